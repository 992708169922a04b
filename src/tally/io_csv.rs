// Primitives for reading CSV files.

use std::fs::File;

use crate::tally::{
    io_common::{clean_choices, make_default_id, parse_count},
    *,
};

pub fn read_csv_ranking(path: String, cfs: &FileSource) -> BTallyResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    let (records, row_offset) = get_records(&path, cfs)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu)?;
        debug!("read_csv_ranking: lineno: {:?} line: {:?}", lineno, line);

        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: Option<u64> = if let Some(count_idx) = count_idx_o {
            let cell = line
                .get(count_idx)
                .context(CsvLineTooShortSnafu { lineno })?;
            parse_count(lineno, cell)?
        } else {
            None
        };

        let cells = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != id_idx_o && Some(*col) != count_idx_o)
            .map(|(_, s)| s);
        let choices = clean_choices(cells);
        debug!("read_csv_ranking: lineno: {:?} choices: {:?}", lineno, &choices);

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}

fn get_records(path: &str, cfs: &FileSource) -> BTallyResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = cfs.first_vote_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn plain_rankings() {
        let f = write_csv("Alice,Bob,Charlie\nBob, Charlie ,Alice\n");
        let path = f.path().display().to_string();
        let cfs = FileSource::from_input("csv", &path, None);
        let ballots = read_csv_ranking(path, &cfs).unwrap();
        assert_eq!(ballots.len(), 2);
        assert_eq!(ballots[1].choices, vec!["Bob", "Charlie", "Alice"]);
        assert_eq!(ballots[1].count, None);
        assert!(ballots[0].id.as_ref().unwrap().ends_with("-00000001"));
    }

    #[test]
    fn header_id_and_count_columns() {
        let f = write_csv("id,count,r1,r2\nb1,4,Alice,Bob\nb2,,Bob,Alice\n");
        let path = f.path().display().to_string();
        let cfs: FileSource = serde_json::from_value(json!({
            "provider": "csv",
            "filePath": path,
            "firstVoteColumnIndex": 3,
            "firstVoteRowIndex": 2,
            "idColumnIndex": 1,
            "countColumnIndex": "B"
        }))
        .unwrap();
        let ballots = read_csv_ranking(path, &cfs).unwrap();
        assert_eq!(
            ballots,
            vec![
                ParsedBallot {
                    id: Some("b1".to_string()),
                    count: Some(4),
                    choices: vec!["Alice".to_string(), "Bob".to_string()],
                },
                ParsedBallot {
                    id: Some("b2".to_string()),
                    count: None,
                    choices: vec!["Bob".to_string(), "Alice".to_string()],
                },
            ]
        );
    }

    #[test]
    fn bad_count_reports_the_line() {
        let f = write_csv("Alice,Bob,many\n");
        let path = f.path().display().to_string();
        let cfs: FileSource = serde_json::from_value(json!({
            "provider": "csv",
            "filePath": path,
            "countColumnIndex": 3
        }))
        .unwrap();
        let err = read_csv_ranking(path, &cfs).unwrap_err();
        assert!(matches!(*err, TallyError::InvalidCount { lineno: 1, .. }));
    }

    #[test]
    fn missing_file() {
        let cfs = FileSource::from_input("csv", "/nonexistent/ballots.csv", None);
        let err = read_csv_ranking("/nonexistent/ballots.csv".to_string(), &cfs).unwrap_err();
        assert!(matches!(*err, TallyError::CsvOpen { .. }));
    }
}
