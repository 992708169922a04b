use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::tally::{
    io_common::{clean_choices, make_default_id, parse_count},
    *,
};

pub fn read_excel_file(path: String, cfs: &FileSource) -> BTallyResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(&path);
    let wrange = get_range(&path, cfs)?;

    let id_idx_o = cfs.id_column_index_int()?;
    let choices_start_col = cfs.first_vote_column_index()?;
    let count_idx_o = cfs.count_column_index_int()?;
    let first_row = cfs.first_vote_row_index()?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = idx + 1;
        debug!("read_excel_file: lineno: {:?} row: {:?}", lineno, row);

        let id = match id_idx_o {
            Some(id_idx) => read_cell(lineno, row.get(id_idx))?,
            None => None,
        }
        .unwrap_or_else(|| default_id(lineno));

        let count = match count_idx_o {
            Some(count_idx) => read_count(lineno, row.get(count_idx))?,
            None => None,
        };

        let mut cells: Vec<String> = Vec::new();
        for (col, cell) in row.iter().enumerate().skip(choices_start_col) {
            if Some(col) == id_idx_o || Some(col) == count_idx_o {
                continue;
            }
            if let Some(s) = read_cell(lineno, Some(cell))? {
                cells.push(s);
            }
        }
        let choices = clean_choices(cells.iter().map(|s| s.as_str()));
        debug!("read_excel_file: lineno: {:?} choices: {:?}", lineno, &choices);

        res.push(ParsedBallot {
            id: Some(id),
            count,
            choices,
        });
    }
    Ok(res)
}

fn get_range(path: &str, cfs: &FileSource) -> BTallyResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "read_excel_file: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // Without a name, the first worksheet holds the ballots.
    let wrange = match worksheet_name_o {
        Some(worksheet_name) => workbook.worksheet_range(&worksheet_name),
        None => workbook.worksheet_range_at(0),
    };
    let wrange = wrange
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}

/// Names and ids may be typed as numbers in a spreadsheet.
fn read_cell(lineno: usize, cell: Option<&DataType>) -> BTallyResult<Option<String>> {
    match cell {
        None | Some(DataType::Empty) => Ok(None),
        Some(DataType::String(s)) => Ok(Some(s.clone())),
        Some(DataType::Int(i)) => Ok(Some(i.to_string())),
        Some(DataType::Float(f)) if f.fract() == 0.0 => Ok(Some(format!("{}", *f as i64))),
        Some(x) => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", x),
        }
        .fail()
        .map_err(Box::new),
    }
}

fn read_count(lineno: usize, cell: Option<&DataType>) -> BTallyResult<Option<u64>> {
    match cell {
        None | Some(DataType::Empty) => Ok(None),
        Some(DataType::Int(i)) if *i >= 0 => Ok(Some(*i as u64)),
        Some(DataType::Float(f)) if *f >= 0.0 && f.fract() == 0.0 => Ok(Some(*f as u64)),
        Some(DataType::String(s)) => Ok(parse_count(lineno, s)?),
        Some(x) => InvalidCountSnafu {
            lineno,
            content: format!("{:?}", x),
        }
        .fail()
        .map_err(Box::new),
    }
}
