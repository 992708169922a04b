use serde::Deserialize;

use crate::tally::*;

#[derive(Debug, Deserialize)]
struct JsonBallot {
    id: Option<String>,
    ranking: Vec<String>,
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JsonBallots {
    ballots: Vec<JsonBallot>,
}

/// Reads ballots written as `{"ballots": [{"id": "b1", "ranking": [..], "count": 2}]}`.
pub fn read_json(path: String) -> BTallyResult<Vec<ParsedBallot>> {
    let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: &path })?;
    parse_ballots(&contents)
}

fn parse_ballots(contents: &str) -> BTallyResult<Vec<ParsedBallot>> {
    let js: JsonBallots = serde_json::from_str(contents).context(ParsingJsonSnafu)?;
    let res = js
        .ballots
        .into_iter()
        .map(|b| ParsedBallot {
            id: b.id,
            count: b.count,
            choices: b.ranking,
        })
        .collect();
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballots_with_and_without_ids() {
        let ballots = parse_ballots(
            r#"{"ballots": [
                {"id": "v1", "ranking": ["Alice", "Bob"], "count": 3},
                {"ranking": ["Bob", "Alice"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(ballots.len(), 2);
        assert_eq!(ballots[0].id.as_deref(), Some("v1"));
        assert_eq!(ballots[0].count, Some(3));
        assert_eq!(ballots[1].id, None);
        assert_eq!(ballots[1].choices, vec!["Bob", "Alice"]);
    }

    #[test]
    fn negative_count_is_rejected() {
        let err = parse_ballots(r#"{"ballots": [{"ranking": ["Alice"], "count": -1}]}"#)
            .unwrap_err();
        assert!(matches!(*err, TallyError::ParsingJson { .. }));
    }
}
