use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The description of the contest, as written in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source read from the command line: every column is a rank, there is no header.
    pub fn from_input(provider: &str, path: &str, excel_worksheet_name: Option<String>) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            id_column_index: None,
            count_column_index: None,
            excel_worksheet_name,
        }
    }

    // All the indexes below are 0-based. The configuration is 1-based.

    pub fn first_vote_column_index(&self) -> TallyResult<usize> {
        match &self._first_vote_column_index {
            Some(js) => Ok(read_js_int(js)? - 1),
            None => Ok(0),
        }
    }

    pub fn first_vote_row_index(&self) -> TallyResult<usize> {
        match &self._first_vote_row_index {
            Some(js) => Ok(read_js_int(js)? - 1),
            None => Ok(0),
        }
    }

    pub fn id_column_index_int(&self) -> TallyResult<Option<usize>> {
        match &self.id_column_index {
            Some(js) => Ok(Some(read_js_int(js)? - 1)),
            None => Ok(None),
        }
    }

    pub fn count_column_index_int(&self) -> TallyResult<Option<usize>> {
        match &self.count_column_index {
            Some(js) => Ok(Some(read_js_int(js)? - 1)),
            None => Ok(None),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyRules {
    #[serde(rename = "maxCandidates")]
    pub max_candidates: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "ballotSources")]
    pub ballot_sources: Vec<FileSource>,
    pub candidates: Vec<TallyCandidate>,
    #[serde(default)]
    pub rules: TallyRules,
}

/// The command line takes precedence over the configuration file.
pub fn validate_rules(rules: &TallyRules, max_candidates: Option<usize>) -> TallyResult<ElectionRules> {
    let max = max_candidates
        .or(rules.max_candidates)
        .unwrap_or(ElectionRules::MAX_CANDIDATES);
    if max == 0 {
        whatever!("maxCandidates must be at least 1")
    }
    Ok(ElectionRules {
        max_candidates: max,
    })
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu)?;
    Ok(js)
}

/// Reads a 1-based index, either a number or an Excel-style column name ("A", "AB").
fn read_js_int(x: &JSValue) -> TallyResult<usize> {
    let idx = match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            s.to_ascii_uppercase().bytes().try_fold(0usize, |acc, b| {
                acc.checked_mul(26)?.checked_add((b - b'A') as usize + 1)
            })
        }
        JSValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    idx.filter(|&i| i >= 1).context(ParsingJsonNumberSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_are_read_from_numbers_strings_and_letters() {
        assert_eq!(read_js_int(&json!(3)).unwrap(), 3);
        assert_eq!(read_js_int(&json!("12")).unwrap(), 12);
        assert_eq!(read_js_int(&json!("C")).unwrap(), 3);
        assert_eq!(read_js_int(&json!("aa")).unwrap(), 27);
        assert!(read_js_int(&json!(0)).is_err());
        assert!(read_js_int(&json!(-1)).is_err());
        assert!(read_js_int(&json!("C3")).is_err());
        assert!(read_js_int(&json!(null)).is_err());
        assert!(matches!(
            read_js_int(&json!("ABCDEFGHIJKLMNOPQRSTUVWXYZ")),
            Err(TallyError::ParsingJsonNumber {})
        ));
    }

    #[test]
    fn config_is_parsed() {
        let js = r#"{
            "outputSettings": { "contestName": "Board chair", "contestDate": "2026-03-01" },
            "candidates": [ { "name": "Alice" }, { "name": "Bob" } ],
            "ballotSources": [
                { "provider": "csv", "filePath": "ballots.csv",
                  "firstVoteColumnIndex": "C", "firstVoteRowIndex": 2, "countColumnIndex": "2" }
            ]
        }"#;
        let config: TallyConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.contest_name, "Board chair");
        assert_eq!(config.output_settings.contest_office, None);
        assert_eq!(config.rules, TallyRules::default());
        let cfs = &config.ballot_sources[0];
        assert_eq!(cfs.first_vote_column_index().unwrap(), 2);
        assert_eq!(cfs.first_vote_row_index().unwrap(), 1);
        assert_eq!(cfs.count_column_index_int().unwrap(), Some(1));
        assert_eq!(cfs.id_column_index_int().unwrap(), None);
    }

    #[test]
    fn default_source_reads_everything() {
        let cfs = FileSource::from_input("csv", "ballots.csv", None);
        assert_eq!(cfs.first_vote_column_index().unwrap(), 0);
        assert_eq!(cfs.first_vote_row_index().unwrap(), 0);
        assert_eq!(cfs.count_column_index_int().unwrap(), None);
    }

    #[test]
    fn rules_precedence() {
        let rules = TallyRules {
            max_candidates: Some(12),
        };
        assert_eq!(validate_rules(&rules, None).unwrap().max_candidates, 12);
        assert_eq!(validate_rules(&rules, Some(4)).unwrap().max_candidates, 4);
        assert_eq!(
            validate_rules(&TallyRules::default(), None).unwrap(),
            ElectionRules::DEFAULT_RULES
        );
        assert!(validate_rules(&rules, Some(0)).is_err());
    }
}
