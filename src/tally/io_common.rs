use std::path::Path;

use crate::tally::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Ballots without an id are named after the file and the line they come from.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// An empty count is the default count of 1.
pub fn parse_count(lineno: usize, content: &str) -> TallyResult<Option<u64>> {
    let s = content.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<u64>()
        .ok()
        .map(Some)
        .context(InvalidCountSnafu { lineno, content })
}

/// Blank cells are not rankings. The names are trimmed.
pub fn clean_choices<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<String> {
    cells
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids() {
        let f = make_default_id("/tmp/elections/ballots.csv");
        assert_eq!(f(3), "ballots.csv-00000003");
    }

    #[test]
    fn counts() {
        assert_eq!(parse_count(1, " 12 ").unwrap(), Some(12));
        assert_eq!(parse_count(1, "").unwrap(), None);
        assert!(matches!(
            parse_count(4, "x"),
            Err(TallyError::InvalidCount { lineno: 4, .. })
        ));
    }

    #[test]
    fn blank_cells_are_dropped() {
        let cells = vec![" Alice", "", "Bob ", "  "];
        assert_eq!(
            clean_choices(cells.into_iter()),
            vec!["Alice".to_string(), "Bob".to_string()]
        );
    }
}
