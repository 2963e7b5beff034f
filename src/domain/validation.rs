use serde::Serialize;

/// The outcome of a structural check over raw document text.
///
/// Issues are human-readable and ordered the way they were found: line-level
/// problems first, in document order, then document-wide problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` iff [`ValidationReport::issues`] is empty.
    pub is_valid: bool,
    /// The problems found, in the order they were detected.
    pub issues: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

/// Returns each value that occurs more than once, in the order its second
/// occurrence was seen, without repeats.
pub(crate) fn duplicates<'a>(values: &[&'a str]) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for value in values {
        if !seen.insert(*value) && !duplicates.contains(value) {
            duplicates.push(*value);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_issue_list_is_valid() {
        let report = ValidationReport::from_issues(Vec::new());
        assert!(report.is_valid);
    }

    #[test]
    fn any_issue_is_invalid() {
        let report = ValidationReport::from_issues(vec!["oops".to_string()]);
        assert!(!report.is_valid);
        assert_eq!(report.issues, ["oops"]);
    }

    #[test]
    fn duplicates_are_reported_once_each() {
        let values = ["a", "b", "a", "c", "b", "a"];
        assert_eq!(duplicates(&values), ["a", "b"]);
    }

    #[test]
    fn unique_values_have_no_duplicates() {
        assert!(duplicates(&["a", "b", "c"]).is_empty());
    }
}
