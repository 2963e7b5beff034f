//! Delta documents: ordered amendments to a specification.
//!
//! ```markdown
//! ## [ADDED] Two-factor Authentication
//! ## [MODIFIED] User Login
//! ## [REMOVED] Legacy Sign-in
//! ## [RENAMED] Password Reset -> Account Recovery
//! ```

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::domain::validation::ValidationReport;

static OPERATION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+\[(ADDED|MODIFIED|REMOVED|RENAMED)\]\s*(.+)$").expect("valid regex")
});

// Also matches operation lines with nothing after the tag, for validation.
static OPERATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+\[(ADDED|MODIFIED|REMOVED|RENAMED)\]\s*(.*)$").expect("valid regex")
});

static RENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\s*->\s*(.+)$").expect("valid regex"));

// Any arrow at all, so the validator can tell a missing side from a missing arrow.
static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)->(.*)$").expect("valid regex"));

/// The kind of change a [`DeltaOperation`] makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Append a new requirement.
    Added,
    /// Replace an existing requirement.
    Modified,
    /// Delete an existing requirement.
    Removed,
    /// Change the header of an existing requirement.
    Renamed,
}

impl OperationKind {
    /// All kinds, in the order they are usually listed.
    pub const ALL: [Self; 4] = [Self::Added, Self::Modified, Self::Removed, Self::Renamed];

    /// The tag used between brackets in a delta document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Removed => "REMOVED",
            Self::Renamed => "RENAMED",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tag was not one of `ADDED`, `MODIFIED`, `REMOVED` or `RENAMED`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown operation type '{0}'")]
pub struct UnknownKind(String);

impl FromStr for OperationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A single change in a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaOperation {
    /// What the operation does.
    pub kind: OperationKind,
    /// The target requirement header.
    ///
    /// For [`OperationKind::Renamed`] this is the new header.
    pub header: String,
    /// Free text following the operation header, trimmed.
    pub content: String,
    /// The old header of a rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_header: Option<String>,
}

impl DeltaOperation {
    /// Creates an operation with no content.
    #[must_use]
    pub fn new(kind: OperationKind, header: impl Into<String>) -> Self {
        Self {
            kind,
            header: header.into(),
            content: String::new(),
            previous_header: None,
        }
    }

    /// Creates a rename from `previous` to `header`.
    #[must_use]
    pub fn renamed(previous: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            previous_header: Some(previous.into()),
            ..Self::new(OperationKind::Renamed, header)
        }
    }

    /// Sets the content, returning the operation.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// The text that follows the `[TYPE]` tag when formatted.
    fn target(&self) -> String {
        match (self.kind, &self.previous_header) {
            (OperationKind::Renamed, Some(previous)) => format!("{previous} -> {}", self.header),
            _ => self.header.clone(),
        }
    }
}

/// Parses a delta document into its operations, in file order.
///
/// Lines before the first operation header are ignored. A `RENAMED` header of
/// the form `Previous -> New` is split so that `header` holds the new name and
/// `previous_header` the old one. Malformed input yields zero or partial
/// operations.
#[must_use]
pub fn parse_operations(text: &str) -> Vec<DeltaOperation> {
    let mut operations = Vec::new();
    let mut current: Option<(DeltaOperation, Vec<&str>)> = None;

    for line in text.split('\n') {
        if let Some(operation) = parse_operation_header(line) {
            if let Some(open) = current.take() {
                operations.push(close(open));
            }
            current = Some((operation, Vec::new()));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    operations.extend(current.map(close));
    operations
}

fn close((mut operation, lines): (DeltaOperation, Vec<&str>)) -> DeltaOperation {
    operation.content = lines.join("\n").trim().to_string();
    operation
}

fn parse_operation_header(line: &str) -> Option<DeltaOperation> {
    let captures = OPERATION_HEADER.captures(line)?;
    // the pattern only admits the four known tags
    let kind: OperationKind = captures[1].parse().ok()?;
    let header = captures[2].trim();

    if kind == OperationKind::Renamed {
        if let Some((previous, new)) = split_rename(header) {
            return Some(DeltaOperation::renamed(previous, new));
        }
    }

    Some(DeltaOperation::new(kind, header))
}

fn split_rename(header: &str) -> Option<(&str, &str)> {
    let captures = RENAME.captures(header)?;
    Some((
        captures.get(1)?.as_str().trim(),
        captures.get(2)?.as_str().trim(),
    ))
}

/// Formats operations back into a delta document.
///
/// Renames are written as `Previous -> New`. This is the inverse of
/// [`parse_operations`] for anything it can produce.
#[must_use]
pub fn format_operations(operations: &[DeltaOperation]) -> String {
    let mut output = String::new();
    for operation in operations {
        output.push_str(&format!(
            "## [{}] {}\n{}\n\n",
            operation.kind,
            operation.target(),
            operation.content
        ));
    }
    output.truncate(output.trim_end().len());
    output
}

/// Checks delta text for syntax problems.
///
/// Line numbers in the issues are 1-based.
#[must_use]
pub fn validate_delta_format(text: &str) -> ValidationReport {
    let mut issues = Vec::new();
    let mut operation_count = 0usize;

    for (index, line) in text.split('\n').enumerate() {
        let number = index + 1;
        let Some(captures) = OPERATION_LINE.captures(line) else {
            continue;
        };
        operation_count += 1;

        let header = captures[2].trim();
        if header.is_empty() {
            issues.push(format!("Line {number}: Operation header cannot be empty"));
            continue;
        }

        if &captures[1] == OperationKind::Renamed.as_str() && split_rename(header).is_none() {
            if ARROW.is_match(header) {
                issues.push(format!(
                    "Line {number}: RENAMED operation requires both previous and new headers"
                ));
            } else {
                issues.push(format!(
                    "Line {number}: RENAMED operation should follow format \"Previous Header -> \
                     New Header\""
                ));
            }
        }
    }

    if operation_count == 0 {
        issues.push(
            "No valid delta operations found. At least one operation with format \"## [TYPE] \
             Header\" is required."
                .to_string(),
        );
    }

    ValidationReport::from_issues(issues)
}

/// Per-kind operation counts for a delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaSummary {
    /// Number of `ADDED` operations.
    pub added: usize,
    /// Number of `MODIFIED` operations.
    pub modified: usize,
    /// Number of `REMOVED` operations.
    pub removed: usize,
    /// Number of `RENAMED` operations.
    pub renamed: usize,
}

impl DeltaSummary {
    /// Counts the operations of each kind.
    #[must_use]
    pub fn of(operations: &[DeltaOperation]) -> Self {
        operations
            .iter()
            .fold(Self::default(), |mut summary, operation| {
                match operation.kind {
                    OperationKind::Added => summary.added += 1,
                    OperationKind::Modified => summary.modified += 1,
                    OperationKind::Removed => summary.removed += 1,
                    OperationKind::Renamed => summary.renamed += 1,
                }
                summary
            })
    }

    /// Total number of operations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.added + self.modified + self.removed + self.renamed
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const DELTA: &str = "## [ADDED] Two-factor Authentication
Users may enable a second factor.

## [MODIFIED] User Login
Login now requires a verified email.

## [REMOVED] Legacy Sign-in
Replaced by single sign-on.

## [RENAMED] Password Reset -> Account Recovery";

    fn delta() -> Vec<DeltaOperation> {
        vec![
            DeltaOperation::new(OperationKind::Added, "Two-factor Authentication")
                .with_content("Users may enable a second factor."),
            DeltaOperation::new(OperationKind::Modified, "User Login")
                .with_content("Login now requires a verified email."),
            DeltaOperation::new(OperationKind::Removed, "Legacy Sign-in")
                .with_content("Replaced by single sign-on."),
            DeltaOperation::renamed("Password Reset", "Account Recovery"),
        ]
    }

    #[test]
    fn parse_all_kinds() {
        assert_eq!(parse_operations(DELTA), delta());
    }

    #[test]
    fn format_is_canonical() {
        assert_eq!(format_operations(&delta()), DELTA);
    }

    #[test]
    fn round_trip() {
        let operations = delta();
        assert_eq!(parse_operations(&format_operations(&operations)), operations);
    }

    #[test]
    fn trailing_empty_header_is_lost_on_round_trip() {
        let operations = parse_operations("## [ADDED] A\n## [ADDED]  ");
        assert_eq!(
            operations,
            [
                DeltaOperation::new(OperationKind::Added, "A"),
                DeltaOperation::new(OperationKind::Added, ""),
            ]
        );
        // the bare tag line no longer matches and becomes content
        assert_eq!(
            parse_operations(&format_operations(&operations)),
            [DeltaOperation::new(OperationKind::Added, "A").with_content("## [ADDED]")]
        );
    }

    #[test]
    fn rename_syntax_is_reconstructed() {
        let formatted = format_operations(&[DeltaOperation::renamed("Old", "New")]);
        assert_eq!(formatted, "## [RENAMED] Old -> New");
    }

    #[test]
    fn rename_without_arrow_keeps_header() {
        let operations = parse_operations("## [RENAMED] Just a name");
        assert_eq!(
            operations,
            [DeltaOperation::new(OperationKind::Renamed, "Just a name")]
        );
    }

    #[test]
    fn rename_splits_on_last_arrow() {
        let operations = parse_operations("## [RENAMED] A -> B -> C");
        assert_eq!(operations, [DeltaOperation::renamed("A -> B", "C")]);
    }

    #[test]
    fn text_before_first_operation_is_ignored() {
        let operations = parse_operations("# Change\n\nsome notes\n## [REMOVED] X\nbecause");
        assert_eq!(
            operations,
            [DeltaOperation::new(OperationKind::Removed, "X").with_content("because")]
        );
    }

    #[test]
    fn tag_without_space_is_accepted() {
        let operations = parse_operations("## [ADDED]Compact");
        assert_eq!(operations, [DeltaOperation::new(OperationKind::Added, "Compact")]);
    }

    #[test_case(""; "empty")]
    #[test_case("## [CHANGED] Something"; "unknown tag")]
    #[test_case("### [ADDED] Wrong level"; "wrong level")]
    #[test_case("## [ADDED]"; "missing header")]
    fn no_operations(text: &str) {
        assert!(parse_operations(text).is_empty());
    }

    #[test]
    fn kind_from_str() {
        assert_eq!("MODIFIED".parse(), Ok(OperationKind::Modified));
        assert!("modified".parse::<OperationKind>().is_err());
    }

    #[test]
    fn valid_delta_has_no_issues() {
        let report = validate_delta_format(DELTA);
        assert!(report.is_valid, "{:?}", report.issues);
    }

    #[test]
    fn formatted_delta_revalidates() {
        assert!(validate_delta_format(&format_operations(&delta())).is_valid);
    }

    #[test_case("## [ADDED]", "Line 1: Operation header cannot be empty"; "empty header")]
    #[test_case("## [REMOVED]    ", "Line 1: Operation header cannot be empty"; "blank header")]
    #[test_case(
        "## [RENAMED] No arrow here",
        "Line 1: RENAMED operation should follow format \"Previous Header -> New Header\"";
        "rename without arrow"
    )]
    #[test_case(
        "## [RENAMED] ->  ",
        "Line 1: RENAMED operation requires both previous and new headers";
        "rename with nothing around arrow"
    )]
    #[test_case(
        "## [RENAMED]  -> New",
        "Line 1: RENAMED operation requires both previous and new headers";
        "rename missing previous"
    )]
    #[test_case(
        "## [RENAMED] Old ->  ",
        "Line 1: RENAMED operation requires both previous and new headers";
        "rename missing new"
    )]
    fn operation_line_issues(text: &str, expected: &str) {
        assert_eq!(validate_delta_format(text).issues, [expected]);
    }

    #[test]
    fn missing_operations_are_reported() {
        assert_eq!(
            validate_delta_format("# Nothing to see").issues,
            ["No valid delta operations found. At least one operation with format \"## \
              [TYPE] Header\" is required."]
        );
    }

    #[test]
    fn summary_counts_each_kind() {
        let summary = DeltaSummary::of(&delta());
        assert_eq!(
            summary,
            DeltaSummary {
                added: 1,
                modified: 1,
                removed: 1,
                renamed: 1,
            }
        );
        assert_eq!(summary.total(), 4);
    }
}
