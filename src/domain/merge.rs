//! Folding delta operations into a baseline specification.
//!
//! Everything here is pure. Reading and writing files is left to
//! [`crate::storage::Applier`].

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{
    delta::{DeltaOperation, OperationKind, parse_operations},
    specification::{Requirement, Specification, validate_format},
};

/// Whether a delta can be applied to a baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Applicability {
    /// `true` iff [`Applicability::issues`] is empty.
    pub can_apply: bool,
    /// Operations that reference requirements the baseline does not have.
    pub issues: Vec<String>,
}

impl Applicability {
    pub(crate) fn from_issues(issues: Vec<String>) -> Self {
        Self {
            can_apply: issues.is_empty(),
            issues,
        }
    }
}

/// The merged specification failed structural validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MergeError {
    /// The merged text has structural issues, so it must not be written.
    #[error("Merged specification is invalid: {}", .0.join("; "))]
    InvalidResult(Vec<String>),
}

/// Applies a single operation to a specification.
///
/// Operations that target a requirement the specification does not contain
/// are no-ops. Only the first requirement with a matching header is affected.
pub fn apply_operation(specification: &mut Specification, operation: &DeltaOperation) {
    let requirements = specification.requirements_mut();

    match operation.kind {
        OperationKind::Added => {
            requirements.push(Requirement::new(operation.header.clone()));
        }
        OperationKind::Modified => {
            // scenarios are dropped and the operation content is not parsed
            if let Some(index) = position(requirements, &operation.header) {
                requirements[index] = Requirement::new(operation.header.clone());
            }
        }
        OperationKind::Removed => {
            if let Some(index) = position(requirements, &operation.header) {
                requirements.remove(index);
            }
        }
        OperationKind::Renamed => {
            // a rename without `Previous -> New` has nothing to match
            if let Some(index) = operation
                .previous_header
                .as_deref()
                .and_then(|previous| position(requirements, previous))
            {
                requirements[index].header.clone_from(&operation.header);
            }
        }
    }
}

fn position(requirements: &[Requirement], header: &str) -> Option<usize> {
    requirements.iter().position(|r| r.header == header)
}

/// Applies operations in order, returning the new specification.
#[must_use]
pub fn apply_operations(
    mut specification: Specification,
    operations: &[DeltaOperation],
) -> Specification {
    for operation in operations {
        tracing::debug!(kind = %operation.kind, header = %operation.header, "applying operation");
        apply_operation(&mut specification, operation);
    }
    specification
}

/// Merges delta text into baseline text.
///
/// An absent baseline is treated as an empty specification. A delta with no
/// operations leaves the baseline text untouched.
///
/// # Errors
///
/// Returns [`MergeError::InvalidResult`] if the merged text fails structural
/// validation.
pub fn apply_delta_text(baseline: Option<&str>, delta: &str) -> Result<String, MergeError> {
    let operations = parse_operations(delta);

    let merged = if operations.is_empty() {
        baseline.unwrap_or_default().to_string()
    } else {
        let specification = baseline.map(Specification::parse).unwrap_or_default();
        apply_operations(specification, &operations).format()
    };

    let report = validate_format(&merged);
    if report.is_valid {
        Ok(merged)
    } else {
        Err(MergeError::InvalidResult(report.issues))
    }
}

/// Checks that every operation in a delta targets something that exists.
///
/// This is a dry run: nothing is merged. `ADDED` operations are always
/// applicable. Without a baseline, every other operation is an issue.
#[must_use]
pub fn check_applicability(baseline: Option<&str>, delta: &str) -> Applicability {
    let operations = parse_operations(delta);

    let Some(baseline) = baseline else {
        let issues = operations
            .iter()
            .filter(|operation| operation.kind != OperationKind::Added)
            .map(|operation| {
                format!(
                    "Operation {} cannot be applied because no baseline specification exists",
                    operation.kind
                )
            })
            .collect();
        return Applicability::from_issues(issues);
    };

    let specification = Specification::parse(baseline);
    let headers: HashSet<&str> = specification.headers().collect();

    let issues = operations
        .iter()
        .filter_map(|operation| match operation.kind {
            OperationKind::Added => None,
            OperationKind::Modified | OperationKind::Removed => (!headers
                .contains(operation.header.as_str()))
            .then(|| {
                format!(
                    "Operation {} references non-existent requirement: \"{}\"",
                    operation.kind, operation.header
                )
            }),
            OperationKind::Renamed => match operation.previous_header.as_deref() {
                None => Some(format!(
                    "Rename operation \"{}\" does not name a previous header",
                    operation.header
                )),
                Some(previous) => (!headers.contains(previous)).then(|| {
                    format!("Rename operation references non-existent requirement: \"{previous}\"")
                }),
            },
        })
        .collect();

    Applicability::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::specification::Scenario;

    const BASELINE: &str = "### Requirement: User Login

#### Scenario: Valid credentials

A session is created

### Requirement: Password Reset

#### Scenario: Reset email

An email is sent";

    #[test]
    fn added_to_empty_baseline() {
        let merged = apply_delta_text(None, "## [ADDED] X\nsome content").unwrap();
        assert_eq!(merged, "### Requirement: X");
        let spec = Specification::parse(&merged);
        assert_eq!(spec.headers().collect::<Vec<_>>(), ["X"]);
    }

    #[test]
    fn added_appends_in_order() {
        let merged = apply_delta_text(Some(BASELINE), "## [ADDED] Audit Log").unwrap();
        let spec = Specification::parse(&merged);
        assert_eq!(
            spec.headers().collect::<Vec<_>>(),
            ["User Login", "Password Reset", "Audit Log"]
        );
    }

    #[test]
    fn removed() {
        let merged = apply_delta_text(Some(BASELINE), "## [REMOVED] Password Reset").unwrap();
        assert!(merged.contains("User Login"));
        assert!(!merged.contains("Password Reset"));
    }

    #[test]
    fn renamed_keeps_scenarios() {
        let merged = apply_delta_text(
            Some(BASELINE),
            "## [RENAMED] User Login -> User Authentication",
        )
        .unwrap();
        assert!(merged.contains("User Authentication"));
        assert!(!merged.contains("User Login"));

        let spec = Specification::parse(&merged);
        assert_eq!(
            spec.requirement("User Authentication").unwrap().scenarios,
            [Scenario::new("Valid credentials", "A session is created")]
        );
    }

    #[test]
    fn modified_drops_scenarios() {
        let merged = apply_delta_text(
            Some(BASELINE),
            "## [MODIFIED] User Login\n#### Scenario: New behaviour\n\nSomething else",
        )
        .unwrap();
        let spec = Specification::parse(&merged);
        let login = spec.requirement("User Login").unwrap();
        assert!(login.scenarios.is_empty());
        assert!(!merged.contains("New behaviour"));
        assert_eq!(spec.requirements()[0].header, "User Login");
    }

    #[test]
    fn missing_targets_are_no_ops() {
        let mut spec = Specification::parse(BASELINE);
        let before = spec.clone();
        apply_operation(&mut spec, &DeltaOperation::new(OperationKind::Modified, "Nope"));
        apply_operation(&mut spec, &DeltaOperation::new(OperationKind::Removed, "Nope"));
        apply_operation(&mut spec, &DeltaOperation::renamed("Nope", "Still nope"));
        assert_eq!(spec, before);
    }

    #[test]
    fn only_first_match_is_affected() {
        let spec = Specification::new(vec![Requirement::new("Twin"), Requirement::new("Twin")]);
        let spec = apply_operations(spec, &[DeltaOperation::renamed("Twin", "Single")]);
        assert_eq!(spec.headers().collect::<Vec<_>>(), ["Single", "Twin"]);
    }

    #[test]
    fn later_operations_see_earlier_effects() {
        let delta = "## [RENAMED] User Login -> Sign In\n## [REMOVED] Sign In\n## [ADDED] Sign In";
        let merged = apply_delta_text(Some(BASELINE), delta).unwrap();
        assert_eq!(
            merged,
            "### Requirement: Password Reset\n\n#### Scenario: Reset email\n\nAn email is \
             sent\n\n### Requirement: Sign In"
        );
    }

    #[test]
    fn duplicate_addition_fails_validation() {
        let error = apply_delta_text(Some(BASELINE), "## [ADDED] User Login").unwrap_err();
        assert_eq!(
            error,
            MergeError::InvalidResult(vec![
                "Duplicate requirement headers found: Requirement: User Login".to_string()
            ])
        );
    }

    #[test]
    fn removing_everything_fails_validation() {
        let delta = "## [REMOVED] User Login\n## [REMOVED] Password Reset";
        let error = apply_delta_text(Some(BASELINE), delta).unwrap_err();
        assert!(error.to_string().contains("No requirement headers found"));
    }

    #[test]
    fn empty_delta_passes_baseline_through() {
        let baseline = "# Auth\n\nPreamble survives.\n\n### Requirement: User Login\n";
        assert_eq!(apply_delta_text(Some(baseline), "").unwrap(), baseline);
        assert_eq!(apply_delta_text(Some(BASELINE), "").unwrap(), BASELINE);
    }

    #[test]
    fn unknown_modification_is_inapplicable() {
        let result = check_applicability(Some(BASELINE), "## [MODIFIED] Non-existent Feature");
        assert!(!result.can_apply);
        assert_eq!(
            result.issues,
            ["Operation MODIFIED references non-existent requirement: \"Non-existent Feature\""]
        );
    }

    #[test]
    fn unknown_rename_source_is_inapplicable() {
        let result = check_applicability(Some(BASELINE), "## [RENAMED] Logout -> Sign Out");
        assert_eq!(
            result.issues,
            ["Rename operation references non-existent requirement: \"Logout\""]
        );
    }

    #[test]
    fn rename_without_previous_header_matches_nothing() {
        let baseline = "### Requirement:  \n\n### Requirement: Other";
        let delta = "## [RENAMED] Just a name";

        let mut spec = Specification::parse(baseline);
        let before = spec.clone();
        apply_operation(&mut spec, &parse_operations(delta)[0]);
        assert_eq!(spec, before);

        let error = apply_delta_text(Some(baseline), delta).unwrap_err();
        assert!(error.to_string().contains("Requirement header cannot be empty"));

        let result = check_applicability(Some(baseline), delta);
        assert!(!result.can_apply);
        assert_eq!(
            result.issues,
            ["Rename operation \"Just a name\" does not name a previous header"]
        );
    }

    #[test]
    fn no_baseline_allows_only_additions() {
        let delta = "## [ADDED] New\n## [MODIFIED] Old\n## [REMOVED] Older";
        let result = check_applicability(None, delta);
        assert!(!result.can_apply);
        assert_eq!(
            result.issues,
            [
                "Operation MODIFIED cannot be applied because no baseline specification exists",
                "Operation REMOVED cannot be applied because no baseline specification exists",
            ]
        );
    }

    #[test]
    fn additions_are_always_applicable() {
        let result = check_applicability(Some(BASELINE), "## [ADDED] User Login");
        assert!(result.can_apply);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn existing_targets_are_applicable() {
        let delta = "## [MODIFIED] User Login\n## [REMOVED] Password Reset\n## [RENAMED] User \
                     Login -> Sign In";
        assert!(check_applicability(Some(BASELINE), delta).can_apply);
    }

    #[test]
    fn empty_baseline_is_not_absent() {
        let result = check_applicability(Some(""), "## [REMOVED] Anything");
        assert_eq!(
            result.issues,
            ["Operation REMOVED references non-existent requirement: \"Anything\""]
        );
    }
}
