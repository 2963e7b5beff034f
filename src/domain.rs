//! Domain models for specifications and deltas.
//!
//! Everything in this module is pure: it works on text and value trees and
//! never touches the filesystem.

/// Specification documents: requirements and scenarios.
pub mod specification;
pub use specification::{
    Requirement, Scenario, Specification, format_requirements, validate_format,
};

/// Delta documents: ordered add/modify/remove/rename operations.
pub mod delta;
pub use delta::{
    DeltaOperation, DeltaSummary, OperationKind, format_operations, parse_operations,
    validate_delta_format,
};

/// Merging deltas into baselines and checking applicability.
pub mod merge;
pub use merge::{Applicability, MergeError, apply_delta_text, check_applicability};

mod config;
pub use config::Config;

mod validation;
pub use validation::ValidationReport;
