//! Plain-text Specification Deltas
//!
//! Specifications are markdown documents made of requirements and scenarios.
//! Deltas are markdown documents listing `ADDED`, `MODIFIED`, `REMOVED` and
//! `RENAMED` operations against a baseline specification.

pub mod domain;
pub use domain::{
    Applicability, Config, DeltaOperation, OperationKind, Requirement, Scenario, Specification,
    ValidationReport,
};

/// Reading and writing specification files, and applying deltas to them.
pub mod storage;
pub use storage::{Applier, ApplyOutcome};
