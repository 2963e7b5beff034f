//! The specification document model.
//!
//! A specification is a markdown document made of requirements, each holding
//! zero or more scenarios:
//!
//! ```markdown
//! ### Requirement: User Login
//!
//! #### Scenario: Valid credentials
//!
//! Given a registered user, when they log in, then a session is created.
//! ```
//!
//! Parsing is lenient and never fails. Structural problems are reported
//! separately by [`validate_format`], which works on the raw text so that it
//! can point at line numbers.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::domain::validation::{ValidationReport, duplicates};

const REQUIREMENT_PREFIX: &str = "Requirement:";
const SCENARIO_PREFIX: &str = "Scenario:";

static REQUIREMENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s+Requirement:(.+)$").expect("valid regex"));
static SCENARIO_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^####\s+Scenario:(.+)$").expect("valid regex"));

// Looser patterns used by the validator to catch misnamed headers.
static LEVEL_THREE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s+(.+)$").expect("valid regex"));
static LEVEL_FOUR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^####\s+(.+)$").expect("valid regex"));

/// A named, described behaviour example nested under a [`Requirement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// The text following `#### Scenario:`, trimmed.
    pub header: String,
    /// Free text between this scenario's header and the next header, trimmed.
    pub description: String,
}

impl Scenario {
    /// Creates a scenario.
    #[must_use]
    pub fn new(header: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            description: description.into(),
        }
    }
}

/// A named section of a [`Specification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// The text following `### Requirement:`, trimmed.
    pub header: String,
    /// Scenarios in document order.
    pub scenarios: Vec<Scenario>,
}

impl Requirement {
    /// Creates a requirement with no scenarios.
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            scenarios: Vec::new(),
        }
    }

    /// Adds a scenario, returning the requirement.
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }
}

/// An ordered sequence of requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Specification {
    requirements: Vec<Requirement>,
}

impl Specification {
    /// Creates a specification from requirements, keeping their order.
    #[must_use]
    pub const fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    /// Parses specification text.
    ///
    /// Text before the first requirement header, and text between a
    /// requirement header and its first scenario header, is discarded.
    /// Malformed input yields an empty or partial specification.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut requirements = Vec::new();
        let state = text
            .split('\n')
            .fold(State::NoSection, |state, line| state.step(line, &mut requirements));
        state.close(&mut requirements);
        Self { requirements }
    }

    /// The requirements, in document order.
    #[must_use]
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub(crate) const fn requirements_mut(&mut self) -> &mut Vec<Requirement> {
        &mut self.requirements
    }

    /// Consumes the specification, returning its requirements.
    #[must_use]
    pub fn into_requirements(self) -> Vec<Requirement> {
        self.requirements
    }

    /// Iterates over requirement headers in document order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.requirements.iter().map(|r| r.header.as_str())
    }

    /// Finds the first requirement with exactly this header.
    #[must_use]
    pub fn requirement(&self, header: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.header == header)
    }

    /// Returns `true` if there are no requirements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Formats the specification back into markdown.
    ///
    /// See [`format_requirements`].
    #[must_use]
    pub fn format(&self) -> String {
        format_requirements(&self.requirements)
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Formats requirements as specification markdown.
///
/// This is the inverse of [`Specification::parse`] for any tree the parser
/// can produce. Content the parser drops is not reproduced.
#[must_use]
pub fn format_requirements(requirements: &[Requirement]) -> String {
    let mut output = String::new();
    for requirement in requirements {
        output.push_str(&format!("### {REQUIREMENT_PREFIX} {}\n\n", requirement.header));
        for scenario in &requirement.scenarios {
            output.push_str(&format!(
                "#### {SCENARIO_PREFIX} {}\n\n{}\n\n",
                scenario.header, scenario.description
            ));
        }
    }
    output.truncate(output.trim_end().len());
    output
}

/// Checks specification text for structural problems.
///
/// Line numbers in the issues are 1-based.
#[must_use]
pub fn validate_format(text: &str) -> ValidationReport {
    let mut issues = Vec::new();
    let mut requirement_headers = Vec::new();
    let mut scenario_headers = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        let number = index + 1;

        if let Some(header) = capture(&LEVEL_THREE_HEADER, line) {
            check_header(header, "Requirement", number, &mut issues, &mut requirement_headers);
        } else if let Some(header) = capture(&LEVEL_FOUR_HEADER, line) {
            check_header(header, "Scenario", number, &mut issues, &mut scenario_headers);
        }
    }

    if requirement_headers.is_empty() {
        issues.push(
            "No requirement headers found. Specifications should include at least one \
             \"### Requirement:\" header."
                .to_string(),
        );
    }

    report_duplicates("requirement", &requirement_headers, &mut issues);
    report_duplicates("scenario", &scenario_headers, &mut issues);

    ValidationReport::from_issues(issues)
}

/// Pushes one issue per duplicated header, each listing every duplicate.
fn report_duplicates(kind: &str, headers: &[(&str, bool)], issues: &mut Vec<String>) {
    let values = duplicates(&non_empty(headers));
    let message = format!("Duplicate {kind} headers found: {}", values.join(", "));
    issues.extend(std::iter::repeat_n(message, values.len()));
}

/// Checks a single header capture such as `Requirement: User Login`.
///
/// Well-prefixed headers are recorded along with whether their name is empty.
fn check_header<'a>(
    header: &'a str,
    kind: &str,
    line: usize,
    issues: &mut Vec<String>,
    seen: &mut Vec<(&'a str, bool)>,
) {
    let header = header.trim_end();
    let prefix = format!("{kind}:");
    match header.strip_prefix(&prefix) {
        None => issues.push(format!(
            "Line {line}: {kind} header should start with \"{prefix}\""
        )),
        Some(name) => {
            let empty = name.trim().is_empty();
            if empty {
                issues.push(format!("Line {line}: {kind} header cannot be empty"));
            }
            seen.push((header, empty));
        }
    }
}

fn non_empty<'a>(headers: &[(&'a str, bool)]) -> Vec<&'a str> {
    headers
        .iter()
        .filter(|(_, empty)| !empty)
        .map(|(header, _)| *header)
        .collect()
}

fn capture<'a>(pattern: &Regex, line: &'a str) -> Option<&'a str> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// A scenario whose description lines are still being collected.
#[derive(Debug)]
struct OpenScenario<'a> {
    header: String,
    lines: Vec<&'a str>,
}

impl<'a> OpenScenario<'a> {
    fn new(header: &str) -> Self {
        Self {
            header: header.trim().to_string(),
            lines: Vec::new(),
        }
    }

    fn close(self) -> Scenario {
        Scenario {
            header: self.header,
            description: self.lines.join("\n").trim().to_string(),
        }
    }

    fn push(&mut self, line: &'a str) {
        self.lines.push(line);
    }
}

/// Parser state. Every transition flushes whatever the previous state held.
#[derive(Debug)]
enum State<'a> {
    NoSection,
    InRequirement(Requirement),
    InRequirementAndScenario(Requirement, OpenScenario<'a>),
}

impl<'a> State<'a> {
    fn step(self, line: &'a str, done: &mut Vec<Requirement>) -> Self {
        if let Some(header) = capture(&REQUIREMENT_HEADER, line) {
            self.close(done);
            return Self::InRequirement(Requirement::new(header.trim()));
        }

        let scenario_header = capture(&SCENARIO_HEADER, line);
        match (self, scenario_header) {
            (Self::NoSection, _) => Self::NoSection,
            (Self::InRequirement(requirement), Some(header)) => {
                Self::InRequirementAndScenario(requirement, OpenScenario::new(header))
            }
            // preamble between a requirement and its first scenario is dropped
            (Self::InRequirement(requirement), None) => Self::InRequirement(requirement),
            (Self::InRequirementAndScenario(mut requirement, scenario), Some(header)) => {
                requirement.scenarios.push(scenario.close());
                Self::InRequirementAndScenario(requirement, OpenScenario::new(header))
            }
            (Self::InRequirementAndScenario(requirement, mut scenario), None) => {
                scenario.push(line);
                Self::InRequirementAndScenario(requirement, scenario)
            }
        }
    }

    fn close(self, done: &mut Vec<Requirement>) {
        match self {
            Self::NoSection => {}
            Self::InRequirement(requirement) => done.push(requirement),
            Self::InRequirementAndScenario(mut requirement, scenario) => {
                requirement.scenarios.push(scenario.close());
                done.push(requirement);
            }
        }
    }
}
