use std::{path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use specdelta::{
    Applicability, Applier, ValidationReport,
    domain::{DeltaSummary, check_applicability, parse_operations, validate_delta_format},
};
use tracing::instrument;

use super::terminal::{bullets, status};

#[derive(Debug, Parser)]
#[command(about = "Check that a delta is well-formed and can be applied to a baseline")]
pub struct Check {
    /// The delta document to check
    delta: PathBuf,

    /// The baseline specification, if there is one
    #[arg(long, short)]
    baseline: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// The findings for one delta.
#[derive(Debug)]
struct Report {
    format: ValidationReport,
    summary: DeltaSummary,
    applicability: Applicability,
}

impl Report {
    const fn passed(&self) -> bool {
        self.format.is_valid && self.applicability.can_apply
    }
}

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let report = self.report()?;

        match self.output {
            OutputFormat::Table => Self::output_table(&report),
            OutputFormat::Json => Self::output_json(&report)?,
        }

        if !report.passed() {
            process::exit(2);
        }
        Ok(())
    }

    fn report(&self) -> anyhow::Result<Report> {
        let text = std::fs::read_to_string(&self.delta)
            .with_context(|| format!("failed to read {}", self.delta.display()))?;

        Ok(Report {
            format: validate_delta_format(&text),
            summary: DeltaSummary::of(&parse_operations(&text)),
            applicability: self.applicability(&text),
        })
    }

    fn applicability(&self, text: &str) -> Applicability {
        match &self.baseline {
            Some(baseline) => Applier::new().validate_delta_application(baseline, &self.delta),
            None => check_applicability(None, text),
        }
    }

    fn output_table(report: &Report) {
        let Report {
            format,
            summary,
            applicability,
        } = report;

        println!(
            "Operations: {} ({} added, {} modified, {} removed, {} renamed)",
            summary.total(),
            summary.added,
            summary.modified,
            summary.removed,
            summary.renamed
        );

        Self::output_section("Format:       ", "well-formed", &format.issues);
        Self::output_section(
            "Applicability:",
            "all operations can be applied",
            &applicability.issues,
        );
    }

    fn output_section(label: &str, ok: &str, issues: &[String]) {
        if issues.is_empty() {
            println!("{}", status(true, &format!("{label} {ok}")));
        } else {
            let summary = format!("{label} {} issues found", issues.len());
            println!("{}", status(false, &summary));
            println!("{}", bullets(issues));
        }
    }

    fn output_json(report: &Report) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "operations": report.summary,
            "format": report.format,
            "applicability": report.applicability,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
