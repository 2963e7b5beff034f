use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use specdelta::Specification;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Display the requirements and scenarios of a specification")]
pub struct Show {
    /// The specification to display
    path: PathBuf,

    /// Only show this requirement
    #[arg(long)]
    requirement: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Include scenario descriptions
    #[arg(long)]
    with_descriptions: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let specification = Specification::parse(&text);

        let specification = match &self.requirement {
            Some(header) => {
                let Some(requirement) = specification.requirement(header) else {
                    anyhow::bail!("Requirement \"{header}\" not found");
                };
                Specification::new(vec![requirement.clone()])
            }
            None => specification,
        };

        match self.output {
            OutputFormat::Pretty => self.output_pretty(&specification),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&specification)?);
            }
        }

        Ok(())
    }

    fn output_pretty(&self, specification: &Specification) {
        if specification.is_empty() {
            println!("{}", "No requirements found".muted());
            return;
        }

        // descriptions wrap badly on narrow terminals
        let with_descriptions = self.with_descriptions && !is_narrow();

        for requirement in specification.requirements() {
            println!("{}", requirement.header.heading());
            if requirement.scenarios.is_empty() {
                println!("  {}", "(no scenarios)".muted());
            }
            for scenario in &requirement.scenarios {
                println!("  • {}", scenario.header);
                if with_descriptions && !scenario.description.is_empty() {
                    for line in scenario.description.lines() {
                        println!("      {}", line.muted());
                    }
                }
            }
        }

        let scenarios: usize = specification
            .requirements()
            .iter()
            .map(|requirement| requirement.scenarios.len())
            .sum();
        println!(
            "\n{}",
            format!(
                "{} requirements, {scenarios} scenarios",
                specification.requirements().len()
            )
            .muted()
        );
    }
}
