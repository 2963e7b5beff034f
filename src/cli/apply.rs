use std::{
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use specdelta::{Applicability, Applier, ApplyOutcome, Config};
use tracing::instrument;

use super::terminal::{Colorize, Stream, Tone, bullets};

#[derive(Debug, Parser)]
pub struct Apply {
    /// The delta document to apply
    delta: PathBuf,

    /// The baseline specification. It does not need to exist yet.
    #[arg(long, short)]
    baseline: PathBuf,

    /// Where to write the merged specification (defaults to the baseline)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Merge even if some operations target requirements that don't exist
    #[arg(long)]
    force: bool,
}

/// What `apply` did.
#[derive(Debug)]
enum Decision {
    /// The applicability check failed, so nothing was merged.
    Refused(Applicability),
    /// The merge was attempted.
    Merged(ApplyOutcome),
}

impl Apply {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        match self.execute(root) {
            Decision::Refused(applicability) => {
                let heading = format!("Cannot apply {}:", self.delta.display());
                eprintln!("{}", Tone::Failed.paint(&heading, Stream::Stderr));
                eprintln!("{}", bullets(&applicability.issues));
                eprintln!(
                    "\n{}",
                    Tone::Muted.paint("Use --force to merge anyway", Stream::Stderr)
                );
                process::exit(2);
            }
            Decision::Merged(outcome) if outcome.success => {
                println!("{}", outcome.message.passed());
                Ok(())
            }
            Decision::Merged(outcome) => anyhow::bail!(outcome.message),
        }
    }

    fn execute(&self, root: &Path) -> Decision {
        let config = Config::load_or_default(root);
        let applier = Applier::new();
        let output = self.output.as_deref().unwrap_or(&self.baseline);

        if config.check_applicability && !self.force {
            let applicability = applier.validate_delta_application(&self.baseline, &self.delta);
            if !applicability.can_apply {
                tracing::debug!("Refusing to apply {}", self.delta.display());
                return Decision::Refused(applicability);
            }
        }

        Decision::Merged(applier.apply_delta(&self.baseline, &self.delta, output))
    }
}
