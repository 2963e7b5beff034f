use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use specdelta::{
    Specification,
    domain::{format_operations, parse_operations},
};
use tracing::instrument;

use super::{DocumentKind, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Rewrite a specification or delta in canonical form")]
pub struct Format {
    /// The document to format
    path: PathBuf,

    /// How to interpret the document
    #[arg(long, value_name = "KIND", default_value = "auto")]
    kind: DocumentKind,

    /// Overwrite the file instead of printing the result
    #[arg(long, short)]
    write: bool,
}

impl Format {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        let formatted = canonical(&text, self.kind);

        if self.write {
            if formatted == text {
                println!("{}", format!("{} already formatted", self.path.display()).muted());
            } else {
                std::fs::write(&self.path, &formatted)
                    .with_context(|| format!("failed to write {}", self.path.display()))?;
                println!("{}", format!("Formatted {}", self.path.display()).passed());
            }
        } else {
            println!("{formatted}");
        }

        Ok(())
    }
}

/// Parses and re-formats a document.
///
/// Anything outside the requirement/scenario or operation grammar is dropped.
fn canonical(text: &str, kind: DocumentKind) -> String {
    match kind.resolve(text) {
        DocumentKind::Delta => format_operations(&parse_operations(text)),
        DocumentKind::Spec | DocumentKind::Auto => Specification::parse(text).format(),
    }
}
