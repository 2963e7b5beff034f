use std::{
    path::{Path, PathBuf},
    process,
};

use clap::Parser;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use specdelta::{
    Config, ValidationReport,
    domain::{validate_delta_format, validate_format},
};
use tracing::instrument;
use walkdir::WalkDir;

use super::{
    DocumentKind,
    terminal::{Colorize, bullets, status},
};

#[derive(Debug, Parser)]
#[command(about = "Validate the structure of specification and delta documents")]
pub struct Validate {
    /// Files to validate. Defaults to every markdown file under the
    /// configured specs and changes directories.
    paths: Vec<PathBuf>,

    /// How to interpret the files given on the command line
    #[arg(long, value_name = "KIND", default_value = "auto")]
    kind: DocumentKind,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[derive(Debug)]
struct FileResult {
    path: PathBuf,
    kind: DocumentKind,
    report: Result<ValidationReport, String>,
}

impl FileResult {
    fn issue_count(&self) -> usize {
        self.report.as_ref().map_or(1, |report| report.issues.len())
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let targets = if self.paths.is_empty() {
            let config = Config::load_or_default(root);
            let mut targets = markdown_files(&root.join(config.specs_dir()), DocumentKind::Spec);
            targets.extend(markdown_files(
                &root.join(config.changes_dir()),
                DocumentKind::Delta,
            ));
            targets
        } else {
            self.paths.iter().map(|path| (path.clone(), self.kind)).collect()
        };

        if targets.is_empty() {
            if !self.quiet {
                println!("No documents found to validate.");
            }
            return Ok(());
        }

        let mut results: Vec<FileResult> = targets
            .into_par_iter()
            .map(|(path, kind)| validate_file(path, kind))
            .collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));

        match self.output {
            OutputFormat::Table => self.output_table(&results),
            OutputFormat::Json => Self::output_json(&results)?,
            OutputFormat::Summary => Self::output_summary(&results),
        }

        if results.iter().any(|result| result.issue_count() > 0) {
            process::exit(2);
        }

        Ok(())
    }

    fn output_table(&self, results: &[FileResult]) {
        if self.quiet {
            return;
        }

        for result in results {
            let path = result.path.display().to_string();
            match &result.report {
                Ok(report) if report.is_valid => println!("{}", status(true, &path)),
                Ok(report) => {
                    println!("{}", status(false, &path));
                    println!("{}", bullets(&report.issues));
                }
                Err(error) => {
                    println!("{}", status(false, &path));
                    println!("{}", bullets(&[error]));
                }
            }
        }

        let total: usize = results.iter().map(FileResult::issue_count).sum();
        if total == 0 {
            println!(
                "\n{}",
                format!("{} documents valid (0 issues)", results.len()).passed()
            );
        } else {
            println!("\n{}", format!("Summary: {total} issues found").failed());
        }
    }

    fn output_json(results: &[FileResult]) -> anyhow::Result<()> {
        use serde_json::json;

        let files: Vec<_> = results
            .iter()
            .map(|result| {
                let kind = match result.kind {
                    DocumentKind::Delta => "delta",
                    DocumentKind::Spec | DocumentKind::Auto => "spec",
                };
                match &result.report {
                    Ok(report) => json!({
                        "path": result.path,
                        "kind": kind,
                        "is_valid": report.is_valid,
                        "issues": report.issues,
                    }),
                    Err(error) => json!({
                        "path": result.path,
                        "kind": kind,
                        "is_valid": false,
                        "error": error,
                    }),
                }
            })
            .collect();

        let total: usize = results.iter().map(FileResult::issue_count).sum();
        let output = json!({
            "status": if total == 0 { "valid" } else { "issues_found" },
            "files": files,
            "summary": {
                "documents": results.len(),
                "total_issues": total,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(results: &[FileResult]) {
        let total: usize = results.iter().map(FileResult::issue_count).sum();
        println!("documents={} issues={total}", results.len());
    }
}

fn validate_file(path: PathBuf, kind: DocumentKind) -> FileResult {
    tracing::debug!("Validating {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let kind = kind.resolve(&text);
            let report = match kind {
                DocumentKind::Delta => validate_delta_format(&text),
                DocumentKind::Spec | DocumentKind::Auto => validate_format(&text),
            };
            FileResult {
                path,
                kind,
                report: Ok(report),
            }
        }
        Err(e) => FileResult {
            path,
            kind,
            report: Err(format!("failed to read file: {e}")),
        },
    }
}

/// Collects every markdown file below `dir`, tagged with `kind`.
///
/// A directory that does not exist yields nothing.
fn markdown_files(dir: &Path, kind: DocumentKind) -> Vec<(PathBuf, DocumentKind)> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| {
            entry
                .map_err(|e| tracing::debug!("Skipping unreadable entry: {e}"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .map(|path| (path, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn markdown_files_are_found_recursively() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("auth");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("spec.md"), "### Requirement: A").unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let files = markdown_files(tmp.path(), DocumentKind::Spec);

        assert_eq!(files, [(nested.join("spec.md"), DocumentKind::Spec)]);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let tmp = TempDir::new().unwrap();
        assert!(markdown_files(&tmp.path().join("nope"), DocumentKind::Delta).is_empty());
    }

    #[test]
    fn auto_detected_delta_is_validated_as_delta() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("delta.md");
        std::fs::write(&path, "## [RENAMED] Missing arrow").unwrap();

        let result = validate_file(path, DocumentKind::Auto);

        assert_eq!(result.kind, DocumentKind::Delta);
        assert_eq!(result.issue_count(), 1);
    }

    #[test]
    fn unreadable_file_counts_as_an_issue() {
        let tmp = TempDir::new().unwrap();
        let result = validate_file(tmp.path().join("missing.md"), DocumentKind::Spec);
        assert!(result.report.is_err());
        assert_eq!(result.issue_count(), 1);
    }
}
