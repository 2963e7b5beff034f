use std::path::PathBuf;

mod apply;
mod check;
mod config;
mod format;
mod show;
mod terminal;
mod validate;

use apply::Apply;
use check::Check;
use clap::ArgAction;
use format::Format;
use show::Show;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Merge a delta into a baseline specification
    Apply(Apply),

    /// Check that a delta is well-formed and applicable, without merging
    Check(Check),

    /// Validate specification and delta documents
    ///
    /// With no paths, every markdown file under the configured specs and
    /// changes directories is validated.
    Validate(Validate),

    /// Show the requirements and scenarios of a specification
    Show(Show),

    /// Rewrite a specification or delta in canonical form
    Format(Format),

    /// Show or modify configuration settings
    Config(config::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Apply(command) => command.run(&root)?,
            Self::Check(command) => command.run()?,
            Self::Validate(command) => command.run(&root)?,
            Self::Show(command) => command.run()?,
            Self::Format(command) => command.run()?,
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

/// Whether a document is a specification or a delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    /// Guess from the content: any `## [TYPE]` line makes it a delta
    #[default]
    Auto,
    /// A specification made of requirements and scenarios
    Spec,
    /// A delta made of operations
    Delta,
}

impl DocumentKind {
    /// Resolves [`DocumentKind::Auto`] by looking at the text.
    fn resolve(self, text: &str) -> Self {
        match self {
            Self::Auto if specdelta::domain::parse_operations(text).is_empty() => Self::Spec,
            Self::Auto => Self::Delta,
            kind => kind,
        }
    }
}
