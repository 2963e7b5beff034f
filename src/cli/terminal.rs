//! Rendering results for the terminal.
//!
//! Colour is only used when the destination stream supports it. Issue lists
//! are wrapped to the terminal width so long requirement headers stay
//! readable.

use owo_colors::{OwoColorize, colors::css};
pub use supports_color::Stream;

/// Issue lists are never wrapped narrower than this.
const MIN_WIDTH: usize = 40;

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| usize::from(w.0))
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// How a piece of output reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Something checked out (green)
    Passed,
    /// Something needs attention (amber)
    Failed,
    /// A requirement or section title (blue)
    Heading,
    /// Secondary detail
    Muted,
}

impl Tone {
    /// Paints `text` for `stream`, leaving it plain if colour is unsupported.
    pub fn paint(self, text: &str, stream: Stream) -> String {
        if supports_color::on(stream).is_none() {
            return text.to_string();
        }
        match self {
            Self::Passed => text.fg::<css::Green>().to_string(),
            Self::Failed => text.fg::<css::Orange>().to_string(),
            Self::Heading => text.fg::<css::LightBlue>().to_string(),
            Self::Muted => text.dimmed().to_string(),
        }
    }
}

/// Extension trait for painting text bound for stdout.
pub trait Colorize: AsRef<str> {
    /// Paint as [`Tone::Passed`]
    fn passed(&self) -> String {
        Tone::Passed.paint(self.as_ref(), Stream::Stdout)
    }

    /// Paint as [`Tone::Failed`]
    fn failed(&self) -> String {
        Tone::Failed.paint(self.as_ref(), Stream::Stdout)
    }

    /// Paint as [`Tone::Heading`]
    fn heading(&self) -> String {
        Tone::Heading.paint(self.as_ref(), Stream::Stdout)
    }

    /// Paint as [`Tone::Muted`]
    fn muted(&self) -> String {
        Tone::Muted.paint(self.as_ref(), Stream::Stdout)
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {}

/// A `✓ label` or `✗ label` line for stdout.
pub fn status(ok: bool, label: &str) -> String {
    if ok {
        format!("✓ {label}")
    } else {
        format!("✗ {label}").failed()
    }
}

/// Renders issues as an indented bullet list wrapped to the terminal.
pub fn bullets<S: AsRef<str>>(issues: &[S]) -> String {
    let width = terminal_width().map_or(usize::MAX, |w| w.max(MIN_WIDTH));
    wrap_bullets(issues, width)
}

fn wrap_bullets<S: AsRef<str>>(issues: &[S], width: usize) -> String {
    let mut lines = Vec::new();

    for issue in issues {
        let issue = issue.as_ref();
        let mut line = String::from("  •");

        if line.chars().count() + 1 + issue.chars().count() <= width {
            line.push(' ');
            line.push_str(issue);
            lines.push(line);
            continue;
        }

        let mut fresh = true;
        for word in issue.split_whitespace() {
            if !fresh && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::replace(&mut line, String::from("   ")));
                fresh = true;
            }
            line.push(' ');
            line.push_str(word);
            fresh = false;
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_issues_are_kept_whole() {
        let issues = ["Line 3: Scenario header cannot be empty", "second"];
        assert_eq!(
            wrap_bullets(&issues, 80),
            "  • Line 3: Scenario header cannot be empty\n  • second"
        );
    }

    #[test]
    fn long_issues_wrap_with_a_hanging_indent() {
        let issues = ["Operation MODIFIED references non-existent requirement: \"User Login\""];
        assert_eq!(
            wrap_bullets(&issues, 40),
            "  • Operation MODIFIED references\n    non-existent requirement: \"User\n    \
             Login\""
        );
    }

    #[test]
    fn overlong_words_are_not_split() {
        let word = "x".repeat(50);
        assert_eq!(wrap_bullets(&[&word], 40), format!("  • {word}"));
    }

    #[test]
    fn no_issues_render_nothing() {
        assert_eq!(wrap_bullets::<&str>(&[], 40), "");
    }
}
