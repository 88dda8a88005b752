//! Host-specific behavior: destination-path grammar and the file-browser
//! convenience action.
//!
//! Keeping both behind this module keeps the backup workflow itself portable;
//! the concrete OS conventions are swappable, not baked into the core logic.

use std::path::Path;
use std::process::Command;

use clap::ValueEnum;
use derive_more::Display;
use regex::Regex;

/// Path convention a destination directory is validated against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Display)]
pub enum PathGrammar {
    /// Drive letter plus backslash-separated segments, e.g. `C:\backups\`.
    #[display("windows")]
    Windows,
    /// Rooted slash-separated segments, e.g. `/var/backups/`.
    #[display("unix")]
    Unix,
}

impl PathGrammar {
    /// Grammar of the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Syntactic check of an absolute directory path.
    ///
    /// This validates the string form only; whether the directory exists is a
    /// separate question answered by the filesystem.
    pub fn validate(&self, path: &str) -> bool {
        let re = match self {
            // Drive letter, then backslash-separated segments. Rejects the
            // reserved characters and CR/LF inside segments.
            Self::Windows => {
                Regex::new(r#"^[a-zA-Z]:\\(?:[^\\/:*?"<>|\r\n]+\\)*[^\\/:*?"<>|\r\n]*$"#).unwrap()
            }
            Self::Unix => Regex::new(r"^/(?:[^/\x00\r\n]+/)*[^/\x00\r\n]*$").unwrap(),
        };

        re.is_match(path)
    }
}

/// Opens the directory in the host's file browser.
///
/// Best effort: a missing browser binary or a non-zero exit is logged and
/// otherwise ignored, the backup is complete either way.
pub fn reveal_in_file_browser(dir: &Path) {
    let browser = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    log::debug!(target: "platform", "Opening {} with {browser}", dir.display());
    match Command::new(browser).arg(dir).status() {
        Ok(status) if status.success() => {}
        Ok(status) => {
            log::debug!(target: "platform", "{browser} exited with {status}");
        }
        Err(e) => {
            log::debug!(target: "platform", "Starting {browser} failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_grammar_requires_drive_prefix() {
        let grammar = PathGrammar::Windows;

        assert!(grammar.validate(r"C:\backups\"));
        assert!(grammar.validate(r"C:\backups"));
        assert!(grammar.validate(r"d:\data\dumps\mysql"));

        assert!(!grammar.validate(r"backups\nightly"));
        assert!(!grammar.validate(r"\\server\share"));
        assert!(!grammar.validate("/var/backups"));
        assert!(!grammar.validate(""));
    }

    #[test]
    fn windows_grammar_rejects_reserved_characters() {
        let grammar = PathGrammar::Windows;

        assert!(!grammar.validate(r"C:\back?ups\"));
        assert!(!grammar.validate(r"C:\back*ups"));
        assert!(!grammar.validate(r#"C:\"backups""#));
        assert!(!grammar.validate(r"C:\backups<old>"));
        assert!(!grammar.validate(r"C:\backups|dumps"));
        assert!(!grammar.validate("C:\\backups\r\n"));
        assert!(!grammar.validate(r"C:\back:ups"));
    }

    #[test]
    fn unix_grammar_requires_rooted_paths() {
        let grammar = PathGrammar::Unix;

        assert!(grammar.validate("/"));
        assert!(grammar.validate("/var/backups"));
        assert!(grammar.validate("/var/backups/"));

        assert!(!grammar.validate("var/backups"));
        assert!(!grammar.validate("./backups"));
        assert!(!grammar.validate("/var/back\nups"));
        assert!(!grammar.validate("/var/back\0ups"));
        assert!(!grammar.validate(""));
    }
}
