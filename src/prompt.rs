//! Interactive collection of run parameters from the terminal.
//!
//! Every prompt that validates its input has a bounded retry budget and
//! returns a typed [ValidationError] once it runs out, so the caller decides
//! how to proceed instead of looping forever.

use std::io::{self, Write};
use std::path::PathBuf;

use derive_more::{Display, Error, From};

use crate::notify::validate_email;
use crate::platform::PathGrammar;

/// Malformed interactive input that survived the whole retry budget.
#[derive(Debug, Display, Error, From)]
pub enum ValidationError {
    /// No valid value after the allowed number of attempts.
    #[display("no valid {what} after {attempts} attempt(s)")]
    AttemptsExhausted {
        #[error(ignore)]
        what: &'static str,
        #[error(ignore)]
        attempts: u32,
    },
    /// Reading from the terminal failed.
    #[from]
    Io(io::Error),
}

/// Operator's answer to a yes/no question.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Input outside the recognized token set; treated as a decline.
    Unrecognized,
}

impl Answer {
    /// Parses a closed, case-insensitive token set. Anything else is
    /// [Answer::Unrecognized] rather than an error.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            "n" | "no" => Self::No,
            _ => Self::Unrecognized,
        }
    }
}

fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompts until a non-empty line is entered or the budget runs out.
pub fn prompt_nonempty(label: &str, what: &'static str, attempts: u32) -> Result<String, ValidationError> {
    for _ in 0..attempts {
        let input = prompt_line(label)?;
        if !input.is_empty() {
            return Ok(input);
        }
        println!("A {what} is required.");
    }

    Err(ValidationError::AttemptsExhausted { what, attempts })
}

/// Prompts for the password without echoing it to the terminal.
pub fn prompt_password(label: &str) -> io::Result<String> {
    rpassword::prompt_password(format!("{label}: "))
}

/// Prompts for a TCP port.
pub fn prompt_port(attempts: u32) -> Result<u16, ValidationError> {
    for _ in 0..attempts {
        let input = prompt_line("Database port")?;
        match input.parse::<u16>() {
            Ok(port) if port != 0 => return Ok(port),
            _ => println!("'{input}' is not a valid TCP port."),
        }
    }

    Err(ValidationError::AttemptsExhausted {
        what: "port",
        attempts,
    })
}

/// Prompts for the destination directory of the dump artifact.
///
/// Accepted only when the input matches the path grammar AND the directory
/// already exists; this never creates directories.
pub fn prompt_backup_dir(
    grammar: PathGrammar,
    attempts: u32,
) -> Result<PathBuf, ValidationError> {
    for _ in 0..attempts {
        let input = prompt_line("Destination directory for the backup")?;

        if !grammar.validate(&input) {
            println!("'{input}' is not a valid {grammar} directory path.");
            continue;
        }

        let path = PathBuf::from(input);
        if !path.is_dir() {
            println!("'{}' does not exist.", path.display());
            continue;
        }

        return Ok(path);
    }

    Err(ValidationError::AttemptsExhausted {
        what: "destination directory",
        attempts,
    })
}

/// Prompts for the confirmation-mail recipient.
pub fn prompt_recipient(attempts: u32) -> Result<String, ValidationError> {
    for _ in 0..attempts {
        let input = prompt_line("Recipient mail address")?;
        if validate_email(&input) {
            return Ok(input);
        }
        println!("'{input}' is not a valid mail address.");
    }

    Err(ValidationError::AttemptsExhausted {
        what: "mail address",
        attempts,
    })
}

/// Asks a yes/no question once. Unrecognized input is not re-prompted.
pub fn prompt_yes_no(label: &str) -> io::Result<Answer> {
    let input = prompt_line(&format!("{label} (y/n)"))?;
    Ok(Answer::parse(&input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_tokens_parse_case_insensitively() {
        assert_eq!(Answer::parse("y"), Answer::Yes);
        assert_eq!(Answer::parse("YES"), Answer::Yes);
        assert_eq!(Answer::parse(" Yes "), Answer::Yes);
    }

    #[test]
    fn negative_tokens_parse_case_insensitively() {
        assert_eq!(Answer::parse("n"), Answer::No);
        assert_eq!(Answer::parse("No"), Answer::No);
    }

    #[test]
    fn anything_else_is_unrecognized() {
        assert_eq!(Answer::parse("xyz"), Answer::Unrecognized);
        assert_eq!(Answer::parse(""), Answer::Unrecognized);
        assert_eq!(Answer::parse("yep"), Answer::Unrecognized);
    }
}
