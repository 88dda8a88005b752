//! File-backed configuration for the pieces that must not live in source:
//! the SMTP submission account and the name of the dump utility.

use serde::{Deserialize, Serialize};

/// Top-level configuration, read from a TOML file at startup.
///
/// A default file is written to the configured path when none exists yet so
/// the operator has a template to fill in.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// SMTP submission settings for the confirmation mail.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Dump-utility settings.
    #[serde(default)]
    pub dump: DumpConfig,
}

/// Account used to submit the confirmation mail.
///
/// The session is upgraded with STARTTLS before the credentials are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Hostname of the submission server.
    pub server: String,

    /// Submission port.
    pub port: u16,

    /// Login name for the SMTP account.
    pub user: String,

    /// Password for the SMTP account.
    pub password: String,

    /// Sender address of the confirmation mail.
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Binary invoked to produce the logical dump.
    pub utility: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            utility: "mysqldump".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        // The write-default-on-first-run path in main relies on this.
        let config = AppConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.smtp.port, 587);
        assert_eq!(parsed.dump.utility, "mysqldump");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [smtp]
            server = "mail.example.com"
            port = 587
            user = "backup@example.com"
            password = "hunter2"
            from = "backup@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.smtp.server, "mail.example.com");
        assert_eq!(parsed.dump.utility, "mysqldump");
    }
}
