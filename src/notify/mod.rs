//! Confirmation mail over SMTP with STARTTLS.
//!
//! Strictly downstream of the audit insert: every failure here is reported
//! and swallowed, the backup itself is already complete and recorded.

use std::path::Path;

use derive_more::{Display, Error, From};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use regex::Regex;

use crate::config::SmtpConfig;

/// Failure to submit the confirmation mail. Non-fatal to the run.
#[derive(Debug, Display, Error, From)]
pub enum NotificationError {
    /// Sender or recipient address was not accepted by the mail builder.
    #[display("invalid mail address: {_0}")]
    Address(lettre::address::AddressError),
    /// Assembling the message failed.
    #[display("building the confirmation mail failed: {_0}")]
    Message(lettre::error::Error),
    /// The SMTP session failed (connect, STARTTLS, auth or rejection).
    #[display("submitting the confirmation mail failed: {_0}")]
    Transport(lettre::transport::smtp::Error),
}

/// Syntactic mail-address check: local part, `@`, domain, dot, TLD-like
/// suffix. Deliverability is not verified.
pub fn validate_email(address: &str) -> bool {
    let re = Regex::new(r"^[a-z0-9]+[._]?[a-z0-9]+@\w+\.\w+$").unwrap();
    re.is_match(address)
}

/// Sends the confirmation mail with the account configured in [SmtpConfig].
pub struct Notifier {
    smtp: SmtpConfig,
}

impl Notifier {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }

    /// Submits one plain-text confirmation naming the artifact path.
    ///
    /// The session is opened, upgraded with STARTTLS, authenticated and torn
    /// down within this call.
    pub async fn send_confirmation(
        &self,
        to: &str,
        artifact: &Path,
    ) -> Result<(), NotificationError> {
        let message = Message::builder()
            .from(self.smtp.from.parse()?)
            .to(to.parse()?)
            .subject("Database backup completed")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "The backup completed successfully and is stored at: {}",
                artifact.display()
            ))?;

        let credentials = Credentials::new(self.smtp.user.clone(), self.smtp.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.server)?
            .port(self.smtp.port)
            .credentials(credentials)
            .build();

        log::debug!(target: "notify", "Submitting confirmation mail to {to} via {}:{}", self.smtp.server, self.smtp.port);
        mailer.send(message).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_addresses_are_accepted() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("user.name@example.com"));
        assert!(validate_email("admin42@mail.example"));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("a..b@@c"));
        assert!(!validate_email("user@example"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@@example.com"));
        assert!(!validate_email(""));
    }
}
