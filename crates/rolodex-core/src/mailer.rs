//! Outbound confirmation-mail seam.
//!
//! Delivery mechanics live behind the [`ConfirmationMailer`] trait so a host
//! can plug in its own transport. Callers treat dispatch as fire-and-forget:
//! the account service spawns the send and logs failures instead of
//! surfacing them.

use async_trait::async_trait;
use tracing::info;

/// Errors that can occur while handing a message to the delivery channel.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// Recipient address rejected by the transport.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Transport failed to accept the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Sends account-confirmation messages.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    /// Sends a confirmation message to `to`, addressed to `username`,
    /// carrying a callback link built from `base_url` and `token`.
    async fn send_confirmation(
        &self,
        to: &str,
        username: &str,
        base_url: &str,
        token: &str,
    ) -> Result<(), MailerError>;
}

/// Mailer that logs the dispatch instead of delivering it.
///
/// Useful in development and for hosts that handle delivery out of band.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl ConfirmationMailer for LogMailer {
    async fn send_confirmation(
        &self,
        to: &str,
        username: &str,
        base_url: &str,
        token: &str,
    ) -> Result<(), MailerError> {
        let link = confirmation_link(base_url, token);
        info!(recipient = %to, %username, %link, "confirmation email (log only)");
        Ok(())
    }
}

/// Builds the confirmation callback URL a recipient should visit.
#[must_use]
pub fn confirmation_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/auth/confirmed_email/{token}",
        base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn link_tolerates_trailing_slash() {
        assert_eq!(
            confirmation_link("https://example.com/", "abc"),
            "https://example.com/auth/confirmed_email/abc"
        );
        assert_eq!(
            confirmation_link("https://example.com", "abc"),
            "https://example.com/auth/confirmed_email/abc"
        );
    }

    #[tokio::test]
    async fn log_mailer_always_accepts() {
        let mailer = LogMailer;
        let result = mailer
            .send_confirmation("a@example.com", "alice", "https://example.com", "tok")
            .await;
        assert!(result.is_ok());
    }
}
