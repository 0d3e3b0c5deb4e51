use async_trait::async_trait;
use tracing::info;

/// Outbound verification-email delivery.
///
/// Delivery is best effort: callers log and swallow failures, a verification
/// token is never lost because the message did not go out (the account can
/// request re-issuance).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(
        &self,
        recipient: &str,
        username: &str,
        link: &str,
    ) -> anyhow::Result<()>;
}

/// Default mailer used when no SMTP relay is wired up: logs the link so an
/// operator can hand it to the user.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(
        &self,
        recipient: &str,
        username: &str,
        link: &str,
    ) -> anyhow::Result<()> {
        info!(%recipient, %username, %link, "verification email (log delivery)");
        Ok(())
    }
}
