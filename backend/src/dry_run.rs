use async_trait::async_trait;
use tracing::info;

use scheduler::Notifier;

/// Logs messages instead of delivering them.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        info!(text = %text, "dry run: message not sent");
        Ok(())
    }
}
