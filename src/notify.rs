//! Pre-checked, fire-and-forget delivery of scheduled reminders.

use serenity::async_trait;
use tracing::{debug, warn};

/// Outbound surface of the chat platform, as much of it as the reminders
/// need. Implemented over serenity in `clients::discord`; tests use mocks.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn channel_exists(&self, channel_id: u64) -> bool;

    async fn can_write(&self, channel_id: u64) -> bool;

    async fn send_message(
        &self,
        channel_id: u64,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct NotificationGate<M> {
    messenger: M,
}

impl<M: Messenger> NotificationGate<M> {
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    /// Sends `text` to `channel_id` if the channel exists and is writable.
    /// A channel that fails either check is skipped without surfacing an
    /// error, and a failed delivery is logged and dropped; a daily reminder
    /// missing one day is acceptable, a retry loop is not.
    pub async fn notify(&self, channel_id: u64, text: &str) {
        if !self.messenger.channel_exists(channel_id).await {
            debug!("Channel {} not found, skipping notification", channel_id);
            return;
        }
        if !self.messenger.can_write(channel_id).await {
            debug!("Cannot write to channel {}, skipping notification", channel_id);
            return;
        }

        if let Err(why) = self.messenger.send_message(channel_id, text).await {
            warn!("Failed to deliver notification to {}: {}", channel_id, why);
        }
    }
}
