use crate::notify::Messenger;
use serenity::async_trait;
use serenity::model::id::ChannelId;
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use std::sync::Arc;
use tracing::error;

/// The real platform: existence and writability come from the gateway cache,
/// delivery goes through the HTTP client.
pub struct DiscordMessenger {
    ctx: Arc<Context>,
}

impl DiscordMessenger {
    pub fn new(ctx: Arc<Context>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Messenger for DiscordMessenger {
    async fn channel_exists(&self, channel_id: u64) -> bool {
        self.ctx.cache.guild_channel(channel_id).await.is_some()
    }

    async fn can_write(&self, channel_id: u64) -> bool {
        let channel = match self.ctx.cache.guild_channel(channel_id).await {
            Some(channel) => channel,
            None => return false,
        };
        let current_user = self.ctx.cache.current_user().await;

        match channel
            .permissions_for_user(&self.ctx.cache, current_user.id)
            .await
        {
            Ok(permissions) => permissions.contains(Permissions::SEND_MESSAGES),
            Err(why) => {
                error!("Could not resolve permissions for {}: {}", channel_id, why);
                false
            }
        }
    }

    async fn send_message(
        &self,
        channel_id: u64,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        ChannelId(channel_id).say(&self.ctx.http, text).await?;
        Ok(())
    }
}
