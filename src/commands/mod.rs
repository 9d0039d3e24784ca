mod logs;
pub mod ping;

use crate::store::log_store::LogStore;
use crate::store::mysql_store::MysqlKvStore;
use serenity::{
  model::interactions::{
    application_command::ApplicationCommandInteraction, InteractionResponseType,
  },
  prelude::Context,
};
use std::sync::Arc;
use tracing::error;

pub async fn handler(
  ctx: Arc<Context>,
  store: &LogStore<MysqlKvStore>,
  command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  match command.data.name.as_str() {
    "logs" => logs::handler(ctx, store, command).await?,
    _ => error!("Unknown slash command"),
  };

  Ok(())
}

pub async fn respond(
  ctx: &Arc<Context>,
  command: &ApplicationCommandInteraction,
  msg: String,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  command
    .create_interaction_response(&ctx.http, |res| {
      res
        .kind(InteractionResponseType::ChannelMessageWithSource)
        .interaction_response_data(|m| m.content(msg))
    })
    .await?;
  Ok(())
}
