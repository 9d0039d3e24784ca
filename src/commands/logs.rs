use super::respond;
use crate::store::log_store::LogStore;
use crate::store::model::LogType;
use crate::store::mysql_store::MysqlKvStore;
use crate::store::storage::{KvBackend, StoreError};
use serenity::{
  model::interactions::application_command::{
    ApplicationCommandInteraction, ApplicationCommandInteractionDataOptionValue,
  },
  prelude::Context,
};
use std::sync::Arc;

/// `/logs action type [channel]` — configure where mod and server logs go.
pub async fn handler(
  ctx: Arc<Context>,
  store: &LogStore<MysqlKvStore>,
  command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let guild_id = match command.guild_id {
    Some(id) => *id.as_u64(),
    None => {
      respond(
        &ctx,
        command,
        String::from("Log channels can only be configured in a server."),
      )
      .await?;
      return Ok(());
    }
  };

  let mut action = None;
  let mut log_type = None;
  let mut channel = None;
  for option in &command.data.options {
    match (option.name.as_str(), option.resolved.as_ref()) {
      ("action", Some(ApplicationCommandInteractionDataOptionValue::String(raw))) => {
        action = Some(raw.clone());
      }
      ("type", Some(ApplicationCommandInteractionDataOptionValue::String(raw))) => {
        log_type = LogType::parse(raw);
      }
      ("channel", Some(ApplicationCommandInteractionDataOptionValue::Channel(picked))) => {
        channel = Some(*picked.id.as_u64());
      }
      _ => {}
    }
  }

  let log_type = match log_type {
    Some(log_type) => log_type,
    None => {
      respond(
        &ctx,
        command,
        String::from("Unknown log type; use `mod` or `server`."),
      )
      .await?;
      return Ok(());
    }
  };

  let reply = match apply(store, guild_id, log_type, action.as_deref(), channel) {
    Ok(reply) => reply,
    Err(why) => {
      // the user still gets an answer when the store is down
      respond(
        &ctx,
        command,
        String::from("Bzzzrt! Couldn't reach the log settings store."),
      )
      .await?;
      return Err(why.into());
    }
  };

  respond(&ctx, command, reply).await?;
  Ok(())
}

fn apply<B: KvBackend>(
  store: &LogStore<B>,
  guild_id: u64,
  log_type: LogType,
  action: Option<&str>,
  channel: Option<u64>,
) -> Result<String, StoreError> {
  match action {
    Some("set") => match channel {
      Some(channel_id) => {
        store.set(guild_id, log_type, channel_id)?;
        Ok(format!(
          "{} log will be posted in <#{}>.",
          log_type.as_str(),
          channel_id
        ))
      }
      None => Ok(String::from("Pick a channel to send the log to.")),
    },
    Some("disable") => {
      store.clear(guild_id, log_type)?;
      Ok(format!("{} log disabled.", log_type.as_str()))
    }
    _ => match store.get(guild_id, log_type)? {
      Some(channel_id) => Ok(format!(
        "{} log is enabled in <#{}>.",
        log_type.as_str(),
        channel_id
      )),
      None => Ok(format!("{} log is disabled.", log_type.as_str())),
    },
  }
}
