use serde::{Deserialize, Serialize};

/// Which of a guild's log streams a lookup or command refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
  Mod,
  Server,
}

impl LogType {
  pub fn parse(raw: &str) -> Option<LogType> {
    match raw {
      "mod" => Some(LogType::Mod),
      "server" => Some(LogType::Server),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      LogType::Mod => "Mod",
      LogType::Server => "Server",
    }
  }
}

/// One guild's log-channel record, stored as a single JSON value per guild.
///
/// Absent fields are omitted on the wire (`{"mod":111}`), matching records
/// written before a log type existed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildLogConfig {
  #[serde(rename = "mod", default, skip_serializing_if = "Option::is_none")]
  pub mod_log: Option<u64>,
  #[serde(rename = "server", default, skip_serializing_if = "Option::is_none")]
  pub server_log: Option<u64>,
}

impl GuildLogConfig {
  pub fn channel(&self, log_type: LogType) -> Option<u64> {
    match log_type {
      LogType::Mod => self.mod_log,
      LogType::Server => self.server_log,
    }
  }

  pub fn set_channel(&mut self, log_type: LogType, channel_id: u64) {
    match log_type {
      LogType::Mod => self.mod_log = Some(channel_id),
      LogType::Server => self.server_log = Some(channel_id),
    }
  }

  pub fn clear_channel(&mut self, log_type: LogType) {
    match log_type {
      LogType::Mod => self.mod_log = None,
      LogType::Server => self.server_log = None,
    }
  }
}
