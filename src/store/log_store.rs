use super::model::{GuildLogConfig, LogType};
use super::storage::{KvBackend, StoreError};
use tracing::warn;

const NAMESPACE: &str = "logs";

/// Per-guild log-channel associations over a key-value backend.
///
/// The whole record is one value per guild, so `set` and `clear` are
/// read-modify-write: fetch, mutate a copy, write everything back. Two
/// concurrent writers to the *same* guild can therefore lose one field on
/// the write-back (last write wins on the record, not the field). Guild log
/// config changes by hand a few times in a guild's lifetime, so this is an
/// accepted limitation rather than a locking scheme; the tests show the
/// mechanism.
pub struct LogStore<B> {
  backend: B,
}

impl<B: KvBackend> LogStore<B> {
  pub fn new(backend: B) -> Self {
    Self { backend }
  }

  /// The configured channel for this log type, or `None` when disabled.
  /// A guild with no record reads the same as a record with no fields.
  pub fn get(&self, guild_id: u64, log_type: LogType) -> Result<Option<u64>, StoreError> {
    Ok(self.load(guild_id)?.channel(log_type))
  }

  pub fn is_enabled(&self, guild_id: u64, log_type: LogType) -> Result<bool, StoreError> {
    Ok(self.get(guild_id, log_type)?.is_some())
  }

  pub fn set(&self, guild_id: u64, log_type: LogType, channel_id: u64) -> Result<(), StoreError> {
    let mut record = self.load(guild_id)?;
    record.set_channel(log_type, channel_id);
    self.save(guild_id, &record)
  }

  /// Disables a log type. A guild with no stored record is left alone: there
  /// is nothing to clear and no record is created.
  pub fn clear(&self, guild_id: u64, log_type: LogType) -> Result<(), StoreError> {
    let stored = self.backend.hash_get(NAMESPACE, &guild_id.to_string())?;
    let raw = match stored {
      Some(raw) if !raw.is_empty() => raw,
      _ => return Ok(()),
    };

    let mut record = decode(guild_id, &raw);
    record.clear_channel(log_type);
    self.save(guild_id, &record)
  }

  fn load(&self, guild_id: u64) -> Result<GuildLogConfig, StoreError> {
    let stored = self.backend.hash_get(NAMESPACE, &guild_id.to_string())?;
    Ok(
      stored
        .filter(|raw| !raw.is_empty())
        .map(|raw| decode(guild_id, &raw))
        .unwrap_or_default(),
    )
  }

  fn save(&self, guild_id: u64, record: &GuildLogConfig) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(record).map_err(StoreError::Encode)?;
    self.backend.hash_set(NAMESPACE, &guild_id.to_string(), &encoded)
  }
}

// An unreadable record reads as an empty one: a corrupt row disables logging
// for that guild instead of failing every caller.
fn decode(guild_id: u64, raw: &str) -> GuildLogConfig {
  match serde_json::from_str(raw) {
    Ok(record) => record,
    Err(why) => {
      warn!("Malformed log record for guild {}: {}", guild_id, why);
      GuildLogConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::sync::Mutex;

  #[derive(Default)]
  struct MemoryKv {
    entries: Mutex<HashMap<(String, String), String>>,
  }

  impl MemoryKv {
    fn raw(&self, key: &str) -> Option<String> {
      self
        .entries
        .lock()
        .unwrap()
        .get(&(NAMESPACE.to_string(), key.to_string()))
        .cloned()
    }
  }

  impl KvBackend for &MemoryKv {
    fn hash_get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
      Ok(
        self
          .entries
          .lock()
          .unwrap()
          .get(&(namespace.to_string(), key.to_string()))
          .cloned(),
      )
    }

    fn hash_set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
      self
        .entries
        .lock()
        .unwrap()
        .insert((namespace.to_string(), key.to_string()), value.to_string());
      Ok(())
    }
  }

  #[test]
  fn set_preserves_the_other_field() {
    let kv = MemoryKv::default();
    let store = LogStore::new(&kv);

    store.set(1, LogType::Mod, 111).unwrap();
    store.set(1, LogType::Server, 222).unwrap();

    assert_eq!(store.get(1, LogType::Mod).unwrap(), Some(111));
    assert_eq!(store.get(1, LogType::Server).unwrap(), Some(222));
  }

  #[test]
  fn missing_record_reads_as_disabled() {
    let kv = MemoryKv::default();
    let store = LogStore::new(&kv);

    assert_eq!(store.get(5, LogType::Mod).unwrap(), None);
    assert!(!store.is_enabled(5, LogType::Server).unwrap());
  }

  #[test]
  fn clear_on_absent_record_never_creates_one() {
    let kv = MemoryKv::default();
    let store = LogStore::new(&kv);

    store.clear(2, LogType::Mod).unwrap();

    assert_eq!(kv.raw("2"), None);
  }

  #[test]
  fn disable_is_idempotent() {
    let kv = MemoryKv::default();
    let store = LogStore::new(&kv);

    store.set(3, LogType::Mod, 111).unwrap();
    store.clear(3, LogType::Mod).unwrap();
    assert!(!store.is_enabled(3, LogType::Mod).unwrap());

    store.clear(3, LogType::Mod).unwrap();
    assert!(!store.is_enabled(3, LogType::Mod).unwrap());
  }

  #[test]
  fn malformed_record_reads_as_disabled() {
    let kv = MemoryKv::default();
    (&kv).hash_set(NAMESPACE, "7", "not json").unwrap();
    let store = LogStore::new(&kv);

    assert_eq!(store.get(7, LogType::Mod).unwrap(), None);
    assert!(!store.is_enabled(7, LogType::Server).unwrap());
  }

  // Hands back one armed stale value on the next read, then defers to the
  // shared map. Stands in for a writer whose read raced an earlier write.
  struct StaleReadKv<'a> {
    inner: &'a MemoryKv,
    stale_read: Mutex<Option<Option<String>>>,
  }

  impl KvBackend for StaleReadKv<'_> {
    fn hash_get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError> {
      if let Some(stale) = self.stale_read.lock().unwrap().take() {
        return Ok(stale);
      }
      self.inner.hash_get(namespace, key)
    }

    fn hash_set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
      self.inner.hash_set(namespace, key, value)
    }
  }

  // The read-modify-write hazard: a second writer whose read happened before
  // the first writer's write carries a snapshot without the first writer's
  // field, and its write-back erases that field. Last write wins on the
  // record, not the field; nothing in the backend makes set atomic.
  #[test]
  fn interleaved_read_modify_write_loses_an_update() {
    let kv = MemoryKv::default();

    let first_writer = LogStore::new(&kv);
    first_writer.set(9, LogType::Mod, 111).unwrap();

    // this writer read the guild's record before the first write landed
    let second_writer = LogStore::new(StaleReadKv {
      inner: &kv,
      stale_read: Mutex::new(Some(None)),
    });
    second_writer.set(9, LogType::Server, 222).unwrap();

    let store = LogStore::new(&kv);
    assert_eq!(store.get(9, LogType::Mod).unwrap(), None);
    assert_eq!(store.get(9, LogType::Server).unwrap(), Some(222));
  }
}
