use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("key-value backend error: {0}")]
  Backend(Box<dyn std::error::Error + Send + Sync>),

  #[error("could not encode log record: {0}")]
  Encode(serde_json::Error),
}

/// The hash-shaped key-value surface the association store writes through:
/// one namespace, string field keys, one opaque string value per field.
pub trait KvBackend: Send + Sync {
  fn hash_get(&self, namespace: &str, key: &str) -> Result<Option<String>, StoreError>;

  fn hash_set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError>;
}
