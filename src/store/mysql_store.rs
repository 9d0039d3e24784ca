use super::schema::kv_entries;
use super::schema::kv_entries::dsl;
use super::storage::{KvBackend, StoreError};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::MysqlConnection;

#[derive(Insertable)]
#[table_name = "kv_entries"]
struct NewKvEntry<'a> {
  namespace: &'a str,
  field: &'a str,
  value: &'a str,
}

/// MySQL rendition of the hash backend: one row per (namespace, field),
/// upserted whole with `REPLACE INTO`.
#[derive(Clone)]
pub struct MysqlKvStore {
  db: Pool<ConnectionManager<MysqlConnection>>,
}

impl MysqlKvStore {
  pub fn new(db: Pool<ConnectionManager<MysqlConnection>>) -> Self {
    Self { db }
  }
}

impl KvBackend for MysqlKvStore {
  fn hash_get(&self, ns: &str, key: &str) -> Result<Option<String>, StoreError> {
    let conn = self
      .db
      .get()
      .map_err(|why| StoreError::Backend(Box::new(why)))?;
    let results = dsl::kv_entries
      .filter(dsl::namespace.eq(ns))
      .filter(dsl::field.eq(key))
      .select(dsl::value)
      .limit(1)
      .load::<String>(&conn)
      .map_err(|why| StoreError::Backend(Box::new(why)))?;

    Ok(results.into_iter().next())
  }

  fn hash_set(&self, ns: &str, key: &str, stored: &str) -> Result<(), StoreError> {
    let conn = self
      .db
      .get()
      .map_err(|why| StoreError::Backend(Box::new(why)))?;
    let entry = NewKvEntry {
      namespace: ns,
      field: key,
      value: stored,
    };
    diesel::replace_into(dsl::kv_entries)
      .values(&entry)
      .execute(&conn)
      .map_err(|why| StoreError::Backend(Box::new(why)))?;

    Ok(())
  }
}
