//! Metadata repository: typed key/value storage per owner.
//!
//! Values are encoded with `supermodels_core::codec` on write and decoded on
//! read. Every read goes through the owner's `MetaCache`; every write and
//! delete invalidates it.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use supermodels_core::entities::MetaEntry;
use supermodels_core::{HasMeta, OwnerRef, codec};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, parse_datetime, placeholders};
use crate::service::SuperService;

/// Rows per DELETE or upsert statement. Keeps bound parameters well under
/// SQLite's limit of 32766 per statement.
const CHUNK_ROWS: usize = 500;

fn row_to_meta(row: &libsql::Row) -> Result<MetaEntry, DatabaseError> {
    Ok(MetaEntry {
        id: row.get::<i64>(0)?,
        owner_type: row.get::<String>(1)?,
        owner_id: row.get::<i64>(2)?,
        name: row.get::<String>(3)?,
        value: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn owner_params(owner: &OwnerRef) -> Vec<libsql::Value> {
    vec![
        libsql::Value::Text(owner.owner_type.clone()),
        libsql::Value::Integer(owner.owner_id),
    ]
}

/// Delete the owner's rows named in `names`, `CHUNK_ROWS` names per
/// statement. Runs on a plain connection or inside a transaction.
async fn delete_named(
    conn: &libsql::Connection,
    table: &str,
    owner: &OwnerRef,
    names: &[&str],
) -> Result<u64, DatabaseError> {
    let mut removed = 0;
    for chunk in names.chunks(CHUNK_ROWS) {
        let sql = format!(
            "DELETE FROM {table} WHERE model_type = ?1 AND model_id = ?2 AND name IN ({})",
            placeholders(3, chunk.len())
        );
        let mut params = owner_params(owner);
        params.extend(chunk.iter().map(|n| libsql::Value::Text((*n).to_string())));
        removed += conn.execute(&sql, libsql::params_from_iter(params)).await?;
    }
    Ok(removed)
}

/// Upsert `(name, encoded)` pairs, `CHUNK_ROWS` rows per statement.
async fn upsert_encoded(
    conn: &libsql::Connection,
    table: &str,
    owner: &OwnerRef,
    pairs: &[(String, String)],
) -> Result<(), DatabaseError> {
    let now = format_datetime(&Utc::now());
    for chunk in pairs.chunks(CHUNK_ROWS) {
        let mut rows = Vec::with_capacity(chunk.len());
        let mut params = owner_params(owner);
        params.push(libsql::Value::Text(now.clone()));
        for (name, encoded) in chunk {
            let name_idx = params.len() + 1;
            rows.push(format!("(?1, ?2, ?{name_idx}, ?{}, ?3, ?3)", name_idx + 1));
            params.push(libsql::Value::Text(name.clone()));
            params.push(libsql::Value::Text(encoded.clone()));
        }
        let sql = format!(
            "INSERT INTO {table} (model_type, model_id, name, value, created_at, updated_at)
             VALUES {}
             ON CONFLICT(model_type, model_id, name)
             DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rows.join(", ")
        );
        conn.execute(&sql, libsql::params_from_iter(params)).await?;
    }
    Ok(())
}

impl SuperService {
    /// Raw metadata rows of an owner, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn meta_entries(&self, owner: &OwnerRef) -> Result<Vec<MetaEntry>, DatabaseError> {
        let sql = format!(
            "SELECT id, model_type, model_id, name, value, created_at, updated_at
             FROM {} WHERE model_type = ?1 AND model_id = ?2 ORDER BY name",
            self.db().meta_table()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(owner_params(owner)))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_meta(&row)?);
        }
        Ok(entries)
    }

    /// Read and decode every stored value of an owner, bypassing any cache.
    async fn load_meta(&self, owner: &OwnerRef) -> Result<BTreeMap<String, Value>, DatabaseError> {
        let sql = format!(
            "SELECT name, value FROM {} WHERE model_type = ?1 AND model_id = ?2",
            self.db().meta_table()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(owner_params(owner)))
            .await?;
        let mut decoded = BTreeMap::new();
        while let Some(row) = rows.next().await? {
            let name = row.get::<String>(0)?;
            let raw = row.get::<Option<String>>(1)?;
            // Empty values read as absent.
            if let Some(value) = codec::decode(raw.as_deref()) {
                decoded.insert(name, value);
            }
        }
        Ok(decoded)
    }

    /// Set one metadata value. A `null` value removes the key.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if encoding or the upsert fails.
    pub async fn set_meta<O: HasMeta>(
        &self,
        owner: &mut O,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), DatabaseError> {
        let owner_ref = owner.owner_ref();
        let table = self.db().meta_table();

        match codec::encode(&value.into())? {
            Some(encoded) => {
                let now = format_datetime(&Utc::now());
                let sql = format!(
                    "INSERT INTO {table} (model_type, model_id, name, value, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                     ON CONFLICT(model_type, model_id, name)
                     DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"
                );
                self.db()
                    .conn()
                    .execute(
                        &sql,
                        libsql::params![
                            owner_ref.owner_type.as_str(),
                            owner_ref.owner_id,
                            name,
                            encoded,
                            now
                        ],
                    )
                    .await?;
                tracing::debug!(owner = %owner_ref, name, "metadata set");
            }
            None => {
                delete_named(self.db().conn(), table, &owner_ref, &[name]).await?;
                tracing::debug!(owner = %owner_ref, name, "metadata cleared by null value");
            }
        }

        owner.meta_cache_mut().invalidate();
        Ok(())
    }

    /// Replace several metadata values at once.
    ///
    /// Existing rows for every given name are deleted, then all pairs with a
    /// non-null value are upserted, in statements of at most `CHUNK_ROWS` rows.
    /// Names not given are left alone. Everything runs in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if encoding or any statement fails; the
    /// transaction is rolled back in that case.
    pub async fn set_meta_many<O, I, K>(&self, owner: &mut O, values: I) -> Result<(), DatabaseError>
    where
        O: HasMeta,
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let owner_ref = owner.owner_ref();
        let table = self.db().meta_table();

        let mut names = Vec::new();
        let mut upserts = Vec::new();
        for (name, value) in values {
            let name = name.into();
            if let Some(encoded) = codec::encode(&value)? {
                upserts.push((name.clone(), encoded));
            }
            names.push(name);
        }

        if names.is_empty() {
            owner.meta_cache_mut().invalidate();
            return Ok(());
        }

        let tx = self.db().conn().transaction().await?;
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let removed = delete_named(&tx, table, &owner_ref, &name_refs).await?;

        upsert_encoded(&tx, table, &owner_ref, &upserts).await?;
        tx.commit().await?;

        tracing::debug!(
            owner = %owner_ref,
            replaced = removed,
            written = upserts.len(),
            "metadata batch set"
        );
        owner.meta_cache_mut().invalidate();
        Ok(())
    }

    /// The owner's decoded metadata, loaded from storage when the cache is
    /// empty or `use_cache` is false.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn cache_meta<'o, O: HasMeta>(
        &self,
        owner: &'o mut O,
        use_cache: bool,
    ) -> Result<&'o BTreeMap<String, Value>, DatabaseError> {
        if !use_cache || owner.meta_cache().needs_fill() {
            let decoded = self.load_meta(&owner.owner_ref()).await?;
            owner.meta_cache_mut().fill(decoded);
        }
        Ok(owner.meta_cache().entries())
    }

    /// Repopulate the owner's cache from storage unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn reload_meta_cache<'o, O: HasMeta>(
        &self,
        owner: &'o mut O,
    ) -> Result<&'o BTreeMap<String, Value>, DatabaseError> {
        self.cache_meta(owner, false).await
    }

    /// All decoded metadata of the owner.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn get_meta_all<O: HasMeta>(
        &self,
        owner: &mut O,
        use_cache: bool,
    ) -> Result<BTreeMap<String, Value>, DatabaseError> {
        Ok(self.cache_meta(owner, use_cache).await?.clone())
    }

    /// One decoded value, `None` if the key is absent or stored empty.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn get_meta<O: HasMeta>(
        &self,
        owner: &mut O,
        name: &str,
        use_cache: bool,
    ) -> Result<Option<Value>, DatabaseError> {
        let entries = self.cache_meta(owner, use_cache).await?;
        Ok(entries.get(name).cloned())
    }

    /// One decoded value, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn get_meta_or<O: HasMeta>(
        &self,
        owner: &mut O,
        name: &str,
        default: Value,
        use_cache: bool,
    ) -> Result<Value, DatabaseError> {
        Ok(self.get_meta(owner, name, use_cache).await?.unwrap_or(default))
    }

    /// The requested keys only. Every requested key is in the result; absent
    /// keys map to `default`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn get_meta_many<O: HasMeta>(
        &self,
        owner: &mut O,
        names: &[&str],
        default: &Value,
        use_cache: bool,
    ) -> Result<BTreeMap<String, Value>, DatabaseError> {
        let entries = self.cache_meta(owner, use_cache).await?;
        Ok(names
            .iter()
            .map(|name| {
                let value = entries.get(*name).unwrap_or(default);
                ((*name).to_string(), value.clone())
            })
            .collect())
    }

    /// Metadata as a plain mapping, optionally restricted to `names`.
    /// Absent keys are omitted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if loading fails.
    pub async fn get_meta_array<O: HasMeta>(
        &self,
        owner: &mut O,
        names: Option<&[&str]>,
    ) -> Result<BTreeMap<String, Value>, DatabaseError> {
        let entries = self.cache_meta(owner, true).await?;
        Ok(match names {
            None => entries.clone(),
            Some(names) => entries
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        })
    }

    /// Metadata deserialized into a record type, optionally restricted to
    /// `names`.
    ///
    /// Numbers are stored as text and read back as strings, so numeric
    /// fields of `T` need a string-tolerant deserializer.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Decode` if the mapping does not fit `T`.
    pub async fn get_meta_object<T, O>(
        &self,
        owner: &mut O,
        names: Option<&[&str]>,
    ) -> Result<T, DatabaseError>
    where
        T: DeserializeOwned,
        O: HasMeta,
    {
        let mapping = self.get_meta_array(owner, names).await?;
        let object = Value::Object(mapping.into_iter().collect());
        serde_json::from_value(object).map_err(|e| DatabaseError::Decode(e.to_string()))
    }

    /// Delete all metadata of the owner. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn remove_meta<O: HasMeta>(&self, owner: &mut O) -> Result<u64, DatabaseError> {
        let owner_ref = owner.owner_ref();
        let removed = self.purge_meta(self.db().conn(), &owner_ref).await?;
        owner.meta_cache_mut().invalidate();
        Ok(removed)
    }

    /// Delete one key of the owner.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn remove_meta_named<O: HasMeta>(
        &self,
        owner: &mut O,
        name: &str,
    ) -> Result<u64, DatabaseError> {
        self.remove_meta_many(owner, &[name]).await
    }

    /// Delete the given keys of the owner. An empty list removes nothing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn remove_meta_many<O: HasMeta>(
        &self,
        owner: &mut O,
        names: &[&str],
    ) -> Result<u64, DatabaseError> {
        let owner_ref = owner.owner_ref();
        let removed =
            delete_named(self.db().conn(), self.db().meta_table(), &owner_ref, names).await?;
        tracing::debug!(owner = %owner_ref, removed, "metadata removed");
        owner.meta_cache_mut().invalidate();
        Ok(removed)
    }

    /// Delete every metadata row of an owner on the given connection.
    pub(crate) async fn purge_meta(
        &self,
        conn: &libsql::Connection,
        owner: &OwnerRef,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE model_type = ?1 AND model_id = ?2",
            self.db().meta_table()
        );
        let removed = conn
            .execute(&sql, libsql::params_from_iter(owner_params(owner)))
            .await?;
        tracing::debug!(owner = %owner, removed, "metadata purged");
        Ok(removed)
    }
}
