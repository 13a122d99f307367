//! Activity log repository.
//!
//! Append-only entries attributed to the acting user of a request. Writing
//! without an authenticated user is a silent no-op.

use chrono::Utc;
use supermodels_core::entities::{DEFAULT_LOG_TYPE, LogEntry, NewLogEntry};
use supermodels_core::{HasLogs, OwnerRef, RequestContext};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, parse_optional_json};
use crate::service::SuperService;

fn row_to_log(row: &libsql::Row) -> Result<LogEntry, DatabaseError> {
    Ok(LogEntry {
        id: row.get::<i64>(0)?,
        owner_type: row.get::<String>(1)?,
        owner_id: row.get::<i64>(2)?,
        user_id: row.get::<Option<i64>>(3)?,
        kind: row.get::<String>(4)?,
        action: row.get::<String>(5)?,
        content: row.get::<String>(6)?,
        params: parse_optional_json(get_opt_string(row, 7)?.as_deref())?,
        notified: row.get::<Option<i64>>(8)?.map(|n| n != 0),
        ip: get_opt_string(row, 9)?,
        user_agent: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

/// Prefer the explicit value, falling back to the request context when it is
/// unset or empty.
fn explicit_or(explicit: Option<String>, ambient: Option<&String>) -> Option<String> {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| ambient.cloned())
        .filter(|s| !s.is_empty())
}

impl SuperService {
    /// Append a log entry for `owner`, attributed to the context's user.
    ///
    /// Returns `Ok(None)` without writing anything when the context carries no
    /// authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails or `params` cannot be
    /// serialized.
    pub async fn log<O: HasLogs>(
        &self,
        owner: &O,
        ctx: &RequestContext,
        entry: NewLogEntry,
    ) -> Result<Option<LogEntry>, DatabaseError> {
        let owner_ref = owner.owner_ref();
        let Some(user_id) = ctx.authenticated_user() else {
            tracing::debug!(owner = %owner_ref, action = %entry.action, "no authenticated user, log skipped");
            return Ok(None);
        };

        let ip = explicit_or(entry.ip, ctx.ip.as_ref());
        let user_agent = explicit_or(entry.user_agent, ctx.user_agent.as_ref());
        let params_json = entry
            .params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO {} (model_type, model_id, user_id, type, action, content, notified, params, ip, user_agent, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10, ?10)",
            self.db().log_table()
        );
        self.db()
            .conn()
            .execute(
                &sql,
                libsql::params![
                    owner_ref.owner_type.as_str(),
                    owner_ref.owner_id,
                    user_id,
                    DEFAULT_LOG_TYPE,
                    entry.action.as_str(),
                    entry.content.as_str(),
                    params_json,
                    ip.as_deref(),
                    user_agent.as_deref(),
                    format_datetime(&now)
                ],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();

        tracing::debug!(owner = %owner_ref, user_id, action = %entry.action, id, "activity logged");

        Ok(Some(LogEntry {
            id,
            owner_type: owner_ref.owner_type,
            owner_id: owner_ref.owner_id,
            user_id: Some(user_id),
            kind: DEFAULT_LOG_TYPE.to_string(),
            action: entry.action,
            content: entry.content,
            params: entry.params,
            notified: Some(false),
            ip,
            user_agent,
            created_at: now,
            updated_at: now,
        }))
    }

    /// All log entries of the owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn logs<O: HasLogs>(&self, owner: &O) -> Result<Vec<LogEntry>, DatabaseError> {
        self.logs_for(&owner.owner_ref()).await
    }

    /// All log entries of an owner reference, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn logs_for(&self, owner: &OwnerRef) -> Result<Vec<LogEntry>, DatabaseError> {
        let sql = format!(
            "SELECT id, model_type, model_id, user_id, type, action, content, params, notified, ip, user_agent, created_at, updated_at
             FROM {} WHERE model_type = ?1 AND model_id = ?2
             ORDER BY created_at DESC, id DESC",
            self.db().log_table()
        );
        let mut rows = self
            .db()
            .conn()
            .query(
                &sql,
                libsql::params![owner.owner_type.as_str(), owner.owner_id],
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_log(&row)?);
        }
        Ok(entries)
    }

    /// Fetch one log entry by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no entry has this id.
    pub async fn get_log(&self, id: i64) -> Result<LogEntry, DatabaseError> {
        let sql = format!(
            "SELECT id, model_type, model_id, user_id, type, action, content, params, notified, ip, user_agent, created_at, updated_at
             FROM {} WHERE id = ?1",
            self.db().log_table()
        );
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_log(&row)
    }

    /// Delete every log entry of an owner on the given connection.
    pub(crate) async fn purge_logs(
        &self,
        conn: &libsql::Connection,
        owner: &OwnerRef,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE model_type = ?1 AND model_id = ?2",
            self.db().log_table()
        );
        let removed = conn
            .execute(
                &sql,
                libsql::params![owner.owner_type.as_str(), owner.owner_id],
            )
            .await?;
        tracing::debug!(owner = %owner, removed, "logs purged");
        Ok(removed)
    }
}
