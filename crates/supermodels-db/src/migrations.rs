//! Database migration runner.
//!
//! Embeds the SQL migration templates at compile time, substitutes the
//! configured table names, and executes them on database open. All
//! statements use `IF NOT EXISTS` for idempotent re-running.

use supermodels_config::TablesConfig;

use crate::SuperDb;
use crate::error::DatabaseError;

/// Metadata table: unique (owner, name) index plus a name index.
const MIGRATION_001: &str = include_str!("../migrations/001_metadata.sql");
/// Activity log table.
const MIGRATION_002: &str = include_str!("../migrations/002_logs.sql");

/// Substitute table names into a migration template.
pub(crate) fn render(template: &str, tables: &TablesConfig) -> String {
    template
        .replace("{{meta_table}}", &tables.meta)
        .replace("{{log_table}}", &tables.log)
}

impl SuperDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, template) in [("001_metadata", MIGRATION_001), ("002_logs", MIGRATION_002)] {
            self.conn
                .execute_batch(&render(template, &self.tables))
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_every_placeholder() {
        let tables = TablesConfig {
            meta: "post_meta".into(),
            log: "post_logs".into(),
        };
        let sql = render(MIGRATION_001, &tables) + &render(MIGRATION_002, &tables);
        assert!(!sql.contains("{{"), "unrendered placeholder in:\n{sql}");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS post_meta"));
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS post_logs"));
    }
}
