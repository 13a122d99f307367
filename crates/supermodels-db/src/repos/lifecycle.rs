//! Owner deletion cascade.
//!
//! Metadata and logs hold no foreign key to their owner, so they are purged
//! explicitly whenever an owner goes away.

use serde::Serialize;
use supermodels_core::OwnerRef;
use supermodels_core::entities::MetaEntry;

use crate::error::DatabaseError;
use crate::service::SuperService;

/// Rows removed from the side tables for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub meta_rows: u64,
    pub log_rows: u64,
}

impl SuperService {
    /// Remove all metadata and logs of an owner that is about to be deleted.
    ///
    /// Call this from whatever deletes the owner row when that deletion does
    /// not go through [`SuperService::delete_owner`]. Both purges commit
    /// together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if either DELETE fails.
    pub async fn before_owner_delete(
        &self,
        owner: &OwnerRef,
    ) -> Result<PurgeSummary, DatabaseError> {
        let tx = self.db().conn().transaction().await?;
        let meta_rows = self.purge_meta(&tx, owner).await?;
        let log_rows = self.purge_logs(&tx, owner).await?;
        tx.commit().await?;

        let summary = PurgeSummary {
            meta_rows,
            log_rows,
        };
        tracing::debug!(owner = %owner, ?summary, "owner side rows purged");
        Ok(summary)
    }

    /// Delete an owner row together with its metadata and logs.
    ///
    /// The owner's table is resolved through the registry. Returns `false` when
    /// no owner row existed; its side rows are purged regardless.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SuperService::owner_table`], or
    /// `DatabaseError` if any DELETE fails. Nothing is committed on error.
    pub async fn delete_owner(&self, owner: &OwnerRef) -> Result<bool, DatabaseError> {
        let table = self.owner_table(owner)?;

        let tx = self.db().conn().transaction().await?;
        let meta_rows = self.purge_meta(&tx, owner).await?;
        let log_rows = self.purge_logs(&tx, owner).await?;
        let sql = format!("DELETE FROM {table} WHERE id = ?1");
        let deleted = tx.execute(&sql, [owner.owner_id]).await?;
        tx.commit().await?;

        tracing::info!(owner = %owner, table, meta_rows, log_rows, deleted, "owner deleted");
        Ok(deleted > 0)
    }

    /// Whether the owner row still exists in its registered table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` if the owner type is not registered.
    pub async fn owner_exists(&self, owner: &OwnerRef) -> Result<bool, DatabaseError> {
        let table = self.owner_table(owner)?;
        let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
        let mut rows = self.db().conn().query(&sql, [owner.owner_id]).await?;
        Ok(rows.next().await?.is_some())
    }

    /// Table that stores owners of this reference's type.
    ///
    /// Metadata and log rows never act as owners, whether addressed by their
    /// configured model tag or by a registration pointing at their table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotAnOwner` for a side table, or
    /// `DatabaseError::Core` if the owner type is not registered.
    pub fn owner_table(&self, owner: &OwnerRef) -> Result<&str, DatabaseError> {
        let models = self.models();
        if owner.owner_type == models.meta || owner.owner_type == models.log {
            return Err(DatabaseError::NotAnOwner(owner.owner_type.clone()));
        }
        let table = self.registry().resolve(owner)?;
        if table == self.db().meta_table() || table == self.db().log_table() {
            return Err(DatabaseError::NotAnOwner(owner.owner_type.clone()));
        }
        Ok(table)
    }

    /// Table of the owner a metadata row belongs to.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` if the row's owner type is not registered.
    pub fn meta_owner_table(&self, entry: &MetaEntry) -> Result<&str, DatabaseError> {
        self.owner_table(&entry.owner())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use supermodels_core::entities::NewLogEntry;
    use supermodels_core::{CoreError, Owner, RequestContext};

    use super::*;
    use crate::test_support::{create_post, test_service};

    #[tokio::test]
    async fn delete_owner_cascades_to_side_rows() {
        let svc = test_service().await;
        let mut post = create_post(&svc, 1).await;
        let mut other = create_post(&svc, 2).await;
        let ctx = RequestContext::for_user(9);

        svc.set_meta(&mut post, "color", "red").await.unwrap();
        svc.set_meta(&mut post, "tags", json!(["a", "b"])).await.unwrap();
        svc.set_meta(&mut other, "color", "blue").await.unwrap();
        svc.log(&post, &ctx, NewLogEntry::new("created", ""))
            .await
            .unwrap();
        svc.log(&other, &ctx, NewLogEntry::new("created", ""))
            .await
            .unwrap();

        let owner = post.owner_ref();
        assert!(svc.delete_owner(&owner).await.unwrap());

        assert!(!svc.owner_exists(&owner).await.unwrap());
        assert!(svc.meta_entries(&owner).await.unwrap().is_empty());
        assert!(svc.logs_for(&owner).await.unwrap().is_empty());

        // Other owners are untouched.
        assert_eq!(
            svc.get_meta(&mut other, "color", false).await.unwrap(),
            Some(json!("blue"))
        );
        assert_eq!(svc.logs(&other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn before_owner_delete_reports_counts() {
        let svc = test_service().await;
        let mut post = create_post(&svc, 1).await;
        let ctx = RequestContext::for_user(9);

        svc.set_meta_many(&mut post, [("a", json!(1)), ("b", json!("x"))])
            .await
            .unwrap();
        svc.log(&post, &ctx, NewLogEntry::new("edited", ""))
            .await
            .unwrap();

        let summary = svc.before_owner_delete(&post.owner_ref()).await.unwrap();
        assert_eq!(
            summary,
            PurgeSummary {
                meta_rows: 2,
                log_rows: 1
            }
        );
        // The owner row itself is left to the caller.
        assert!(svc.owner_exists(&post.owner_ref()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_owner_returns_false() {
        let svc = test_service().await;
        let deleted = svc.delete_owner(&OwnerRef::new("post", 99)).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn unknown_owner_type_is_rejected() {
        let svc = test_service().await;
        let result = svc.delete_owner(&OwnerRef::new("comment", 1)).await;
        assert!(matches!(
            result,
            Err(DatabaseError::Core(CoreError::UnknownOwnerType(ref tag))) if tag == "comment"
        ));
    }

    #[tokio::test]
    async fn side_tables_cannot_be_deleted_as_owners() {
        let mut svc = test_service().await;
        let mut post = create_post(&svc, 1).await;
        svc.set_meta(&mut post, "color", "red").await.unwrap();
        let row_id = svc.meta_entries(&post.owner_ref()).await.unwrap()[0].id;

        // Model tag of metadata rows, never registered.
        let by_tag = svc.delete_owner(&OwnerRef::new("meta", row_id)).await;
        assert!(matches!(by_tag, Err(DatabaseError::NotAnOwner(ref tag)) if tag == "meta"));

        // Some other tag pointed at the metadata table.
        svc.registry_mut().register_tag("setting", "metadata").unwrap();
        let by_table = svc.delete_owner(&OwnerRef::new("setting", row_id)).await;
        assert!(matches!(by_table, Err(DatabaseError::NotAnOwner(_))));
        assert!(matches!(
            svc.owner_exists(&OwnerRef::new("log", 1)).await,
            Err(DatabaseError::NotAnOwner(_))
        ));

        assert_eq!(
            svc.get_meta(&mut post, "color", false).await.unwrap(),
            Some(json!("red"))
        );
    }

    #[tokio::test]
    async fn owner_table_resolves_registered_type() {
        let svc = test_service().await;
        assert_eq!(svc.owner_table(&OwnerRef::new("post", 1)).unwrap(), "posts");
    }

    #[tokio::test]
    async fn meta_entry_resolves_back_to_owner_table() {
        let svc = test_service().await;
        let mut post = create_post(&svc, 3).await;
        svc.set_meta(&mut post, "color", "red").await.unwrap();

        let entries = svc.meta_entries(&post.owner_ref()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(svc.meta_owner_table(&entries[0]).unwrap(), "posts");
    }
}
