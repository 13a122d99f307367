//! Shared test utilities for supermodels-db unit tests.

use supermodels_config::SuperConfig;
use supermodels_core::{HasLogs, HasMeta, MetaCache, Owner};

use crate::service::SuperService;

/// A minimal owner with metadata and logs, stored in `posts`.
#[derive(Debug, Default)]
pub(crate) struct Post {
    pub id: i64,
    pub meta: MetaCache,
}

impl Post {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            meta: MetaCache::new(),
        }
    }
}

impl Owner for Post {
    const MODEL_TYPE: &'static str = "post";

    fn owner_id(&self) -> i64 {
        self.id
    }
}

impl HasMeta for Post {
    fn meta_cache(&self) -> &MetaCache {
        &self.meta
    }

    fn meta_cache_mut(&mut self) -> &mut MetaCache {
        &mut self.meta
    }
}

impl HasLogs for Post {}

/// In-memory service with a `posts` owner table registered.
pub(crate) async fn test_service() -> SuperService {
    let mut svc = SuperService::new(&SuperConfig::default()).await.unwrap();
    svc.db()
        .conn()
        .execute(
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT NOT NULL)",
            (),
        )
        .await
        .unwrap();
    svc.registry_mut().register::<Post>("posts").unwrap();
    svc
}

/// Insert a post row and return the in-memory owner.
pub(crate) async fn create_post(svc: &SuperService, id: i64) -> Post {
    svc.db()
        .conn()
        .execute(
            "INSERT INTO posts (id, title) VALUES (?1, 'untitled')",
            [id],
        )
        .await
        .unwrap();
    Post::new(id)
}
