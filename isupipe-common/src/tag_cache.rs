//! In-memory mirror of the `tags` table
//!
//! Read-frequently, write-rarely access pattern using RwLock.
//! Populated once at startup and rebuilt wholesale by [`TagCache::initialize`];
//! never updated incrementally and never evicted.
//!
//! # Lock Poisoning
//!
//! Writers only ever swap in an index that was fully built before the lock
//! was taken, so a poisoned lock still guards a consistent index. Readers and
//! writers therefore recover the guard from a poisoned lock instead of
//! panicking.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// Tag row, also the JSON shape returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Default)]
struct TagIndex {
    by_id: HashMap<i64, Tag>,
    name_to_id: HashMap<String, i64>,
}

impl TagIndex {
    fn build(tags: Vec<Tag>) -> Self {
        let mut index = TagIndex {
            by_id: HashMap::with_capacity(tags.len()),
            name_to_id: HashMap::with_capacity(tags.len()),
        };
        for tag in tags {
            index.name_to_id.insert(tag.name.clone(), tag.id);
            index.by_id.insert(tag.id, tag);
        }
        index
    }
}

/// Process-lifetime tag cache shared by all request handlers
///
/// Readers see either the previous index or the fully rebuilt one, never a
/// mix of both.
#[derive(Debug, Default)]
pub struct TagCache {
    index: RwLock<TagIndex>,
}

impl TagCache {
    /// Create an empty cache; call [`TagCache::initialize`] before serving
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every tag from the database and replace both indexes
    ///
    /// On any database failure the current contents are left untouched.
    /// Returns the number of tags loaded.
    pub async fn initialize(&self, pool: &SqlitePool) -> Result<usize> {
        let mut tx = pool.begin().await?;

        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags")
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let count = tags.len();
        self.replace(tags);
        info!("Tag cache loaded {} tags", count);

        Ok(count)
    }

    /// Rebuild the cache from the database; same contract as `initialize`
    pub async fn reload(&self, pool: &SqlitePool) -> Result<usize> {
        self.initialize(pool).await
    }

    /// Swap in a new index built from `tags`
    ///
    /// The index is built before the exclusive lock is taken.
    pub fn replace(&self, tags: Vec<Tag>) {
        let index = TagIndex::build(tags);
        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        *guard = index;
    }

    pub fn lookup_by_id(&self, id: i64) -> Option<Tag> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        guard.by_id.get(&id).cloned()
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<i64> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        guard.name_to_id.get(name).copied()
    }

    /// All cached tags, ordered by id
    pub fn all(&self) -> Vec<Tag> {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        let mut tags: Vec<Tag> = guard.by_id.values().cloned().collect();
        tags.sort_by_key(|tag| tag.id);
        tags
    }

    pub fn len(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use std::thread;

    fn tag(id: i64, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
        }
    }

    async fn pool_with_tags(rows: &[(i64, &str)]) -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query("CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)")
            .execute(&pool)
            .await
            .unwrap();

        for &(id, name) in rows {
            sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
                .bind(id)
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        pool
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = TagCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup_by_id(1), None);
        assert_eq!(cache.lookup_by_name("a"), None);
    }

    #[tokio::test]
    async fn test_initialize_populates_both_indexes() {
        let pool = pool_with_tags(&[(1, "a"), (2, "b")]).await;
        let cache = TagCache::new();

        let loaded = cache.initialize(&pool).await.unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(cache.lookup_by_id(1), Some(tag(1, "a")));
        assert_eq!(cache.lookup_by_name("b"), Some(2));
        assert_eq!(cache.lookup_by_name("c"), None);
        assert_eq!(cache.lookup_by_id(3), None);
    }

    #[tokio::test]
    async fn test_reload_replaces_previous_contents() {
        let cache = TagCache::new();
        cache.replace(vec![tag(9, "stale")]);

        let pool = pool_with_tags(&[(1, "a")]).await;
        cache.reload(&pool).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup_by_name("stale"), None);
        assert_eq!(cache.lookup_by_id(1), Some(tag(1, "a")));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_contents() {
        let cache = TagCache::new();
        cache.replace(vec![tag(1, "a"), tag(2, "b")]);

        // No tags table: the bulk read fails
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        assert!(cache.reload(&pool).await.is_err());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup_by_id(2), Some(tag(2, "b")));
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let cache = TagCache::new();
        cache.replace(vec![tag(3, "c"), tag(1, "a"), tag(2, "b")]);

        let ids: Vec<i64> = cache.all().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_readers_never_observe_partial_index() {
        let cache = Arc::new(TagCache::new());
        let full: Vec<Tag> = (1..=500).map(|id| tag(id, &format!("tag{}", id))).collect();

        let writer = {
            let cache = Arc::clone(&cache);
            let full = full.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    if round % 2 == 0 {
                        cache.replace(full.clone());
                    } else {
                        cache.replace(Vec::new());
                    }
                }
            })
        };

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let len = cache.all().len();
                        assert!(len == 0 || len == 500, "observed partial index of {} tags", len);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
