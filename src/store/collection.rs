use std::sync::Arc;

use tokio::sync::RwLock;
use ulid::Ulid;

use super::StoreError;

/// A record kind that can live in a [`Collection`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Caller-supplied fields for `create`.
    type Draft: Send;
    /// Partial fields for `update`; absent fields are left alone.
    type Patch: Send;
    /// Human-readable kind used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn from_draft(id: String, draft: Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Ordered in-memory sequence of one record kind.
///
/// Clones share the same underlying sequence. Every method takes the lock
/// for the duration of a single operation only, so each operation is atomic
/// with respect to the collection.
#[derive(Debug)]
pub struct Collection<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Copy of the sequence in insertion order.
    pub async fn list(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Append a new record built from `draft` under a fresh ULID.
    pub async fn create(&self, draft: T::Draft) -> T {
        let record = T::from_draft(Ulid::new().to_string(), draft);
        self.records.write().await.push(record.clone());
        record
    }

    pub async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    /// Remove every record with `id`. Returns how many were removed.
    pub async fn delete(&self, id: &str) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        before - records.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: i32,
    }

    impl Record for Item {
        type Draft = i32;
        type Patch = i32;
        const KIND: &'static str = "Item";

        fn id(&self) -> &str {
            &self.id
        }

        fn from_draft(id: String, value: i32) -> Self {
            Self { id, value }
        }

        fn apply_patch(&mut self, value: i32) {
            self.value = value;
        }
    }

    fn item(id: &str, value: i32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_collection_crud() {
        let items = Collection::with_records(vec![item("1", 10)]);

        let created = items.create(42).await;
        assert_eq!(created.value, 42);
        assert_eq!(items.get(&created.id).await, Some(created.clone()));

        let updated = items.update(&created.id, 100).await.unwrap();
        assert_eq!(updated.value, 100);
        assert_eq!(items.get(&created.id).await.unwrap().value, 100);

        assert_eq!(items.delete(&created.id).await, 1);
        assert!(items.get(&created.id).await.is_none());
        assert_eq!(items.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let items = Collection::with_records(vec![item("b", 2), item("a", 1)]);
        let c = items.create(3).await;

        let ids: Vec<String> = items.list().await.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string(), c.id]);
    }

    #[tokio::test]
    async fn test_update_missing_leaves_collection_unchanged() {
        let items = Collection::with_records(vec![item("1", 10)]);
        let err = items.update("999", 5).await.unwrap_err();
        assert_eq!(err, StoreError::not_found("Item", "999"));
        assert_eq!(items.list().await, vec![item("1", 10)]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let items = Collection::with_records(vec![item("1", 10), item("2", 20)]);
        assert_eq!(items.delete("1").await, 1);
        let once = items.list().await;
        assert_eq!(items.delete("1").await, 0);
        assert_eq!(items.list().await, once);
        assert_eq!(items.delete("nope").await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let items: Collection<Item> = Collection::new();
        let created = futures::future::join_all((0..200).map(|n| items.create(n))).await;

        let ids: HashSet<String> = created.into_iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(items.len().await, 200);
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let items: Collection<Item> = Collection::new();
        let other = items.clone();
        other.create(1).await;
        assert!(!items.is_empty().await);
    }
}
