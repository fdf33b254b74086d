//! In-memory document store for development and testing
//!
//! Keeps every collection in process memory behind a single lock, so each
//! operation is atomic with respect to the others.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::*;
use crate::error::{LaunchpadError, Result};

/// In-memory document storage. Collections keep insertion order.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn position(documents: &[Document], id: &str) -> Option<usize> {
        documents
            .iter()
            .position(|doc| doc.get("id").and_then(|v| v.as_str()) == Some(id))
    }

    /// `Conflict` if `candidate` repeats a unique field held by another document.
    /// `own_id` is the document being rewritten, if any.
    fn check_unique(
        collection: &str,
        documents: &[Document],
        candidate: &Document,
        own_id: Option<&str>,
    ) -> Result<()> {
        for field in unique_fields(collection) {
            let Some(value) = candidate.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = documents.iter().any(|doc| {
                doc.get(field) == Some(value)
                    && doc.get("id").and_then(|v| v.as_str()) != own_id
            });
            if taken {
                return Err(LaunchpadError::Conflict(format!(
                    "Duplicate {} in {}",
                    field, collection
                )));
            }
        }
        Ok(())
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)?.to_string();
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if Self::position(documents, &id).is_some() {
            return Err(LaunchpadError::Conflict(format!(
                "Document {} already exists in {}",
                id, collection
            )));
        }
        Self::check_unique(collection, documents, &document, None)?;
        documents.push(document);
        Ok(())
    }

    async fn insert_if_absent(&self, collection: &str, document: Document) -> Result<bool> {
        let id = document_id(&document)?.to_string();
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if Self::position(documents, &id).is_some() {
            return Ok(false);
        }
        Self::check_unique(collection, documents, &document, None)?;
        documents.push(document);
        Ok(true)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| Self::position(docs, id).map(|i| docs[i].clone())))
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> =
            documents.iter().filter(|doc| query.filter.matches(doc)).collect();

        if let Some((field, order)) = &query.sort {
            // Stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_by_id(&self, collection: &str, id: &str, fields: Document) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };

        match Self::position(documents, id) {
            Some(index) => {
                Self::check_unique(collection, documents, &fields, Some(id))?;
                let document = &mut documents[index];
                for (key, value) in fields {
                    // The application id is immutable
                    if key != "id" {
                        document.insert(key, value);
                    }
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_and_push(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        array_field: &str,
        value: Value,
    ) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(index) = Self::position(documents, id) else {
            return Ok(false);
        };
        Self::check_unique(collection, documents, &fields, Some(id))?;

        let document = &mut documents[index];
        for (key, field_value) in fields {
            if key != "id" {
                document.insert(key, field_value);
            }
        }
        match document
            .entry(array_field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(entries) => entries.push(value),
            other => *other = Value::Array(vec![value]),
        }
        Ok(true)
    }

    async fn upsert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)?.to_string();
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        Self::check_unique(collection, documents, &document, Some(id.as_str()))?;
        match Self::position(documents, &id) {
            Some(index) => documents[index] = document,
            None => documents.push(document),
        }
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(false);
        };

        match Self::position(documents, id) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Create a new memory-based document store
pub fn create_memory_store() -> SharedDocumentStore {
    Arc::new(MemoryDocumentStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryDocumentStore::new();
        store.insert("slides", doc(json!({"id": "s1", "order": 2}))).await.unwrap();
        store.insert("slides", doc(json!({"id": "s2", "order": 1}))).await.unwrap();

        let found = store.find_by_id("slides", "s1").await.unwrap().unwrap();
        assert_eq!(found["order"], 2);
        assert!(store.find_by_id("slides", "nope").await.unwrap().is_none());
        assert!(store.find_by_id("other", "s1").await.unwrap().is_none());

        let sorted = store
            .find("slides", &Query::default().sort_by("order", SortOrder::Ascending))
            .await
            .unwrap();
        assert_eq!(sorted[0]["id"], "s2");
        assert_eq!(sorted[1]["id"], "s1");
    }

    #[tokio::test]
    async fn test_update_and_push_appends() {
        let store = MemoryDocumentStore::new();
        store.insert("orders", doc(json!({"id": "o1", "status": "pending"}))).await.unwrap();

        for status in ["paid", "shipped"] {
            assert!(store
                .update_and_push("orders", "o1", doc(json!({"status": status})), "history", json!(status))
                .await
                .unwrap());
        }
        let order = store.find_by_id("orders", "o1").await.unwrap().unwrap();
        assert_eq!(order["status"], "shipped");
        assert_eq!(order["history"], json!(["paid", "shipped"]));

        assert!(!store
            .update_and_push("orders", "missing", Document::new(), "history", json!(1))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unique_admin_email() {
        let store = MemoryDocumentStore::new();
        let admins = crate::constants::ADMIN_USERS_COLLECTION;
        store.insert(admins, doc(json!({"id": "a1", "email": "ops@example.com"}))).await.unwrap();

        let duplicate = store
            .insert(admins, doc(json!({"id": "a2", "email": "ops@example.com"})))
            .await;
        assert!(matches!(duplicate, Err(LaunchpadError::Conflict(_))));

        store.insert(admins, doc(json!({"id": "a2", "email": "dev@example.com"}))).await.unwrap();
        let renamed = store
            .update_by_id(admins, "a2", doc(json!({"email": "ops@example.com"})))
            .await;
        assert!(matches!(renamed, Err(LaunchpadError::Conflict(_))));
        // Rewriting a document with its own value is fine
        assert!(store
            .update_by_id(admins, "a1", doc(json!({"email": "ops@example.com"})))
            .await
            .unwrap());

        // Other collections are unconstrained
        store.insert("users", doc(json!({"id": "u1", "email": "ops@example.com"}))).await.unwrap();
        store.insert("users", doc(json!({"id": "u2", "email": "ops@example.com"}))).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = MemoryDocumentStore::new();
        store.insert("users", doc(json!({"id": "u1"}))).await.unwrap();
        let err = store.insert("users", doc(json!({"id": "u1"}))).await.unwrap_err();
        assert!(matches!(err, LaunchpadError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_insert_if_absent_is_exclusive() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_if_absent("markers", doc(json!({"id": "only-once"})))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.count("markers", &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = MemoryDocumentStore::new();
        store.insert("users", doc(json!({"id": "u1", "status": "active"}))).await.unwrap();

        let updated = store
            .update_by_id("users", "u1", doc(json!({"status": "banned", "id": "hijack"})))
            .await
            .unwrap();
        assert!(updated);
        let user = store.find_by_id("users", "u1").await.unwrap().unwrap();
        assert_eq!(user["status"], "banned");
        assert!(!store.update_by_id("users", "missing", Document::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_pagination_and_count() {
        let store = MemoryDocumentStore::new();
        for i in 0..5 {
            let status = if i % 2 == 0 { "live" } else { "draft" };
            store
                .insert("projects", doc(json!({"id": format!("p{}", i), "status": status})))
                .await
                .unwrap();
        }

        let live = Filter::new().eq("status", "live");
        assert_eq!(store.count("projects", &live).await.unwrap(), 3);

        let page = store
            .find("projects", &Query::new(live).skip(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], "p2");
    }

    #[tokio::test]
    async fn test_upsert_and_delete() {
        let store = MemoryDocumentStore::new();
        store.upsert("site_config", doc(json!({"id": "site_config", "site_name": "A"}))).await.unwrap();
        store.upsert("site_config", doc(json!({"id": "site_config", "site_name": "B"}))).await.unwrap();
        assert_eq!(store.count("site_config", &Filter::new()).await.unwrap(), 1);

        assert!(store.delete_by_id("site_config", "site_config").await.unwrap());
        assert!(!store.delete_by_id("site_config", "site_config").await.unwrap());
    }
}
