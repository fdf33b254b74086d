//! MongoDB-backed document store
//!
//! Documents are addressed by the application `id` field. Every collection
//! gets a unique index on `id` at startup, which is what makes
//! `insert_if_absent` (an upsert with `$setOnInsert`) race-free.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, Bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions, ReplaceOptions, UpdateOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde_json::Value;
use std::sync::Arc;

use super::traits::*;
use crate::error::{LaunchpadError, Result};

const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    /// Connect to `uri` and use database `db_name`
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            database: client.database(db_name),
        })
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.database.collection::<bson::Document>(name)
    }

    fn to_bson(document: &Document) -> Result<bson::Document> {
        bson::to_document(document)
            .map_err(|e| LaunchpadError::StorageError(format!("Cannot encode document: {}", e)))
    }

    fn from_bson(mut document: bson::Document) -> Document {
        // The backend's own key never leaves the store
        document.remove("_id");
        match Bson::Document(document).into_relaxed_extjson() {
            Value::Object(map) => map,
            _ => Document::new(),
        }
    }

    fn filter_to_bson(filter: &Filter) -> Result<bson::Document> {
        let mut query = bson::Document::new();
        let encode = |value: &Value| {
            bson::to_bson(value)
                .map_err(|e| LaunchpadError::StorageError(format!("Cannot encode filter: {}", e)))
        };
        for condition in filter.conditions() {
            match condition {
                Condition::Eq(field, value) => {
                    query.insert(field.clone(), encode(value)?);
                }
                Condition::In(field, values) => {
                    let values = values.iter().map(encode).collect::<Result<Vec<Bson>>>()?;
                    query.insert(field.clone(), doc! { "$in": values });
                }
            }
        }
        Ok(query)
    }

    fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        matches!(
            err.kind.as_ref(),
            ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
        )
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn initialize(&self, collections: &[&str]) -> Result<()> {
        for name in collections {
            for field in std::iter::once("id").chain(unique_fields(name)) {
                let mut keys = bson::Document::new();
                keys.insert(field, 1);
                let index = IndexModel::builder()
                    .keys(keys)
                    .options(IndexOptions::builder().unique(true).build())
                    .build();
                self.collection(name).create_index(index, None).await?;
                log::debug!("Ensured unique {} index on {}", field, name);
            }
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)?.to_string();
        match self.collection(collection).insert_one(Self::to_bson(&document)?, None).await {
            Ok(_) => Ok(()),
            Err(e) if Self::is_duplicate_key(&e) => Err(LaunchpadError::Conflict(format!(
                "Document {} duplicates a unique key in {}",
                id, collection
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_if_absent(&self, collection: &str, document: Document) -> Result<bool> {
        let id = document_id(&document)?.to_string();
        let mut options = UpdateOptions::default();
        options.upsert = Some(true);

        let result = self
            .collection(collection)
            .update_one(
                doc! { "id": id.as_str() },
                doc! { "$setOnInsert": Self::to_bson(&document)? },
                options,
            )
            .await;

        match result {
            Ok(outcome) => Ok(outcome.upserted_id.is_some()),
            Err(e) if Self::is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.find_one(collection, &Filter::by_id(id)).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(Self::filter_to_bson(filter)?, FindOneOptions::default())
            .await?;
        Ok(found.map(Self::from_bson))
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let mut options = FindOptions::default();
        options.skip = Some(query.skip);
        options.limit = query.limit.map(|l| l as i64);
        if let Some((field, order)) = &query.sort {
            let direction = match order {
                SortOrder::Ascending => 1,
                SortOrder::Descending => -1,
            };
            let mut sort = bson::Document::new();
            sort.insert(field.clone(), direction);
            options.sort = Some(sort);
        }

        let cursor = self
            .collection(collection)
            .find(Self::filter_to_bson(&query.filter)?, options)
            .await?;
        let documents: Vec<bson::Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Self::from_bson).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        Ok(self
            .collection(collection)
            .count_documents(Self::filter_to_bson(filter)?, None)
            .await?)
    }

    async fn update_by_id(&self, collection: &str, id: &str, mut fields: Document) -> Result<bool> {
        fields.remove("id");
        if fields.is_empty() {
            return Ok(self.find_by_id(collection, id).await?.is_some());
        }

        let result = self
            .collection(collection)
            .update_one(doc! { "id": id }, doc! { "$set": Self::to_bson(&fields)? }, None)
            .await;
        match result {
            Ok(outcome) => Ok(outcome.matched_count > 0),
            Err(e) if Self::is_duplicate_key(&e) => Err(LaunchpadError::Conflict(format!(
                "Update of {} duplicates a unique key in {}",
                id, collection
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_and_push(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
        array_field: &str,
        value: Value,
    ) -> Result<bool> {
        fields.remove("id");
        let entry = bson::to_bson(&value)
            .map_err(|e| LaunchpadError::StorageError(format!("Cannot encode document: {}", e)))?;
        let mut push = bson::Document::new();
        push.insert(array_field, entry);
        let mut update = doc! { "$push": push };
        if !fields.is_empty() {
            update.insert("$set", Self::to_bson(&fields)?);
        }

        let result = self
            .collection(collection)
            .update_one(doc! { "id": id }, update, None)
            .await;
        match result {
            Ok(outcome) => Ok(outcome.matched_count > 0),
            Err(e) if Self::is_duplicate_key(&e) => Err(LaunchpadError::Conflict(format!(
                "Update of {} duplicates a unique key in {}",
                id, collection
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, collection: &str, document: Document) -> Result<()> {
        let id = document_id(&document)?.to_string();
        let mut options = ReplaceOptions::default();
        options.upsert = Some(true);

        self.collection(collection)
            .replace_one(doc! { "id": id.as_str() }, Self::to_bson(&document)?, options)
            .await?;
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "id": id }, None)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.database.run_command(doc! { "ping": 1 }, None).await {
            Ok(_) => Ok(true),
            Err(e) => {
                log::warn!("Document store ping failed: {}", e);
                Ok(false)
            }
        }
    }
}

/// Connect and wrap in the shared handle type
pub async fn create_mongo_store(uri: &str, db_name: &str) -> Result<SharedDocumentStore> {
    Ok(Arc::new(MongoDocumentStore::connect(uri, db_name).await?))
}
