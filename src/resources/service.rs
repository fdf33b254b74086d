use chrono::Utc;
use std::collections::HashMap;
use std::marker::PhantomData;

use super::{filter_from_query, ListParams, PaginatedResponse, Resource, Validate};
use crate::error::{LaunchpadError, Result};
use crate::storage::traits::{Document, Filter, Query};
use crate::storage::SharedDocumentStore;

/// CRUD over one resource collection
pub struct ResourceService<R: Resource> {
    store: SharedDocumentStore,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: SharedDocumentStore) -> Self {
        Self {
            store,
            _resource: PhantomData,
        }
    }

    fn not_found() -> LaunchpadError {
        LaunchpadError::NotFound(R::NAME.to_string())
    }

    /// List using the resource's filterable query parameters
    pub async fn list(&self, query: &HashMap<String, String>) -> Result<PaginatedResponse<Document>> {
        let params = ListParams::from_query(query)?;
        let filter = filter_from_query(query, R::FILTER_FIELDS);
        self.list_where(filter, &params).await
    }

    /// List with an explicit filter
    pub async fn list_where(
        &self,
        filter: Filter,
        params: &ListParams,
    ) -> Result<PaginatedResponse<Document>> {
        let total = self.store.count(R::COLLECTION, &filter).await?;
        let (sort_field, sort_order) = R::DEFAULT_SORT;
        let query = Query::new(filter)
            .sort_by(sort_field, sort_order)
            .skip(params.skip())
            .limit(params.limit);
        let items = self.store.find(R::COLLECTION, &query).await?;
        Ok(PaginatedResponse::new(items, total, params))
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        self.store
            .find_by_id(R::COLLECTION, id)
            .await?
            .ok_or_else(Self::not_found)
    }

    /// Validate, assign an id and timestamps, persist, and echo the document
    pub async fn create(&self, payload: R::Create) -> Result<Document> {
        payload.validate()?;
        let id = uuid::Uuid::new_v4().to_string();
        let document = R::create_document(payload, id.clone(), Utc::now())?;
        self.store.insert(R::COLLECTION, document.clone()).await?;
        log::info!("{} {} created", R::NAME, id);
        Ok(document)
    }

    pub async fn update(&self, id: &str, payload: R::Update) -> Result<()> {
        payload.validate()?;
        let current = self.get(id).await?;
        let now = Utc::now();
        let appended = R::appended_entry(&payload, &current, now)?;
        let fields = R::update_fields(payload, &current, now)?;
        let matched = match appended {
            Some((array_field, entry)) => {
                self.store
                    .update_and_push(R::COLLECTION, id, fields, array_field, entry)
                    .await?
            }
            None => self.store.update_by_id(R::COLLECTION, id, fields).await?,
        };
        if !matched {
            return Err(Self::not_found());
        }
        log::info!("{} {} updated", R::NAME, id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete_by_id(R::COLLECTION, id).await? {
            return Err(Self::not_found());
        }
        log::info!("{} {} deleted", R::NAME, id);
        Ok(())
    }
}
