// MongoAdapter — concrete implementation of the core Adapter trait on MongoDB.
//
// Mapping: model names → collections, records → documents, `id` → `_id`,
// WHERE clauses → find filters. The increment primitives translate to `$inc`
// updates; `next_sequence` is a `find_one_and_update` upsert against a
// `counters` collection so concurrent issuers each observe a distinct value.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};

use skillforge_core::db::adapter::{
    storage_error, Adapter, AdapterResult, FindManyQuery, WhereClause,
};

use crate::query;

/// Name of the collection holding named sequence counters.
const COUNTERS_COLLECTION: &str = "counters";

/// MongoDB document-store adapter.
#[derive(Debug, Clone)]
pub struct MongoAdapter {
    db: Database,
}

impl MongoAdapter {
    /// Create a new adapter from an existing database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new adapter by connecting to a MongoDB URI.
    pub async fn connect(uri: &str, db_name: &str) -> AdapterResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| storage_error(format!("MongoDB connection failed: {e}")))?;
        let db = client.database(db_name);
        Ok(Self { db })
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Get a collection by model name.
    fn collection(&self, model: &str) -> Collection<mongodb::bson::Document> {
        self.db.collection(model)
    }
}

#[async_trait]
impl Adapter for MongoAdapter {
    async fn create(
        &self,
        model: &str,
        data: serde_json::Value,
    ) -> AdapterResult<serde_json::Value> {
        let mut record = data;

        // Auto-generate ID if not present
        if record.get("id").is_none() || record.get("id") == Some(&serde_json::Value::Null) {
            if let Some(obj) = record.as_object_mut() {
                obj.insert(
                    "id".to_string(),
                    serde_json::Value::String(skillforge_core::utils::id::generate_id()),
                );
            }
        }

        let coll = self.collection(model);
        let doc = query::build_insert_doc(&record);

        coll.insert_one(doc)
            .await
            .map_err(|e| storage_error(format!("MongoDB insert failed: {e}")))?;

        Ok(record)
    }

    async fn find_one(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<Option<serde_json::Value>> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);

        let result = coll
            .find_one(filter)
            .await
            .map_err(|e| storage_error(format!("MongoDB find_one failed: {e}")))?;

        Ok(result.map(|doc| query::doc_to_json(&doc)))
    }

    async fn find_many(
        &self,
        model: &str,
        query_params: FindManyQuery,
    ) -> AdapterResult<Vec<serde_json::Value>> {
        let coll = self.collection(model);
        let filter = query::build_filter(&query_params.where_clauses);

        let mut find_opts = FindOptions::default();
        if let Some(limit) = query_params.limit {
            find_opts.limit = Some(limit);
        }
        if let Some(offset) = query_params.offset {
            find_opts.skip = Some(offset as u64);
        }
        if let Some(sort) = query::build_sort(&query_params) {
            find_opts.sort = Some(sort);
        }

        let mut cursor = coll
            .find(filter)
            .with_options(find_opts)
            .await
            .map_err(|e| storage_error(format!("MongoDB find failed: {e}")))?;

        let mut results = Vec::new();
        use futures_util::StreamExt;
        while let Some(doc) = cursor.next().await {
            let doc = doc.map_err(|e| storage_error(format!("Cursor error: {e}")))?;
            results.push(query::doc_to_json(&doc));
        }

        Ok(results)
    }

    async fn count(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<i64> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);

        let count = coll
            .count_documents(filter)
            .await
            .map_err(|e| storage_error(format!("MongoDB count failed: {e}")))?;

        Ok(count as i64)
    }

    async fn update(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);
        let update = query::build_update_doc(&data);

        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = coll
            .find_one_and_update(filter, update)
            .with_options(opts)
            .await
            .map_err(|e| storage_error(format!("MongoDB update failed: {e}")))?;

        Ok(updated.map(|doc| query::doc_to_json(&doc)))
    }

    async fn update_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<i64> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);
        let update = query::build_update_doc(&data);

        let result = coll
            .update_many(filter, update)
            .await
            .map_err(|e| storage_error(format!("MongoDB update_many failed: {e}")))?;

        Ok(result.modified_count as i64)
    }

    async fn delete(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<()> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);

        coll.delete_one(filter)
            .await
            .map_err(|e| storage_error(format!("MongoDB delete failed: {e}")))?;

        Ok(())
    }

    async fn delete_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);

        let result = coll
            .delete_many(filter)
            .await
            .map_err(|e| storage_error(format!("MongoDB delete_many failed: {e}")))?;

        Ok(result.deleted_count as i64)
    }

    async fn increment(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);
        let update = query::build_inc_doc(field, delta);

        let opts = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = coll
            .find_one_and_update(filter, update)
            .with_options(opts)
            .await
            .map_err(|e| storage_error(format!("MongoDB increment failed: {e}")))?;

        Ok(updated.map(|doc| query::doc_to_json(&doc)))
    }

    async fn increment_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<i64> {
        let coll = self.collection(model);
        let filter = query::build_filter(where_clauses);
        let update = query::build_inc_doc(field, delta);

        let result = coll
            .update_many(filter, update)
            .await
            .map_err(|e| storage_error(format!("MongoDB increment_many failed: {e}")))?;

        Ok(result.modified_count as i64)
    }

    async fn next_sequence(&self, name: &str) -> AdapterResult<i64> {
        let coll = self.collection(COUNTERS_COLLECTION);

        // Atomic upsert: the server applies $inc and returns the new value,
        // so concurrent callers each see a distinct sequence number.
        let opts = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let updated = coll
            .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "value": 1_i64 } })
            .with_options(opts)
            .await
            .map_err(|e| storage_error(format!("MongoDB sequence update failed: {e}")))?;

        let value = updated
            .as_ref()
            .and_then(|d| d.get("value"))
            .and_then(|v| v.as_i64().or_else(|| v.as_i32().map(i64::from)))
            .ok_or_else(|| storage_error(format!("Counter '{name}' returned no value")))?;

        Ok(value)
    }
}
