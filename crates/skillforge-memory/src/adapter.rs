// In-memory document-store adapter — HashMap-based store implementing the
// core Adapter trait.
//
// Stores records in `HashMap<String, Vec<serde_json::Value>>` keyed by model
// name, plus a named-counter map backing `next_sequence`. Thread-safe via
// `tokio::sync::RwLock`; all mutations run under the write lock, which makes
// the increment and sequence primitives atomic within the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use skillforge_core::db::adapter::{
    Adapter, AdapterResult, Connector, FindManyQuery, Operator, SortDirection, WhereClause,
};
use skillforge_core::utils::id::generate_id;

/// Type alias for the in-memory record store.
type Store = HashMap<String, Vec<serde_json::Value>>;

/// In-memory document-store adapter.
///
/// All data lives in process memory and is lost when the adapter is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    store: Arc<RwLock<Store>>,
    sequences: Arc<RwLock<HashMap<String, i64>>>,
}

impl MemoryAdapter {
    /// Create a new empty in-memory adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all data (for debugging/testing).
    pub async fn snapshot(&self) -> Store {
        self.store.read().await.clone()
    }

    /// Clear all data and counters.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        self.sequences.write().await.clear();
    }

    /// Get record count for a specific model.
    pub async fn model_count(&self, model: &str) -> usize {
        self.store
            .read()
            .await
            .get(model)
            .map(|v| v.len())
            .unwrap_or(0)
    }
}

/// Check if a record matches a set of WHERE clauses.
fn matches_where(record: &serde_json::Value, clauses: &[WhereClause]) -> bool {
    if clauses.is_empty() {
        return true;
    }

    let mut result = true;
    let mut pending_or = false;

    for clause in clauses {
        let field_val = record
            .get(&clause.field)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let clause_match = match_operator(&field_val, &clause.value, &clause.operator);

        if pending_or {
            result = result || clause_match;
        } else {
            result = result && clause_match;
        }

        pending_or = matches!(clause.connector, Some(Connector::Or));
    }

    result
}

/// Match a single operator condition.
fn match_operator(field_val: &serde_json::Value, target: &serde_json::Value, op: &Operator) -> bool {
    match op {
        Operator::Eq => field_val == target,
        Operator::Ne => field_val != target,
        Operator::Lt => compare_json(field_val, target).map_or(false, |c| c < 0),
        Operator::Lte => compare_json(field_val, target).map_or(false, |c| c <= 0),
        Operator::Gt => compare_json(field_val, target).map_or(false, |c| c > 0),
        Operator::Gte => compare_json(field_val, target).map_or(false, |c| c >= 0),
        Operator::In => {
            if let serde_json::Value::Array(arr) = target {
                arr.contains(field_val)
            } else {
                false
            }
        }
        Operator::Contains => {
            let fs = field_val.as_str().unwrap_or("").to_lowercase();
            let ts = target.as_str().unwrap_or("").to_lowercase();
            fs.contains(&ts)
        }
    }
}

/// Compare two JSON values numerically/lexicographically.
fn compare_json(a: &serde_json::Value, b: &serde_json::Value) -> Option<i8> {
    match (a, b) {
        (serde_json::Value::Number(an), serde_json::Value::Number(bn)) => {
            let af = an.as_f64()?;
            let bf = bn.as_f64()?;
            Some(match af.partial_cmp(&bf)? {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            })
        }
        (serde_json::Value::String(a_s), serde_json::Value::String(b_s)) => {
            Some(match a_s.cmp(b_s) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            })
        }
        _ => None,
    }
}

/// Apply sorting to records.
fn sort_records(records: &mut [serde_json::Value], query: &FindManyQuery) {
    if let Some(ref sort) = query.sort_by {
        records.sort_by(|a, b| {
            let av = a.get(&sort.field);
            let bv = b.get(&sort.field);
            let cmp = match (av, bv) {
                (Some(av), Some(bv)) => compare_json(av, bv).unwrap_or(0),
                (Some(_), None) => 1,
                (None, Some(_)) => -1,
                (None, None) => 0,
            };
            match sort.direction {
                SortDirection::Asc => cmp.cmp(&0),
                SortDirection::Desc => cmp.cmp(&0).reverse(),
            }
        });
    }
}

/// Merge update data into an existing record.
fn merge_update(record: &mut serde_json::Value, data: &serde_json::Value) {
    if let (Some(rec_obj), Some(data_obj)) = (record.as_object_mut(), data.as_object()) {
        for (k, v) in data_obj {
            rec_obj.insert(k.clone(), v.clone());
        }
    }
}

/// Add `delta` to a numeric field, treating a missing field as 0.
fn bump_field(record: &mut serde_json::Value, field: &str, delta: i64) {
    if let Some(obj) = record.as_object_mut() {
        let current = obj.get(field).and_then(|v| v.as_i64()).unwrap_or(0);
        obj.insert(field.to_string(), serde_json::json!(current + delta));
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn create(
        &self,
        model: &str,
        data: serde_json::Value,
    ) -> AdapterResult<serde_json::Value> {
        let mut record = data;

        // Auto-generate ID if not present
        if record.get("id").is_none() || record.get("id") == Some(&serde_json::Value::Null) {
            if let Some(obj) = record.as_object_mut() {
                obj.insert("id".to_string(), serde_json::Value::String(generate_id()));
            }
        }

        let mut store = self.store.write().await;
        store
            .entry(model.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn find_one(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<Option<serde_json::Value>> {
        let store = self.store.read().await;
        Ok(store
            .get(model)
            .and_then(|recs| recs.iter().find(|r| matches_where(r, where_clauses)).cloned()))
    }

    async fn find_many(
        &self,
        model: &str,
        query: FindManyQuery,
    ) -> AdapterResult<Vec<serde_json::Value>> {
        let store = self.store.read().await;
        let empty = Vec::new();
        let records = store.get(model).unwrap_or(&empty);

        let mut result: Vec<serde_json::Value> = records
            .iter()
            .filter(|r| matches_where(r, &query.where_clauses))
            .cloned()
            .collect();

        sort_records(&mut result, &query);

        if let Some(offset) = query.offset {
            if (offset as usize) < result.len() {
                result = result.split_off(offset as usize);
            } else {
                result.clear();
            }
        }

        if let Some(limit) = query.limit {
            result.truncate(limit as usize);
        }

        Ok(result)
    }

    async fn count(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<i64> {
        let store = self.store.read().await;
        let count = store
            .get(model)
            .map(|recs| recs.iter().filter(|r| matches_where(r, where_clauses)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn update(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        if let Some(recs) = store.get_mut(model) {
            if let Some(record) = recs.iter_mut().find(|r| matches_where(r, where_clauses)) {
                merge_update(record, &data);
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn update_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<i64> {
        let mut store = self.store.write().await;
        let mut count = 0i64;
        if let Some(recs) = store.get_mut(model) {
            for record in recs.iter_mut() {
                if matches_where(record, where_clauses) {
                    merge_update(record, &data);
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn delete(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<()> {
        let mut store = self.store.write().await;
        if let Some(recs) = store.get_mut(model) {
            if let Some(pos) = recs.iter().position(|r| matches_where(r, where_clauses)) {
                recs.remove(pos);
            }
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64> {
        let mut store = self.store.write().await;
        if let Some(recs) = store.get_mut(model) {
            let before = recs.len();
            recs.retain(|r| !matches_where(r, where_clauses));
            Ok((before - recs.len()) as i64)
        } else {
            Ok(0)
        }
    }

    async fn increment(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        if let Some(recs) = store.get_mut(model) {
            if let Some(record) = recs.iter_mut().find(|r| matches_where(r, where_clauses)) {
                bump_field(record, field, delta);
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn increment_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<i64> {
        let mut store = self.store.write().await;
        let mut count = 0i64;
        if let Some(recs) = store.get_mut(model) {
            for record in recs.iter_mut() {
                if matches_where(record, where_clauses) {
                    bump_field(record, field, delta);
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn next_sequence(&self, name: &str) -> AdapterResult<i64> {
        let mut sequences = self.sequences.write().await;
        let counter = sequences.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
