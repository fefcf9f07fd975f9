// Document-store adapter trait — the abstraction all storage backends implement.
//
// The contract is schema-agnostic: records are `serde_json::Value` objects,
// collections are addressed by model name, and filters are expressed as
// WHERE clauses with a small operator set. On top of plain CRUD the trait
// carries three numeric primitives the domain depends on:
// `increment`/`increment_many` for counter fields and order shifting, and
// `next_sequence` for the strictly-increasing certificate issuance counter.
// Each of those must be atomic at the single-document level; nothing in the
// contract coordinates across documents.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SkillForgeError;

/// Result type for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, SkillForgeError>;

// ─── Where Clause ────────────────────────────────────────────────

/// Comparison operators for WHERE clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal (default).
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Value is in the given list.
    In,
    /// String contains substring (case-insensitive).
    Contains,
}

impl Default for Operator {
    fn default() -> Self {
        Self::Eq
    }
}

/// Logical connector between WHERE clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connector {
    And,
    Or,
}

/// A single WHERE condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhereClause {
    /// The field name to filter on.
    pub field: String,
    /// The comparison value.
    pub value: serde_json::Value,
    /// The comparison operator (default: Eq).
    #[serde(default)]
    pub operator: Operator,
    /// Connector to the next clause. None means this is the last/only clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<Connector>,
}

impl WhereClause {
    /// Simple equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: Operator::Eq,
            connector: None,
        }
    }

    /// Inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: Operator::Ne,
            connector: None,
        }
    }

    /// Greater-than-or-equal filter.
    pub fn gte(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            operator: Operator::Gte,
            connector: None,
        }
    }

    /// Membership filter: field value is one of the listed values.
    pub fn is_in(field: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            value: serde_json::Value::Array(values),
            operator: Operator::In,
            connector: None,
        }
    }

    /// Case-insensitive substring filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: serde_json::Value::String(value.into()),
            operator: Operator::Contains,
            connector: None,
        }
    }

    /// Mark this clause as connected to the next via OR.
    pub fn or(mut self) -> Self {
        self.connector = Some(Connector::Or);
        self
    }
}

// ─── Sort / Pagination ───────────────────────────────────────────

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort specification (field + direction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Query parameters for `find_many`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyQuery {
    pub where_clauses: Vec<WhereClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
}

// ─── Adapter Trait ───────────────────────────────────────────────

/// The document-store adapter trait.
///
/// Every storage backend (memory, MongoDB) implements this. The adapter
/// works with `serde_json::Value` to stay schema-agnostic; the typed store
/// layer in the application crate converts between models and `Value`.
#[async_trait]
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Create a new record in the given model/collection.
    /// Returns the created record (with an auto-generated `id` if absent).
    async fn create(
        &self,
        model: &str,
        data: serde_json::Value,
    ) -> AdapterResult<serde_json::Value>;

    /// Find a single record matching the WHERE clauses.
    async fn find_one(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<Option<serde_json::Value>>;

    /// Find multiple records matching the query parameters.
    async fn find_many(
        &self,
        model: &str,
        query: FindManyQuery,
    ) -> AdapterResult<Vec<serde_json::Value>>;

    /// Count records matching the WHERE clauses.
    async fn count(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64>;

    /// Update a single record matching the WHERE clauses by merging `data`.
    /// Returns the updated record, or `None` if no match was found.
    async fn update(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<Option<serde_json::Value>>;

    /// Update multiple records matching the WHERE clauses.
    /// Returns the number of affected records.
    async fn update_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<i64>;

    /// Delete a single record matching the WHERE clauses.
    async fn delete(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<()>;

    /// Delete multiple records matching the WHERE clauses.
    /// Returns the number of deleted records.
    async fn delete_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64>;

    /// Atomically add `delta` to a numeric field of the first matching
    /// record. Returns the updated record, or `None` if no match was found.
    async fn increment(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<Option<serde_json::Value>>;

    /// Atomically add `delta` to a numeric field of every matching record.
    /// Returns the number of affected records.
    async fn increment_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        field: &str,
        delta: i64,
    ) -> AdapterResult<i64>;

    /// Atomically advance the named counter and return its new value.
    ///
    /// The first call for a name returns 1. Concurrent callers must each
    /// observe a distinct, strictly increasing value.
    async fn next_sequence(&self, name: &str) -> AdapterResult<i64>;
}

/// Convenience: a storage error with a formatted message.
pub fn storage_error(msg: impl Into<String>) -> SkillForgeError {
    SkillForgeError::Storage(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_builders() {
        let c = WhereClause::eq("courseId", "c1");
        assert_eq!(c.operator, Operator::Eq);
        assert_eq!(c.value, serde_json::json!("c1"));

        let c = WhereClause::gte("order", 3);
        assert_eq!(c.operator, Operator::Gte);

        let c = WhereClause::is_in(
            "status",
            vec![serde_json::json!("active"), serde_json::json!("completed")],
        );
        assert_eq!(c.operator, Operator::In);
        assert!(c.value.is_array());
    }

    #[test]
    fn test_or_connector() {
        let c = WhereClause::contains("title", "rust").or();
        assert_eq!(c.connector, Some(Connector::Or));
    }

    #[test]
    fn test_sort_builders() {
        let s = SortBy::desc("createdAt");
        assert_eq!(s.direction, SortDirection::Desc);
        let s = SortBy::asc("order");
        assert_eq!(s.direction, SortDirection::Asc);
    }
}
