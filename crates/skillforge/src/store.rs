// Typed store facade over the generic document adapter.
//
// Routes speak in domain models; the adapter speaks in `serde_json::Value`.
// This layer owns the model-name constants and the conversions between the
// two, so a decode failure surfaces as a Serialization error instead of a
// panic somewhere inside a handler.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use skillforge_core::db::adapter::{Adapter, FindManyQuery, WhereClause};
use skillforge_core::error::{Result, SkillForgeError};

/// Collection names used across the application.
pub mod model {
    pub const COURSE: &str = "course";
    pub const LESSON: &str = "lesson";
    pub const ENROLLMENT: &str = "enrollment";
    pub const CERTIFICATE: &str = "certificate";
    pub const VIDEO: &str = "video";
    pub const ACTIVITY: &str = "activity";
    pub const USER: &str = "user";
}

/// Typed facade over an `Adapter`.
#[derive(Debug, Clone)]
pub struct Store {
    adapter: Arc<dyn Adapter>,
}

impl Store {
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self { adapter }
    }

    /// Direct access to the underlying adapter (counters, increments).
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    /// Insert a typed record, returning it as stored.
    pub async fn insert<T>(&self, model: &str, record: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = to_value(record)?;
        let created = self.adapter.create(model, value).await?;
        from_value(created)
    }

    /// Find a typed record by id.
    pub async fn find_by_id<T>(&self, model: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let found = self
            .adapter
            .find_one(model, &[WhereClause::eq("id", id)])
            .await?;
        found.map(from_value).transpose()
    }

    /// Find a typed record by WHERE clauses.
    pub async fn find_one<T>(&self, model: &str, clauses: &[WhereClause]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let found = self.adapter.find_one(model, clauses).await?;
        found.map(from_value).transpose()
    }

    /// Find typed records matching a query.
    pub async fn find_many<T>(&self, model: &str, query: FindManyQuery) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let found = self.adapter.find_many(model, query).await?;
        found.into_iter().map(from_value).collect()
    }

    /// Count records matching the clauses.
    pub async fn count(&self, model: &str, clauses: &[WhereClause]) -> Result<i64> {
        self.adapter.count(model, clauses).await
    }

    /// Merge `data` into the record with the given id, returning the updated
    /// record if one matched.
    pub async fn update_by_id<T>(
        &self,
        model: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let updated = self
            .adapter
            .update(model, &[WhereClause::eq("id", id)], data)
            .await?;
        updated.map(from_value).transpose()
    }

    /// Persist a full typed record over the stored one (by id).
    pub async fn replace<T>(&self, model: &str, id: &str, record: &T) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = to_value(record)?;
        self.update_by_id(model, id, value).await
    }

    /// Delete the record with the given id.
    pub async fn delete_by_id(&self, model: &str, id: &str) -> Result<()> {
        self.adapter
            .delete(model, &[WhereClause::eq("id", id)])
            .await
    }

    /// Delete every record matching the clauses; returns how many went.
    pub async fn delete_many(&self, model: &str, clauses: &[WhereClause]) -> Result<i64> {
        self.adapter.delete_many(model, clauses).await
    }

    /// Atomically bump a numeric field on the record with the given id.
    pub async fn increment_by_id(
        &self,
        model: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Option<serde_json::Value>> {
        self.adapter
            .increment(model, &[WhereClause::eq("id", id)], field, delta)
            .await
    }

    /// Advance the named sequence counter.
    pub async fn next_sequence(&self, name: &str) -> Result<i64> {
        self.adapter.next_sequence(name).await
    }

    // ─── User enrolled-course set ────────────────────────────────
    //
    // The user record itself belongs to the external auth system; the only
    // field this application touches is its enrolled-course id set. These
    // are read-modify-write updates, not transactions (accepted weak point).

    /// Add a course id to the user's enrolled-course set (no duplicates).
    /// Returns false when no such user record exists.
    pub async fn add_enrolled_course(&self, user_id: &str, course_id: &str) -> Result<bool> {
        let Some(user) = self
            .adapter
            .find_one(model::USER, &[WhereClause::eq("id", user_id)])
            .await?
        else {
            return Ok(false);
        };

        let mut courses: Vec<String> = user
            .get("enrolledCourses")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        if !courses.iter().any(|c| c == course_id) {
            courses.push(course_id.to_string());
        }

        self.adapter
            .update(
                model::USER,
                &[WhereClause::eq("id", user_id)],
                serde_json::json!({ "enrolledCourses": courses }),
            )
            .await?;
        Ok(true)
    }

    /// Remove a course id from the user's enrolled-course set.
    /// Returns false when no such user record exists.
    pub async fn remove_enrolled_course(&self, user_id: &str, course_id: &str) -> Result<bool> {
        let Some(user) = self
            .adapter
            .find_one(model::USER, &[WhereClause::eq("id", user_id)])
            .await?
        else {
            return Ok(false);
        };

        let mut courses: Vec<String> = user
            .get("enrolledCourses")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        courses.retain(|c| c != course_id);

        self.adapter
            .update(
                model::USER,
                &[WhereClause::eq("id", user_id)],
                serde_json::json!({ "enrolledCourses": courses }),
            )
            .await?;
        Ok(true)
    }

    /// Display name of a user, when the auth system mirrors one into storage.
    pub async fn user_name(&self, user_id: &str) -> Result<Option<String>> {
        let user = self
            .adapter
            .find_one(model::USER, &[WhereClause::eq("id", user_id)])
            .await?;
        Ok(user
            .and_then(|u| u.get("name").and_then(|n| n.as_str().map(String::from))))
    }
}

fn to_value<T: Serialize>(record: &T) -> Result<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| SkillForgeError::Serialization(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SkillForgeError::Serialization(e.to_string()))
}
