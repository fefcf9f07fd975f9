// Course catalog routes — listing, detail, authoring, and statistics.
//
// The public listing only ever shows published courses; filtering, search,
// sorting, and pagination are pushed down to the storage adapter. Authoring
// operations require the course owner or an admin.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use skillforge_core::db::adapter::{FindManyQuery, SortBy, SortDirection, WhereClause};
use skillforge_core::db::models::{
    ActivityAction, Course, CourseCategory, CourseLevel, Enrollment, Lesson, Quiz,
};
use skillforge_core::error::ApiError;

use crate::activity::{self, ActivityRefs};
use crate::actor::Actor;
use crate::context::AppContext;
use crate::pagination::{PageParams, PageWindow, Pagination};
use crate::routes::enrollments::{group_by_status, StatusStat};
use crate::store::model;

// ─── Validation ──────────────────────────────────────────────────

fn validate_title(title: &str) -> Result<(), ApiError> {
    let title = title.trim();
    if title.len() < 3 {
        return Err(ApiError::validation("Title must be at least 3 characters"));
    }
    if title.len() > 100 {
        return Err(ApiError::validation("Title cannot be more than 100 characters"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    let description = description.trim();
    if description.len() < 10 {
        return Err(ApiError::validation(
            "Description must be at least 10 characters",
        ));
    }
    if description.len() > 1000 {
        return Err(ApiError::validation(
            "Description cannot be more than 1000 characters",
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if price < 0.0 {
        return Err(ApiError::validation("Price cannot be negative"));
    }
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesQuery {
    pub category: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
    /// Sort directive: a field name, `-` prefixed for descending
    /// (e.g. `-createdAt`, `price`).
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Course>,
}

/// Parse a sort directive into a SortBy; defaults to newest first.
fn parse_sort(sort: Option<&str>) -> SortBy {
    let Some(sort) = sort.and_then(|s| s.split(',').next()).filter(|s| !s.is_empty()) else {
        return SortBy::desc("createdAt");
    };
    match sort.strip_prefix('-') {
        Some(field) => SortBy {
            field: field.to_string(),
            direction: SortDirection::Desc,
        },
        None => SortBy {
            field: sort.to_string(),
            direction: SortDirection::Asc,
        },
    }
}

/// List published courses with filters, search, and pagination.
pub async fn handle_list_courses(
    ctx: Arc<AppContext>,
    query: ListCoursesQuery,
) -> Result<CourseListResponse, ApiError> {
    let mut clauses = Vec::new();

    // The search pair must come first so the OR grouping binds to itself
    // before the AND filters apply.
    if let Some(ref search) = query.search {
        if !search.trim().is_empty() {
            clauses.push(WhereClause::contains("title", search.trim()).or());
            clauses.push(WhereClause::contains("description", search.trim()));
        }
    }
    clauses.push(WhereClause::eq("isPublished", true));
    if let Some(ref category) = query.category {
        clauses.push(WhereClause::eq("category", category.as_str()));
    }
    if let Some(ref level) = query.level {
        clauses.push(WhereClause::eq("level", level.as_str()));
    }

    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let window = PageWindow::resolve(&params, &ctx.options.pagination);
    let total = ctx.store.count(model::COURSE, &clauses).await?;

    let data: Vec<Course> = ctx
        .store
        .find_many(
            model::COURSE,
            FindManyQuery {
                where_clauses: clauses,
                sort_by: Some(parse_sort(query.sort.as_deref())),
                limit: Some(window.limit),
                offset: Some(window.offset),
            },
        )
        .await?;

    Ok(CourseListResponse {
        count: data.len(),
        pagination: Pagination::build(window, total),
        data,
    })
}

// ─── Detail ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,
    /// Published lessons in order.
    pub lessons: Vec<Lesson>,
    /// Whether the calling user holds an active or completed enrollment.
    pub is_enrolled: bool,
}

/// Fetch a single course with its published lessons sorted by order.
pub async fn handle_get_course(
    ctx: Arc<AppContext>,
    actor: Option<&Actor>,
    course_id: &str,
) -> Result<CourseDetailResponse, ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let lessons: Vec<Lesson> = ctx
        .store
        .find_many(
            model::LESSON,
            FindManyQuery {
                where_clauses: vec![
                    WhereClause::eq("courseId", course_id),
                    WhereClause::eq("isPublished", true),
                ],
                sort_by: Some(SortBy::asc("order")),
                ..Default::default()
            },
        )
        .await?;

    let is_enrolled = match actor {
        Some(actor) => {
            let enrollment: Option<Enrollment> = ctx
                .store
                .find_one(
                    model::ENROLLMENT,
                    &[
                        WhereClause::eq("userId", actor.id.as_str()),
                        WhereClause::eq("courseId", course_id),
                        WhereClause::is_in(
                            "status",
                            vec![serde_json::json!("active"), serde_json::json!("completed")],
                        ),
                    ],
                )
                .await?;
            enrollment.is_some()
        }
        None => false,
    };

    Ok(CourseDetailResponse {
        course,
        lessons,
        is_enrolled,
    })
}

// ─── Create / Update / Delete ────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub level: Option<CourseLevel>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub learning_outcomes: Option<Vec<String>>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub certificate_template: Option<String>,
}

/// Create a new course owned by the acting user.
pub async fn handle_create_course(
    ctx: Arc<AppContext>,
    actor: &Actor,
    body: CreateCourseRequest,
) -> Result<Course, ApiError> {
    if !actor.can_author() {
        return Err(ApiError::forbidden("Not authorized to create courses"));
    }

    validate_title(&body.title)?;
    validate_description(&body.description)?;
    if let Some(price) = body.price {
        validate_price(price)?;
    }

    let mut course = Course::new(
        body.title.trim(),
        body.description.trim(),
        body.category,
        &actor.id,
    );
    if let Some(thumbnail) = body.thumbnail {
        course.thumbnail = thumbnail;
    }
    if let Some(price) = body.price {
        course.price = price;
    }
    if let Some(level) = body.level {
        course.level = level;
    }
    if let Some(tags) = body.tags {
        course.tags = tags;
    }
    if let Some(requirements) = body.requirements {
        course.requirements = requirements;
    }
    if let Some(outcomes) = body.learning_outcomes {
        course.learning_outcomes = outcomes;
    }
    if let Some(published) = body.is_published {
        course.is_published = published;
    }
    if let Some(featured) = body.is_featured {
        course.is_featured = featured;
    }
    if let Some(template) = body.certificate_template {
        course.certificate_template = template;
    }

    let course = ctx.store.insert(model::COURSE, &course).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::CreateCourse,
        ActivityRefs::course(&course.id),
        serde_json::json!({ "title": course.title }),
    )
    .await;

    Ok(course)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<CourseCategory>,
    pub thumbnail: Option<String>,
    pub price: Option<f64>,
    pub level: Option<CourseLevel>,
    pub tags: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub learning_outcomes: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub certificate_template: Option<String>,
}

/// Update a course. Owner or admin only.
pub async fn handle_update_course(
    ctx: Arc<AppContext>,
    actor: &Actor,
    course_id: &str,
    body: UpdateCourseRequest,
) -> Result<Course, ApiError> {
    let mut course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if !actor.can_manage(&course.created_by) {
        return Err(ApiError::forbidden("Not authorized to update this course"));
    }

    let was_published = course.is_published;

    if let Some(ref title) = body.title {
        validate_title(title)?;
        course.title = title.trim().to_string();
    }
    if let Some(ref description) = body.description {
        validate_description(description)?;
        course.description = description.trim().to_string();
    }
    if let Some(category) = body.category {
        course.category = category;
    }
    if let Some(thumbnail) = body.thumbnail {
        course.thumbnail = thumbnail;
    }
    if let Some(price) = body.price {
        validate_price(price)?;
        course.price = price;
    }
    if let Some(level) = body.level {
        course.level = level;
    }
    if let Some(tags) = body.tags {
        course.tags = tags;
    }
    if let Some(requirements) = body.requirements {
        course.requirements = requirements;
    }
    if let Some(outcomes) = body.learning_outcomes {
        course.learning_outcomes = outcomes;
    }
    if let Some(published) = body.is_published {
        course.is_published = published;
    }
    if let Some(featured) = body.is_featured {
        course.is_featured = featured;
    }
    if let Some(template) = body.certificate_template {
        course.certificate_template = template;
    }
    course.updated_at = Utc::now();

    let course = ctx
        .store
        .replace(model::COURSE, course_id, &course)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let action = match (was_published, course.is_published) {
        (false, true) => ActivityAction::PublishCourse,
        (true, false) => ActivityAction::UnpublishCourse,
        _ => ActivityAction::UpdateCourse,
    };
    activity::record(
        &ctx,
        actor,
        action,
        ActivityRefs::course(course_id),
        serde_json::json!({ "title": course.title }),
    )
    .await;

    Ok(course)
}

/// Delete a course and all of its lessons. Owner or admin only.
pub async fn handle_delete_course(
    ctx: Arc<AppContext>,
    actor: &Actor,
    course_id: &str,
) -> Result<(), ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if !actor.can_manage(&course.created_by) {
        return Err(ApiError::forbidden("Not authorized to delete this course"));
    }

    // Lessons go first so a failure cannot orphan them under a live course
    ctx.store
        .delete_many(model::LESSON, &[WhereClause::eq("courseId", course_id)])
        .await?;
    ctx.store.delete_by_id(model::COURSE, course_id).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::DeleteCourse,
        ActivityRefs::course(course_id),
        serde_json::json!({ "title": course.title }),
    )
    .await;

    Ok(())
}

// ─── Featured / Instructor ───────────────────────────────────────

/// Published featured courses, newest first, at most 6.
pub async fn handle_featured_courses(ctx: Arc<AppContext>) -> Result<Vec<Course>, ApiError> {
    let courses = ctx
        .store
        .find_many(
            model::COURSE,
            FindManyQuery {
                where_clauses: vec![
                    WhereClause::eq("isPublished", true),
                    WhereClause::eq("isFeatured", true),
                ],
                sort_by: Some(SortBy::desc("createdAt")),
                limit: Some(6),
                ..Default::default()
            },
        )
        .await?;
    Ok(courses)
}

/// Published courses owned by the given instructor.
pub async fn handle_courses_by_instructor(
    ctx: Arc<AppContext>,
    instructor_id: &str,
) -> Result<Vec<Course>, ApiError> {
    let courses = ctx
        .store
        .find_many(
            model::COURSE,
            FindManyQuery {
                where_clauses: vec![
                    WhereClause::eq("createdBy", instructor_id),
                    WhereClause::eq("isPublished", true),
                ],
                sort_by: Some(SortBy::desc("createdAt")),
                ..Default::default()
            },
        )
        .await?;
    Ok(courses)
}

// ─── Stats ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatsResponse {
    pub course: Course,
    pub enrollment_stats: Vec<StatusStat>,
    pub total_enrollments: i64,
    pub completed_enrollments: i64,
    pub completion_rate: i64,
}

/// Enrollment statistics for one course. Owner or admin only.
pub async fn handle_course_stats(
    ctx: Arc<AppContext>,
    actor: &Actor,
    course_id: &str,
) -> Result<CourseStatsResponse, ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if !actor.can_manage(&course.created_by) {
        return Err(ApiError::forbidden(
            "Not authorized to view course statistics",
        ));
    }

    let enrollments: Vec<Enrollment> = ctx
        .store
        .find_many(
            model::ENROLLMENT,
            FindManyQuery {
                where_clauses: vec![WhereClause::eq("courseId", course_id)],
                ..Default::default()
            },
        )
        .await?;

    let total = enrollments.len() as i64;
    let completed = enrollments
        .iter()
        .filter(|e| e.status == skillforge_core::db::models::EnrollmentStatus::Completed)
        .count() as i64;

    Ok(CourseStatsResponse {
        enrollment_stats: group_by_status(&enrollments),
        total_enrollments: total,
        completed_enrollments: completed,
        completion_rate: if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        },
        course,
    })
}

/// Validate an optional quiz definition: every question needs options and an
/// in-bounds correct index; the passing score is a percentage.
pub(crate) fn validate_quiz(quiz: &Quiz) -> Result<(), ApiError> {
    if quiz.passing_score > 100 {
        return Err(ApiError::validation("Passing score cannot exceed 100"));
    }
    for q in &quiz.questions {
        if q.options.is_empty() {
            return Err(ApiError::validation("Quiz questions need at least one option"));
        }
        if (q.correct_answer as usize) >= q.options.len() {
            return Err(ApiError::validation(
                "Quiz correct answer index is out of bounds",
            ));
        }
    }
    Ok(())
}
