// Lesson routes — authoring and the per-course ordering invariant.
//
// Orders are dense, gap-free, and duplicate-free within a course. Placing a
// lesson at an occupied order shifts every lesson at or after that order up
// by one, and the shift is applied before the placed lesson is persisted so
// no transient duplicate-order state is observable. The owning course's
// aggregate duration is recomputed by every operation that changes the
// lesson set.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use skillforge_core::db::adapter::{FindManyQuery, SortBy, WhereClause};
use skillforge_core::db::models::{ActivityAction, Course, Lesson, Quiz};
use skillforge_core::error::ApiError;

use crate::activity::{self, ActivityRefs};
use crate::actor::Actor;
use crate::context::AppContext;
use crate::routes::courses::validate_quiz;
use crate::store::model;

// ─── Shared helpers ──────────────────────────────────────────────

fn validate_lesson_title(title: &str) -> Result<(), ApiError> {
    let title = title.trim();
    if title.len() < 3 {
        return Err(ApiError::validation("Title must be at least 3 characters"));
    }
    if title.len() > 100 {
        return Err(ApiError::validation("Title cannot be more than 100 characters"));
    }
    Ok(())
}

fn validate_order(order: i64) -> Result<(), ApiError> {
    if order < 1 {
        return Err(ApiError::validation("Order must be a positive integer"));
    }
    Ok(())
}

/// If `order` is already taken in the course, shift every lesson at or after
/// it (excluding `exclude_id`) up by one. Runs before the triggering lesson
/// is persisted.
async fn make_room_at_order(
    ctx: &AppContext,
    course_id: &str,
    order: i64,
    exclude_id: Option<&str>,
) -> Result<(), ApiError> {
    let mut occupied = vec![
        WhereClause::eq("courseId", course_id),
        WhereClause::eq("order", order),
    ];
    if let Some(id) = exclude_id {
        occupied.push(WhereClause::ne("id", id));
    }

    let existing: Option<Lesson> = ctx.store.find_one(model::LESSON, &occupied).await?;
    if existing.is_none() {
        return Ok(());
    }

    let mut shift = vec![
        WhereClause::eq("courseId", course_id),
        WhereClause::gte("order", order),
    ];
    if let Some(id) = exclude_id {
        shift.push(WhereClause::ne("id", id));
    }
    ctx.store
        .adapter()
        .increment_many(model::LESSON, &shift, "order", 1)
        .await?;
    Ok(())
}

/// Recompute a course's aggregate duration as the sum of its lessons'
/// durations.
pub(crate) async fn recompute_course_duration(
    ctx: &AppContext,
    course_id: &str,
) -> Result<(), ApiError> {
    let lessons: Vec<Lesson> = ctx
        .store
        .find_many(
            model::LESSON,
            FindManyQuery {
                where_clauses: vec![WhereClause::eq("courseId", course_id)],
                ..Default::default()
            },
        )
        .await?;
    let total: i64 = lessons.iter().map(|l| l.duration).sum();

    ctx.store
        .update_by_id::<Course>(
            model::COURSE,
            course_id,
            serde_json::json!({ "duration": total }),
        )
        .await?;
    Ok(())
}

/// Look up a lesson's course and check the actor may manage it.
async fn managed_course(
    ctx: &AppContext,
    actor: &Actor,
    course_id: &str,
) -> Result<Course, ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    if !actor.can_manage(&course.created_by) {
        return Err(ApiError::forbidden(
            "Not authorized to manage lessons for this course",
        ));
    }
    Ok(course)
}

// ─── Create ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    pub title: String,
    pub description: String,
    pub course_id: String,
    pub video_url: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    pub order: i64,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub is_free: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub quiz: Option<Quiz>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Create a lesson, shifting same-or-greater orders first if needed.
pub async fn handle_create_lesson(
    ctx: Arc<AppContext>,
    actor: &Actor,
    body: CreateLessonRequest,
) -> Result<Lesson, ApiError> {
    validate_lesson_title(&body.title)?;
    if body.video_url.trim().is_empty() {
        return Err(ApiError::validation("Please provide a video URL"));
    }
    validate_order(body.order)?;
    if let Some(ref quiz) = body.quiz {
        validate_quiz(quiz)?;
    }

    let mut course = managed_course(&ctx, actor, &body.course_id).await?;

    make_room_at_order(&ctx, &body.course_id, body.order, None).await?;

    let mut lesson = Lesson::new(
        body.title.trim(),
        body.description.trim(),
        &body.course_id,
        body.video_url.trim(),
        body.order,
    );
    if let Some(duration) = body.duration {
        lesson.duration = duration.max(0);
    }
    if let Some(published) = body.is_published {
        lesson.is_published = published;
    }
    if let Some(free) = body.is_free {
        lesson.is_free = free;
    }
    if let Some(notes) = body.notes {
        lesson.notes = notes;
    }
    lesson.quiz = body.quiz;
    if let Some(tags) = body.tags {
        lesson.tags = tags;
    }

    let lesson = ctx.store.insert(model::LESSON, &lesson).await?;

    // Register the lesson on the course and refresh its aggregate duration
    course.lessons.push(lesson.id.clone());
    course.updated_at = Utc::now();
    ctx.store
        .update_by_id::<Course>(
            model::COURSE,
            &body.course_id,
            serde_json::json!({ "lessons": course.lessons, "updatedAt": course.updated_at }),
        )
        .await?;
    recompute_course_duration(&ctx, &body.course_id).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::CreateLesson,
        ActivityRefs::lesson(&body.course_id, &lesson.id),
        serde_json::json!({ "title": lesson.title, "order": lesson.order }),
    )
    .await;

    Ok(lesson)
}

// ─── Update ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i64>,
    pub order: Option<i64>,
    pub is_published: Option<bool>,
    pub is_free: Option<bool>,
    pub notes: Option<String>,
    pub quiz: Option<Quiz>,
    pub tags: Option<Vec<String>>,
}

/// Update a lesson; order changes re-apply the shift, duration changes
/// refresh the course aggregate.
pub async fn handle_update_lesson(
    ctx: Arc<AppContext>,
    actor: &Actor,
    lesson_id: &str,
    body: UpdateLessonRequest,
) -> Result<Lesson, ApiError> {
    let mut lesson: Lesson = ctx
        .store
        .find_by_id(model::LESSON, lesson_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))?;

    managed_course(&ctx, actor, &lesson.course_id).await?;

    if let Some(ref title) = body.title {
        validate_lesson_title(title)?;
        lesson.title = title.trim().to_string();
    }
    if let Some(ref description) = body.description {
        lesson.description = description.trim().to_string();
    }
    if let Some(ref video_url) = body.video_url {
        if video_url.trim().is_empty() {
            return Err(ApiError::validation("Please provide a video URL"));
        }
        lesson.video_url = video_url.trim().to_string();
    }

    let old_duration = lesson.duration;
    if let Some(duration) = body.duration {
        lesson.duration = duration.max(0);
    }

    if let Some(order) = body.order {
        validate_order(order)?;
        if order != lesson.order {
            make_room_at_order(&ctx, &lesson.course_id, order, Some(lesson_id)).await?;
            lesson.order = order;
        }
    }

    if let Some(published) = body.is_published {
        lesson.is_published = published;
    }
    if let Some(free) = body.is_free {
        lesson.is_free = free;
    }
    if let Some(notes) = body.notes {
        lesson.notes = notes;
    }
    if let Some(quiz) = body.quiz {
        validate_quiz(&quiz)?;
        lesson.quiz = Some(quiz);
    }
    if let Some(tags) = body.tags {
        lesson.tags = tags;
    }
    lesson.updated_at = Utc::now();

    let lesson = ctx
        .store
        .replace(model::LESSON, lesson_id, &lesson)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))?;

    if lesson.duration != old_duration {
        recompute_course_duration(&ctx, &lesson.course_id).await?;
    }

    activity::record(
        &ctx,
        actor,
        ActivityAction::UpdateLesson,
        ActivityRefs::lesson(&lesson.course_id, lesson_id),
        serde_json::json!({ "title": lesson.title }),
    )
    .await;

    Ok(lesson)
}

// ─── Delete ──────────────────────────────────────────────────────

/// Delete a lesson, unregister it from its course, and refresh the
/// course's aggregate duration.
pub async fn handle_delete_lesson(
    ctx: Arc<AppContext>,
    actor: &Actor,
    lesson_id: &str,
) -> Result<(), ApiError> {
    let lesson: Lesson = ctx
        .store
        .find_by_id(model::LESSON, lesson_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))?;

    let mut course = managed_course(&ctx, actor, &lesson.course_id).await?;

    ctx.store.delete_by_id(model::LESSON, lesson_id).await?;

    course.lessons.retain(|id| id != lesson_id);
    course.updated_at = Utc::now();
    ctx.store
        .update_by_id::<Course>(
            model::COURSE,
            &lesson.course_id,
            serde_json::json!({ "lessons": course.lessons, "updatedAt": course.updated_at }),
        )
        .await?;
    recompute_course_duration(&ctx, &lesson.course_id).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::DeleteLesson,
        ActivityRefs::lesson(&lesson.course_id, lesson_id),
        serde_json::json!({ "title": lesson.title }),
    )
    .await;

    Ok(())
}

// ─── Reads ───────────────────────────────────────────────────────

/// Published lessons of a course, ascending by order.
pub async fn handle_lessons_by_course(
    ctx: Arc<AppContext>,
    course_id: &str,
) -> Result<Vec<Lesson>, ApiError> {
    let lessons = ctx
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
    Ok(lessons)
}
