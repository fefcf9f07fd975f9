// Enrollment ledger routes — enroll, progress updates, cancellation, stats.
//
// One enrollment per (user, course) pair while it is active or completed.
// Progress is recomputed against the course's lesson count on every update;
// the active → completed transition is one-way and is the trigger point for
// certificate issuance (invoked by the client, see routes::certificates).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use skillforge_core::db::adapter::{FindManyQuery, SortBy, WhereClause};
use skillforge_core::db::models::{
    ActivityAction, Course, Enrollment, EnrollmentStatus, PaymentStatus, QuizScore,
};
use skillforge_core::error::ApiError;

use crate::activity::{self, ActivityRefs};
use crate::actor::Actor;
use crate::context::AppContext;
use crate::store::model;

/// Round the completed-lesson ratio to a whole percentage.
pub fn compute_progress(completed: usize, total: usize) -> i64 {
    ((completed as f64 / total as f64) * 100.0).round() as i64
}

// ─── Enroll ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: String,
}

/// Enroll the acting user in a course.
pub async fn handle_enroll(
    ctx: Arc<AppContext>,
    actor: &Actor,
    body: EnrollRequest,
) -> Result<Enrollment, ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, &body.course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if !course.is_published {
        return Err(ApiError::invalid_state(
            "Course is not available for enrollment",
        ));
    }

    let existing: Option<Enrollment> = ctx
        .store
        .find_one(
            model::ENROLLMENT,
            &[
                WhereClause::eq("userId", actor.id.as_str()),
                WhereClause::eq("courseId", body.course_id.as_str()),
                WhereClause::is_in(
                    "status",
                    vec![serde_json::json!("active"), serde_json::json!("completed")],
                ),
            ],
        )
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("You are already enrolled in this course"));
    }

    let payment_status = if course.price > 0.0 {
        PaymentStatus::Pending
    } else {
        PaymentStatus::Completed
    };
    let enrollment = Enrollment::new(&actor.id, &body.course_id, payment_status, course.price);
    let enrollment = ctx.store.insert(model::ENROLLMENT, &enrollment).await?;

    // The follow-up writes are not transactional with the enrollment insert.
    // A failure here leaves the counters behind the ledger; log and continue.
    if let Err(e) = ctx
        .store
        .add_enrolled_course(&actor.id, &body.course_id)
        .await
    {
        ctx.logger.error(&format!(
            "Enrolled {} in {} but failed to update enrolled-course set: {e}",
            actor.id, body.course_id
        ));
    }
    if let Err(e) = ctx
        .store
        .increment_by_id(model::COURSE, &body.course_id, "totalStudents", 1)
        .await
    {
        ctx.logger.error(&format!(
            "Enrolled {} in {} but failed to increment totalStudents: {e}",
            actor.id, body.course_id
        ));
    }

    activity::record(
        &ctx,
        actor,
        ActivityAction::Enroll,
        ActivityRefs::course(&body.course_id),
        serde_json::json!({ "paymentAmount": enrollment.payment_amount }),
    )
    .await;

    Ok(enrollment)
}

// ─── Progress ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub lesson_id: String,
    pub completed: bool,
    /// Seconds watched since the last report. Non-positive values are ignored.
    #[serde(default)]
    pub watch_time: Option<i64>,
    /// Latest quiz score for the lesson, when a quiz was taken.
    #[serde(default)]
    pub quiz_score: Option<u32>,
}

/// Update an enrollment's completed-lesson set, watch time, and progress.
pub async fn handle_update_progress(
    ctx: Arc<AppContext>,
    actor: &Actor,
    enrollment_id: &str,
    body: UpdateProgressRequest,
) -> Result<Enrollment, ApiError> {
    let mut enrollment: Enrollment = ctx
        .store
        .find_by_id(model::ENROLLMENT, enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if enrollment.user_id != actor.id {
        return Err(ApiError::forbidden(
            "Not authorized to update this enrollment",
        ));
    }

    let now = Utc::now();

    // Completed-lesson set edits are idempotent: re-adding a present id or
    // removing an absent one is a no-op.
    if body.completed {
        if !enrollment.completed_lessons.contains(&body.lesson_id) {
            enrollment.completed_lessons.push(body.lesson_id.clone());
        }
    } else {
        enrollment.completed_lessons.retain(|id| id != &body.lesson_id);
    }

    if let Some(delta) = body.watch_time {
        if delta > 0 {
            enrollment.watch_time += delta;
        }
    }

    if let Some(score) = body.quiz_score {
        match enrollment
            .quiz_scores
            .iter_mut()
            .find(|qs| qs.lesson_id == body.lesson_id)
        {
            Some(existing) => {
                existing.score = score;
                existing.attempts += 1;
                existing.last_attempt_date = now;
            }
            None => enrollment.quiz_scores.push(QuizScore {
                lesson_id: body.lesson_id.clone(),
                score,
                attempts: 1,
                last_attempt_date: now,
            }),
        }
    }

    enrollment.last_accessed = now;
    enrollment.updated_at = now;

    // Recompute progress against the course's current lesson count. The
    // active → completed transition fires exactly once and never reverses,
    // even if a lesson is later un-completed.
    let course: Option<Course> = ctx.store.find_by_id(model::COURSE, &enrollment.course_id).await?;
    let mut completed_course = false;
    if let Some(course) = course {
        if course.lesson_count() > 0 {
            enrollment.progress =
                compute_progress(enrollment.completed_lessons.len(), course.lesson_count());
            if enrollment.progress == 100 && enrollment.status == EnrollmentStatus::Active {
                enrollment.status = EnrollmentStatus::Completed;
                enrollment.completion_date = Some(now);
                completed_course = true;
            }
        }
    }

    let enrollment = ctx
        .store
        .replace(model::ENROLLMENT, enrollment_id, &enrollment)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if body.completed {
        activity::record(
            &ctx,
            actor,
            ActivityAction::CompleteLesson,
            ActivityRefs::lesson(&enrollment.course_id, &body.lesson_id),
            serde_json::json!({ "progress": enrollment.progress }),
        )
        .await;
    }
    if completed_course {
        activity::record(
            &ctx,
            actor,
            ActivityAction::CompleteCourse,
            ActivityRefs::course(&enrollment.course_id),
            serde_json::json!({ "watchTime": enrollment.watch_time }),
        )
        .await;
    }

    Ok(enrollment)
}

// ─── Cancel ──────────────────────────────────────────────────────

/// Cancel an active enrollment. Completed enrollments cannot be cancelled.
pub async fn handle_cancel(
    ctx: Arc<AppContext>,
    actor: &Actor,
    enrollment_id: &str,
) -> Result<Enrollment, ApiError> {
    let mut enrollment: Enrollment = ctx
        .store
        .find_by_id(model::ENROLLMENT, enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if enrollment.user_id != actor.id {
        return Err(ApiError::forbidden(
            "Not authorized to cancel this enrollment",
        ));
    }

    if enrollment.status == EnrollmentStatus::Completed {
        return Err(ApiError::invalid_state("Cannot cancel completed enrollment"));
    }

    enrollment.status = EnrollmentStatus::Cancelled;
    enrollment.updated_at = Utc::now();
    let enrollment = ctx
        .store
        .replace(model::ENROLLMENT, enrollment_id, &enrollment)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if let Err(e) = ctx
        .store
        .remove_enrolled_course(&enrollment.user_id, &enrollment.course_id)
        .await
    {
        ctx.logger.error(&format!(
            "Cancelled enrollment {enrollment_id} but failed to update enrolled-course set: {e}"
        ));
    }
    if let Err(e) = ctx
        .store
        .increment_by_id(model::COURSE, &enrollment.course_id, "totalStudents", -1)
        .await
    {
        ctx.logger.error(&format!(
            "Cancelled enrollment {enrollment_id} but failed to decrement totalStudents: {e}"
        ));
    }

    activity::record(
        &ctx,
        actor,
        ActivityAction::Unenroll,
        ActivityRefs::course(&enrollment.course_id),
        serde_json::Value::Null,
    )
    .await;

    Ok(enrollment)
}

// ─── Reads ───────────────────────────────────────────────────────

/// List the acting user's enrollments, newest first.
pub async fn handle_list_user_enrollments(
    ctx: Arc<AppContext>,
    actor: &Actor,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, ApiError> {
    let mut clauses = vec![WhereClause::eq("userId", actor.id.as_str())];
    if let Some(status) = status {
        clauses.push(WhereClause::eq("status", serde_json::json!(status)));
    }

    let enrollments = ctx
        .store
        .find_many(
            model::ENROLLMENT,
            FindManyQuery {
                where_clauses: clauses,
                sort_by: Some(SortBy::desc("enrollmentDate")),
                ..Default::default()
            },
        )
        .await?;
    Ok(enrollments)
}

/// Fetch a single enrollment. Owner or admin only.
pub async fn handle_get_enrollment(
    ctx: Arc<AppContext>,
    actor: &Actor,
    enrollment_id: &str,
) -> Result<Enrollment, ApiError> {
    let enrollment: Enrollment = ctx
        .store
        .find_by_id(model::ENROLLMENT, enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if enrollment.user_id != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden("Not authorized to view this enrollment"));
    }

    Ok(enrollment)
}

/// List a course's enrollments. Course owner or admin only.
pub async fn handle_course_enrollments(
    ctx: Arc<AppContext>,
    actor: &Actor,
    course_id: &str,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, ApiError> {
    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if !actor.can_manage(&course.created_by) {
        return Err(ApiError::forbidden(
            "Not authorized to view course enrollments",
        ));
    }

    let mut clauses = vec![WhereClause::eq("courseId", course_id)];
    if let Some(status) = status {
        clauses.push(WhereClause::eq("status", serde_json::json!(status)));
    }

    let enrollments = ctx
        .store
        .find_many(
            model::ENROLLMENT,
            FindManyQuery {
                where_clauses: clauses,
                sort_by: Some(SortBy::desc("enrollmentDate")),
                ..Default::default()
            },
        )
        .await?;
    Ok(enrollments)
}

// ─── Stats ───────────────────────────────────────────────────────

/// Per-status count and mean progress.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusStat {
    pub status: EnrollmentStatus,
    pub count: i64,
    pub avg_progress: f64,
}

/// Group enrollments by status with counts and mean progress.
pub(crate) fn group_by_status(enrollments: &[Enrollment]) -> Vec<StatusStat> {
    let mut groups: BTreeMap<&'static str, (EnrollmentStatus, i64, i64)> = BTreeMap::new();
    for e in enrollments {
        let key = match e.status {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Cancelled => "cancelled",
            EnrollmentStatus::Expired => "expired",
        };
        let entry = groups.entry(key).or_insert((e.status, 0, 0));
        entry.1 += 1;
        entry.2 += e.progress;
    }
    groups
        .into_values()
        .map(|(status, count, progress_sum)| StatusStat {
            status,
            count,
            avg_progress: progress_sum as f64 / count as f64,
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatsResponse {
    pub stats: Vec<StatusStat>,
    pub total_enrollments: i64,
    pub active_enrollments: i64,
    pub completed_enrollments: i64,
    /// Completed / total, rounded to a whole percentage.
    pub completion_rate: i64,
}

/// Global enrollment statistics. Admin only.
pub async fn handle_enrollment_stats(
    ctx: Arc<AppContext>,
    actor: &Actor,
) -> Result<EnrollmentStatsResponse, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to view enrollment statistics",
        ));
    }

    let enrollments: Vec<Enrollment> = ctx
        .store
        .find_many(model::ENROLLMENT, FindManyQuery::default())
        .await?;

    let total = enrollments.len() as i64;
    let active = enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Active)
        .count() as i64;
    let completed = enrollments
        .iter()
        .filter(|e| e.status == EnrollmentStatus::Completed)
        .count() as i64;

    Ok(EnrollmentStatsResponse {
        stats: group_by_status(&enrollments),
        total_enrollments: total,
        active_enrollments: active,
        completed_enrollments: completed,
        completion_rate: if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use skillforge_core::db::models::CourseCategory;
    use skillforge_core::options::SkillForgeOptions;
    use skillforge_memory::MemoryAdapter;

    use crate::actor::Role;

    async fn setup() -> (Arc<AppContext>, Actor, Course) {
        let ctx = AppContext::new(SkillForgeOptions::new(), Arc::new(MemoryAdapter::new()));
        let actor = Actor::new("u1", "Ida", Role::Student);

        let mut course = Course::new("Rust 101", "Intro to Rust", CourseCategory::WebDevelopment, "inst1");
        course.is_published = true;
        course.lessons = vec!["l1".into(), "l2".into()];
        let course = ctx.store.insert(model::COURSE, &course).await.unwrap();

        ctx.store
            .adapter()
            .create(model::USER, serde_json::json!({"id": "u1", "name": "Ida"}))
            .await
            .unwrap();

        (ctx, actor, course)
    }

    #[test]
    fn test_compute_progress_rounding() {
        assert_eq!(compute_progress(0, 3), 0);
        assert_eq!(compute_progress(1, 3), 33);
        assert_eq!(compute_progress(2, 3), 67);
        assert_eq!(compute_progress(3, 3), 100);
        assert_eq!(compute_progress(1, 2), 50);
    }

    #[tokio::test]
    async fn test_enroll_success() {
        let (ctx, actor, course) = setup().await;
        let enrollment = handle_enroll(
            ctx.clone(),
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(enrollment.status, EnrollmentStatus::Active);
        assert_eq!(enrollment.progress, 0);
        // Free course pays up front
        assert_eq!(enrollment.payment_status, PaymentStatus::Completed);

        let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
        assert_eq!(course.total_students, 1);

        // Enroll activity was appended
        let activities = ctx
            .store
            .adapter()
            .find_many(model::ACTIVITY, FindManyQuery::default())
            .await
            .unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0]["action"], "enroll");
    }

    #[tokio::test]
    async fn test_enroll_paid_course_pending_payment() {
        let (ctx, actor, mut course) = setup().await;
        course.price = 49.99;
        ctx.store.replace(model::COURSE, &course.id, &course).await.unwrap();

        let enrollment = handle_enroll(
            ctx,
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(enrollment.payment_status, PaymentStatus::Pending);
        assert_eq!(enrollment.payment_amount, 49.99);
    }

    #[tokio::test]
    async fn test_enroll_missing_course() {
        let (ctx, actor, _) = setup().await;
        let err = handle_enroll(
            ctx,
            &actor,
            EnrollRequest {
                course_id: "nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_enroll_unpublished_course() {
        let (ctx, actor, mut course) = setup().await;
        course.is_published = false;
        ctx.store.replace(model::COURSE, &course.id, &course).await.unwrap();

        let err = handle_enroll(
            ctx,
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_enroll_twice_conflicts() {
        let (ctx, actor, course) = setup().await;
        handle_enroll(
            ctx.clone(),
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap();

        let err = handle_enroll(
            ctx,
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_reenroll_after_cancel() {
        let (ctx, actor, course) = setup().await;
        let enrollment = handle_enroll(
            ctx.clone(),
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap();
        handle_cancel(ctx.clone(), &actor, &enrollment.id).await.unwrap();

        // A cancelled enrollment does not block a fresh one
        handle_enroll(
            ctx,
            &actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap();
    }

    async fn enrolled(ctx: &Arc<AppContext>, actor: &Actor, course: &Course) -> Enrollment {
        handle_enroll(
            ctx.clone(),
            actor,
            EnrollRequest {
                course_id: course.id.clone(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_progress_half_then_complete() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let e = handle_update_progress(
            ctx.clone(),
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l1".into(),
                completed: true,
                watch_time: Some(120),
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(e.progress, 50);
        assert_eq!(e.status, EnrollmentStatus::Active);
        assert_eq!(e.watch_time, 120);

        let e = handle_update_progress(
            ctx,
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l2".into(),
                completed: true,
                watch_time: Some(60),
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(e.progress, 100);
        assert_eq!(e.status, EnrollmentStatus::Completed);
        assert!(e.completion_date.is_some());
        assert_eq!(e.watch_time, 180);
    }

    #[tokio::test]
    async fn test_progress_idempotent_add_and_remove() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        for _ in 0..2 {
            let e = handle_update_progress(
                ctx.clone(),
                &actor,
                &enrollment.id,
                UpdateProgressRequest {
                    lesson_id: "l1".into(),
                    completed: true,
                    watch_time: None,
                    quiz_score: None,
                },
            )
            .await
            .unwrap();
            assert_eq!(e.completed_lessons, vec!["l1".to_string()]);
            assert_eq!(e.progress, 50);
        }

        // Removing an absent id is a no-op
        let e = handle_update_progress(
            ctx,
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l9".into(),
                completed: false,
                watch_time: None,
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(e.completed_lessons, vec!["l1".to_string()]);
    }

    #[tokio::test]
    async fn test_completion_is_one_way() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        for lesson in ["l1", "l2"] {
            handle_update_progress(
                ctx.clone(),
                &actor,
                &enrollment.id,
                UpdateProgressRequest {
                    lesson_id: lesson.into(),
                    completed: true,
                    watch_time: None,
                    quiz_score: None,
                },
            )
            .await
            .unwrap();
        }

        // Un-completing a lesson lowers progress but not the status
        let e = handle_update_progress(
            ctx,
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l2".into(),
                completed: false,
                watch_time: None,
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(e.progress, 50);
        assert_eq!(e.status, EnrollmentStatus::Completed);
        assert!(e.completion_date.is_some());
    }

    #[tokio::test]
    async fn test_nonpositive_watch_time_ignored() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let e = handle_update_progress(
            ctx,
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l1".into(),
                completed: false,
                watch_time: Some(-30),
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(e.watch_time, 0);
    }

    #[tokio::test]
    async fn test_quiz_score_recording() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let e = handle_update_progress(
            ctx.clone(),
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l1".into(),
                completed: false,
                watch_time: None,
                quiz_score: Some(60),
            },
        )
        .await
        .unwrap();
        assert_eq!(e.quiz_scores.len(), 1);
        assert_eq!(e.quiz_scores[0].score, 60);
        assert_eq!(e.quiz_scores[0].attempts, 1);

        let e = handle_update_progress(
            ctx,
            &actor,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l1".into(),
                completed: false,
                watch_time: None,
                quiz_score: Some(85),
            },
        )
        .await
        .unwrap();
        assert_eq!(e.quiz_scores.len(), 1);
        assert_eq!(e.quiz_scores[0].score, 85);
        assert_eq!(e.quiz_scores[0].attempts, 2);
    }

    #[tokio::test]
    async fn test_progress_forbidden_for_other_user() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let stranger = Actor::new("u2", "Sam", Role::Student);
        let err = handle_update_progress(
            ctx,
            &stranger,
            &enrollment.id,
            UpdateProgressRequest {
                lesson_id: "l1".into(),
                completed: true,
                watch_time: None,
                quiz_score: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_cancel_decrements_counter_once() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let e = handle_cancel(ctx.clone(), &actor, &enrollment.id).await.unwrap();
        assert_eq!(e.status, EnrollmentStatus::Cancelled);

        let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
        assert_eq!(course.total_students, 0);
    }

    #[tokio::test]
    async fn test_cancel_completed_rejected() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;
        for lesson in ["l1", "l2"] {
            handle_update_progress(
                ctx.clone(),
                &actor,
                &enrollment.id,
                UpdateProgressRequest {
                    lesson_id: lesson.into(),
                    completed: true,
                    watch_time: None,
                    quiz_score: None,
                },
            )
            .await
            .unwrap();
        }

        let err = handle_cancel(ctx, &actor, &enrollment.id).await.unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_list_user_enrollments_filtered() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;
        handle_cancel(ctx.clone(), &actor, &enrollment.id).await.unwrap();
        enrolled(&ctx, &actor, &course).await;

        let all = handle_list_user_enrollments(ctx.clone(), &actor, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let active =
            handle_list_user_enrollments(ctx, &actor, Some(EnrollmentStatus::Active))
                .await
                .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_get_enrollment_authorization() {
        let (ctx, actor, course) = setup().await;
        let enrollment = enrolled(&ctx, &actor, &course).await;

        let admin = Actor::new("root", "Root", Role::Admin);
        handle_get_enrollment(ctx.clone(), &admin, &enrollment.id).await.unwrap();

        let stranger = Actor::new("u2", "Sam", Role::Student);
        let err = handle_get_enrollment(ctx, &stranger, &enrollment.id).await.unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_enrollment_stats() {
        let (ctx, actor, course) = setup().await;
        let e1 = enrolled(&ctx, &actor, &course).await;
        for lesson in ["l1", "l2"] {
            handle_update_progress(
                ctx.clone(),
                &actor,
                &e1.id,
                UpdateProgressRequest {
                    lesson_id: lesson.into(),
                    completed: true,
                    watch_time: None,
                    quiz_score: None,
                },
            )
            .await
            .unwrap();
        }
        let other = Actor::new("u2", "Sam", Role::Student);
        enrolled(&ctx, &other, &course).await;

        let admin = Actor::new("root", "Root", Role::Admin);
        let stats = handle_enrollment_stats(ctx.clone(), &admin).await.unwrap();
        assert_eq!(stats.total_enrollments, 2);
        assert_eq!(stats.active_enrollments, 1);
        assert_eq!(stats.completed_enrollments, 1);
        assert_eq!(stats.completion_rate, 50);

        let err = handle_enrollment_stats(ctx, &actor).await.unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Forbidden);
    }

    #[test]
    fn test_group_by_status() {
        let mut e1 = Enrollment::new("u1", "c1", PaymentStatus::Completed, 0.0);
        e1.progress = 40;
        let mut e2 = Enrollment::new("u2", "c1", PaymentStatus::Completed, 0.0);
        e2.progress = 60;
        let mut e3 = Enrollment::new("u3", "c1", PaymentStatus::Completed, 0.0);
        e3.status = EnrollmentStatus::Completed;
        e3.progress = 100;

        let stats = group_by_status(&[e1, e2, e3]);
        assert_eq!(stats.len(), 2);
        let active = stats
            .iter()
            .find(|s| s.status == EnrollmentStatus::Active)
            .unwrap();
        assert_eq!(active.count, 2);
        assert_eq!(active.avg_progress, 50.0);
    }
}
