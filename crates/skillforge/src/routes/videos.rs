// Video store routes — upload validation, metadata, deletion, and the
// stream-side lookup.
//
// File bytes live on disk under the configured uploads directory; the web
// layer owns the actual file I/O. These handlers own the rules: which
// files are accepted, who may delete, and keeping the owning course's
// aggregate duration in step with the video set. Duration recomputation is
// an explicit call made by the operations that change state, not a save
// hook.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use skillforge_core::db::adapter::{FindManyQuery, WhereClause};
use skillforge_core::db::models::{ActivityAction, Course, Video};
use skillforge_core::error::ApiError;

use crate::activity::{self, ActivityRefs};
use crate::actor::Actor;
use crate::context::AppContext;
use crate::store::model;

// ─── Upload validation ───────────────────────────────────────────

/// Lowercased extension of a file name, if it has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Validate an incoming upload against the allowed video types and the
/// size ceiling. Returns the normalized extension.
pub fn validate_upload(
    ctx: &AppContext,
    file_name: &str,
    size: u64,
) -> Result<String, ApiError> {
    let ext = file_extension(file_name)
        .ok_or_else(|| ApiError::validation("Only video files are allowed"))?;
    if !ctx.options.upload.allows_extension(&ext) {
        return Err(ApiError::validation("Only video files are allowed"));
    }
    if size > ctx.options.upload.max_file_size {
        return Err(ApiError::validation(
            "File size is too large. Maximum size is 500MB",
        ));
    }
    Ok(ext)
}

/// Recompute a course's aggregate duration as the sum over all videos
/// referencing it.
pub(crate) async fn recompute_course_duration_from_videos(
    ctx: &AppContext,
    course_id: &str,
) -> Result<(), ApiError> {
    let videos: Vec<Video> = ctx
        .store
        .find_many(
            model::VIDEO,
            FindManyQuery {
                where_clauses: vec![WhereClause::eq("courseId", course_id)],
                ..Default::default()
            },
        )
        .await?;
    let total: i64 = videos.iter().map(|v| v.duration).sum();

    ctx.store
        .update_by_id::<Course>(
            model::COURSE,
            course_id,
            serde_json::json!({ "duration": total }),
        )
        .await?;
    Ok(())
}

// ─── Register ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub course_id: String,
    /// Storage URL the web layer wrote the file under.
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Duration in seconds, when already known at upload time.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub is_preview: Option<bool>,
}

/// Create the video record for a stored upload and refresh the owning
/// course's aggregate duration.
pub async fn handle_register_video(
    ctx: Arc<AppContext>,
    actor: &Actor,
    body: RegisterVideoRequest,
) -> Result<Video, ApiError> {
    if !actor.can_author() {
        return Err(ApiError::forbidden("Not authorized to upload videos"));
    }
    let title = body.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Please add a title"));
    }
    if title.len() > 100 {
        return Err(ApiError::validation("Title cannot be more than 100 characters"));
    }

    let course: Option<Course> = ctx.store.find_by_id(model::COURSE, &body.course_id).await?;
    if course.is_none() {
        return Err(ApiError::not_found("Course not found"));
    }

    let mut video = Video::new(title, &body.url, &body.course_id, &actor.id);
    if let Some(description) = body.description {
        video.description = description;
    }
    if let Some(thumbnail) = body.thumbnail {
        video.thumbnail = thumbnail;
    }
    if let Some(duration) = body.duration {
        if duration < 1 {
            return Err(ApiError::validation("Duration must be at least 1 second"));
        }
        video.duration = duration;
    }
    if let Some(preview) = body.is_preview {
        video.is_preview = preview;
    }

    let video = ctx.store.insert(model::VIDEO, &video).await?;

    recompute_course_duration_from_videos(&ctx, &body.course_id).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::UploadVideo,
        ActivityRefs::video(&body.course_id, &video.id),
        serde_json::json!({ "title": video.title, "url": video.url }),
    )
    .await;

    Ok(video)
}

// ─── Reads / Delete ──────────────────────────────────────────────

/// Fetch video metadata.
pub async fn handle_get_video(ctx: Arc<AppContext>, video_id: &str) -> Result<Video, ApiError> {
    ctx.store
        .find_by_id(model::VIDEO, video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

/// Resolve a video for streaming, counting the view.
pub async fn handle_stream_lookup(
    ctx: Arc<AppContext>,
    video_id: &str,
) -> Result<Video, ApiError> {
    let video: Video = ctx
        .store
        .find_by_id(model::VIDEO, video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    // View counting is best-effort bookkeeping around the stream
    ctx.store
        .increment_by_id(model::VIDEO, video_id, "viewCount", 1)
        .await?;
    ctx.store
        .update_by_id::<Video>(
            model::VIDEO,
            video_id,
            serde_json::json!({ "lastViewedAt": Utc::now() }),
        )
        .await?;

    Ok(video)
}

/// Delete a video record and refresh the owning course's duration.
/// Returns the deleted record so the web layer can remove the file.
pub async fn handle_delete_video(
    ctx: Arc<AppContext>,
    actor: &Actor,
    video_id: &str,
) -> Result<Video, ApiError> {
    let video: Video = ctx
        .store
        .find_by_id(model::VIDEO, video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    if video.uploaded_by != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden("Not authorized to delete this video"));
    }

    ctx.store.delete_by_id(model::VIDEO, video_id).await?;

    recompute_course_duration_from_videos(&ctx, &video.course_id).await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::DeleteVideo,
        ActivityRefs::video(&video.course_id, video_id),
        serde_json::json!({ "title": video.title }),
    )
    .await;

    Ok(video)
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
        let actor = Actor::new("inst1", "Ida", Role::Instructor);
        let mut course = Course::new("Rust 101", "Intro to Rust", CourseCategory::WebDevelopment, "inst1");
        course.is_published = true;
        let course = ctx.store.insert(model::COURSE, &course).await.unwrap();
        (ctx, actor, course)
    }

    fn register_request(course_id: &str, title: &str, duration: i64) -> RegisterVideoRequest {
        RegisterVideoRequest {
            title: title.into(),
            description: None,
            course_id: course_id.into(),
            url: "/uploads/abc123.mp4".into(),
            thumbnail: None,
            duration: Some(duration),
            is_preview: None,
        }
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("intro.MP4"), Some("mp4".into()));
        assert_eq!(file_extension("a.b.webm"), Some("webm".into()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[tokio::test]
    async fn test_validate_upload_accepts_video_types() {
        let (ctx, _, _) = setup().await;
        assert_eq!(validate_upload(&ctx, "intro.mp4", 1024).unwrap(), "mp4");
        assert_eq!(validate_upload(&ctx, "clip.WEBM", 1024).unwrap(), "webm");
    }

    #[tokio::test]
    async fn test_validate_upload_rejects_bad_type() {
        let (ctx, _, _) = setup().await;
        let err = validate_upload(&ctx, "malware.exe", 1024).unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Validation);
        let err = validate_upload(&ctx, "noext", 1024).unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_validate_upload_rejects_oversize() {
        let (ctx, _, _) = setup().await;
        let limit = ctx.options.upload.max_file_size;
        assert!(validate_upload(&ctx, "big.mp4", limit).is_ok());
        let err = validate_upload(&ctx, "big.mp4", limit + 1).unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_register_video_recomputes_duration() {
        let (ctx, actor, course) = setup().await;
        let video = handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Intro", 120))
            .await
            .unwrap();
        assert_eq!(video.status, skillforge_core::db::models::VideoStatus::Processing);
        assert_eq!(video.view_count, 0);

        handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Part 2", 240))
            .await
            .unwrap();

        let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
        assert_eq!(course.duration, 360);
    }

    #[tokio::test]
    async fn test_register_requires_author_role() {
        let (ctx, _, course) = setup().await;
        let student = Actor::new("u1", "Sam", Role::Student);
        let err = handle_register_video(ctx, &student, register_request(&course.id, "Nope", 60))
            .await
            .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_register_missing_course() {
        let (ctx, actor, _) = setup().await;
        let err = handle_register_video(ctx, &actor, register_request("ghost", "Intro", 60))
            .await
            .unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stream_lookup_counts_views() {
        let (ctx, actor, course) = setup().await;
        let video = handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Intro", 120))
            .await
            .unwrap();

        handle_stream_lookup(ctx.clone(), &video.id).await.unwrap();
        handle_stream_lookup(ctx.clone(), &video.id).await.unwrap();

        let video: Video = ctx.store.find_by_id(model::VIDEO, &video.id).await.unwrap().unwrap();
        assert_eq!(video.view_count, 2);
        assert!(video.last_viewed_at.is_some());
    }

    #[tokio::test]
    async fn test_stream_lookup_missing_video() {
        let (ctx, _, _) = setup().await;
        let err = handle_stream_lookup(ctx, "ghost").await.unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_video_recomputes_duration() {
        let (ctx, actor, course) = setup().await;
        let keep = handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Keep", 100))
            .await
            .unwrap();
        let gone = handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Gone", 200))
            .await
            .unwrap();

        handle_delete_video(ctx.clone(), &actor, &gone.id).await.unwrap();

        let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
        assert_eq!(course.duration, 100);
        assert!(ctx
            .store
            .find_by_id::<Video>(model::VIDEO, &keep.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_video_authorization() {
        let (ctx, actor, course) = setup().await;
        let video = handle_register_video(ctx.clone(), &actor, register_request(&course.id, "Intro", 60))
            .await
            .unwrap();

        let other = Actor::new("inst2", "Bob", Role::Instructor);
        let err = handle_delete_video(ctx.clone(), &other, &video.id).await.unwrap_err();
        assert_eq!(err.kind, skillforge_core::error::ErrorKind::Forbidden);

        let admin = Actor::new("root", "Root", Role::Admin);
        handle_delete_video(ctx, &admin, &video.id).await.unwrap();
    }
}
