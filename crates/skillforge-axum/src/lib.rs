// skillforge-axum — Axum integration for SkillForge.
//
// Builds the HTTP router over the framework-agnostic handlers in the
// `skillforge` crate: JSON envelopes, the Actor extension contract with the
// host's auth middleware, multipart video upload, and byte-range file
// streaming for video delivery.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, request::Parts, HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tower_http::cors::{Any, CorsLayer};

use skillforge::actor::{Actor, Role};
use skillforge::context::AppContext;
use skillforge::pagination::PageParams;
use skillforge::range::RangePlan;
use skillforge::routes;
use skillforge_core::db::adapter::Adapter;
use skillforge_core::db::models::EnrollmentStatus;
use skillforge_core::error::ApiError;
use skillforge_core::options::SkillForgeOptions;

// ─── Error / Envelope Mapping ────────────────────────────────────

/// Newtype so `ApiError` can flow out of handlers as an HTTP response.
pub struct AppError(pub ApiError);

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_json())).into_response()
    }
}

/// `{success: true, data}` envelope.
fn envelope<T: serde::Serialize>(data: &T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "data": data,
    }))
}

/// `{success: true, count, data}` envelope for plain lists.
fn list_envelope<T: serde::Serialize>(data: &[T]) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "count": data.len(),
        "data": data,
    }))
}

/// Merge a response struct's fields into the success envelope at the top
/// level (used for list responses that carry their own count/pagination).
fn merged_envelope<T: serde::Serialize>(resp: &T) -> Json<serde_json::Value> {
    let mut value = serde_json::to_value(resp).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("success".to_string(), serde_json::json!(true));
    }
    Json(value)
}

// ─── Actor Extraction ────────────────────────────────────────────

/// Extracts the Actor the host's auth middleware placed in the request
/// extensions; rejects with 401 when none is present.
pub struct RequireActor(pub Actor);

impl<S> axum::extract::FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(RequireActor)
            .ok_or_else(|| AppError(ApiError::forbidden("Not authenticated")))
    }
}

/// Like [`RequireActor`] but optional, for routes that personalize when a
/// session is present and still work anonymously.
pub struct MaybeActor(pub Option<Actor>);

impl<S> axum::extract::FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(parts.extensions.get::<Actor>().cloned()))
    }
}

/// Trusted-header actor middleware for deployments where an auth proxy in
/// front of the service asserts the caller's identity. Reads `x-user-id`,
/// `x-user-name`, and `x-user-role` and inserts the Actor extension.
pub async fn actor_from_headers(mut req: Request<Body>, next: Next) -> Response {
    fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    if let Some(id) = header_str(req.headers(), "x-user-id") {
        let name = header_str(req.headers(), "x-user-name")
            .unwrap_or("")
            .to_string();
        let role = match header_str(req.headers(), "x-user-role") {
            Some("admin") => Role::Admin,
            Some("instructor") => Role::Instructor,
            _ => Role::Student,
        };
        let actor = Actor::new(id.to_string(), name, role);
        req.extensions_mut().insert(actor);
    }

    next.run(req).await
}

// ─── Builder ─────────────────────────────────────────────────────

/// The main entry point for serving SkillForge over axum.
///
/// ```rust,ignore
/// use skillforge_axum::SkillForge;
/// use skillforge_core::options::SkillForgeOptions;
///
/// let app = SkillForge::new(SkillForgeOptions::new(), adapter).router();
/// axum::serve(listener, app).await?;
/// ```
pub struct SkillForge {
    ctx: Arc<AppContext>,
}

impl SkillForge {
    /// Create a new instance from options and a storage adapter.
    pub fn new(options: SkillForgeOptions, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            ctx: AppContext::new(options, adapter),
        }
    }

    /// Create from an existing `AppContext`.
    pub fn from_context(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Get a reference to the application context.
    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Build the router: API routes nested under the configured base path
    /// (default `/api`) plus a root-level `/health`.
    pub fn router(&self) -> Router {
        let base_path = self.ctx.options.base_path.clone();
        Router::new()
            .route("/health", get(handle_health))
            .nest(&base_path, self.api_routes())
    }

    /// [`Self::router`] with a permissive CORS layer. For production,
    /// configure CORS to the frontend origin instead.
    pub fn router_with_cors(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        self.router().layer(cors)
    }

    fn api_routes(&self) -> Router {
        // Uploads carry whole video files; everything else stays on the
        // default body limit.
        let upload_limit = self.ctx.options.upload.max_file_size as usize + 1024 * 1024;
        let upload_routes = Router::new()
            .route("/videos/upload", post(handle_upload_video))
            .layer(DefaultBodyLimit::max(upload_limit));

        Router::new()
            // Courses
            .route("/courses", get(handle_list_courses).post(handle_create_course))
            .route("/courses/featured", get(handle_featured_courses))
            .route("/courses/instructor/{instructorId}", get(handle_courses_by_instructor))
            .route(
                "/courses/{id}",
                get(handle_get_course)
                    .put(handle_update_course)
                    .delete(handle_delete_course),
            )
            .route("/courses/{id}/stats", get(handle_course_stats))
            // Lessons
            .route("/lessons", post(handle_create_lesson))
            .route(
                "/lessons/{id}",
                put(handle_update_lesson).delete(handle_delete_lesson),
            )
            .route("/lessons/course/{courseId}", get(handle_lessons_by_course))
            // Enrollments
            .route(
                "/enrollments",
                get(handle_list_enrollments).post(handle_enroll),
            )
            .route("/enrollments/stats", get(handle_enrollment_stats))
            .route("/enrollments/course/{courseId}", get(handle_course_enrollments))
            .route("/enrollments/{id}", get(handle_get_enrollment))
            .route("/enrollments/{id}/progress", put(handle_update_progress))
            .route("/enrollments/{id}/cancel", put(handle_cancel_enrollment))
            // Certificates
            .route(
                "/certificates",
                get(handle_list_certificates).post(handle_issue_certificate),
            )
            .route("/certificates/stats", get(handle_certificate_stats))
            .route("/certificates/verify/{certificateNumber}", get(handle_verify_certificate))
            .route("/certificates/{id}", get(handle_get_certificate))
            .route("/certificates/{id}/download", get(handle_download_certificate))
            .route("/certificates/{id}/revoke", put(handle_revoke_certificate))
            // Videos
            .route("/videos/stream/{id}", get(handle_stream_video))
            .route("/videos/{id}", get(handle_get_video).delete(handle_delete_video))
            .merge(upload_routes)
            // Activities
            .route("/activities", get(handle_own_activities))
            .route("/activities/recent", get(handle_recent_activities))
            .route("/activities/user/{userId}", get(handle_user_activities))
            .with_state(self.ctx.clone())
    }
}

// ─── Health ──────────────────────────────────────────────────────

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ─── Course Handlers ─────────────────────────────────────────────

async fn handle_list_courses(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<routes::courses::ListCoursesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_list_courses(ctx, query).await?;
    Ok(merged_envelope(&result))
}

async fn handle_featured_courses(
    State(ctx): State<Arc<AppContext>>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_featured_courses(ctx).await?;
    Ok(list_envelope(&result))
}

async fn handle_courses_by_instructor(
    State(ctx): State<Arc<AppContext>>,
    Path(instructor_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_courses_by_instructor(ctx, &instructor_id).await?;
    Ok(list_envelope(&result))
}

async fn handle_get_course(
    State(ctx): State<Arc<AppContext>>,
    MaybeActor(actor): MaybeActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_get_course(ctx, actor.as_ref(), &id).await?;
    Ok(envelope(&result))
}

async fn handle_create_course(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Json(body): Json<routes::courses::CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_create_course(ctx, &actor, body).await?;
    Ok((StatusCode::CREATED, envelope(&result)))
}

async fn handle_update_course(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
    Json(body): Json<routes::courses::UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_update_course(ctx, &actor, &id, body).await?;
    Ok(envelope(&result))
}

async fn handle_delete_course(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    routes::courses::handle_delete_course(ctx, &actor, &id).await?;
    Ok(envelope(&serde_json::json!({})))
}

async fn handle_course_stats(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::courses::handle_course_stats(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

// ─── Lesson Handlers ─────────────────────────────────────────────

async fn handle_create_lesson(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Json(body): Json<routes::lessons::CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::lessons::handle_create_lesson(ctx, &actor, body).await?;
    Ok((StatusCode::CREATED, envelope(&result)))
}

async fn handle_update_lesson(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
    Json(body): Json<routes::lessons::UpdateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::lessons::handle_update_lesson(ctx, &actor, &id, body).await?;
    Ok(envelope(&result))
}

async fn handle_delete_lesson(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    routes::lessons::handle_delete_lesson(ctx, &actor, &id).await?;
    Ok(envelope(&serde_json::json!({})))
}

async fn handle_lessons_by_course(
    State(ctx): State<Arc<AppContext>>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::lessons::handle_lessons_by_course(ctx, &course_id).await?;
    Ok(list_envelope(&result))
}

// ─── Enrollment Handlers ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusFilter {
    status: Option<EnrollmentStatus>,
}

async fn handle_enroll(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Json(body): Json<routes::enrollments::EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::enrollments::handle_enroll(ctx, &actor, body).await?;
    Ok((StatusCode::CREATED, envelope(&result)))
}

async fn handle_list_enrollments(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        routes::enrollments::handle_list_user_enrollments(ctx, &actor, filter.status).await?;
    Ok(list_envelope(&result))
}

async fn handle_get_enrollment(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::enrollments::handle_get_enrollment(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

async fn handle_update_progress(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
    Json(body): Json<routes::enrollments::UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::enrollments::handle_update_progress(ctx, &actor, &id, body).await?;
    Ok(envelope(&result))
}

async fn handle_cancel_enrollment(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::enrollments::handle_cancel(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

async fn handle_course_enrollments(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(course_id): Path<String>,
    Query(filter): Query<StatusFilter>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        routes::enrollments::handle_course_enrollments(ctx, &actor, &course_id, filter.status)
            .await?;
    Ok(list_envelope(&result))
}

async fn handle_enrollment_stats(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::enrollments::handle_enrollment_stats(ctx, &actor).await?;
    Ok(envelope(&result))
}

// ─── Certificate Handlers ────────────────────────────────────────

async fn handle_issue_certificate(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Json(body): Json<routes::certificates::IssueCertificateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_issue_certificate(ctx, &actor, body).await?;
    Ok((StatusCode::CREATED, envelope(&result)))
}

async fn handle_list_certificates(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_list_user_certificates(ctx, &actor).await?;
    Ok(list_envelope(&result))
}

async fn handle_get_certificate(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_get_certificate(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

async fn handle_verify_certificate(
    State(ctx): State<Arc<AppContext>>,
    Path(certificate_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_verify_certificate(ctx, &certificate_number).await?;
    Ok(envelope(&result))
}

async fn handle_download_certificate(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_download_certificate(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

async fn handle_revoke_certificate(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_revoke_certificate(ctx, &actor, &id).await?;
    Ok(envelope(&result))
}

async fn handle_certificate_stats(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::certificates::handle_certificate_stats(ctx, &actor).await?;
    Ok(envelope(&result))
}

// ─── Video Handlers ──────────────────────────────────────────────

/// Map a stored file extension to a response content type.
fn content_type_for(url: &str) -> &'static str {
    match url.rsplit('.').next() {
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "video/mp4",
    }
}

/// Resolve the on-disk path for a stored video URL ("/uploads/<name>").
fn upload_path(ctx: &AppContext, url: &str) -> Option<PathBuf> {
    let file_name = url.rsplit('/').next()?;
    // Server-generated names only; nothing traversable
    if file_name.is_empty() || file_name.contains("..") {
        return None;
    }
    Some(PathBuf::from(&ctx.options.upload.dir).join(file_name))
}

async fn handle_upload_video(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut title = String::new();
    let mut description = None;
    let mut course_id = String::new();
    let mut duration = None;
    let mut is_preview = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("video") => {
                let file_name = field.file_name().unwrap_or("video").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
                file_data = Some((file_name, bytes.to_vec()));
            }
            Some("title") => {
                title = field.text().await.unwrap_or_default();
            }
            Some("description") => {
                description = Some(field.text().await.unwrap_or_default());
            }
            Some("courseId") => {
                course_id = field.text().await.unwrap_or_default();
            }
            Some("duration") => {
                duration = field.text().await.ok().and_then(|s| s.parse::<i64>().ok());
            }
            Some("isPreview") => {
                is_preview = field.text().await.ok().and_then(|s| s.parse::<bool>().ok());
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file_data.ok_or_else(|| ApiError::validation("Please upload a video file"))?;

    let ext = routes::videos::validate_upload(&ctx, &file_name, bytes.len() as u64)?;

    // Server-generated name: collision-free by construction
    let stored_name = format!("{}.{ext}", uuid::Uuid::new_v4());
    let dir = PathBuf::from(&ctx.options.upload.dir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::unexpected(format!("Failed to prepare upload dir: {e}")))?;
    tokio::fs::write(dir.join(&stored_name), &bytes)
        .await
        .map_err(|e| ApiError::unexpected(format!("Failed to store upload: {e}")))?;

    let result = routes::videos::handle_register_video(
        ctx,
        &actor,
        routes::videos::RegisterVideoRequest {
            title,
            description,
            course_id,
            url: format!("/uploads/{stored_name}"),
            thumbnail: None,
            duration,
            is_preview,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, envelope(&result)))
}

async fn handle_get_video(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::videos::handle_get_video(ctx, &id).await?;
    Ok(envelope(&result))
}

async fn handle_delete_video(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let video = routes::videos::handle_delete_video(ctx.clone(), &actor, &id).await?;

    // Best-effort file removal; the record is already gone
    if let Some(path) = upload_path(&ctx, &video.url) {
        let _ = tokio::fs::remove_file(path).await;
    }

    Ok(envelope(&serde_json::json!({ "message": "Video deleted" })))
}

/// Stream a video, honoring a `bytes=<start>-<end>?` Range header.
///
/// The response body reads through a file handle scoped to the requested
/// window; dropping the body (client disconnect included) drops the handle.
async fn handle_stream_video(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let video = routes::videos::handle_stream_lookup(ctx.clone(), &id).await?;

    let path = upload_path(&ctx, &video.url)
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    let meta = tokio::fs::metadata(&path)
        .await
        .map_err(|_| ApiError::not_found("Video not found"))?;
    let file_size = meta.len();

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let plan = RangePlan::from_header(range_header, file_size);

    let mut file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::not_found("Video not found"))?;
    if plan.start() > 0 {
        file.seek(std::io::SeekFrom::Start(plan.start()))
            .await
            .map_err(|e| ApiError::unexpected(format!("Failed to seek video file: {e}")))?;
    }
    let reader = file.take(plan.len());

    let mut builder = Response::builder()
        .status(plan.status())
        .header(header::CONTENT_TYPE, content_type_for(&video.url))
        .header(header::CONTENT_LENGTH, plan.len())
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(content_range) = plan.content_range() {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError(ApiError::unexpected(format!("Failed to build response: {e}"))))
}

// ─── Activity Handlers ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

async fn handle_own_activities(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = actor.id.clone();
    let result =
        routes::activities::handle_user_activities(ctx, &actor, &user_id, query.limit).await?;
    Ok(list_envelope(&result))
}

async fn handle_user_activities(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Path(user_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let result =
        routes::activities::handle_user_activities(ctx, &actor, &user_id, query.limit).await?;
    Ok(list_envelope(&result))
}

async fn handle_recent_activities(
    State(ctx): State<Arc<AppContext>>,
    RequireActor(actor): RequireActor,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let result = routes::activities::handle_recent_activities(ctx, &actor, page).await?;
    Ok(list_envelope(&result))
}

// ─── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use skillforge_memory::MemoryAdapter;

    #[test]
    fn test_router_creation() {
        let forge = SkillForge::new(SkillForgeOptions::new(), Arc::new(MemoryAdapter::new()));
        let _router = forge.router();
        let _router = forge.router_with_cors();
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("/uploads/a.mp4"), "video/mp4");
        assert_eq!(content_type_for("/uploads/a.webm"), "video/webm");
        assert_eq!(content_type_for("/uploads/a.mov"), "video/quicktime");
        assert_eq!(content_type_for("/uploads/a"), "video/mp4");
    }

    #[test]
    fn test_upload_path_rejects_traversal() {
        let ctx = AppContext::new(SkillForgeOptions::new(), Arc::new(MemoryAdapter::new()));
        assert!(upload_path(&ctx, "/uploads/ok.mp4").is_some());
        assert!(upload_path(&ctx, "/uploads/..").is_none());
        assert!(upload_path(&ctx, "/uploads/").is_none());
        assert!(upload_path(&ctx, "").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = AppError(ApiError::not_found("Course not found"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_merged_envelope_inserts_success() {
        #[derive(serde::Serialize)]
        struct Resp {
            count: usize,
        }
        let Json(value) = merged_envelope(&Resp { count: 3 });
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 3);
    }
}
