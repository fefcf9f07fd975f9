// Certificate issuer routes — issuance, public verification, revocation,
// and download authorization.
//
// Certificate numbers are `<prefix>-<issue millis>-<zero-padded sequence>`.
// The sequence component comes from the storage adapter's atomic counter,
// so concurrent issuers can never mint the same number and the sequence is
// monotonically non-decreasing for auditability. The metadata snapshot is
// captured at issuance; later course edits never touch issued certificates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skillforge_core::db::adapter::{FindManyQuery, SortBy, WhereClause};
use skillforge_core::db::models::{
    validity_end, ActivityAction, Certificate, CertificateMetadata, CertificateStatus, Course,
    Enrollment, EnrollmentStatus, Grade,
};
use skillforge_core::error::ApiError;
use skillforge_core::utils::id::generate_id;

use crate::activity::{self, ActivityRefs};
use crate::actor::Actor;
use crate::context::AppContext;
use crate::store::model;

/// Name of the issuance counter in the adapter's sequence store.
const CERTIFICATE_SEQUENCE: &str = "certificate";

/// Width of the zero-padded sequence suffix. Keeps lexicographic and
/// numeric ordering aligned up to 10^6 issuances.
const SEQUENCE_WIDTH: usize = 6;

/// Format a certificate number from its parts.
pub fn format_certificate_number(prefix: &str, issued_at: DateTime<Utc>, sequence: i64) -> String {
    format!(
        "{prefix}-{}-{sequence:0width$}",
        issued_at.timestamp_millis(),
        width = SEQUENCE_WIDTH
    )
}

// ─── Issue ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    pub enrollment_id: String,
    #[serde(default)]
    pub grade: Option<Grade>,
    /// Final score, 0..=100.
    pub score: u32,
}

/// Issue a certificate for a completed enrollment. At most one per
/// enrollment, ever.
pub async fn handle_issue_certificate(
    ctx: Arc<AppContext>,
    actor: &Actor,
    body: IssueCertificateRequest,
) -> Result<Certificate, ApiError> {
    if body.score > 100 {
        return Err(ApiError::validation("Score must be between 0 and 100"));
    }

    let enrollment: Enrollment = ctx
        .store
        .find_by_id(model::ENROLLMENT, &body.enrollment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enrollment not found"))?;

    if enrollment.user_id != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to issue a certificate for this enrollment",
        ));
    }
    if enrollment.status != EnrollmentStatus::Completed {
        return Err(ApiError::invalid_state("Course is not completed"));
    }
    if enrollment.certificate_id.is_some() {
        return Err(ApiError::conflict(
            "Certificate already issued for this enrollment",
        ));
    }

    let course: Course = ctx
        .store
        .find_by_id(model::COURSE, &enrollment.course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let student_name = ctx
        .store
        .user_name(&enrollment.user_id)
        .await?
        .unwrap_or_else(|| actor.name.clone());
    let instructor_name = ctx
        .store
        .user_name(&course.created_by)
        .await?
        .unwrap_or_default();

    let now = Utc::now();
    let sequence = ctx.store.next_sequence(CERTIFICATE_SEQUENCE).await?;
    let number = format_certificate_number(
        &ctx.options.certificate.number_prefix,
        now,
        sequence,
    );

    let certificate = Certificate {
        id: generate_id(),
        user_id: enrollment.user_id.clone(),
        course_id: enrollment.course_id.clone(),
        certificate_number: number.clone(),
        issue_date: now,
        certificate_url: format!("/certificates/{number}.pdf"),
        status: CertificateStatus::Issued,
        completion_date: enrollment.completion_date.unwrap_or(now),
        grade: body.grade.unwrap_or_default(),
        score: body.score,
        valid_until: validity_end(now, ctx.options.certificate.validity_years),
        metadata: CertificateMetadata {
            course_title: course.title.clone(),
            student_name,
            instructor_name,
            total_lessons: course.lesson_count() as i64,
            completed_lessons: enrollment.completed_lessons.len() as i64,
            total_duration: course.duration,
        },
        created_at: now,
        updated_at: now,
    };

    let certificate = ctx.store.insert(model::CERTIFICATE, &certificate).await?;

    ctx.store
        .update_by_id::<Enrollment>(
            model::ENROLLMENT,
            &body.enrollment_id,
            serde_json::json!({ "certificateId": certificate.id }),
        )
        .await?;

    activity::record(
        &ctx,
        actor,
        ActivityAction::IssueCertificate,
        ActivityRefs::course(&enrollment.course_id),
        serde_json::json!({ "certificateNumber": certificate.certificate_number }),
    )
    .await;

    Ok(certificate)
}

// ─── Verify ──────────────────────────────────────────────────────

/// Public verification payload. Deliberately projects names and titles
/// only — no internal ids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateResponse {
    pub certificate_number: String,
    pub student_name: String,
    pub course_title: String,
    pub issue_date: DateTime<Utc>,
    pub status: CertificateStatus,
    pub is_valid: bool,
}

/// Verify a certificate by number. Public, unauthenticated.
///
/// Only issued certificates resolve; a revoked or unknown number reads as
/// not found. The validity flag still reflects time-based expiry.
pub async fn handle_verify_certificate(
    ctx: Arc<AppContext>,
    certificate_number: &str,
) -> Result<VerifyCertificateResponse, ApiError> {
    let certificate: Certificate = ctx
        .store
        .find_one(
            model::CERTIFICATE,
            &[
                WhereClause::eq("certificateNumber", certificate_number),
                WhereClause::eq("status", "issued"),
            ],
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found or invalid"))?;

    Ok(VerifyCertificateResponse {
        certificate_number: certificate.certificate_number.clone(),
        student_name: certificate.metadata.student_name.clone(),
        course_title: certificate.metadata.course_title.clone(),
        issue_date: certificate.issue_date,
        status: certificate.status,
        is_valid: certificate.is_valid(),
    })
}

// ─── Revoke ──────────────────────────────────────────────────────

/// Revoke a certificate. Admin only; the transition is one-way.
pub async fn handle_revoke_certificate(
    ctx: Arc<AppContext>,
    actor: &Actor,
    certificate_id: &str,
) -> Result<Certificate, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden("Not authorized to revoke certificates"));
    }

    let certificate: Certificate = ctx
        .store
        .find_by_id(model::CERTIFICATE, certificate_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))?;

    let certificate = ctx
        .store
        .update_by_id::<Certificate>(
            model::CERTIFICATE,
            certificate_id,
            serde_json::json!({ "status": "revoked", "updatedAt": Utc::now() }),
        )
        .await?
        .unwrap_or(certificate);

    activity::record(
        &ctx,
        actor,
        ActivityAction::RevokeCertificate,
        ActivityRefs::course(&certificate.course_id),
        serde_json::json!({ "certificateNumber": certificate.certificate_number }),
    )
    .await;

    Ok(certificate)
}

// ─── Download ────────────────────────────────────────────────────

/// Artifact reference handed to the web layer for retrieval.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDownload {
    pub certificate_url: String,
    pub file_name: String,
    pub content_type: &'static str,
}

/// Authorize a certificate download. Owner or admin, and the certificate
/// must currently be valid.
pub async fn handle_download_certificate(
    ctx: Arc<AppContext>,
    actor: &Actor,
    certificate_id: &str,
) -> Result<CertificateDownload, ApiError> {
    let certificate: Certificate = ctx
        .store
        .find_by_id(model::CERTIFICATE, certificate_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))?;

    if certificate.user_id != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to download this certificate",
        ));
    }
    if !certificate.is_valid() {
        return Err(ApiError::invalid_state(
            "Certificate has expired or been revoked",
        ));
    }

    activity::record(
        &ctx,
        actor,
        ActivityAction::DownloadCertificate,
        ActivityRefs::course(&certificate.course_id),
        serde_json::json!({ "certificateNumber": certificate.certificate_number }),
    )
    .await;

    Ok(CertificateDownload {
        certificate_url: certificate.certificate_url.clone(),
        file_name: format!("certificate-{}.pdf", certificate.certificate_number),
        content_type: "application/pdf",
    })
}

// ─── Reads / Stats ───────────────────────────────────────────────

/// The acting user's issued certificates, newest first.
pub async fn handle_list_user_certificates(
    ctx: Arc<AppContext>,
    actor: &Actor,
) -> Result<Vec<Certificate>, ApiError> {
    let certificates = ctx
        .store
        .find_many(
            model::CERTIFICATE,
            FindManyQuery {
                where_clauses: vec![
                    WhereClause::eq("userId", actor.id.as_str()),
                    WhereClause::eq("status", "issued"),
                ],
                sort_by: Some(SortBy::desc("issueDate")),
                ..Default::default()
            },
        )
        .await?;
    Ok(certificates)
}

/// Fetch a single certificate. Owner or admin only.
pub async fn handle_get_certificate(
    ctx: Arc<AppContext>,
    actor: &Actor,
    certificate_id: &str,
) -> Result<Certificate, ApiError> {
    let certificate: Certificate = ctx
        .store
        .find_by_id(model::CERTIFICATE, certificate_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Certificate not found"))?;

    if certificate.user_id != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to view this certificate",
        ));
    }

    Ok(certificate)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatsResponse {
    pub total_certificates: i64,
    pub issued_certificates: i64,
    pub revoked_certificates: i64,
}

/// Certificate statistics. Admin only.
pub async fn handle_certificate_stats(
    ctx: Arc<AppContext>,
    actor: &Actor,
) -> Result<CertificateStatsResponse, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to view certificate statistics",
        ));
    }

    let total = ctx.store.count(model::CERTIFICATE, &[]).await?;
    let issued = ctx
        .store
        .count(model::CERTIFICATE, &[WhereClause::eq("status", "issued")])
        .await?;
    let revoked = ctx
        .store
        .count(model::CERTIFICATE, &[WhereClause::eq("status", "revoked")])
        .await?;

    Ok(CertificateStatsResponse {
        total_certificates: total,
        issued_certificates: issued,
        revoked_certificates: revoked,
    })
}
