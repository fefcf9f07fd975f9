// Typed domain models for the catalog, ledger, issuer, video store, and
// activity log. Wire format is camelCase JSON; timestamps are UTC.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::id::generate_id;

// ─── Course ──────────────────────────────────────────────────────

/// Course categories offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseCategory {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    Design,
    Business,
    Marketing,
    Other,
}

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for CourseLevel {
    fn default() -> Self {
        Self::Beginner
    }
}

/// A course: the catalog's aggregate root. Holds an ordered list of lesson
/// ids; `duration` is derived from the lesson set and recomputed by the
/// operations that change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub price: f64,
    /// Aggregate duration in minutes, derived from the lesson set.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub level: CourseLevel,
    /// Ids of the lessons belonging to this course.
    #[serde(default)]
    pub lessons: Vec<String>,
    pub created_by: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub learning_outcomes: Vec<String>,
    #[serde(default)]
    pub total_students: i64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: i64,
    #[serde(default)]
    pub certificate_template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: CourseCategory,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: title.into(),
            description: description.into(),
            category,
            thumbnail: String::new(),
            price: 0.0,
            duration: 0,
            level: CourseLevel::default(),
            lessons: Vec::new(),
            created_by: created_by.into(),
            is_published: false,
            is_featured: false,
            tags: Vec::new(),
            requirements: Vec::new(),
            learning_outcomes: Vec::new(),
            total_students: 0,
            average_rating: 0.0,
            total_ratings: 0,
            certificate_template: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of lessons currently referenced by the course.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }
}

// ─── Lesson ──────────────────────────────────────────────────────

/// A single quiz question with one correct option index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: u32,
    #[serde(default)]
    pub explanation: String,
}

/// Optional lesson quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
}

fn default_passing_score() -> u32 {
    70
}

/// Downloadable supporting material attached to a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonMaterial {
    pub title: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
}

/// A lesson within a course. `order` is a strictly positive integer unique
/// within the owning course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub course_id: String,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: i64,
    pub order: i64,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub materials: Vec<LessonMaterial>,
    #[serde(default)]
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        course_id: impl Into<String>,
        video_url: impl Into<String>,
        order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: title.into(),
            description: description.into(),
            course_id: course_id.into(),
            video_url: video_url.into(),
            thumbnail: String::new(),
            duration: 0,
            order,
            is_published: false,
            is_free: false,
            materials: Vec::new(),
            notes: String::new(),
            quiz: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration as `m:ss`.
    pub fn formatted_duration(&self) -> String {
        let minutes = self.duration / 60;
        let seconds = self.duration % 60;
        format!("{}:{:02}", minutes, seconds)
    }
}

// ─── Enrollment ──────────────────────────────────────────────────

/// Lifecycle states of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Cancelled,
    Expired,
}

/// Payment states recorded on an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// A quiz attempt record kept on the enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub lesson_id: String,
    pub score: u32,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    pub last_attempt_date: DateTime<Utc>,
}

fn default_attempts() -> u32 {
    1
}

/// The relationship record tracking one user's participation in one course.
/// At most one active-or-completed enrollment may exist per (user, course)
/// pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub enrollment_date: DateTime<Utc>,
    pub status: EnrollmentStatus,
    /// Percentage of the course's lessons completed, 0..=100.
    #[serde(default)]
    pub progress: i64,
    /// Lesson ids marked completed. No duplicates.
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    pub last_accessed: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
    #[serde(default)]
    pub quiz_scores: Vec<QuizScore>,
    /// Accumulated watch time in seconds. Never decreases while active.
    #[serde(default)]
    pub watch_time: i64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        payment_status: PaymentStatus,
        payment_amount: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            user_id: user_id.into(),
            course_id: course_id.into(),
            enrollment_date: now,
            status: EnrollmentStatus::Active,
            progress: 0,
            completed_lessons: Vec::new(),
            last_accessed: now,
            completion_date: None,
            certificate_id: None,
            quiz_scores: Vec::new(),
            watch_time: 0,
            payment_status,
            payment_amount,
            created_at: now,
            updated_at: now,
        }
    }
}

// ─── Certificate ─────────────────────────────────────────────────

/// Lifecycle states of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Issued,
    Revoked,
    Expired,
}

/// Letter grade recorded on a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    C,
    #[serde(rename = "C-")]
    CMinus,
    D,
    F,
}

impl Default for Grade {
    fn default() -> Self {
        Self::A
    }
}

/// Snapshot of course/student metadata captured at issuance. Later edits to
/// the course must not alter an already-issued certificate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMetadata {
    pub course_title: String,
    pub student_name: String,
    pub instructor_name: String,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    /// Course duration in minutes at issuance.
    pub total_duration: i64,
}

/// A uniquely numbered, time-bounded proof of course completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub certificate_number: String,
    pub issue_date: DateTime<Utc>,
    pub certificate_url: String,
    pub status: CertificateStatus,
    pub completion_date: DateTime<Utc>,
    #[serde(default)]
    pub grade: Grade,
    pub score: u32,
    pub valid_until: DateTime<Utc>,
    #[serde(default)]
    pub metadata: CertificateMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    /// Whether the certificate is currently valid: issued and not yet past
    /// its validity window. False from `valid_until` onward.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status == CertificateStatus::Issued && now < self.valid_until
    }

    /// Validity against the current clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Compute the expiry timestamp for a certificate issued at `issue_date`.
pub fn validity_end(issue_date: DateTime<Utc>, validity_years: i32) -> DateTime<Utc> {
    issue_date
        .with_year(issue_date.year() + validity_years)
        // Feb 29 on a non-leap target year: fall back to Mar 1
        .unwrap_or_else(|| {
            issue_date + chrono::Duration::days(365 * validity_years as i64 + 1)
        })
}

// ─── Video ───────────────────────────────────────────────────────

/// Processing states of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Processing,
    Ready,
    Error,
}

/// An uploaded video: metadata plus a pointer into the file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Storage URL, e.g. "/uploads/<name>".
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Duration in seconds, at least 1 once known.
    #[serde(default)]
    pub duration: i64,
    pub course_id: String,
    pub uploaded_by: String,
    #[serde(default)]
    pub is_preview: bool,
    #[serde(default)]
    pub view_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub status: VideoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        course_id: impl Into<String>,
        uploaded_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            title: title.into(),
            description: String::new(),
            url: url.into(),
            thumbnail: String::new(),
            duration: 0,
            course_id: course_id.into(),
            uploaded_by: uploaded_by.into(),
            is_preview: false,
            view_count: 0,
            last_viewed_at: None,
            status: VideoStatus::Processing,
            processing_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ─── Activity ────────────────────────────────────────────────────

/// Closed enumeration of user lifecycle events the activity log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Enroll,
    Unenroll,
    CompleteLesson,
    CompleteCourse,
    WatchVideo,
    DownloadCertificate,
    CreateCourse,
    UpdateCourse,
    PublishCourse,
    UnpublishCourse,
    DeleteCourse,
    CreateLesson,
    UpdateLesson,
    DeleteLesson,
    UploadVideo,
    DeleteVideo,
    IssueCertificate,
    RevokeCertificate,
}

/// One append-only audit record. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub action: ActivityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
