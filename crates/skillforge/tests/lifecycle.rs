// End-to-end lifecycle tests over the in-memory adapter: author a course,
// enroll, work through the lessons, earn a certificate, verify and revoke
// it, and check the audit trail left behind.

use std::sync::Arc;

use skillforge::actor::{Actor, Role};
use skillforge::context::AppContext;
use skillforge::routes::{certificates, courses, enrollments, lessons};
use skillforge::store::model;
use skillforge_core::db::adapter::FindManyQuery;
use skillforge_core::db::models::{Course, CourseCategory, EnrollmentStatus};
use skillforge_core::error::ErrorKind;
use skillforge_core::options::SkillForgeOptions;
use skillforge_memory::MemoryAdapter;

fn instructor() -> Actor {
    Actor::new("inst1", "Prof. Rust", Role::Instructor)
}

fn student() -> Actor {
    Actor::new("u1", "Ida Learner", Role::Student)
}

fn admin() -> Actor {
    Actor::new("root", "Root", Role::Admin)
}

async fn new_ctx() -> Arc<AppContext> {
    let ctx = AppContext::new(SkillForgeOptions::new(), Arc::new(MemoryAdapter::new()));
    for (id, name) in [("inst1", "Prof. Rust"), ("u1", "Ida Learner")] {
        ctx.store
            .adapter()
            .create(model::USER, serde_json::json!({"id": id, "name": name}))
            .await
            .unwrap();
    }
    ctx
}

async fn authored_course(ctx: &Arc<AppContext>, lesson_count: usize) -> Course {
    let course = courses::handle_create_course(
        ctx.clone(),
        &instructor(),
        courses::CreateCourseRequest {
            title: "Rust in Practice".into(),
            description: "From ownership to async, end to end".into(),
            category: CourseCategory::WebDevelopment,
            thumbnail: None,
            price: None,
            level: None,
            tags: None,
            requirements: None,
            learning_outcomes: None,
            is_published: Some(true),
            is_featured: None,
            certificate_template: None,
        },
    )
    .await
    .unwrap();

    for i in 1..=lesson_count {
        lessons::handle_create_lesson(
            ctx.clone(),
            &instructor(),
            lessons::CreateLessonRequest {
                title: format!("Lesson {i}"),
                description: "Hands-on material".into(),
                course_id: course.id.clone(),
                video_url: format!("/uploads/lesson-{i}.mp4"),
                duration: Some(600),
                order: i as i64,
                is_published: Some(true),
                is_free: None,
                notes: None,
                quiz: None,
                tags: None,
            },
        )
        .await
        .unwrap();
    }

    ctx.store
        .find_by_id(model::COURSE, &course.id)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn full_completion_and_certificate_lifecycle() {
    let ctx = new_ctx().await;
    let course = authored_course(&ctx, 3).await;
    assert_eq!(course.duration, 1800);

    let student = student();
    let enrollment = enrollments::handle_enroll(
        ctx.clone(),
        &student,
        enrollments::EnrollRequest {
            course_id: course.id.clone(),
        },
    )
    .await
    .unwrap();

    // Work through the lessons; progress tracks the rounded ratio
    let mut last = enrollment.clone();
    for (i, lesson_id) in course.lessons.iter().enumerate() {
        last = enrollments::handle_update_progress(
            ctx.clone(),
            &student,
            &enrollment.id,
            enrollments::UpdateProgressRequest {
                lesson_id: lesson_id.clone(),
                completed: true,
                watch_time: Some(500),
                quiz_score: None,
            },
        )
        .await
        .unwrap();
        let expected = (((i + 1) as f64 / 3.0) * 100.0).round() as i64;
        assert_eq!(last.progress, expected);
    }

    assert_eq!(last.status, EnrollmentStatus::Completed);
    assert_eq!(last.watch_time, 1500);
    assert!(last.completion_date.is_some());

    // Completion unlocks issuance
    let cert = certificates::handle_issue_certificate(
        ctx.clone(),
        &student,
        certificates::IssueCertificateRequest {
            enrollment_id: enrollment.id.clone(),
            grade: None,
            score: 95,
        },
    )
    .await
    .unwrap();
    assert_eq!(cert.metadata.total_lessons, 3);
    assert_eq!(cert.metadata.student_name, "Ida Learner");
    assert_eq!(cert.metadata.instructor_name, "Prof. Rust");

    let verified = certificates::handle_verify_certificate(ctx.clone(), &cert.certificate_number)
        .await
        .unwrap();
    assert!(verified.is_valid);

    // Revocation takes effect immediately and hides the number from verify
    certificates::handle_revoke_certificate(ctx.clone(), &admin(), &cert.id)
        .await
        .unwrap();
    let err = certificates::handle_verify_certificate(ctx.clone(), &cert.certificate_number)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // The trail covers the whole journey
    let activities = ctx
        .store
        .adapter()
        .find_many(model::ACTIVITY, FindManyQuery::default())
        .await
        .unwrap();
    let actions: Vec<&str> = activities
        .iter()
        .filter_map(|a| a["action"].as_str())
        .collect();
    for expected in [
        "create_course",
        "create_lesson",
        "enroll",
        "complete_lesson",
        "complete_course",
        "issue_certificate",
        "revoke_certificate",
    ] {
        assert!(actions.contains(&expected), "missing action {expected}");
    }
}

#[tokio::test]
async fn duration_invariant_follows_lesson_edits() {
    let ctx = new_ctx().await;
    let course = authored_course(&ctx, 2).await;
    assert_eq!(course.duration, 1200);

    // Edit a lesson's duration
    let lesson_id = course.lessons[0].clone();
    lessons::handle_update_lesson(
        ctx.clone(),
        &instructor(),
        &lesson_id,
        lessons::UpdateLessonRequest {
            duration: Some(60),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
    assert_eq!(course.duration, 660);

    // Remove it entirely
    lessons::handle_delete_lesson(ctx.clone(), &instructor(), &lesson_id)
        .await
        .unwrap();
    let course: Course = ctx.store.find_by_id(model::COURSE, &course.id).await.unwrap().unwrap();
    assert_eq!(course.duration, 600);
    assert_eq!(course.lesson_count(), 1);
}

#[tokio::test]
async fn progress_tracks_lesson_count_at_read_time() {
    let ctx = new_ctx().await;
    let course = authored_course(&ctx, 2).await;
    let student = student();

    let enrollment = enrollments::handle_enroll(
        ctx.clone(),
        &student,
        enrollments::EnrollRequest {
            course_id: course.id.clone(),
        },
    )
    .await
    .unwrap();

    let e = enrollments::handle_update_progress(
        ctx.clone(),
        &student,
        &enrollment.id,
        enrollments::UpdateProgressRequest {
            lesson_id: course.lessons[0].clone(),
            completed: true,
            watch_time: None,
            quiz_score: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(e.progress, 50);

    // A third lesson appears; the next update reads the new count
    lessons::handle_create_lesson(
        ctx.clone(),
        &instructor(),
        lessons::CreateLessonRequest {
            title: "Lesson 3".into(),
            description: "Late addition".into(),
            course_id: course.id.clone(),
            video_url: "/uploads/lesson-3.mp4".into(),
            duration: Some(600),
            order: 3,
            is_published: Some(true),
            is_free: None,
            notes: None,
            quiz: None,
            tags: None,
        },
    )
    .await
    .unwrap();

    let e = enrollments::handle_update_progress(
        ctx.clone(),
        &student,
        &enrollment.id,
        enrollments::UpdateProgressRequest {
            lesson_id: course.lessons[1].clone(),
            completed: true,
            watch_time: None,
            quiz_score: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(e.progress, 67);
    assert_eq!(e.status, EnrollmentStatus::Active);
}
