// Activity recorder — append-only audit trail of user lifecycle events.
//
// Recording is fire-and-forget: a failed write is logged and swallowed so
// it can never fail the operation that triggered it. The acting user is a
// mandatory, explicit parameter; attribution is never inferred from the
// entity being written.

use chrono::Utc;

use skillforge_core::db::models::{Activity, ActivityAction};
use skillforge_core::utils::id::generate_id;

use crate::actor::Actor;
use crate::context::AppContext;
use crate::store::model;

/// Optional entity references attached to an activity record.
#[derive(Debug, Clone, Default)]
pub struct ActivityRefs {
    pub course_id: Option<String>,
    pub lesson_id: Option<String>,
    pub video_id: Option<String>,
}

impl ActivityRefs {
    pub fn course(course_id: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id.into()),
            ..Default::default()
        }
    }

    pub fn lesson(course_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id.into()),
            lesson_id: Some(lesson_id.into()),
            ..Default::default()
        }
    }

    pub fn video(course_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            course_id: Some(course_id.into()),
            video_id: Some(video_id.into()),
            ..Default::default()
        }
    }
}

/// Append an activity record for the acting user.
///
/// Never returns an error: storage failures are logged at warn and dropped.
pub async fn record(
    ctx: &AppContext,
    actor: &Actor,
    action: ActivityAction,
    refs: ActivityRefs,
    metadata: serde_json::Value,
) {
    let activity = Activity {
        id: generate_id(),
        user_id: actor.id.clone(),
        action,
        course_id: refs.course_id,
        lesson_id: refs.lesson_id,
        video_id: refs.video_id,
        metadata,
        created_at: Utc::now(),
    };

    let value = match serde_json::to_value(&activity) {
        Ok(v) => v,
        Err(e) => {
            ctx.logger
                .warn(&format!("Failed to serialize activity record: {e}"));
            return;
        }
    };

    if let Err(e) = ctx.store.adapter().create(model::ACTIVITY, value).await {
        ctx.logger
            .warn(&format!("Failed to write activity record: {e}"));
    }
}
