// Activity log routes — read-side of the append-only audit trail.

use std::sync::Arc;

use skillforge_core::db::adapter::{FindManyQuery, SortBy, WhereClause};
use skillforge_core::db::models::Activity;
use skillforge_core::error::ApiError;

use crate::actor::Actor;
use crate::context::AppContext;
use crate::pagination::{PageParams, PageWindow};
use crate::store::model;

/// Default cap on a user-activity listing.
const DEFAULT_USER_ACTIVITY_LIMIT: i64 = 50;

/// Recent activities for a user, newest first. Users see their own trail;
/// admins may inspect any user's.
pub async fn handle_user_activities(
    ctx: Arc<AppContext>,
    actor: &Actor,
    user_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Activity>, ApiError> {
    if user_id != actor.id && !actor.is_admin() {
        return Err(ApiError::forbidden(
            "Not authorized to view this user's activity",
        ));
    }

    let activities = ctx
        .store
        .find_many(
            model::ACTIVITY,
            FindManyQuery {
                where_clauses: vec![WhereClause::eq("userId", user_id)],
                sort_by: Some(SortBy::desc("createdAt")),
                limit: Some(limit.unwrap_or(DEFAULT_USER_ACTIVITY_LIMIT).clamp(1, 200)),
                ..Default::default()
            },
        )
        .await?;
    Ok(activities)
}

/// Recent activities across all users, paginated. Admin only.
pub async fn handle_recent_activities(
    ctx: Arc<AppContext>,
    actor: &Actor,
    page: PageParams,
) -> Result<Vec<Activity>, ApiError> {
    if !actor.is_admin() {
        return Err(ApiError::forbidden("Not authorized to view the activity log"));
    }

    let window = PageWindow::resolve(&page, &ctx.options.pagination);
    let activities = ctx
        .store
        .find_many(
            model::ACTIVITY,
            FindManyQuery {
                where_clauses: Vec::new(),
                sort_by: Some(SortBy::desc("createdAt")),
                limit: Some(window.limit),
                offset: Some(window.offset),
            },
        )
        .await?;
    Ok(activities)
}
