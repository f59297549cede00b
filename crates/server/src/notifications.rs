//! In-app notification inbox.

use api_types::notification::{
    MarkedRead, NotificationList, NotificationListResponse, NotificationView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Actor;

use crate::{ServerError, server::ServerState, views::notification_view};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<NotificationList>,
) -> Result<Json<NotificationListResponse>, ServerError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let notifications = state
        .engine
        .notifications(&actor, query.unread_only.unwrap_or(false), limit)
        .await?;
    let unread = state.engine.unread_count(&actor).await?;

    Ok(Json(NotificationListResponse {
        notifications: notifications.into_iter().map(notification_view).collect(),
        unread,
    }))
}

pub async fn mark_read(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<NotificationView>, ServerError> {
    let notification = state.engine.mark_notification_read(&id, &actor).await?;
    Ok(Json(notification_view(notification)))
}

pub async fn mark_all_read(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<MarkedRead>, ServerError> {
    let updated = state.engine.mark_all_notifications_read(&actor).await?;
    Ok(Json(MarkedRead { updated }))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_notification(&id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
