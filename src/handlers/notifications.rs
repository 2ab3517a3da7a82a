// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{error::ApiError, response::ok},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notification::Notification,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilter {
    /// Só as não lidas
    #[serde(default)]
    pub unread_only: bool,
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(NotificationFilter),
    responses((status = 200, description = "Notificações do usuário", body = Vec<Notification>)),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(filter): Query<NotificationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notification_service
        .list_mine(&app_state.db_pool, user.id, filter.unread_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", notifications))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificação lida", body = Notification),
        (status = 404, description = "Notificação não encontrada")
    ),
    params(("notification_id" = Uuid, Path, description = "ID da notificação")),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notification_service
        .mark_read(&app_state.db_pool, user.id, notification_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "notification_read", notification))
}
