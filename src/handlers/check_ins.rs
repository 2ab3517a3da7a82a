// src/handlers/check_ins.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::ApiError,
        response::{created, ok},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::check_in::CheckIn,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload {
    pub club_id: Uuid,
    // Ausente = matrícula ativa do esporte do clube
    pub membership_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/check-ins",
    tag = "Check-ins",
    request_body = CheckInPayload,
    responses(
        (status = 201, description = "Entrada registrada", body = CheckIn),
        (status = 422, description = "Matrícula não dá acesso ao clube")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CheckInPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let check_in = app_state
        .check_in_service
        .check_in(&app_state.db_pool, &user, payload.club_id, payload.membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "check_in_recorded", check_in))
}

#[utoipa::path(
    post,
    path = "/api/check-ins/{check_in_id}/check-out",
    tag = "Check-ins",
    responses(
        (status = 200, description = "Saída registrada", body = CheckIn),
        (status = 409, description = "Saída já registrada")
    ),
    params(("check_in_id" = Uuid, Path, description = "ID do check-in")),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(check_in_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let check_in = app_state
        .check_in_service
        .check_out(&app_state.db_pool, &user, check_in_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "check_out_recorded", check_in))
}

#[utoipa::path(
    get,
    path = "/api/check-ins/mine",
    tag = "Check-ins",
    responses((status = 200, description = "Histórico de entradas", body = Vec<CheckIn>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_check_ins(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let check_ins = app_state
        .check_in_service
        .list_mine(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", check_ins))
}
