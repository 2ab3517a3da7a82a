// src/handlers/memberships.rs

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
    models::membership::MembershipView,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMembershipPayload {
    pub sport_id: Uuid,
    pub tier_id: Uuid,
    #[serde(default)]
    pub auto_renew: bool,
}

#[utoipa::path(
    post,
    path = "/api/memberships",
    tag = "Memberships",
    request_body = PurchaseMembershipPayload,
    responses(
        (status = 201, description = "Matrícula comprada", body = MembershipView),
        (status = 409, description = "Já existe matrícula ativa para o esporte"),
        (status = 422, description = "Plano indisponível ou de outro esporte")
    ),
    security(("api_jwt" = []))
)]
pub async fn purchase_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<PurchaseMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .purchase(&app_state.db_pool, &user, payload.sport_id, payload.tier_id, payload.auto_renew)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "membership_purchased", membership))
}

#[utoipa::path(
    get,
    path = "/api/memberships/mine",
    tag = "Memberships",
    responses((status = 200, description = "Matrículas do usuário", body = Vec<MembershipView>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_memberships(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let memberships = app_state
        .membership_service
        .list_mine(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", memberships))
}

#[utoipa::path(
    get,
    path = "/api/memberships/{membership_id}",
    tag = "Memberships",
    responses(
        (status = 200, description = "Matrícula", body = MembershipView),
        (status = 404, description = "Matrícula não encontrada")
    ),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn get_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .get(&app_state.db_pool, &user, membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", membership))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/renew",
    tag = "Memberships",
    responses(
        (status = 200, description = "Matrícula renovada", body = MembershipView),
        (status = 409, description = "Matrícula cancelada ou sem plano")
    ),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn renew_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .renew(&app_state.db_pool, &user, membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "membership_renewed", membership))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/pause",
    tag = "Memberships",
    responses((status = 200, description = "Matrícula pausada", body = MembershipView)),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn pause_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .pause(&app_state.db_pool, &user, membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "membership_updated", membership))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/resume",
    tag = "Memberships",
    responses((status = 200, description = "Matrícula reativada", body = MembershipView)),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn resume_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .resume(&app_state.db_pool, &user, membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "membership_updated", membership))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{membership_id}/cancel",
    tag = "Memberships",
    responses((status = 200, description = "Matrícula cancelada", body = MembershipView)),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn cancel_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .cancel(&app_state.db_pool, &user, membership_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "membership_updated", membership))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoRenewPayload {
    pub auto_renew: bool,
}

#[utoipa::path(
    put,
    path = "/api/memberships/{membership_id}/auto-renew",
    tag = "Memberships",
    request_body = AutoRenewPayload,
    responses((status = 200, description = "Renovação automática atualizada", body = MembershipView)),
    params(("membership_id" = Uuid, Path, description = "ID da matrícula")),
    security(("api_jwt" = []))
)]
pub async fn set_auto_renew(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<Uuid>,
    Json(payload): Json<AutoRenewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .set_auto_renew(&app_state.db_pool, &user, membership_id, payload.auto_renew)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "membership_updated", membership))
}
