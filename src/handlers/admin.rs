// src/handlers/admin.rs
// Rotinas periódicas disparadas por um agendador externo (cron) com token de staff.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::{error::ApiError, response::ok},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    services::membership_service::{AutoRenewalSummary, MonthlyResetSummary},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResetPayload {
    // "YYYY-MM"; ausente = mês corrente
    #[schema(example = "2026-10")]
    pub period: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/admin/monthly-reset",
    tag = "Admin",
    request_body = MonthlyResetPayload,
    responses(
        (status = 200, description = "Contadores zerados", body = MonthlyResetSummary),
        (status = 409, description = "Período já zerado")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_reset(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    payload: Option<Json<MonthlyResetPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    // Corpo opcional
    let Json(payload) = payload.unwrap_or_default();
    let summary = app_state
        .membership_service
        .reset_monthly_counters(&app_state.db_pool, &user, payload.period.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "counters_reset", summary))
}

#[utoipa::path(
    post,
    path = "/api/admin/auto-renewals",
    tag = "Admin",
    responses((status = 200, description = "Renovações processadas", body = AutoRenewalSummary)),
    security(("api_jwt" = []))
)]
pub async fn process_auto_renewals(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .membership_service
        .process_auto_renewals(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "renewals_processed", summary))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredRequests {
    pub expired: u64,
}

#[utoipa::path(
    post,
    path = "/api/admin/expire-requests",
    tag = "Admin",
    responses((status = 200, description = "Solicitações vencidas expiradas", body = ExpiredRequests)),
    security(("api_jwt" = []))
)]
pub async fn expire_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let expired = app_state
        .trainer_request_service
        .expire_stale(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "requests_expired", ExpiredRequests { expired }))
}
