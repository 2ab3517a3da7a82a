// src/handlers/payments.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{error::ApiError, response::ok},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::payment::Payment,
};

#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    responses((status = 200, description = "Histórico de pagamentos do usuário", body = Vec<Payment>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_payments(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let payments = app_state
        .payment_service
        .list_mine(&app_state.db_pool, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", payments))
}
