// src/handlers/service_purchases.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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
    models::service_purchase::{PurchaseStatus, ServicePurchase},
    services::service_purchase_service::CreatePurchase,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    // Staff pode registrar em nome de outro usuário
    pub user_id: Option<Uuid>,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    // Ausente = preço atual do serviço
    #[schema(example = "150.00")]
    pub amount: Option<Decimal>,
    // Ausente = upcoming
    pub status: Option<PurchaseStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/service-purchases",
    tag = "Service Purchases",
    request_body = CreatePurchasePayload,
    responses(
        (status = 201, description = "Compra registrada", body = ServicePurchase),
        (status = 422, description = "Matrícula ou serviço inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = app_state
        .service_purchase_service
        .create(
            &app_state.db_pool,
            &user,
            CreatePurchase {
                user_id: payload.user_id,
                membership_id: payload.membership_id,
                sport_service_id: payload.sport_service_id,
                amount: payload.amount,
                status: payload.status,
                scheduled_for: payload.scheduled_for,
                payment_reference: payload.payment_reference,
                notes: payload.notes,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "purchase_recorded", purchase))
}

#[utoipa::path(
    get,
    path = "/api/service-purchases/mine",
    tag = "Service Purchases",
    responses((status = 200, description = "Compras do usuário", body = Vec<ServicePurchase>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_purchases(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let purchases = app_state
        .service_purchase_service
        .list_mine(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", purchases))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchasePayload {
    pub status: Option<PurchaseStatus>,
    #[schema(example = "120.00")]
    pub amount: Option<Decimal>,
    pub payment_reference: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/service-purchases/{purchase_id}",
    tag = "Service Purchases",
    request_body = UpdatePurchasePayload,
    responses(
        (status = 200, description = "Compra atualizada", body = ServicePurchase),
        (status = 409, description = "Transição de status inválida")
    ),
    params(("purchase_id" = Uuid, Path, description = "ID da compra")),
    security(("api_jwt" = []))
)]
pub async fn update_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = app_state
        .service_purchase_service
        .update(
            &app_state.db_pool,
            &user,
            purchase_id,
            payload.status,
            payload.amount,
            payload.payment_reference.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "purchase_updated", purchase))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletePurchasePayload {
    pub payment_reference: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/service-purchases/{purchase_id}/complete",
    tag = "Service Purchases",
    request_body = CompletePurchasePayload,
    responses(
        (status = 200, description = "Compra concluída", body = ServicePurchase),
        (status = 409, description = "Compra não pode ser concluída")
    ),
    params(("purchase_id" = Uuid, Path, description = "ID da compra")),
    security(("api_jwt" = []))
)]
pub async fn complete_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
    payload: Option<Json<CompletePurchasePayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();
    let purchase = app_state
        .service_purchase_service
        .complete(&app_state.db_pool, &user, purchase_id, payload.payment_reference.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "purchase_updated", purchase))
}

#[utoipa::path(
    post,
    path = "/api/service-purchases/{purchase_id}/cancel",
    tag = "Service Purchases",
    responses(
        (status = 200, description = "Compra cancelada", body = ServicePurchase),
        (status = 409, description = "Compra não pode ser cancelada")
    ),
    params(("purchase_id" = Uuid, Path, description = "ID da compra")),
    security(("api_jwt" = []))
)]
pub async fn cancel_purchase(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let purchase = app_state
        .service_purchase_service
        .cancel(&app_state.db_pool, &user, purchase_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "purchase_updated", purchase))
}
