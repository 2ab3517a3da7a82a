// src/handlers/catalog.rs

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
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::{created, ok},
    },
    config::AppState,
    db::catalog_repo::{NewTier, SportServiceFields},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::catalog::{Sport, SportService, Tier},
};

// =============================================================================
//  ESPORTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSportPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Natação")]
    pub name: String,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/sports",
    tag = "Catalog",
    request_body = CreateSportPayload,
    responses(
        (status = 201, description = "Esporte criado", body = Sport),
        (status = 403, description = "Apenas administração")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sport(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sport = app_state
        .catalog_service
        .create_sport(&app_state.db_pool, &user, &payload.name, payload.description.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", sport))
}

#[utoipa::path(
    get,
    path = "/api/sports",
    tag = "Catalog",
    responses((status = 200, description = "Esportes cadastrados", body = Vec<Sport>))
)]
pub async fn list_sports(State(app_state): State<AppState>, locale: Locale) -> Result<impl IntoResponse, ApiError> {
    let sports = app_state
        .catalog_service
        .list_sports(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", sports))
}

// =============================================================================
//  PLANOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "gold")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ouro")]
    pub display_name: String,
    #[schema(example = "1000.00")]
    pub price: Decimal,
    #[validate(range(min = 1, max = 3650, message = "invalid_duration"))]
    #[schema(example = 30)]
    pub duration_days: i32,
    #[serde(default)]
    #[schema(example = "10.00")]
    pub discount_percentage: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/sports/{sport_id}/tiers",
    tag = "Catalog",
    request_body = CreateTierPayload,
    responses(
        (status = 201, description = "Plano criado", body = Tier),
        (status = 422, description = "Dados inválidos")
    ),
    params(("sport_id" = Uuid, Path, description = "ID do esporte")),
    security(("api_jwt" = []))
)]
pub async fn create_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(sport_id): Path<Uuid>,
    Json(payload): Json<CreateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tier = app_state
        .catalog_service
        .create_tier(
            &app_state.db_pool,
            &user,
            NewTier {
                sport_id,
                name: &payload.name,
                display_name: &payload.display_name,
                price: payload.price,
                duration_days: payload.duration_days,
                discount_percentage: payload.discount_percentage,
                start_date: payload.start_date,
                end_date: payload.end_date,
                features: &payload.features,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", tier))
}

#[utoipa::path(
    get,
    path = "/api/sports/{sport_id}/tiers",
    tag = "Catalog",
    responses((status = 200, description = "Planos do esporte", body = Vec<Tier>)),
    params(("sport_id" = Uuid, Path, description = "ID do esporte"))
)]
pub async fn list_tiers(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(sport_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .catalog_service
        .list_tiers(&app_state.db_pool, sport_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", tiers))
}

// =============================================================================
//  SERVIÇOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportServicePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Avaliação física")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "150.00")]
    pub price: Decimal,
    #[schema(example = 60)]
    pub duration_minutes: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    // Só na atualização: move o serviço para outro esporte
    pub sport_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

impl SportServicePayload {
    fn fields(&self, sport_id: Uuid) -> SportServiceFields<'_> {
        SportServiceFields {
            sport_id,
            name: &self.name,
            description: self.description.as_deref(),
            price: self.price,
            duration_minutes: self.duration_minutes,
            is_active: self.is_active,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/sports/{sport_id}/services",
    tag = "Catalog",
    request_body = SportServicePayload,
    responses((status = 201, description = "Serviço criado", body = SportService)),
    params(("sport_id" = Uuid, Path, description = "ID do esporte")),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(sport_id): Path<Uuid>,
    Json(payload): Json<SportServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state
        .catalog_service
        .create_service(&app_state.db_pool, &user, payload.fields(sport_id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", service))
}

#[utoipa::path(
    get,
    path = "/api/sports/{sport_id}/services",
    tag = "Catalog",
    responses((status = 200, description = "Serviços do esporte", body = Vec<SportService>)),
    params(("sport_id" = Uuid, Path, description = "ID do esporte"))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(sport_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let services = app_state
        .catalog_service
        .list_services(&app_state.db_pool, sport_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", services))
}

#[utoipa::path(
    put,
    path = "/api/services/{service_id}",
    tag = "Catalog",
    request_body = SportServicePayload,
    responses((status = 200, description = "Serviço atualizado", body = SportService)),
    params(("service_id" = Uuid, Path, description = "ID do serviço")),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<SportServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sport_id = payload
        .sport_id
        .ok_or_else(|| AppError::field("sport_id", "required").to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state
        .catalog_service
        .update_service(&app_state.db_pool, &user, service_id, payload.fields(sport_id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", service))
}

#[utoipa::path(
    delete,
    path = "/api/services/{service_id}",
    tag = "Catalog",
    responses((status = 200, description = "Serviço removido")),
    params(("service_id" = Uuid, Path, description = "ID do serviço")),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .catalog_service
        .delete_service(&app_state.db_pool, &user, service_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "deleted", service_id))
}
