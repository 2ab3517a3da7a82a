// src/handlers/clubs.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::{created, ok},
    },
    config::AppState,
    db::club_repo::NewClub,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::club::{Amenity, Club, ClubDetail, ClubImage, Facility},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct SportFilter {
    /// Filtra pelo esporte
    pub sport_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubPayload {
    pub sport_id: Uuid,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Clube Aquático Centro")]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(range(min = -90.0, max = 90.0, message = "out_of_range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "out_of_range"))]
    pub longitude: Option<f64>,
    #[schema(value_type = Option<String>, example = "06:00:00")]
    pub opening_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "22:00:00")]
    pub closing_time: Option<NaiveTime>,
}

#[utoipa::path(
    post,
    path = "/api/clubs",
    tag = "Clubs",
    request_body = CreateClubPayload,
    responses(
        (status = 201, description = "Clube criado", body = Club),
        (status = 403, description = "Apenas administração"),
        (status = 422, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_club(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateClubPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let club = app_state
        .club_service
        .create_club(
            &app_state.db_pool,
            &user,
            NewClub {
                sport_id: payload.sport_id,
                owner_id: user.id,
                name: payload.name.trim(),
                description: payload.description.as_deref(),
                address: &payload.address,
                city: &payload.city,
                latitude: payload.latitude,
                longitude: payload.longitude,
                opening_time: payload.opening_time,
                closing_time: payload.closing_time,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", club))
}

#[utoipa::path(
    get,
    path = "/api/clubs",
    tag = "Clubs",
    params(SportFilter),
    responses((status = 200, description = "Clubes ativos", body = Vec<Club>))
)]
pub async fn list_clubs(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<SportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let clubs = app_state
        .club_service
        .list_clubs(&app_state.db_pool, filter.sport_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", clubs))
}

#[utoipa::path(
    get,
    path = "/api/clubs/{club_id}",
    tag = "Clubs",
    responses(
        (status = 200, description = "Clube com imagens, comodidades e instalações", body = ClubDetail),
        (status = 404, description = "Clube não encontrado")
    ),
    params(("club_id" = Uuid, Path, description = "ID do clube"))
)]
pub async fn get_club(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(club_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .club_service
        .get_club(&app_state.db_pool, club_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", detail))
}

// --- Anexos do clube ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddImagePayload {
    #[validate(url(message = "invalid_url"))]
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[utoipa::path(
    post,
    path = "/api/clubs/{club_id}/images",
    tag = "Clubs",
    request_body = AddImagePayload,
    responses((status = 201, description = "Imagem adicionada", body = ClubImage)),
    params(("club_id" = Uuid, Path, description = "ID do clube")),
    security(("api_jwt" = []))
)]
pub async fn add_image(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<AddImagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let image = app_state
        .club_service
        .add_image(&app_state.db_pool, &user, club_id, &payload.url, payload.is_primary)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", image))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamedItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/clubs/{club_id}/amenities",
    tag = "Clubs",
    request_body = NamedItemPayload,
    responses((status = 201, description = "Comodidade adicionada", body = Amenity)),
    params(("club_id" = Uuid, Path, description = "ID do clube")),
    security(("api_jwt" = []))
)]
pub async fn add_amenity(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<NamedItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let amenity = app_state
        .club_service
        .add_amenity(&app_state.db_pool, &user, club_id, payload.name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", amenity))
}

#[utoipa::path(
    post,
    path = "/api/clubs/{club_id}/facilities",
    tag = "Clubs",
    request_body = NamedItemPayload,
    responses((status = 201, description = "Instalação adicionada", body = Facility)),
    params(("club_id" = Uuid, Path, description = "ID do clube")),
    security(("api_jwt" = []))
)]
pub async fn add_facility(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(club_id): Path<Uuid>,
    Json(payload): Json<NamedItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let facility = app_state
        .club_service
        .add_facility(&app_state.db_pool, &user, club_id, payload.name.trim(), payload.description.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", facility))
}
