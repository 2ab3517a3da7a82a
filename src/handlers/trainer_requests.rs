// src/handlers/trainer_requests.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::trainer_request::{TimeSlot, TrainerRequest, TrainerRequestDraft, TrainerRequestType},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainerRequestPayload {
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    #[schema(example = "specific_trainer")]
    pub request_type: TrainerRequestType,
    // Obrigatório em specific_trainer
    pub trainer_profile_id: Option<Uuid>,
    // Só em open_request
    pub club_id: Option<Uuid>,
    pub preferred_time_slots: Vec<TimeSlot>,
    #[validate(length(max = 1000, message = "out_of_range"))]
    pub message: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/trainer-requests",
    tag = "Trainer Requests",
    request_body = CreateTrainerRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada", body = TrainerRequest),
        (status = 422, description = "Solicitação inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTrainerRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let draft = TrainerRequestDraft {
        user_id: user.id,
        membership_id: payload.membership_id,
        sport_service_id: payload.sport_service_id,
        request_type: payload.request_type,
        trainer_profile_id: payload.trainer_profile_id,
        club_id: payload.club_id,
        preferred_time_slots: payload.preferred_time_slots,
        message: payload.message,
    };

    let request = app_state
        .trainer_request_service
        .create(&app_state.db_pool, &user, draft)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "request_created", request))
}

#[utoipa::path(
    get,
    path = "/api/trainer-requests/mine",
    tag = "Trainer Requests",
    responses((status = 200, description = "Solicitações feitas pelo usuário", body = Vec<TrainerRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .trainer_request_service
        .list_mine(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", requests))
}

#[utoipa::path(
    get,
    path = "/api/trainer-requests/inbox",
    tag = "Trainer Requests",
    responses(
        (status = 200, description = "Pendentes visíveis para o treinador", body = Vec<TrainerRequest>),
        (status = 422, description = "Usuário sem perfil de treinador")
    ),
    security(("api_jwt" = []))
)]
pub async fn trainer_inbox(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .trainer_request_service
        .inbox(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", requests))
}

#[utoipa::path(
    post,
    path = "/api/trainer-requests/{request_id}/accept",
    tag = "Trainer Requests",
    responses(
        (status = 200, description = "Solicitação aceita", body = TrainerRequest),
        (status = 409, description = "Solicitação não pendente ou expirada")
    ),
    params(("request_id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn accept_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .trainer_request_service
        .accept(&app_state.db_pool, &user, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "request_updated", request))
}

#[utoipa::path(
    post,
    path = "/api/trainer-requests/{request_id}/decline",
    tag = "Trainer Requests",
    responses(
        (status = 200, description = "Solicitação recusada", body = TrainerRequest),
        (status = 409, description = "Solicitação não pendente ou expirada")
    ),
    params(("request_id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn decline_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .trainer_request_service
        .decline(&app_state.db_pool, &user, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "request_updated", request))
}

#[utoipa::path(
    post,
    path = "/api/trainer-requests/{request_id}/cancel",
    tag = "Trainer Requests",
    responses((status = 200, description = "Solicitação cancelada", body = TrainerRequest)),
    params(("request_id" = Uuid, Path, description = "ID da solicitação")),
    security(("api_jwt" = []))
)]
pub async fn cancel_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .trainer_request_service
        .cancel(&app_state.db_pool, &user, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "request_updated", request))
}
