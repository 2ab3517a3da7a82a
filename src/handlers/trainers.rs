// src/handlers/trainers.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::{created, ok},
    },
    config::AppState,
    db::trainer_repo::{NewLocation, NewTrainerProfile},
    handlers::clubs::SportFilter,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::trainer::{
        Certification, DayOfWeek, GenderPreference, Specialty, TrainerAvailability, TrainerLocation, TrainerProfile,
        TrainerProfileDetail, TrainerSession,
    },
    services::trainer_service::BookSession,
};

// =============================================================================
//  PERFIL
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainerProfilePayload {
    // Ausente = o próprio usuário logado
    pub user_id: Option<Uuid>,
    pub sport_id: Uuid,
    pub tier_id: Uuid,
    #[validate(range(min = 0, max = 80, message = "out_of_range"))]
    #[schema(example = 5)]
    pub experience_years: i32,
    pub bio: Option<String>,
    #[schema(example = "both")]
    pub gender_preference: GenderPreference,
}

#[utoipa::path(
    post,
    path = "/api/trainers",
    tag = "Trainers",
    request_body = CreateTrainerProfilePayload,
    responses(
        (status = 201, description = "Perfil criado", body = TrainerProfile),
        (status = 409, description = "Usuário já possui perfil")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTrainerProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .trainer_service
        .create_profile(
            &app_state.db_pool,
            &user,
            NewTrainerProfile {
                user_id: payload.user_id.unwrap_or(user.id),
                sport_id: payload.sport_id,
                tier_id: payload.tier_id,
                experience_years: payload.experience_years,
                bio: payload.bio.as_deref(),
                gender_preference: payload.gender_preference,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", profile))
}

#[utoipa::path(
    get,
    path = "/api/trainers",
    tag = "Trainers",
    params(SportFilter),
    responses((status = 200, description = "Treinadores", body = Vec<TrainerProfile>))
)]
pub async fn list_trainers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<SportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let trainers = app_state
        .trainer_service
        .list_trainers(&app_state.db_pool, filter.sport_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", trainers))
}

#[utoipa::path(
    get,
    path = "/api/trainers/{profile_id}",
    tag = "Trainers",
    responses(
        (status = 200, description = "Perfil com categorias derivadas e anexos", body = TrainerProfileDetail),
        (status = 404, description = "Perfil não encontrado")
    ),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador"))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .trainer_service
        .get_profile(&app_state.db_pool, profile_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", detail))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlagPayload {
    pub value: bool,
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/verify",
    tag = "Trainers",
    request_body = FlagPayload,
    responses(
        (status = 200, description = "Verificação atualizada", body = TrainerProfile),
        (status = 403, description = "Apenas administração")
    ),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn verify_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<FlagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .trainer_service
        .verify(&app_state.db_pool, &user, profile_id, payload.value)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", profile))
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/availability-flag",
    tag = "Trainers",
    request_body = FlagPayload,
    responses((status = 200, description = "Disponibilidade geral atualizada", body = TrainerProfile)),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn set_availability_flag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<FlagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .trainer_service
        .set_availability_flag(&app_state.db_pool, &user, profile_id, payload.value)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", profile))
}

// =============================================================================
//  DISPONIBILIDADE, CERTIFICAÇÕES, ESPECIALIDADES, LOCAIS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    #[schema(example = "monday")]
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String, example = "08:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub end_time: NaiveTime,
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/availabilities",
    tag = "Trainers",
    request_body = AvailabilityPayload,
    responses(
        (status = 201, description = "Janela adicionada", body = TrainerAvailability),
        (status = 422, description = "Janela inválida ou sobreposta")
    ),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn add_availability(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<AvailabilityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let window = app_state
        .trainer_service
        .add_availability(
            &app_state.db_pool,
            &user,
            profile_id,
            payload.day_of_week,
            payload.start_time,
            payload.end_time,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", window))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Dia da semana; ignorado quando `date` é informado
    pub day: Option<DayOfWeek>,
    /// Data (AAAA-MM-DD)
    pub date: Option<NaiveDate>,
    /// Horário (HH:MM:SS)
    #[param(value_type = String)]
    pub time: NaiveTime,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCheck {
    pub day_of_week: DayOfWeek,
    #[schema(value_type = String)]
    pub time: NaiveTime,
    pub available: bool,
}

#[utoipa::path(
    get,
    path = "/api/trainers/{profile_id}/availability",
    tag = "Trainers",
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador"), AvailabilityQuery),
    responses((status = 200, description = "Resultado da consulta", body = AvailabilityCheck))
)]
pub async fn check_availability(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(profile_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let day_of_week = match (query.date, query.day) {
        (Some(date), _) => DayOfWeek::from(date.weekday()),
        (None, Some(day)) => day,
        (None, None) => {
            return Err(AppError::field("day", "required").to_api_error(&locale, &app_state.i18n_store));
        }
    };

    let available = app_state
        .trainer_service
        .is_available_at(&app_state.db_pool, profile_id, day_of_week, query.time)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(
        &app_state.i18n_store,
        &locale,
        "ok",
        AvailabilityCheck { day_of_week, time: query.time, available },
    ))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificationPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "CREF")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    pub issuing_organization: String,
    #[schema(value_type = String, example = "2020-03-01")]
    pub issue_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub expiry_date: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/certifications",
    tag = "Trainers",
    request_body = CertificationPayload,
    responses((status = 201, description = "Certificação adicionada", body = Certification)),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn add_certification(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<CertificationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let certification = app_state
        .trainer_service
        .add_certification(
            &app_state.db_pool,
            &user,
            profile_id,
            payload.name.trim(),
            payload.issuing_organization.trim(),
            payload.issue_date,
            payload.expiry_date,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", certification))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Nado borboleta")]
    pub specialty: String,
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/specialties",
    tag = "Trainers",
    request_body = SpecialtyPayload,
    responses(
        (status = 201, description = "Especialidade adicionada", body = Specialty),
        (status = 409, description = "Especialidade já cadastrada")
    ),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn add_specialty(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<SpecialtyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let specialty = app_state
        .trainer_service
        .add_specialty(&app_state.db_pool, &user, profile_id, &payload.specialty)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", specialty))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0, message = "out_of_range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "out_of_range"))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_primary: bool,
}

#[utoipa::path(
    post,
    path = "/api/trainers/{profile_id}/locations",
    tag = "Trainers",
    request_body = LocationPayload,
    responses((status = 201, description = "Local adicionado", body = TrainerLocation)),
    params(("profile_id" = Uuid, Path, description = "ID do perfil de treinador")),
    security(("api_jwt" = []))
)]
pub async fn add_location(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<LocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let location = app_state
        .trainer_service
        .add_location(
            &app_state.db_pool,
            &user,
            profile_id,
            NewLocation {
                name: payload.name.trim(),
                address: &payload.address,
                latitude: payload.latitude,
                longitude: payload.longitude,
                is_primary: payload.is_primary,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", location))
}

// =============================================================================
//  SESSÕES
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSessionPayload {
    pub trainer_profile_id: Uuid,
    pub trainee_membership_id: Uuid,
    #[schema(value_type = String, example = "2026-11-03")]
    pub session_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub session_time: NaiveTime,
    #[schema(example = 60)]
    pub duration_minutes: i32,
    #[schema(example = "120.00")]
    pub fee_amount: Decimal,
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    request_body = BookSessionPayload,
    responses(
        (status = 201, description = "Sessão agendada", body = TrainerSession),
        (status = 422, description = "Regras de agendamento violadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn book_session(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<BookSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .book_session(
            &app_state.db_pool,
            &user,
            BookSession {
                trainer_profile_id: payload.trainer_profile_id,
                trainee_membership_id: payload.trainee_membership_id,
                session_date: payload.session_date,
                session_time: payload.session_time,
                duration_minutes: payload.duration_minutes,
                fee_amount: payload.fee_amount,
                notes: payload.notes,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "session_booked", session))
}

#[utoipa::path(
    get,
    path = "/api/sessions/mine",
    tag = "Sessions",
    responses((status = 200, description = "Sessões como aluno ou treinador", body = Vec<TrainerSession>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_sessions(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = app_state
        .trainer_service
        .list_my_sessions(&app_state.db_pool, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", sessions))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "Sessions",
    responses(
        (status = 200, description = "Sessão", body = TrainerSession),
        (status = 403, description = "Não é parte da sessão")
    ),
    params(("session_id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn get_session(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .get_session(&app_state.db_pool, &user, session_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", session))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/complete",
    tag = "Sessions",
    responses(
        (status = 200, description = "Sessão concluída", body = TrainerSession),
        (status = 409, description = "Sessão não pode ser concluída")
    ),
    params(("session_id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn complete_session(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .complete_session(&app_state.db_pool, &user, session_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "session_updated", session))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/cancel",
    tag = "Sessions",
    responses(
        (status = 200, description = "Sessão cancelada", body = TrainerSession),
        (status = 409, description = "Sessão não pode ser cancelada")
    ),
    params(("session_id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn cancel_session(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .cancel_session(&app_state.db_pool, &user, session_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "session_updated", session))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/no-show",
    tag = "Sessions",
    responses((status = 200, description = "Falta registrada", body = TrainerSession)),
    params(("session_id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn mark_no_show(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .mark_no_show(&app_state.db_pool, &user, session_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "session_updated", session))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateSessionPayload {
    #[schema(example = 5)]
    pub rating: i16,
    pub feedback: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/rate",
    tag = "Sessions",
    request_body = RateSessionPayload,
    responses(
        (status = 200, description = "Sessão avaliada", body = TrainerSession),
        (status = 409, description = "Sessão não pode ser avaliada")
    ),
    params(("session_id" = Uuid, Path, description = "ID da sessão")),
    security(("api_jwt" = []))
)]
pub async fn rate_session(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<RateSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .trainer_service
        .rate_session(&app_state.db_pool, &user, session_id, payload.rating, payload.feedback.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "session_updated", session))
}
