// src/handlers/events.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::event::{Event, EventRegistration},
    services::event_service::CreateEvent,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    pub club_id: Uuid,
    // Ausente = esporte do clube
    pub sport_id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Travessia do lago")]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[schema(example = 30)]
    pub capacity: i32,
    #[serde(default)]
    #[schema(example = "50.00")]
    pub fee: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Evento criado como rascunho", body = Event),
        (status = 422, description = "Datas, capacidade ou valor inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .event_service
        .create(
            &app_state.db_pool,
            &user,
            CreateEvent {
                club_id: payload.club_id,
                sport_id: payload.sport_id,
                title: payload.title,
                description: payload.description,
                starts_at: payload.starts_at,
                ends_at: payload.ends_at,
                capacity: payload.capacity,
                fee: payload.fee,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "created", event))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ClubFilter {
    /// Filtra pelo clube
    pub club_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    params(ClubFilter),
    responses((status = 200, description = "Eventos publicados", body = Vec<Event>))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ClubFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .event_service
        .list_published(&app_state.db_pool, filter.club_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", events))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    tag = "Events",
    responses(
        (status = 200, description = "Evento", body = Event),
        (status = 404, description = "Evento não encontrado")
    ),
    params(("event_id" = Uuid, Path, description = "ID do evento"))
)]
pub async fn get_event(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .get(&app_state.db_pool, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", event))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/publish",
    tag = "Events",
    responses(
        (status = 200, description = "Evento publicado", body = Event),
        (status = 409, description = "Evento não pode ser publicado")
    ),
    params(("event_id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn publish_event(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .publish(&app_state.db_pool, &user, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "event_updated", event))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/complete",
    tag = "Events",
    responses(
        (status = 200, description = "Evento concluído", body = Event),
        (status = 409, description = "Evento não pode ser concluído")
    ),
    params(("event_id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn complete_event(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .complete(&app_state.db_pool, &user, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "event_updated", event))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/cancel",
    tag = "Events",
    responses(
        (status = 200, description = "Evento cancelado; inscrições canceladas e estornadas", body = Event),
        (status = 409, description = "Evento não pode ser cancelado")
    ),
    params(("event_id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn cancel_event(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .cancel(&app_state.db_pool, &user, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "event_updated", event))
}

// --- Inscrições ---

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/register",
    tag = "Events",
    responses(
        (status = 201, description = "Inscrição realizada", body = EventRegistration),
        (status = 409, description = "Evento lotado, fechado ou inscrição duplicada")
    ),
    params(("event_id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn register_for_event(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = app_state
        .event_service
        .register(&app_state.db_pool, &user, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(created(&app_state.i18n_store, &locale, "event_registered", registration))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/registrations",
    tag = "Events",
    responses((status = 200, description = "Inscrições do evento", body = Vec<EventRegistration>)),
    params(("event_id" = Uuid, Path, description = "ID do evento")),
    security(("api_jwt" = []))
)]
pub async fn list_registrations(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let registrations = app_state
        .event_service
        .list_registrations(&app_state.db_pool, &user, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", registrations))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "PIX-8F3A21")]
    pub payment_reference: String,
}

#[utoipa::path(
    post,
    path = "/api/event-registrations/{registration_id}/confirm-payment",
    tag = "Events",
    request_body = ConfirmPaymentPayload,
    responses(
        (status = 200, description = "Pagamento confirmado", body = EventRegistration),
        (status = 409, description = "Inscrição não aceita pagamento")
    ),
    params(("registration_id" = Uuid, Path, description = "ID da inscrição")),
    security(("api_jwt" = []))
)]
pub async fn confirm_registration_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(registration_id): Path<Uuid>,
    Json(payload): Json<ConfirmPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let registration = app_state
        .event_service
        .confirm_payment(&app_state.db_pool, &user, registration_id, payload.payment_reference.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", registration))
}

#[utoipa::path(
    post,
    path = "/api/event-registrations/{registration_id}/cancel",
    tag = "Events",
    responses(
        (status = 200, description = "Inscrição cancelada", body = EventRegistration),
        (status = 409, description = "Inscrição já cancelada")
    ),
    params(("registration_id" = Uuid, Path, description = "ID da inscrição")),
    security(("api_jwt" = []))
)]
pub async fn cancel_registration(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(registration_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let registration = app_state
        .event_service
        .cancel_registration(&app_state.db_pool, &user, registration_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(ok(&app_state.i18n_store, &locale, "ok", registration))
}
