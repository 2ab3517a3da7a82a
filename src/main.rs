//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let app_state = AppState::new(settings).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let addr = app_state.settings.server_addr.clone();
    let app = router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas abertas (sem token)
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/sports", get(handlers::catalog::list_sports))
        .route("/sports/{sport_id}/tiers", get(handlers::catalog::list_tiers))
        .route("/sports/{sport_id}/services", get(handlers::catalog::list_services))
        .route("/clubs", get(handlers::clubs::list_clubs))
        .route("/clubs/{club_id}", get(handlers::clubs::get_club))
        .route("/trainers", get(handlers::trainers::list_trainers))
        .route("/trainers/{profile_id}", get(handlers::trainers::get_profile))
        .route("/trainers/{profile_id}/availability", get(handlers::trainers::check_availability))
        .route("/events", get(handlers::events::list_events))
        .route("/events/{event_id}", get(handlers::events::get_event));

    // Rotas protegidas pelo auth_guard
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        // Catálogo
        .route("/sports", post(handlers::catalog::create_sport))
        .route("/sports/{sport_id}/tiers", post(handlers::catalog::create_tier))
        .route("/sports/{sport_id}/services", post(handlers::catalog::create_service))
        .route(
            "/services/{service_id}",
            put(handlers::catalog::update_service).delete(handlers::catalog::delete_service),
        )
        // Clubes
        .route("/clubs", post(handlers::clubs::create_club))
        .route("/clubs/{club_id}/images", post(handlers::clubs::add_image))
        .route("/clubs/{club_id}/amenities", post(handlers::clubs::add_amenity))
        .route("/clubs/{club_id}/facilities", post(handlers::clubs::add_facility))
        // Matrículas
        .route("/memberships", post(handlers::memberships::purchase_membership))
        .route("/memberships/mine", get(handlers::memberships::list_my_memberships))
        .route("/memberships/{membership_id}", get(handlers::memberships::get_membership))
        .route("/memberships/{membership_id}/renew", post(handlers::memberships::renew_membership))
        .route("/memberships/{membership_id}/pause", post(handlers::memberships::pause_membership))
        .route("/memberships/{membership_id}/resume", post(handlers::memberships::resume_membership))
        .route("/memberships/{membership_id}/cancel", post(handlers::memberships::cancel_membership))
        .route("/memberships/{membership_id}/auto-renew", put(handlers::memberships::set_auto_renew))
        // Treinadores
        .route("/trainers", post(handlers::trainers::create_profile))
        .route("/trainers/{profile_id}/verify", post(handlers::trainers::verify_profile))
        .route("/trainers/{profile_id}/availability-flag", post(handlers::trainers::set_availability_flag))
        .route("/trainers/{profile_id}/availabilities", post(handlers::trainers::add_availability))
        .route("/trainers/{profile_id}/certifications", post(handlers::trainers::add_certification))
        .route("/trainers/{profile_id}/specialties", post(handlers::trainers::add_specialty))
        .route("/trainers/{profile_id}/locations", post(handlers::trainers::add_location))
        // Sessões
        .route("/sessions", post(handlers::trainers::book_session))
        .route("/sessions/mine", get(handlers::trainers::list_my_sessions))
        .route("/sessions/{session_id}", get(handlers::trainers::get_session))
        .route("/sessions/{session_id}/complete", post(handlers::trainers::complete_session))
        .route("/sessions/{session_id}/cancel", post(handlers::trainers::cancel_session))
        .route("/sessions/{session_id}/no-show", post(handlers::trainers::mark_no_show))
        .route("/sessions/{session_id}/rate", post(handlers::trainers::rate_session))
        // Solicitações de treinador
        .route("/trainer-requests", post(handlers::trainer_requests::create_request))
        .route("/trainer-requests/mine", get(handlers::trainer_requests::list_my_requests))
        .route("/trainer-requests/inbox", get(handlers::trainer_requests::trainer_inbox))
        .route("/trainer-requests/{request_id}/accept", post(handlers::trainer_requests::accept_request))
        .route("/trainer-requests/{request_id}/decline", post(handlers::trainer_requests::decline_request))
        .route("/trainer-requests/{request_id}/cancel", post(handlers::trainer_requests::cancel_request))
        // Compras de serviço
        .route("/service-purchases", post(handlers::service_purchases::create_purchase))
        .route("/service-purchases/mine", get(handlers::service_purchases::list_my_purchases))
        .route("/service-purchases/{purchase_id}", patch(handlers::service_purchases::update_purchase))
        .route("/service-purchases/{purchase_id}/complete", post(handlers::service_purchases::complete_purchase))
        .route("/service-purchases/{purchase_id}/cancel", post(handlers::service_purchases::cancel_purchase))
        // Check-ins
        .route("/check-ins", post(handlers::check_ins::check_in))
        .route("/check-ins/mine", get(handlers::check_ins::list_my_check_ins))
        .route("/check-ins/{check_in_id}/check-out", post(handlers::check_ins::check_out))
        // Eventos
        .route("/events", post(handlers::events::create_event))
        .route("/events/{event_id}/publish", post(handlers::events::publish_event))
        .route("/events/{event_id}/complete", post(handlers::events::complete_event))
        .route("/events/{event_id}/cancel", post(handlers::events::cancel_event))
        .route("/events/{event_id}/register", post(handlers::events::register_for_event))
        .route("/events/{event_id}/registrations", get(handlers::events::list_registrations))
        .route(
            "/event-registrations/{registration_id}/confirm-payment",
            post(handlers::events::confirm_registration_payment),
        )
        .route("/event-registrations/{registration_id}/cancel", post(handlers::events::cancel_registration))
        // Pagamentos e notificações
        .route("/payments", get(handlers::payments::list_my_payments))
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/{notification_id}/read", post(handlers::notifications::mark_notification_read))
        // Rotinas periódicas (staff)
        .route("/admin/monthly-reset", post(handlers::admin::monthly_reset))
        .route("/admin/auto-renewals", post(handlers::admin::process_auto_renewals))
        .route("/admin/expire-requests", post(handlers::admin::expire_requests))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
