// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Catalog ---
        handlers::catalog::create_sport,
        handlers::catalog::list_sports,
        handlers::catalog::create_tier,
        handlers::catalog::list_tiers,
        handlers::catalog::create_service,
        handlers::catalog::list_services,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,

        // --- Clubs ---
        handlers::clubs::create_club,
        handlers::clubs::list_clubs,
        handlers::clubs::get_club,
        handlers::clubs::add_image,
        handlers::clubs::add_amenity,
        handlers::clubs::add_facility,

        // --- Memberships ---
        handlers::memberships::purchase_membership,
        handlers::memberships::list_my_memberships,
        handlers::memberships::get_membership,
        handlers::memberships::renew_membership,
        handlers::memberships::pause_membership,
        handlers::memberships::resume_membership,
        handlers::memberships::cancel_membership,
        handlers::memberships::set_auto_renew,

        // --- Trainers ---
        handlers::trainers::create_profile,
        handlers::trainers::list_trainers,
        handlers::trainers::get_profile,
        handlers::trainers::verify_profile,
        handlers::trainers::set_availability_flag,
        handlers::trainers::add_availability,
        handlers::trainers::check_availability,
        handlers::trainers::add_certification,
        handlers::trainers::add_specialty,
        handlers::trainers::add_location,

        // --- Sessions ---
        handlers::trainers::book_session,
        handlers::trainers::list_my_sessions,
        handlers::trainers::get_session,
        handlers::trainers::complete_session,
        handlers::trainers::cancel_session,
        handlers::trainers::mark_no_show,
        handlers::trainers::rate_session,

        // --- Trainer Requests ---
        handlers::trainer_requests::create_request,
        handlers::trainer_requests::list_my_requests,
        handlers::trainer_requests::trainer_inbox,
        handlers::trainer_requests::accept_request,
        handlers::trainer_requests::decline_request,
        handlers::trainer_requests::cancel_request,

        // --- Service Purchases ---
        handlers::service_purchases::create_purchase,
        handlers::service_purchases::list_my_purchases,
        handlers::service_purchases::update_purchase,
        handlers::service_purchases::complete_purchase,
        handlers::service_purchases::cancel_purchase,

        // --- Check-ins ---
        handlers::check_ins::check_in,
        handlers::check_ins::check_out,
        handlers::check_ins::list_my_check_ins,

        // --- Events ---
        handlers::events::create_event,
        handlers::events::list_events,
        handlers::events::get_event,
        handlers::events::publish_event,
        handlers::events::complete_event,
        handlers::events::cancel_event,
        handlers::events::register_for_event,
        handlers::events::list_registrations,
        handlers::events::confirm_registration_payment,
        handlers::events::cancel_registration,

        // --- Payments / Notifications ---
        handlers::payments::list_my_payments,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,

        // --- Admin ---
        handlers::admin::monthly_reset,
        handlers::admin::process_auto_renewals,
        handlers::admin::expire_requests,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Sport,
            models::catalog::Tier,
            models::catalog::SportService,

            // --- Clubs ---
            models::club::Club,
            models::club::ClubImage,
            models::club::Amenity,
            models::club::Facility,
            models::club::ClubDetail,

            // --- Memberships ---
            models::membership::MembershipStatus,
            models::membership::Membership,
            models::membership::MembershipView,

            // --- Trainers ---
            models::trainer::GenderPreference,
            models::trainer::DayOfWeek,
            models::trainer::SessionStatus,
            models::trainer::PaymentStatus,
            models::trainer::TrainerProfile,
            models::trainer::AvailabilityStatus,
            models::trainer::RatingCategory,
            models::trainer::ExperienceLevel,
            models::trainer::Certification,
            models::trainer::Specialty,
            models::trainer::TrainerAvailability,
            models::trainer::TrainerLocation,
            models::trainer::TrainerProfileDetail,
            models::trainer::TrainerSession,

            // --- Trainer Requests ---
            models::trainer_request::TrainerRequestType,
            models::trainer_request::TrainerRequestStatus,
            models::trainer_request::TimeSlot,
            models::trainer_request::TrainerRequest,

            // --- Compras, check-ins, eventos, pagamentos ---
            models::service_purchase::PurchaseStatus,
            models::service_purchase::ServicePurchase,
            models::check_in::CheckIn,
            models::event::EventStatus,
            models::event::RegistrationStatus,
            models::event::Event,
            models::event::EventRegistration,
            models::payment::PaymentType,
            models::payment::TransactionStatus,
            models::payment::Payment,
            models::notification::Notification,

            // --- Resumos ---
            services::membership_service::MonthlyResetSummary,
            services::membership_service::AutoRenewalSummary,
            handlers::admin::ExpiredRequests,
            handlers::trainers::AvailabilityCheck,

            // --- Payloads ---
            handlers::catalog::CreateSportPayload,
            handlers::catalog::CreateTierPayload,
            handlers::catalog::SportServicePayload,
            handlers::clubs::CreateClubPayload,
            handlers::clubs::AddImagePayload,
            handlers::clubs::NamedItemPayload,
            handlers::memberships::PurchaseMembershipPayload,
            handlers::memberships::AutoRenewPayload,
            handlers::trainers::CreateTrainerProfilePayload,
            handlers::trainers::FlagPayload,
            handlers::trainers::AvailabilityPayload,
            handlers::trainers::CertificationPayload,
            handlers::trainers::SpecialtyPayload,
            handlers::trainers::LocationPayload,
            handlers::trainers::BookSessionPayload,
            handlers::trainers::RateSessionPayload,
            handlers::trainer_requests::CreateTrainerRequestPayload,
            handlers::service_purchases::CreatePurchasePayload,
            handlers::service_purchases::UpdatePurchasePayload,
            handlers::service_purchases::CompletePurchasePayload,
            handlers::check_ins::CheckInPayload,
            handlers::events::CreateEventPayload,
            handlers::events::ConfirmPaymentPayload,
            handlers::admin::MonthlyResetPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Catalog", description = "Esportes, Planos e Serviços"),
        (name = "Clubs", description = "Clubes, Imagens, Comodidades e Instalações"),
        (name = "Memberships", description = "Matrículas e Ciclo de Vida"),
        (name = "Trainers", description = "Perfis de Treinador e Disponibilidade"),
        (name = "Sessions", description = "Sessões de Treino"),
        (name = "Trainer Requests", description = "Solicitações de Treinador"),
        (name = "Service Purchases", description = "Compras de Serviços"),
        (name = "Check-ins", description = "Entradas nos Clubes"),
        (name = "Events", description = "Eventos e Inscrições"),
        (name = "Payments", description = "Histórico de Pagamentos"),
        (name = "Notifications", description = "Notificações do Usuário"),
        (name = "Admin", description = "Rotinas Periódicas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/memberships/{membership_id}/renew"));
        assert!(doc.paths.paths.contains_key("/api/admin/monthly-reset"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
