// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CatalogRepository, CheckInRepository, ClubRepository, CounterRepository, EventRepository,
        MembershipRepository, NotificationRepository, PaymentRepository, ServicePurchaseRepository,
        TrainerRepository, TrainerRequestRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        check_in_service::CheckInService,
        club_service::ClubService,
        event_service::EventService,
        membership_service::MembershipService,
        notification_service::{DbNotificationSink, NotificationService},
        payment_service::PaymentService,
        service_purchase_service::ServicePurchaseService,
        trainer_request_service::TrainerRequestService,
        trainer_service::TrainerService,
    },
};

// Teto para os prazos em dias (pedidos de treinador e JWT)
const MAX_TTL_DAYS: i64 = 365;

/// Configuração lida do ambiente (.env incluso) uma única vez na subida.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub trainer_request_ttl_days: i64,
    pub jwt_ttl_days: i64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{} deve ser definida", key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let ttl_days = |key: &str| -> anyhow::Result<i64> {
            let days: i64 = or_default(key, "7").parse().with_context(|| format!("{} inválido", key))?;
            anyhow::ensure!((1..=MAX_TTL_DAYS).contains(&days), "{} deve estar entre 1 e {}", key, MAX_TTL_DAYS);
            Ok(days)
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:3000"),
            db_max_connections: or_default("DB_MAX_CONNECTIONS", "5")
                .parse()
                .context("DB_MAX_CONNECTIONS inválido")?,
            db_acquire_timeout_secs: or_default("DB_ACQUIRE_TIMEOUT_SECS", "3")
                .parse()
                .context("DB_ACQUIRE_TIMEOUT_SECS inválido")?,
            trainer_request_ttl_days: ttl_days("TRAINER_REQUEST_TTL_DAYS")?,
            jwt_ttl_days: ttl_days("JWT_TTL_DAYS")?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub club_service: ClubService,
    pub membership_service: MembershipService,
    pub trainer_service: TrainerService,
    pub trainer_request_service: TrainerRequestService,
    pub service_purchase_service: ServicePurchaseService,
    pub check_in_service: CheckInService,
    pub event_service: EventService,
    pub payment_service: PaymentService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(settings.db_acquire_timeout_secs))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::from_pool(db_pool, settings))
    }

    /// Monta o gráfico de dependências em cima de um pool já conectado.
    pub fn from_pool(db_pool: PgPool, settings: Settings) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new();
        let club_repo = ClubRepository::new();
        let membership_repo = MembershipRepository::new();
        let trainer_repo = TrainerRepository::new();
        let counter_repo = CounterRepository::new();
        let payment_repo = PaymentRepository::new();
        let notification_repo = NotificationRepository::new();

        let notification_service = NotificationService::new(
            Arc::new(DbNotificationSink::new(db_pool.clone(), notification_repo.clone())),
            notification_repo,
        );

        let auth_service = AuthService::new(
            user_repo.clone(),
            settings.jwt_secret.clone(),
            settings.jwt_ttl_days,
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(catalog_repo.clone());
        let club_service = ClubService::new(club_repo.clone(), catalog_repo.clone());
        let membership_service = MembershipService::new(
            membership_repo.clone(),
            catalog_repo.clone(),
            trainer_repo.clone(),
            payment_repo.clone(),
            notification_service.clone(),
        );
        let trainer_service = TrainerService::new(
            trainer_repo.clone(),
            membership_repo.clone(),
            catalog_repo.clone(),
            counter_repo.clone(),
            payment_repo.clone(),
            user_repo,
            notification_service.clone(),
        );
        let trainer_request_service = TrainerRequestService::new(
            TrainerRequestRepository::new(),
            membership_repo.clone(),
            catalog_repo.clone(),
            club_repo.clone(),
            trainer_repo,
            notification_service.clone(),
            settings.trainer_request_ttl_days,
        );
        let service_purchase_service = ServicePurchaseService::new(
            ServicePurchaseRepository::new(),
            membership_repo.clone(),
            catalog_repo,
            counter_repo.clone(),
            payment_repo.clone(),
        );
        let check_in_service = CheckInService::new(
            CheckInRepository::new(),
            club_repo.clone(),
            membership_repo,
            counter_repo,
        );
        let event_service = EventService::new(
            EventRepository::new(),
            club_repo,
            payment_repo.clone(),
            notification_service.clone(),
        );
        let payment_service = PaymentService::new(payment_repo);

        Self {
            db_pool,
            settings,
            i18n_store: I18nStore::default(),
            auth_service,
            catalog_service,
            club_service,
            membership_service,
            trainer_service,
            trainer_request_service,
            service_purchase_service,
            check_in_service,
            event_service,
            payment_service,
            notification_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn optional_values_fall_back_to_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/clubhub"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.server_addr, "0.0.0.0:3000");
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.db_acquire_timeout_secs, 3);
        assert_eq!(settings.trainer_request_ttl_days, 7);
        assert_eq!(settings.jwt_ttl_days, 7);
    }

    #[test]
    fn missing_required_values_fail() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/clubhub")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn malformed_numbers_fail() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/clubhub"),
            ("JWT_SECRET", "segredo"),
            ("TRAINER_REQUEST_TTL_DAYS", "uma semana"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn ttl_days_must_stay_within_bounds() {
        for value in ["0", "-3", "9999999999999"] {
            let result = Settings::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/clubhub"),
                ("JWT_SECRET", "segredo"),
                ("JWT_TTL_DAYS", value),
            ]));
            assert!(result.is_err(), "JWT_TTL_DAYS={} deveria falhar", value);
        }

        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/clubhub"),
            ("JWT_SECRET", "segredo"),
            ("TRAINER_REQUEST_TTL_DAYS", "365"),
        ]))
        .unwrap();
        assert_eq!(settings.trainer_request_ttl_days, 365);
    }
}
