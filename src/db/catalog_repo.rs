// src/db/catalog_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::catalog::{Sport, SportService, Tier},
};

/// Dados de um plano novo.
#[derive(Debug, Clone)]
pub struct NewTier<'a> {
    pub sport_id: Uuid,
    pub name: &'a str,
    pub display_name: &'a str,
    pub price: Decimal,
    pub duration_days: i32,
    pub discount_percentage: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub features: &'a [String],
}

/// Campos de um serviço (criação e atualização usam o mesmo formato).
#[derive(Debug, Clone)]
pub struct SportServiceFields<'a> {
    pub sport_id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
}

#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ESPORTES
    // =========================================================================

    pub async fn create_sport<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Sport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sport>(
            r#"
            INSERT INTO sports (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("sports_name_key", "sport_name_taken")]))
    }

    pub async fn list_sports<'e, E>(&self, executor: E) -> Result<Vec<Sport>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sports = sqlx::query_as::<_, Sport>("SELECT * FROM sports ORDER BY name ASC")
            .fetch_all(executor)
            .await?;
        Ok(sports)
    }

    pub async fn find_sport<'e, E>(&self, executor: E, sport_id: Uuid) -> Result<Option<Sport>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sport = sqlx::query_as::<_, Sport>("SELECT * FROM sports WHERE id = $1")
            .bind(sport_id)
            .fetch_optional(executor)
            .await?;
        Ok(sport)
    }

    /// Trava a linha do esporte até o fim da transação. Toda escrita em
    /// sport_services passa por aqui antes do recálculo.
    pub async fn find_sport_for_update<'e, E>(&self, executor: E, sport_id: Uuid) -> Result<Option<Sport>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sport = sqlx::query_as::<_, Sport>("SELECT * FROM sports WHERE id = $1 FOR UPDATE")
            .bind(sport_id)
            .fetch_optional(executor)
            .await?;
        Ok(sport)
    }

    /// Recalcula number_of_services como COUNT ao vivo dos filhos.
    /// Exige a linha do esporte já travada (`find_sport_for_update`).
    pub async fn recount_services<'e, E>(&self, executor: E, sport_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE sports
            SET number_of_services = (SELECT COUNT(*) FROM sport_services WHERE sport_id = $1),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(sport_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  PLANOS
    // =========================================================================

    pub async fn create_tier<'e, E>(&self, executor: E, tier: &NewTier<'_>) -> Result<Tier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tier>(
            r#"
            INSERT INTO tiers (
                sport_id, name, display_name, price, duration_days,
                discount_percentage, start_date, end_date, features
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tier.sport_id)
        .bind(tier.name)
        .bind(tier.display_name)
        .bind(tier.price)
        .bind(tier.duration_days)
        .bind(tier.discount_percentage)
        .bind(tier.start_date)
        .bind(tier.end_date)
        .bind(tier.features)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("tiers_sport_name_key", "tier_name_taken")]))
    }

    pub async fn list_tiers<'e, E>(&self, executor: E, sport_id: Uuid) -> Result<Vec<Tier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tiers = sqlx::query_as::<_, Tier>("SELECT * FROM tiers WHERE sport_id = $1 ORDER BY price ASC")
            .bind(sport_id)
            .fetch_all(executor)
            .await?;
        Ok(tiers)
    }

    pub async fn find_tier<'e, E>(&self, executor: E, tier_id: Uuid) -> Result<Option<Tier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tier = sqlx::query_as::<_, Tier>("SELECT * FROM tiers WHERE id = $1")
            .bind(tier_id)
            .fetch_optional(executor)
            .await?;
        Ok(tier)
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        fields: &SportServiceFields<'_>,
    ) -> Result<SportService, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, SportService>(
            r#"
            INSERT INTO sport_services (sport_id, name, description, price, duration_minutes, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(fields.sport_id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.duration_minutes)
        .bind(fields.is_active)
        .fetch_one(executor)
        .await?;
        Ok(service)
    }

    pub async fn update_service<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
        fields: &SportServiceFields<'_>,
    ) -> Result<SportService, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SportService>(
            r#"
            UPDATE sport_services
            SET sport_id = $2, name = $3, description = $4, price = $5,
                duration_minutes = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(service_id)
        .bind(fields.sport_id)
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.price)
        .bind(fields.duration_minutes)
        .bind(fields.is_active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("sport_service"))
    }

    /// Apaga e devolve o sport_id que tinha (para o recálculo).
    pub async fn delete_service<'e, E>(&self, executor: E, service_id: Uuid) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sport_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM sport_services WHERE id = $1 RETURNING sport_id")
                .bind(service_id)
                .fetch_optional(executor)
                .await?;
        sport_id.ok_or(AppError::NotFound("sport_service"))
    }

    pub async fn find_service<'e, E>(&self, executor: E, service_id: Uuid) -> Result<Option<SportService>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, SportService>("SELECT * FROM sport_services WHERE id = $1")
            .bind(service_id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    /// Trava a linha do serviço (atualização concorrente de sport_id).
    pub async fn find_service_for_update<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
    ) -> Result<Option<SportService>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, SportService>("SELECT * FROM sport_services WHERE id = $1 FOR UPDATE")
            .bind(service_id)
            .fetch_optional(executor)
            .await?;
        Ok(service)
    }

    pub async fn list_services<'e, E>(&self, executor: E, sport_id: Uuid) -> Result<Vec<SportService>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let services = sqlx::query_as::<_, SportService>(
            "SELECT * FROM sport_services WHERE sport_id = $1 ORDER BY name ASC",
        )
        .bind(sport_id)
        .fetch_all(executor)
        .await?;
        Ok(services)
    }
}
