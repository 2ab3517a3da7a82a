// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    db::{
        catalog_repo::{NewTier, SportServiceFields},
        CatalogRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::catalog::{sports_to_recount, Sport, SportService, Tier, MAX_TIER_DURATION_DAYS},
};

/// Regras de um plano antes do INSERT.
pub fn validate_tier(tier: &NewTier<'_>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(
        (1..=MAX_TIER_DURATION_DAYS).contains(&tier.duration_days),
        "duration_days",
        "invalid_duration",
    );
    errors.check(tier.price >= Decimal::ZERO, "price", "invalid_amount");
    errors.check(
        tier.discount_percentage >= Decimal::ZERO && tier.discount_percentage <= Decimal::ONE_HUNDRED,
        "discount_percentage",
        "invalid_discount",
    );
    if let (Some(start), Some(end)) = (tier.start_date, tier.end_date) {
        errors.check(end >= start, "end_date", "invalid_date_range");
    }
    errors.into_result()
}

fn validate_service(fields: &SportServiceFields<'_>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(fields.price >= Decimal::ZERO, "price", "invalid_amount");
    if let Some(minutes) = fields.duration_minutes {
        errors.check(minutes > 0, "duration_minutes", "invalid_duration");
    }
    errors.into_result()
}

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

    // --- Esportes ---

    pub async fn create_sport(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        name: &str,
        description: Option<&str>,
    ) -> Result<Sport, AppError> {
        caller.require_staff()?;
        self.catalog_repo.create_sport(pool, name.trim(), description).await
    }

    pub async fn list_sports(&self, pool: &PgPool) -> Result<Vec<Sport>, AppError> {
        self.catalog_repo.list_sports(pool).await
    }

    // --- Planos ---

    pub async fn create_tier(&self, pool: &PgPool, caller: &AuthenticatedUser, tier: NewTier<'_>) -> Result<Tier, AppError> {
        caller.require_staff()?;
        validate_tier(&tier)?;

        self.catalog_repo
            .find_sport(pool, tier.sport_id)
            .await?
            .ok_or(AppError::NotFound("sport"))?;

        self.catalog_repo.create_tier(pool, &tier).await
    }

    pub async fn list_tiers(&self, pool: &PgPool, sport_id: Uuid) -> Result<Vec<Tier>, AppError> {
        self.catalog_repo.list_tiers(pool, sport_id).await
    }

    // --- Serviços ---
    // Toda escrita em sport_services trava os esportes envolvidos (ordem
    // crescente de id) e recalcula number_of_services na mesma transação.

    async fn lock_sports(&self, tx: &mut PgConnection, sport_ids: &[Uuid]) -> Result<(), AppError> {
        for sport_id in sport_ids {
            self.catalog_repo
                .find_sport_for_update(&mut *tx, *sport_id)
                .await?
                .ok_or(AppError::NotFound("sport"))?;
        }
        Ok(())
    }

    async fn recount(&self, tx: &mut PgConnection, sport_ids: &[Uuid]) -> Result<(), AppError> {
        for sport_id in sport_ids {
            self.catalog_repo.recount_services(&mut *tx, *sport_id).await?;
        }
        Ok(())
    }

    pub async fn create_service(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        fields: SportServiceFields<'_>,
    ) -> Result<SportService, AppError> {
        caller.require_staff()?;
        validate_service(&fields)?;

        let mut tx = pool.begin().await?;
        let sports = sports_to_recount(None, Some(fields.sport_id));
        self.lock_sports(&mut tx, &sports).await?;

        let service = self.catalog_repo.create_service(&mut *tx, &fields).await?;
        self.recount(&mut tx, &sports).await?;
        tx.commit().await?;
        Ok(service)
    }

    pub async fn update_service(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        service_id: Uuid,
        fields: SportServiceFields<'_>,
    ) -> Result<SportService, AppError> {
        caller.require_staff()?;
        validate_service(&fields)?;

        let mut tx = pool.begin().await?;
        let current = self
            .catalog_repo
            .find_service_for_update(&mut *tx, service_id)
            .await?
            .ok_or(AppError::NotFound("sport_service"))?;

        let sports = sports_to_recount(Some(current.sport_id), Some(fields.sport_id));
        self.lock_sports(&mut tx, &sports).await?;

        let service = self.catalog_repo.update_service(&mut *tx, service_id, &fields).await?;
        self.recount(&mut tx, &sports).await?;
        tx.commit().await?;
        Ok(service)
    }

    pub async fn delete_service(&self, pool: &PgPool, caller: &AuthenticatedUser, service_id: Uuid) -> Result<(), AppError> {
        caller.require_staff()?;

        let mut tx = pool.begin().await?;
        let current = self
            .catalog_repo
            .find_service_for_update(&mut *tx, service_id)
            .await?
            .ok_or(AppError::NotFound("sport_service"))?;

        let sports = sports_to_recount(Some(current.sport_id), None);
        self.lock_sports(&mut tx, &sports).await?;

        self.catalog_repo.delete_service(&mut *tx, service_id).await?;
        self.recount(&mut tx, &sports).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_services(&self, pool: &PgPool, sport_id: Uuid) -> Result<Vec<SportService>, AppError> {
        self.catalog_repo.list_services(pool, sport_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn tier(duration_days: i32, discount: i64) -> NewTier<'static> {
        NewTier {
            sport_id: Uuid::new_v4(),
            name: "gold",
            display_name: "Ouro",
            price: Decimal::new(1000, 0),
            duration_days,
            discount_percentage: Decimal::new(discount, 0),
            start_date: None,
            end_date: None,
            features: &[],
        }
    }

    #[test]
    fn accepts_a_well_formed_tier() {
        assert!(validate_tier(&tier(30, 10)).is_ok());
    }

    #[test]
    fn rejects_zero_duration_and_discount_out_of_range() {
        match validate_tier(&tier(0, 120)) {
            Err(AppError::FieldValidation(map)) => {
                assert_eq!(map["duration_days"], "invalid_duration");
                assert_eq!(map["discount_percentage"], "invalid_discount");
            }
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }

    #[test]
    fn rejects_duration_past_the_cap() {
        assert!(validate_tier(&tier(MAX_TIER_DURATION_DAYS, 0)).is_ok());
        match validate_tier(&tier(i32::MAX, 0)) {
            Err(AppError::FieldValidation(map)) => assert_eq!(map["duration_days"], "invalid_duration"),
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }

    #[test]
    fn sale_window_must_not_end_before_it_starts() {
        let now = Utc::now();
        let mut t = tier(30, 0);
        t.start_date = Some(now);
        t.end_date = Some(now - Duration::days(1));

        match validate_tier(&t) {
            Err(AppError::FieldValidation(map)) => assert_eq!(map["end_date"], "invalid_date_range"),
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }
}
