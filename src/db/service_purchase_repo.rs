// src/db/service_purchase_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::service_purchase::{PurchaseStatus, ServicePurchase},
};

#[derive(Debug, Clone)]
pub struct NewServicePurchase<'a> {
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    pub amount: Decimal,
    pub status: PurchaseStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub payment_reference: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(Clone, Default)]
pub struct ServicePurchaseRepository;

impl ServicePurchaseRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, purchase: &NewServicePurchase<'_>) -> Result<ServicePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ServicePurchase>(
            r#"
            INSERT INTO service_purchases (
                user_id, membership_id, sport_service_id, amount, status,
                scheduled_for, payment_reference, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(purchase.user_id)
        .bind(purchase.membership_id)
        .bind(purchase.sport_service_id)
        .bind(purchase.amount)
        .bind(purchase.status)
        .bind(purchase.scheduled_for)
        .bind(purchase.payment_reference)
        .bind(purchase.notes)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, purchase_id: Uuid) -> Result<Option<ServicePurchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ServicePurchase>("SELECT * FROM service_purchases WHERE id = $1 FOR UPDATE")
            .bind(purchase_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<ServicePurchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ServicePurchase>(
            "SELECT * FROM service_purchases WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        status: PurchaseStatus,
        amount: Decimal,
        payment_reference: Option<&str>,
    ) -> Result<ServicePurchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ServicePurchase>(
            r#"
            UPDATE service_purchases
            SET status = $2, amount = $3,
                payment_reference = COALESCE($4, payment_reference),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(purchase_id)
        .bind(status)
        .bind(amount)
        .bind(payment_reference)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("service_purchase"))
    }
}
