// src/db/payment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{NewPayment, Payment},
};

// Livro de pagamentos: só INSERT e leitura. Os motores gravam aqui
// dentro da própria transação.
#[derive(Clone, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn record<'e, E>(&self, executor: E, payment: &NewPayment<'_>) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (user_id, payment_type, reference_id, amount, status, transaction_reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payment.user_id)
        .bind(payment.payment_type)
        .bind(payment.reference_id)
        .bind(payment.amount)
        .bind(payment.status)
        .bind(payment.transaction_reference)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
