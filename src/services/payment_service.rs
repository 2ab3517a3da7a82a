// src/services/payment_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::PaymentRepository, models::payment::Payment};

#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository) -> Self {
        Self { repo }
    }

    pub async fn list_mine(&self, pool: &PgPool, user_id: Uuid) -> Result<Vec<Payment>, AppError> {
        self.repo.list_by_user(pool, user_id).await
    }
}
