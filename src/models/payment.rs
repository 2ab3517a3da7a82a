// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Membership,
    ServicePurchase,
    TrainerSession,
    EventRegistration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

// Registro genérico do livro de pagamentos. `reference_id` aponta para a
// entidade que gerou a cobrança (matrícula, compra, sessão, inscrição).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_type: PaymentType,
    pub reference_id: Uuid,
    #[schema(example = "1000.00")]
    pub amount: Decimal,
    pub status: TransactionStatus,
    // Referência devolvida pelo gateway (externo)
    pub transaction_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub user_id: Uuid,
    pub payment_type: PaymentType,
    pub reference_id: Uuid,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub transaction_reference: Option<&'a str>,
}
