// src/models/event.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::trainer::PaymentStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub sport_id: Option<Uuid>,
    pub organizer_id: Uuid,
    #[schema(example = "Travessia de verão")]
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[schema(example = 50)]
    pub capacity: i32,
    #[schema(example = "80.00")]
    pub fee: Decimal,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_event_fields(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: i32,
    fee: Decimal,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(ends_at > starts_at, "ends_at", "invalid_date_range");
    errors.check(capacity > 0, "capacity", "invalid_capacity");
    errors.check(fee >= Decimal::ZERO, "fee", "invalid_fee");
    errors.into_result()
}

impl Event {
    pub fn publish(&self, now: DateTime<Utc>) -> Result<EventStatus, AppError> {
        match self.status {
            EventStatus::Draft if self.starts_at > now => Ok(EventStatus::Published),
            _ => Err(AppError::StateConflict("event_not_publishable")),
        }
    }

    pub fn cancel(&self) -> Result<EventStatus, AppError> {
        match self.status {
            EventStatus::Draft | EventStatus::Published => Ok(EventStatus::Cancelled),
            _ => Err(AppError::StateConflict("event_not_cancellable")),
        }
    }

    pub fn complete(&self, now: DateTime<Utc>) -> Result<EventStatus, AppError> {
        match self.status {
            EventStatus::Published if self.ends_at <= now => Ok(EventStatus::Completed),
            _ => Err(AppError::StateConflict("event_not_completable")),
        }
    }

    /// Inscrição só em evento publicado, que ainda não começou e com vaga.
    /// `registered_count` é lido com a linha do evento travada.
    pub fn check_registration(&self, registered_count: i64, now: DateTime<Utc>) -> Result<PaymentStatus, AppError> {
        if self.status != EventStatus::Published || self.starts_at <= now {
            return Err(AppError::StateConflict("event_not_open"));
        }
        if registered_count >= i64::from(self.capacity) {
            return Err(AppError::StateConflict("event_full"));
        }
        Ok(if self.fee > Decimal::ZERO { PaymentStatus::Pending } else { PaymentStatus::Waived })
    }
}

impl EventRegistration {
    pub fn confirm_payment(&self) -> Result<PaymentStatus, AppError> {
        if self.status != RegistrationStatus::Registered || self.payment_status != PaymentStatus::Pending {
            return Err(AppError::StateConflict("registration_not_payable"));
        }
        Ok(PaymentStatus::Paid)
    }

    /// Cancelar devolve o novo status de pagamento (pago vira estornado).
    pub fn cancel(&self) -> Result<PaymentStatus, AppError> {
        if self.status == RegistrationStatus::Cancelled {
            return Err(AppError::StateConflict("registration_already_cancelled"));
        }
        Ok(match self.payment_status {
            PaymentStatus::Paid => PaymentStatus::Refunded,
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(status: EventStatus, fee: i64, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            sport_id: None,
            organizer_id: Uuid::new_v4(),
            title: "Torneio".into(),
            description: None,
            starts_at: now + Duration::days(3),
            ends_at: now + Duration::days(3) + Duration::hours(4),
            capacity: 2,
            fee: Decimal::new(fee, 0),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn registration(status: RegistrationStatus, payment_status: PaymentStatus) -> EventRegistration {
        let now = Utc::now();
        EventRegistration {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            payment_status,
            payment_reference: None,
            registered_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn field_rules() {
        let now = Utc::now();
        assert!(validate_event_fields(now, now + Duration::hours(1), 10, Decimal::ZERO).is_ok());
        match validate_event_fields(now, now, 0, Decimal::new(-5, 0)) {
            Err(AppError::FieldValidation(m)) => {
                assert_eq!(m["ends_at"], "invalid_date_range");
                assert_eq!(m["capacity"], "invalid_capacity");
                assert_eq!(m["fee"], "invalid_fee");
            }
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }

    #[test]
    fn publication_lifecycle() {
        let now = Utc::now();
        let draft = event(EventStatus::Draft, 0, now);
        assert_eq!(draft.publish(now).unwrap(), EventStatus::Published);
        assert!(draft.publish(now + Duration::days(4)).is_err());
        assert!(draft.complete(now).is_err());

        let published = event(EventStatus::Published, 0, now);
        assert!(published.complete(now).is_err());
        assert_eq!(published.complete(now + Duration::days(4)).unwrap(), EventStatus::Completed);
        assert_eq!(published.cancel().unwrap(), EventStatus::Cancelled);

        assert!(event(EventStatus::Completed, 0, now).cancel().is_err());
    }

    #[test]
    fn registration_respects_status_and_capacity() {
        let now = Utc::now();
        let paid = event(EventStatus::Published, 80, now);
        assert_eq!(paid.check_registration(0, now).unwrap(), PaymentStatus::Pending);
        assert!(matches!(paid.check_registration(2, now), Err(AppError::StateConflict("event_full"))));

        let free = event(EventStatus::Published, 0, now);
        assert_eq!(free.check_registration(1, now).unwrap(), PaymentStatus::Waived);

        let draft = event(EventStatus::Draft, 0, now);
        assert!(matches!(draft.check_registration(0, now), Err(AppError::StateConflict("event_not_open"))));
    }

    #[test]
    fn payment_and_cancellation() {
        let pending = registration(RegistrationStatus::Registered, PaymentStatus::Pending);
        assert_eq!(pending.confirm_payment().unwrap(), PaymentStatus::Paid);
        assert_eq!(pending.cancel().unwrap(), PaymentStatus::Pending);

        let paid = registration(RegistrationStatus::Registered, PaymentStatus::Paid);
        assert!(paid.confirm_payment().is_err());
        assert_eq!(paid.cancel().unwrap(), PaymentStatus::Refunded);

        let cancelled = registration(RegistrationStatus::Cancelled, PaymentStatus::Refunded);
        assert!(cancelled.cancel().is_err());
    }
}
