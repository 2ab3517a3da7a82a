// src/models/service_purchase.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::{
        catalog::SportService,
        counters::CounterEffect,
        membership::{Membership, MembershipStatus},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Completed,
    Cancelled,
    Upcoming,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    #[schema(example = "500.00")]
    pub amount: Decimal,
    pub status: PurchaseStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cadeia de validação da compra: dono da matrícula, matrícula ativa e
/// dentro da validade, serviço ativo e do mesmo esporte.
pub fn validate_purchase(
    user_id: Uuid,
    membership: &Membership,
    service: &SportService,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(membership.user_id == user_id, "membership_id", "membership_not_owned");
    errors.check(membership.status == MembershipStatus::Active, "membership_id", "membership_inactive");
    errors.check(membership.expiry_date >= now, "membership_id", "membership_expired");
    errors.check(service.is_active, "sport_service_id", "service_inactive");
    errors.check(service.sport_id == membership.sport_id, "sport_service_id", "service_sport_mismatch");
    errors.check(amount >= Decimal::ZERO, "amount", "invalid_amount");
    errors.into_result()
}

/// Efeito de gasto na criação: só quando já nasce concluída.
pub fn creation_effects(membership_id: Uuid, status: PurchaseStatus, amount: Decimal) -> Result<Vec<CounterEffect>, AppError> {
    if status == PurchaseStatus::Completed {
        Ok(vec![CounterEffect::spending(membership_id, amount)?])
    } else {
        Ok(vec![])
    }
}

impl ServicePurchase {
    /// Efeitos de uma atualização (status e/ou valor).
    ///
    /// * virou concluída: soma o valor novo
    /// * continua concluída com valor diferente: soma só a diferença
    /// * concluída -> cancelada: estorna o valor antigo
    /// * qualquer outra coisa: nada
    pub fn update_effects(&self, new_status: PurchaseStatus, new_amount: Decimal) -> Result<Vec<CounterEffect>, AppError> {
        if new_amount < Decimal::ZERO {
            return Err(AppError::field("amount", "invalid_amount"));
        }
        let was_completed = self.status == PurchaseStatus::Completed;
        let effects = match (was_completed, new_status) {
            (false, PurchaseStatus::Completed) => vec![CounterEffect::spending(self.membership_id, new_amount)?],
            (true, PurchaseStatus::Completed) => {
                CounterEffect::spending_delta(self.membership_id, new_amount - self.amount).into_iter().collect()
            }
            (true, PurchaseStatus::Cancelled) => vec![CounterEffect::spending_reversal(self.membership_id, self.amount)?],
            _ => vec![],
        };
        Ok(effects)
    }

    pub fn check_transition(&self, new_status: PurchaseStatus) -> Result<(), AppError> {
        match (self.status, new_status) {
            (from, to) if from == to => Ok(()),
            (PurchaseStatus::Upcoming, _) => Ok(()),
            (PurchaseStatus::Completed, PurchaseStatus::Cancelled) => Ok(()),
            (_, PurchaseStatus::Completed) => Err(AppError::StateConflict("purchase_not_completable")),
            _ => Err(AppError::StateConflict("purchase_not_cancellable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::new_membership;
    use crate::models::membership::tests::{membership_from, tier_for};
    use chrono::Duration;

    fn purchase(status: PurchaseStatus, amount: i64) -> ServicePurchase {
        let now = Utc::now();
        ServicePurchase {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            sport_service_id: Uuid::new_v4(),
            amount: Decimal::new(amount, 0),
            status,
            scheduled_for: None,
            payment_reference: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(sport_id: Uuid, is_active: bool) -> SportService {
        let now = Utc::now();
        SportService {
            id: Uuid::new_v4(),
            sport_id,
            name: "Massagem".into(),
            description: None,
            price: Decimal::new(500, 0),
            duration_minutes: None,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn validation_chain() {
        let now = Utc::now();
        let user = Uuid::new_v4();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let membership = membership_from(&new_membership(user, &tier, false, now).unwrap());

        assert!(validate_purchase(user, &membership, &service(membership.sport_id, true), Decimal::new(500, 0), now).is_ok());

        match validate_purchase(Uuid::new_v4(), &membership, &service(Uuid::new_v4(), false), Decimal::new(500, 0), now) {
            Err(AppError::FieldValidation(m)) => {
                assert_eq!(m["membership_id"], "membership_not_owned");
                assert_eq!(m["sport_service_id"], "service_inactive");
            }
            other => panic!("esperava erro de validação, veio {:?}", other),
        }

        let later = now + Duration::days(31);
        assert!(matches!(
            validate_purchase(user, &membership, &service(membership.sport_id, true), Decimal::new(500, 0), later),
            Err(AppError::FieldValidation(ref m)) if m["membership_id"] == "membership_expired"
        ));
    }

    #[test]
    fn completed_creation_adds_spend_once() {
        let id = Uuid::new_v4();
        assert_eq!(
            creation_effects(id, PurchaseStatus::Completed, Decimal::new(500, 0)).unwrap(),
            vec![CounterEffect::MembershipSpend { membership_id: id, amount: Decimal::new(500, 0) }]
        );
        assert!(creation_effects(id, PurchaseStatus::Upcoming, Decimal::new(500, 0)).unwrap().is_empty());
    }

    #[test]
    fn updating_completed_purchase_with_same_amount_does_not_double_count() {
        let p = purchase(PurchaseStatus::Completed, 500);
        assert!(p.update_effects(PurchaseStatus::Completed, Decimal::new(500, 0)).unwrap().is_empty());
    }

    #[test]
    fn amount_change_on_completed_purchase_propagates_delta() {
        let p = purchase(PurchaseStatus::Completed, 500);
        assert_eq!(
            p.update_effects(PurchaseStatus::Completed, Decimal::new(650, 0)).unwrap(),
            vec![CounterEffect::MembershipSpend { membership_id: p.membership_id, amount: Decimal::new(150, 0) }]
        );
        assert_eq!(
            p.update_effects(PurchaseStatus::Completed, Decimal::new(400, 0)).unwrap(),
            vec![CounterEffect::MembershipSpendReversal { membership_id: p.membership_id, amount: Decimal::new(100, 0) }]
        );
    }

    #[test]
    fn completing_and_cancelling() {
        let upcoming = purchase(PurchaseStatus::Upcoming, 500);
        assert_eq!(
            upcoming.update_effects(PurchaseStatus::Completed, Decimal::new(500, 0)).unwrap(),
            vec![CounterEffect::MembershipSpend { membership_id: upcoming.membership_id, amount: Decimal::new(500, 0) }]
        );
        assert!(upcoming.update_effects(PurchaseStatus::Cancelled, Decimal::new(500, 0)).unwrap().is_empty());

        let done = purchase(PurchaseStatus::Completed, 500);
        assert_eq!(
            done.update_effects(PurchaseStatus::Cancelled, Decimal::new(500, 0)).unwrap(),
            vec![CounterEffect::MembershipSpendReversal { membership_id: done.membership_id, amount: Decimal::new(500, 0) }]
        );
    }

    #[test]
    fn transitions() {
        assert!(purchase(PurchaseStatus::Upcoming, 1).check_transition(PurchaseStatus::Completed).is_ok());
        assert!(purchase(PurchaseStatus::Completed, 1).check_transition(PurchaseStatus::Cancelled).is_ok());
        assert!(purchase(PurchaseStatus::Cancelled, 1).check_transition(PurchaseStatus::Completed).is_err());
        assert!(purchase(PurchaseStatus::Expired, 1).check_transition(PurchaseStatus::Cancelled).is_err());
    }
}
