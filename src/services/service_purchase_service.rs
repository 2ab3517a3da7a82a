// src/services/service_purchase_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        service_purchase_repo::NewServicePurchase, CatalogRepository, CounterRepository, MembershipRepository,
        PaymentRepository, ServicePurchaseRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::{
        payment::{NewPayment, PaymentType, TransactionStatus},
        service_purchase::{creation_effects, validate_purchase, PurchaseStatus, ServicePurchase},
    },
};

#[derive(Debug, Clone)]
pub struct CreatePurchase {
    pub user_id: Option<Uuid>,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    pub amount: Option<Decimal>,
    pub status: Option<PurchaseStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

/// Linha de pagamento que uma mudança de compra gera, se gerar.
pub fn payment_for_transition(before: Option<&ServicePurchase>, after: &ServicePurchase) -> Option<(TransactionStatus, Decimal)> {
    let was_completed = before.is_some_and(|p| p.status == PurchaseStatus::Completed);
    match (was_completed, after.status) {
        (false, PurchaseStatus::Completed) => Some((TransactionStatus::Completed, after.amount)),
        (true, PurchaseStatus::Cancelled) => before.map(|p| (TransactionStatus::Refunded, p.amount)),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ServicePurchaseService {
    purchase_repo: ServicePurchaseRepository,
    membership_repo: MembershipRepository,
    catalog_repo: CatalogRepository,
    counter_repo: CounterRepository,
    payment_repo: PaymentRepository,
}

impl ServicePurchaseService {
    pub fn new(
        purchase_repo: ServicePurchaseRepository,
        membership_repo: MembershipRepository,
        catalog_repo: CatalogRepository,
        counter_repo: CounterRepository,
        payment_repo: PaymentRepository,
    ) -> Self {
        Self { purchase_repo, membership_repo, catalog_repo, counter_repo, payment_repo }
    }

    async fn record_payment(
        &self,
        conn: &mut sqlx::PgConnection,
        before: Option<&ServicePurchase>,
        after: &ServicePurchase,
    ) -> Result<(), AppError> {
        if let Some((status, amount)) = payment_for_transition(before, after) {
            self.payment_repo
                .record(
                    &mut *conn,
                    &NewPayment {
                        user_id: after.user_id,
                        payment_type: PaymentType::ServicePurchase,
                        reference_id: after.id,
                        amount,
                        status,
                        transaction_reference: after.payment_reference.as_deref(),
                    },
                )
                .await?;
        }
        Ok(())
    }

    pub async fn create(&self, pool: &PgPool, caller: &AuthenticatedUser, input: CreatePurchase) -> Result<ServicePurchase, AppError> {
        let user_id = input.user_id.unwrap_or(caller.id);
        caller.require_self_or_staff(user_id)?;

        let status = input.status.unwrap_or(PurchaseStatus::Upcoming);
        if !matches!(status, PurchaseStatus::Upcoming | PurchaseStatus::Completed) {
            return Err(AppError::field("status", "invalid_purchase_status"));
        }

        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let membership = self
            .membership_repo
            .find_for_update(&mut *tx, input.membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        let service = self
            .catalog_repo
            .find_service(&mut *tx, input.sport_service_id)
            .await?
            .ok_or(AppError::NotFound("sport_service"))?;

        let amount = input.amount.unwrap_or(service.price);
        validate_purchase(user_id, &membership, &service, amount, now)?;

        let purchase = self
            .purchase_repo
            .create(
                &mut *tx,
                &NewServicePurchase {
                    user_id,
                    membership_id: membership.id,
                    sport_service_id: service.id,
                    amount,
                    status,
                    scheduled_for: input.scheduled_for,
                    payment_reference: input.payment_reference.as_deref(),
                    notes: input.notes.as_deref(),
                },
            )
            .await?;

        for effect in creation_effects(membership.id, status, amount)? {
            self.counter_repo.apply(&mut *tx, &effect).await?;
        }
        self.record_payment(&mut tx, None, &purchase).await?;
        tx.commit().await?;
        Ok(purchase)
    }

    /// Status e/ou valor. Efeitos nos contadores e pagamento na mesma transação.
    pub async fn update(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        purchase_id: Uuid,
        status: Option<PurchaseStatus>,
        amount: Option<Decimal>,
        payment_reference: Option<&str>,
    ) -> Result<ServicePurchase, AppError> {
        let mut tx = pool.begin().await?;
        let current = self
            .purchase_repo
            .find_for_update(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound("service_purchase"))?;
        caller.require_self_or_staff(current.user_id)?;

        let new_status = status.unwrap_or(current.status);
        let new_amount = amount.unwrap_or(current.amount);
        current.check_transition(new_status)?;
        let effects = current.update_effects(new_status, new_amount)?;

        let updated = self
            .purchase_repo
            .update(&mut *tx, purchase_id, new_status, new_amount, payment_reference)
            .await?;
        for effect in &effects {
            self.counter_repo.apply(&mut *tx, effect).await?;
        }
        self.record_payment(&mut tx, Some(&current), &updated).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn complete(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        purchase_id: Uuid,
        payment_reference: Option<&str>,
    ) -> Result<ServicePurchase, AppError> {
        self.update(pool, caller, purchase_id, Some(PurchaseStatus::Completed), None, payment_reference)
            .await
    }

    pub async fn cancel(&self, pool: &PgPool, caller: &AuthenticatedUser, purchase_id: Uuid) -> Result<ServicePurchase, AppError> {
        self.update(pool, caller, purchase_id, Some(PurchaseStatus::Cancelled), None, None)
            .await
    }

    pub async fn list_mine(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<ServicePurchase>, AppError> {
        self.purchase_repo.list_by_user(pool, caller.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn completing_records_a_payment_for_the_new_amount() {
        let before = purchase(PurchaseStatus::Upcoming, 100);
        let mut after = before.clone();
        after.status = PurchaseStatus::Completed;
        after.amount = Decimal::new(120, 0);

        assert_eq!(
            payment_for_transition(Some(&before), &after),
            Some((TransactionStatus::Completed, Decimal::new(120, 0)))
        );
        assert_eq!(
            payment_for_transition(None, &after),
            Some((TransactionStatus::Completed, Decimal::new(120, 0)))
        );
    }

    #[test]
    fn cancelling_a_completed_purchase_refunds_the_old_amount() {
        let before = purchase(PurchaseStatus::Completed, 100);
        let mut after = before.clone();
        after.status = PurchaseStatus::Cancelled;

        assert_eq!(
            payment_for_transition(Some(&before), &after),
            Some((TransactionStatus::Refunded, Decimal::new(100, 0)))
        );
    }

    #[test]
    fn other_changes_write_no_payment() {
        let upcoming = purchase(PurchaseStatus::Upcoming, 100);
        let mut cancelled = upcoming.clone();
        cancelled.status = PurchaseStatus::Cancelled;
        assert_eq!(payment_for_transition(Some(&upcoming), &cancelled), None);

        let completed = purchase(PurchaseStatus::Completed, 100);
        let mut repriced = completed.clone();
        repriced.amount = Decimal::new(80, 0);
        assert_eq!(payment_for_transition(Some(&completed), &repriced), None);
    }
}
