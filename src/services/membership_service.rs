// src/services/membership_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, MembershipRepository, PaymentRepository, TrainerRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        counters::monthly_period,
        membership::{self, Membership, MembershipStatus, MembershipView},
        notification::DomainEvent,
        payment::{NewPayment, PaymentType, TransactionStatus},
    },
    services::notification_service::NotificationService,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResetSummary {
    #[schema(example = "2026-10")]
    pub period: String,
    pub memberships_reset: u64,
    pub trainers_reset: u64,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoRenewalSummary {
    pub renewed: u64,
    pub skipped: u64,
}

/// Período "YYYY-MM". Sem período, usa o mês corrente (UTC).
pub fn resolve_period(period: Option<&str>, now: DateTime<Utc>) -> Result<String, AppError> {
    match period {
        None => Ok(monthly_period(now)),
        Some(p) => {
            let valid = p.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", p), "%Y-%m-%d").is_ok();
            if valid {
                Ok(p.to_string())
            } else {
                Err(AppError::field("period", "invalid_period"))
            }
        }
    }
}

/// Ainda elegível quando a linha é relida dentro da transação.
fn is_due_for_auto_renewal(m: &Membership, now: DateTime<Utc>) -> bool {
    m.auto_renew && m.status == MembershipStatus::Active && m.expiry_date < now
}

#[derive(Clone)]
pub struct MembershipService {
    membership_repo: MembershipRepository,
    catalog_repo: CatalogRepository,
    trainer_repo: TrainerRepository,
    payment_repo: PaymentRepository,
    notifications: NotificationService,
}

impl MembershipService {
    pub fn new(
        membership_repo: MembershipRepository,
        catalog_repo: CatalogRepository,
        trainer_repo: TrainerRepository,
        payment_repo: PaymentRepository,
        notifications: NotificationService,
    ) -> Self {
        Self { membership_repo, catalog_repo, trainer_repo, payment_repo, notifications }
    }

    pub async fn purchase(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        sport_id: Uuid,
        tier_id: Uuid,
        auto_renew: bool,
    ) -> Result<MembershipView, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        self.membership_repo.lock_owner(&mut *tx, caller.id).await?;

        let tier = self
            .catalog_repo
            .find_tier(&mut *tx, tier_id)
            .await?
            .ok_or(AppError::NotFound("tier"))?;

        let has_active = self
            .membership_repo
            .find_active_for_sport(&mut *tx, caller.id, sport_id, now)
            .await?
            .is_some();

        membership::validate_purchase(sport_id, &tier, has_active, now)?;

        let new = membership::new_membership(caller.id, &tier, auto_renew, now)?;
        let created = self.membership_repo.create(&mut *tx, &new).await?;

        self.payment_repo
            .record(
                &mut *tx,
                &NewPayment {
                    user_id: caller.id,
                    payment_type: PaymentType::Membership,
                    reference_id: created.id,
                    amount: created.purchase_amount,
                    status: TransactionStatus::Completed,
                    transaction_reference: None,
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!("🎟️ Matrícula {} comprada por {}", created.membership_number, caller.id);
        self.notifications.publish(vec![DomainEvent::MembershipPurchased {
            user_id: created.user_id,
            membership_id: created.id,
            membership_number: created.membership_number.clone(),
        }]);

        Ok(created.view(now))
    }

    pub async fn get(&self, pool: &PgPool, caller: &AuthenticatedUser, membership_id: Uuid) -> Result<MembershipView, AppError> {
        let m = self
            .membership_repo
            .find(pool, membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        caller.require_self_or_staff(m.user_id)?;
        Ok(m.view(Utc::now()))
    }

    pub async fn list_mine(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<MembershipView>, AppError> {
        let now = Utc::now();
        let memberships = self.membership_repo.list_by_user(pool, caller.id).await?;
        Ok(memberships.into_iter().map(|m| m.view(now)).collect())
    }

    /// Carrega com lock e confere se o chamador pode mexer na matrícula.
    async fn lock_owned(
        &self,
        tx: &mut sqlx::PgConnection,
        caller: &AuthenticatedUser,
        membership_id: Uuid,
    ) -> Result<Membership, AppError> {
        let m = self
            .membership_repo
            .find_for_update(&mut *tx, membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        caller.require_self_or_staff(m.user_id)?;
        Ok(m)
    }

    pub async fn renew(&self, pool: &PgPool, caller: &AuthenticatedUser, membership_id: Uuid) -> Result<MembershipView, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let current = self.lock_owned(&mut tx, caller, membership_id).await?;

        let renewed = self.renew_locked(&mut tx, &current, now).await?;
        tx.commit().await?;

        self.announce_renewal(&renewed);
        Ok(renewed.view(now))
    }

    // Renovação + pagamento, dentro da transação de quem chamou.
    async fn renew_locked(
        &self,
        tx: &mut sqlx::PgConnection,
        current: &Membership,
        now: DateTime<Utc>,
    ) -> Result<Membership, AppError> {
        let tier = match current.tier_id {
            Some(tier_id) => self.catalog_repo.find_tier(&mut *tx, tier_id).await?,
            None => None,
        };
        let renewal = current.renewal(tier.as_ref(), now)?;

        let renewed = self.membership_repo.apply_renewal(&mut *tx, current.id, &renewal).await?;
        self.payment_repo
            .record(
                &mut *tx,
                &NewPayment {
                    user_id: renewed.user_id,
                    payment_type: PaymentType::Membership,
                    reference_id: renewed.id,
                    amount: renewed.purchase_amount,
                    status: TransactionStatus::Completed,
                    transaction_reference: None,
                },
            )
            .await?;
        Ok(renewed)
    }

    fn announce_renewal(&self, renewed: &Membership) {
        tracing::info!("🔁 Matrícula {} renovada até {}", renewed.membership_number, renewed.expiry_date);
        self.notifications.publish(vec![DomainEvent::MembershipRenewed {
            user_id: renewed.user_id,
            membership_id: renewed.id,
            expiry_date: renewed.expiry_date,
        }]);
    }

    pub async fn pause(&self, pool: &PgPool, caller: &AuthenticatedUser, membership_id: Uuid) -> Result<MembershipView, AppError> {
        self.change_status(pool, caller, membership_id, Membership::pause_status).await
    }

    pub async fn resume(&self, pool: &PgPool, caller: &AuthenticatedUser, membership_id: Uuid) -> Result<MembershipView, AppError> {
        self.change_status(pool, caller, membership_id, Membership::resume_status).await
    }

    pub async fn cancel(&self, pool: &PgPool, caller: &AuthenticatedUser, membership_id: Uuid) -> Result<MembershipView, AppError> {
        self.change_status(pool, caller, membership_id, |m| Ok(m.cancel_status())).await
    }

    async fn change_status<F>(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        membership_id: Uuid,
        next_status: F,
    ) -> Result<MembershipView, AppError>
    where
        F: FnOnce(&Membership) -> Result<MembershipStatus, AppError>,
    {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let current = self.lock_owned(&mut tx, caller, membership_id).await?;

        let status = next_status(&current)?;
        if status == current.status {
            // Idempotente: nada a gravar
            return Ok(current.view(now));
        }

        let updated = self.membership_repo.update_status(&mut *tx, membership_id, status).await?;
        tx.commit().await?;
        Ok(updated.view(now))
    }

    pub async fn set_auto_renew(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        membership_id: Uuid,
        auto_renew: bool,
    ) -> Result<MembershipView, AppError> {
        let mut tx = pool.begin().await?;
        self.lock_owned(&mut tx, caller, membership_id).await?;
        let updated = self.membership_repo.set_auto_renew(&mut *tx, membership_id, auto_renew).await?;
        tx.commit().await?;
        Ok(updated.view(Utc::now()))
    }

    /// Zera contadores mensais de matrículas e treinadores numa transação só.
    /// Cada período só pode ser zerado uma vez.
    pub async fn reset_monthly_counters(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        period: Option<&str>,
    ) -> Result<MonthlyResetSummary, AppError> {
        caller.require_staff()?;
        let period = resolve_period(period, Utc::now())?;

        let mut tx = pool.begin().await?;
        if !self.membership_repo.claim_reset_period(&mut *tx, &period).await? {
            return Err(AppError::StateConflict("monthly_reset_already_done"));
        }
        let memberships_reset = self.membership_repo.reset_monthly_counters(&mut *tx).await?;
        let trainers_reset = self.trainer_repo.reset_monthly_earnings(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(
            "🧮 Contadores mensais zerados ({}): {} matrículas, {} treinadores",
            period,
            memberships_reset,
            trainers_reset
        );
        Ok(MonthlyResetSummary { period, memberships_reset, trainers_reset })
    }

    /// Renova as matrículas com auto_renew vencidas, uma transação por matrícula.
    pub async fn process_auto_renewals(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<AutoRenewalSummary, AppError> {
        caller.require_staff()?;
        let now = Utc::now();
        let mut summary = AutoRenewalSummary::default();

        for membership_id in self.membership_repo.due_auto_renewals(pool, now).await? {
            let mut tx = pool.begin().await?;
            let Some(current) = self.membership_repo.find_for_update(&mut *tx, membership_id).await? else {
                continue;
            };
            if !is_due_for_auto_renewal(&current, now) {
                continue;
            }

            match self.renew_locked(&mut tx, &current, now).await {
                Ok(renewed) => {
                    tx.commit().await?;
                    summary.renewed += 1;
                    self.announce_renewal(&renewed);
                }
                Err(AppError::StateConflict(code)) => {
                    tracing::warn!("⚠️ Renovação automática ignorada para {}: {}", current.membership_number, code);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::new_membership;
    use crate::models::membership::tests::{membership_from, tier_for};
    use chrono::{Duration, TimeZone};

    #[test]
    fn period_defaults_to_current_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(resolve_period(None, now).unwrap(), "2026-03");
        assert_eq!(resolve_period(Some("2025-12"), now).unwrap(), "2025-12");
    }

    #[test]
    fn malformed_periods_are_rejected() {
        let now = Utc::now();
        for bad in ["2026-13", "2026-3", "março", "2026-03-01"] {
            match resolve_period(Some(bad), now) {
                Err(AppError::FieldValidation(map)) => assert_eq!(map["period"], "invalid_period"),
                other => panic!("{} deveria falhar, veio {:?}", bad, other),
            }
        }
    }

    #[test]
    fn only_active_expired_auto_renew_memberships_are_due() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(Uuid::new_v4(), &tier, true, now - Duration::days(40)).unwrap());

        assert!(is_due_for_auto_renewal(&m, now));

        m.auto_renew = false;
        assert!(!is_due_for_auto_renewal(&m, now));

        m.auto_renew = true;
        m.status = MembershipStatus::Paused;
        assert!(!is_due_for_auto_renewal(&m, now));

        m.status = MembershipStatus::Active;
        assert!(!is_due_for_auto_renewal(&m, now - Duration::days(20)));
    }
}
