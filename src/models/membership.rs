// src/models/membership.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::catalog::Tier,
};

// Base para usage_percentage: 30 check-ins no mês = 100%
const CHECK_INS_FOR_FULL_USAGE: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Paused,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    #[schema(example = "MEM48213907")]
    pub membership_number: String,
    pub user_id: Uuid,
    pub sport_id: Uuid,
    // Fica nulo se o plano for apagado; aí não dá mais para renovar.
    pub tier_id: Option<Uuid>,
    pub status: MembershipStatus,
    pub purchase_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub auto_renew: bool,
    #[schema(example = "1000.00")]
    pub purchase_amount: Decimal,
    pub monthly_check_ins: i32,
    pub total_spent: Decimal,
    pub monthly_spent: Decimal,
    // Só faz sentido quando o dono também é treinador
    pub total_earnings: Decimal,
    pub monthly_earnings: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados de uma matrícula nova, prontos para o INSERT.
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub membership_number: String,
    pub user_id: Uuid,
    pub sport_id: Uuid,
    pub tier_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub purchase_amount: Decimal,
}

/// Campos que mudam numa renovação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub purchase_amount: Decimal,
}

/// Matrícula + campos derivados, para as respostas da API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    #[serde(flatten)]
    pub membership: Membership,
    pub is_active: bool,
    pub is_expired: bool,
    pub days_remaining: i64,
    pub usage_percentage: i32,
}

/// "MEM" + 8 dígitos aleatórios
pub fn generate_membership_number() -> String {
    let mut rng = rand::rng();
    format!("MEM{:08}", rng.random_range(0..100_000_000u32))
}

/// Regras de compra. `has_active_for_sport` vem de uma consulta feita
/// dentro da mesma transação.
pub fn validate_purchase(
    sport_id: Uuid,
    tier: &Tier,
    has_active_for_sport: bool,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(tier.sport_id == sport_id, "tier_id", "tier_sport_mismatch");
    errors.check(tier.is_available(now), "tier_id", "tier_unavailable");
    errors.check(!has_active_for_sport, "sport_id", "active_membership_exists");
    errors.into_result()
}

/// Fim da validade de um plano que começa em `start`.
pub fn expiry_from(start: DateTime<Utc>, duration_days: i32) -> Result<DateTime<Utc>, AppError> {
    Duration::try_days(i64::from(duration_days))
        .and_then(|days| start.checked_add_signed(days))
        .ok_or_else(|| AppError::field("duration_days", "out_of_range"))
}

pub fn new_membership(
    user_id: Uuid,
    tier: &Tier,
    auto_renew: bool,
    now: DateTime<Utc>,
) -> Result<NewMembership, AppError> {
    Ok(NewMembership {
        membership_number: generate_membership_number(),
        user_id,
        sport_id: tier.sport_id,
        tier_id: tier.id,
        purchase_date: now,
        start_date: now,
        expiry_date: expiry_from(now, tier.duration_days)?,
        auto_renew,
        purchase_amount: tier.price,
    })
}

impl Membership {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && self.expiry_date >= now
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry_date - now).num_days().max(0)
    }

    pub fn usage_percentage(&self) -> i32 {
        (self.monthly_check_ins * 100 / CHECK_INS_FOR_FULL_USAGE).min(100)
    }

    pub fn can_access_club(&self, club_sport_id: Uuid) -> bool {
        self.sport_id == club_sport_id
    }

    /// expiry_date >= start_date >= purchase_date
    pub fn dates_are_consistent(&self) -> bool {
        self.expiry_date >= self.start_date && self.start_date >= self.purchase_date
    }

    /// Renovação: sem plano não há renovação, e nada muda.
    /// Os contadores mensais são zerados pelo repositório na mesma escrita.
    pub fn renewal(&self, tier: Option<&Tier>, now: DateTime<Utc>) -> Result<Renewal, AppError> {
        if self.status == MembershipStatus::Cancelled {
            return Err(AppError::StateConflict("membership_cancelled"));
        }
        let tier = tier.ok_or(AppError::StateConflict("membership_without_tier"))?;
        // start_date não pode voltar para antes da compra
        let start_date = now.max(self.purchase_date);
        Ok(Renewal {
            start_date,
            expiry_date: expiry_from(start_date, tier.duration_days)?,
            purchase_amount: tier.price,
        })
    }

    /// Aplica a renovação em memória (mesmo efeito do UPDATE do repositório).
    pub fn apply_renewal(&mut self, renewal: &Renewal) {
        self.status = MembershipStatus::Active;
        self.start_date = renewal.start_date;
        self.expiry_date = renewal.expiry_date;
        self.purchase_amount = renewal.purchase_amount;
        self.monthly_check_ins = 0;
        self.monthly_spent = Decimal::ZERO;
    }

    pub fn pause_status(&self) -> Result<MembershipStatus, AppError> {
        match self.status {
            MembershipStatus::Cancelled => Err(AppError::StateConflict("membership_cancelled")),
            _ => Ok(MembershipStatus::Paused),
        }
    }

    pub fn resume_status(&self) -> Result<MembershipStatus, AppError> {
        match self.status {
            MembershipStatus::Cancelled => Err(AppError::StateConflict("membership_cancelled")),
            _ => Ok(MembershipStatus::Active),
        }
    }

    /// Cancelar é terminal e idempotente.
    pub fn cancel_status(&self) -> MembershipStatus {
        MembershipStatus::Cancelled
    }

    pub fn view(self, now: DateTime<Utc>) -> MembershipView {
        MembershipView {
            is_active: self.is_active(now),
            is_expired: self.is_expired(now),
            days_remaining: self.days_remaining(now),
            usage_percentage: self.usage_percentage(),
            membership: self,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tier_for(sport_id: Uuid, price: i64, days: i32) -> Tier {
        let now = Utc::now();
        Tier {
            id: Uuid::new_v4(),
            sport_id,
            name: "gold".into(),
            display_name: "Ouro".into(),
            price: Decimal::new(price, 0),
            duration_days: days,
            discount_percentage: Decimal::ZERO,
            start_date: None,
            end_date: None,
            features: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn membership_from(new: &NewMembership) -> Membership {
        Membership {
            id: Uuid::new_v4(),
            membership_number: new.membership_number.clone(),
            user_id: new.user_id,
            sport_id: new.sport_id,
            tier_id: Some(new.tier_id),
            status: MembershipStatus::Active,
            purchase_date: new.purchase_date,
            start_date: new.start_date,
            expiry_date: new.expiry_date,
            auto_renew: new.auto_renew,
            purchase_amount: new.purchase_amount,
            monthly_check_ins: 0,
            total_spent: Decimal::ZERO,
            monthly_spent: Decimal::ZERO,
            total_earnings: Decimal::ZERO,
            monthly_earnings: Decimal::ZERO,
            created_at: new.purchase_date,
            updated_at: new.purchase_date,
        }
    }

    #[test]
    fn purchase_sets_dates_and_amount_from_tier() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let new = new_membership(Uuid::new_v4(), &tier, false, now).unwrap();

        assert!(new.membership_number.starts_with("MEM"));
        assert_eq!(new.membership_number.len(), 11);
        assert_eq!(new.expiry_date, new.start_date + Duration::days(30));
        assert_eq!(new.purchase_amount, Decimal::new(1000, 0));
        assert!(membership_from(&new).dates_are_consistent());
    }

    #[test]
    fn huge_tier_duration_is_a_field_error_not_a_panic() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, i32::MAX);

        match new_membership(Uuid::new_v4(), &tier, false, now) {
            Err(AppError::FieldValidation(map)) => assert_eq!(map["duration_days"], "out_of_range"),
            other => panic!("esperava erro de validação, veio {:?}", other),
        }

        let m = membership_from(&new_membership(Uuid::new_v4(), &tier_for(tier.sport_id, 1000, 30), false, now).unwrap());
        assert!(matches!(m.renewal(Some(&tier), now), Err(AppError::FieldValidation(_))));
    }

    #[test]
    fn purchase_rejects_second_active_membership_and_foreign_tier() {
        let now = Utc::now();
        let sport = Uuid::new_v4();
        let tier = tier_for(sport, 1000, 30);

        assert!(validate_purchase(sport, &tier, false, now).is_ok());

        match validate_purchase(sport, &tier, true, now) {
            Err(AppError::FieldValidation(map)) => assert_eq!(map["sport_id"], "active_membership_exists"),
            other => panic!("esperava erro de validação, veio {:?}", other),
        }

        match validate_purchase(Uuid::new_v4(), &tier, false, now) {
            Err(AppError::FieldValidation(map)) => assert_eq!(map["tier_id"], "tier_sport_mismatch"),
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
    }

    #[test]
    fn derived_fields() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());

        assert!(m.is_active(now));
        assert!(!m.is_expired(now));
        assert_eq!(m.days_remaining(now), 30);

        m.monthly_check_ins = 15;
        assert_eq!(m.usage_percentage(), 50);
        m.monthly_check_ins = 45;
        assert_eq!(m.usage_percentage(), 100);

        let later = now + Duration::days(31);
        assert!(m.is_expired(later));
        assert!(!m.is_active(later));
        assert_eq!(m.days_remaining(later), 0);

        m.status = MembershipStatus::Paused;
        assert!(!m.is_active(now));
    }

    #[test]
    fn renew_without_tier_fails_and_changes_nothing() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());
        m.tier_id = None;
        m.monthly_check_ins = 7;
        let before = format!("{:?}", m);

        let result = m.renewal(None, now + Duration::days(40));
        assert!(matches!(result, Err(AppError::StateConflict("membership_without_tier"))));
        assert_eq!(format!("{:?}", m), before);
    }

    #[test]
    fn renew_resets_monthly_counters_but_keeps_lifetime_totals() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());
        m.status = MembershipStatus::Expired;
        m.monthly_check_ins = 12;
        m.monthly_spent = Decimal::new(300, 0);
        m.total_spent = Decimal::new(1300, 0);
        m.total_earnings = Decimal::new(50, 0);

        let renewed_tier = tier_for(m.sport_id, 1200, 60);
        let later = now + Duration::days(45);
        let renewal = m.renewal(Some(&renewed_tier), later).unwrap();
        m.apply_renewal(&renewal);

        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.start_date, later);
        assert_eq!(m.expiry_date, later + Duration::days(60));
        assert_eq!(m.purchase_amount, Decimal::new(1200, 0));
        assert_eq!(m.monthly_check_ins, 0);
        assert_eq!(m.monthly_spent, Decimal::ZERO);
        assert_eq!(m.total_spent, Decimal::new(1300, 0));
        assert_eq!(m.total_earnings, Decimal::new(50, 0));
        assert!(m.dates_are_consistent());
    }

    #[test]
    fn cancelled_is_terminal_for_pause_and_resume() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());

        assert_eq!(m.pause_status().unwrap(), MembershipStatus::Paused);
        m.status = MembershipStatus::Paused;
        assert_eq!(m.pause_status().unwrap(), MembershipStatus::Paused);
        assert_eq!(m.resume_status().unwrap(), MembershipStatus::Active);

        m.status = m.cancel_status();
        assert!(m.pause_status().is_err());
        assert!(m.resume_status().is_err());
        assert_eq!(m.cancel_status(), MembershipStatus::Cancelled);
        assert!(matches!(m.renewal(Some(&tier), now), Err(AppError::StateConflict("membership_cancelled"))));
    }

    #[test]
    fn club_access_follows_sport() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let m = membership_from(&new_membership(Uuid::new_v4(), &tier, false, now).unwrap());
        assert!(m.can_access_club(m.sport_id));
        assert!(!m.can_access_club(Uuid::new_v4()));
    }
}
