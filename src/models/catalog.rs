// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Esporte ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub id: Uuid,
    #[schema(example = "Natação")]
    pub name: String,
    pub description: Option<String>,
    // Sempre igual a COUNT(*) de sport_services (mantido pelo CatalogService)
    #[schema(example = 4)]
    pub number_of_services: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Plano (Tier) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: Uuid,
    pub sport_id: Uuid,
    #[schema(example = "gold")]
    pub name: String,
    #[schema(example = "Ouro")]
    pub display_name: String,
    #[schema(example = "1000.00")]
    pub price: Decimal,
    #[schema(example = 30)]
    pub duration_days: i32,
    #[schema(example = "10.00")]
    pub discount_percentage: Decimal,
    // Janela opcional de venda. Limite ausente = sem limite.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tier {
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date.is_none_or(|start| now >= start)
            && self.end_date.is_none_or(|end| now <= end)
    }

    /// Preço com desconto, só para exibição. A cobrança usa `price`.
    pub fn final_price(&self) -> Decimal {
        let factor = Decimal::ONE - self.discount_percentage / Decimal::ONE_HUNDRED;
        (self.price * factor).round_dp(2)
    }
}

// --- 3. Serviço de um esporte ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SportService {
    pub id: Uuid,
    pub sport_id: Uuid,
    #[schema(example = "Avaliação física")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "150.00")]
    pub price: Decimal,
    #[schema(example = 60)]
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plano mais longo aceito (10 anos).
pub const MAX_TIER_DURATION_DAYS: i32 = 3650;

/// Quais esportes precisam ter o contador de serviços recalculado
/// depois de uma escrita em sport_services. Sai em ordem crescente de id,
/// que é a ordem em que as linhas são travadas.
pub fn sports_to_recount(old_sport_id: Option<Uuid>, new_sport_id: Option<Uuid>) -> Vec<Uuid> {
    match (old_sport_id, new_sport_id) {
        (Some(old), Some(new)) if old == new => vec![],
        (Some(old), Some(new)) => vec![old.min(new), old.max(new)],
        (Some(old), None) => vec![old],
        (None, Some(new)) => vec![new],
        (None, None) => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tier(now: DateTime<Utc>) -> Tier {
        Tier {
            id: Uuid::new_v4(),
            sport_id: Uuid::new_v4(),
            name: "gold".into(),
            display_name: "Ouro".into(),
            price: Decimal::new(1000, 0),
            duration_days: 30,
            discount_percentage: Decimal::ZERO,
            start_date: None,
            end_date: None,
            features: vec![],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_ended_window_is_available() {
        let now = Utc::now();
        assert!(tier(now).is_available(now));
    }

    #[test]
    fn window_bounds_are_respected() {
        let now = Utc::now();
        let mut t = tier(now);
        t.start_date = Some(now + Duration::days(1));
        assert!(!t.is_available(now));

        t.start_date = Some(now - Duration::days(10));
        t.end_date = Some(now - Duration::days(1));
        assert!(!t.is_available(now));

        t.end_date = Some(now + Duration::days(1));
        assert!(t.is_available(now));
    }

    #[test]
    fn inactive_tier_is_never_available() {
        let now = Utc::now();
        let mut t = tier(now);
        t.is_active = false;
        assert!(!t.is_available(now));
    }

    #[test]
    fn final_price_applies_discount() {
        let now = Utc::now();
        let mut t = tier(now);
        t.discount_percentage = Decimal::new(15, 0);
        assert_eq!(t.final_price(), Decimal::new(85000, 2));
    }

    #[test]
    fn recount_covers_old_and_new_sport() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(sports_to_recount(None, Some(a)), vec![a]);
        assert_eq!(sports_to_recount(Some(a), None), vec![a]);
        assert_eq!(sports_to_recount(Some(a), Some(b)), vec![a.min(b), a.max(b)]);
        assert_eq!(sports_to_recount(Some(a), Some(b)), sports_to_recount(Some(b), Some(a)));
        assert!(sports_to_recount(Some(a), Some(a)).is_empty());
    }
}
