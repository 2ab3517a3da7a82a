// src/models/counters.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::common::error::AppError;

/// Escrita de contador que acompanha uma operação principal.
///
/// As regras de domínio devolvem a lista de efeitos; quem aplica é o
/// `CounterRepository`, dentro da mesma transação da escrita principal,
/// sempre com incremento no próprio UPDATE (`SET x = x + $1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterEffect {
    /// total_spent e monthly_spent da matrícula
    MembershipSpend { membership_id: Uuid, amount: Decimal },
    /// Estorno de gasto (cancelamento de compra concluída). Nunca fica negativo.
    MembershipSpendReversal { membership_id: Uuid, amount: Decimal },
    /// total_earnings e monthly_earnings da matrícula (usuário treinador)
    MembershipEarnings { membership_id: Uuid, amount: Decimal },
    /// total_earnings e monthly_earnings do perfil de treinador
    TrainerEarnings { trainer_profile_id: Uuid, amount: Decimal },
    /// monthly_check_ins + 1
    MembershipCheckIn { membership_id: Uuid },
}

fn non_negative(amount: Decimal) -> Result<Decimal, AppError> {
    if amount < Decimal::ZERO {
        return Err(AppError::field("amount", "invalid_amount"));
    }
    Ok(amount)
}

impl CounterEffect {
    pub fn spending(membership_id: Uuid, amount: Decimal) -> Result<Self, AppError> {
        Ok(CounterEffect::MembershipSpend { membership_id, amount: non_negative(amount)? })
    }

    pub fn spending_reversal(membership_id: Uuid, amount: Decimal) -> Result<Self, AppError> {
        Ok(CounterEffect::MembershipSpendReversal { membership_id, amount: non_negative(amount)? })
    }

    pub fn membership_earnings(membership_id: Uuid, amount: Decimal) -> Result<Self, AppError> {
        Ok(CounterEffect::MembershipEarnings { membership_id, amount: non_negative(amount)? })
    }

    pub fn trainer_earnings(trainer_profile_id: Uuid, amount: Decimal) -> Result<Self, AppError> {
        Ok(CounterEffect::TrainerEarnings { trainer_profile_id, amount: non_negative(amount)? })
    }

    pub fn check_in(membership_id: Uuid) -> Self {
        CounterEffect::MembershipCheckIn { membership_id }
    }

    /// Efeito de gasto para uma variação de valor (positiva ou negativa).
    /// Variação zero não gera escrita nenhuma.
    pub fn spending_delta(membership_id: Uuid, delta: Decimal) -> Option<Self> {
        if delta > Decimal::ZERO {
            Some(CounterEffect::MembershipSpend { membership_id, amount: delta })
        } else if delta < Decimal::ZERO {
            Some(CounterEffect::MembershipSpendReversal { membership_id, amount: -delta })
        } else {
            None
        }
    }
}

/// Chave do período mensal (UTC) usada para zerar contadores uma vez por mês.
pub fn monthly_period(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn negative_amounts_are_rejected() {
        let id = Uuid::new_v4();
        assert!(CounterEffect::spending(id, Decimal::new(-1, 0)).is_err());
        assert!(CounterEffect::trainer_earnings(id, Decimal::new(-1, 2)).is_err());
        assert!(CounterEffect::spending(id, Decimal::ZERO).is_ok());
    }

    #[test]
    fn delta_picks_direction() {
        let id = Uuid::new_v4();
        assert_eq!(
            CounterEffect::spending_delta(id, Decimal::new(100, 0)),
            Some(CounterEffect::MembershipSpend { membership_id: id, amount: Decimal::new(100, 0) })
        );
        assert_eq!(
            CounterEffect::spending_delta(id, Decimal::new(-40, 0)),
            Some(CounterEffect::MembershipSpendReversal { membership_id: id, amount: Decimal::new(40, 0) })
        );
        assert_eq!(CounterEffect::spending_delta(id, Decimal::ZERO), None);
    }

    #[test]
    fn period_is_calendar_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 0).unwrap();
        assert_eq!(monthly_period(now), "2026-03");
    }
}
