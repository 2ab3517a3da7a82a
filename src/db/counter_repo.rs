// src/db/counter_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::counters::CounterEffect};

/// Aplica os efeitos de contador devolvidos pelas regras de domínio.
/// Sempre incremento no próprio UPDATE; nunca ler-modificar-gravar.
#[derive(Clone, Default)]
pub struct CounterRepository;

impl CounterRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn apply<'e, E>(&self, executor: E, effect: &CounterEffect) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (query, entity) = match effect {
            CounterEffect::MembershipSpend { membership_id, amount } => (
                sqlx::query(
                    r#"
                    UPDATE memberships
                    SET total_spent = total_spent + $2,
                        monthly_spent = monthly_spent + $2,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(*membership_id)
                .bind(*amount),
                "membership",
            ),
            CounterEffect::MembershipSpendReversal { membership_id, amount } => (
                sqlx::query(
                    r#"
                    UPDATE memberships
                    SET total_spent = GREATEST(total_spent - $2, 0),
                        monthly_spent = GREATEST(monthly_spent - $2, 0),
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(*membership_id)
                .bind(*amount),
                "membership",
            ),
            CounterEffect::MembershipEarnings { membership_id, amount } => (
                sqlx::query(
                    r#"
                    UPDATE memberships
                    SET total_earnings = total_earnings + $2,
                        monthly_earnings = monthly_earnings + $2,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(*membership_id)
                .bind(*amount),
                "membership",
            ),
            CounterEffect::TrainerEarnings { trainer_profile_id, amount } => (
                sqlx::query(
                    r#"
                    UPDATE trainer_profiles
                    SET total_earnings = total_earnings + $2,
                        monthly_earnings = monthly_earnings + $2,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(*trainer_profile_id)
                .bind(*amount),
                "trainer_profile",
            ),
            CounterEffect::MembershipCheckIn { membership_id } => (
                sqlx::query(
                    r#"
                    UPDATE memberships
                    SET monthly_check_ins = monthly_check_ins + 1,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(*membership_id),
                "membership",
            ),
        };

        let result = query.execute(executor).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(entity));
        }
        Ok(())
    }
}
