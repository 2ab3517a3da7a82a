// src/db/membership_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::membership::{Membership, MembershipStatus, NewMembership, Renewal},
};

#[derive(Clone, Default)]
pub struct MembershipRepository;

impl MembershipRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewMembership) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (
                membership_number, user_id, sport_id, tier_id, status,
                purchase_date, start_date, expiry_date, auto_renew, purchase_amount
            )
            VALUES ($1, $2, $3, $4, 'active', $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&new.membership_number)
        .bind(new.user_id)
        .bind(new.sport_id)
        .bind(new.tier_id)
        .bind(new.purchase_date)
        .bind(new.start_date)
        .bind(new.expiry_date)
        .bind(new.auto_renew)
        .bind(new.purchase_amount)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, &[("memberships_membership_number_key", "membership_number_taken")])
        })
    }

    pub async fn find<'e, E>(&self, executor: E, membership_id: Uuid) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
            .bind(membership_id)
            .fetch_optional(executor)
            .await?;
        Ok(membership)
    }

    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
    ) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1 FOR UPDATE")
            .bind(membership_id)
            .fetch_optional(executor)
            .await?;
        Ok(membership)
    }

    /// Trava a linha do usuário: compras do mesmo usuário ficam em fila
    /// até o commit da anterior.
    pub async fn lock_owner<'e, E>(&self, executor: E, user_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::UserNotFound)?;
        Ok(())
    }

    /// Matrícula ativa e dentro da validade do usuário naquele esporte.
    pub async fn find_active_for_sport<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        sport_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT * FROM memberships
            WHERE user_id = $1 AND sport_id = $2 AND status = 'active' AND expiry_date >= $3
            ORDER BY expiry_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(sport_id)
        .bind(now)
        .fetch_optional(executor)
        .await?;
        Ok(membership)
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let memberships = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE user_id = $1 ORDER BY purchase_date DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(memberships)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
        status: MembershipStatus,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(membership_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("membership"))
    }

    /// Renovação: datas e valor novos, contadores mensais zerados.
    /// Os totais (gasto e ganhos) continuam.
    pub async fn apply_renewal<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
        renewal: &Renewal,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships
            SET status = 'active',
                start_date = $2,
                expiry_date = $3,
                purchase_amount = $4,
                monthly_check_ins = 0,
                monthly_spent = 0,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(membership_id)
        .bind(renewal.start_date)
        .bind(renewal.expiry_date)
        .bind(renewal.purchase_amount)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("membership"))
    }

    pub async fn set_auto_renew<'e, E>(
        &self,
        executor: E,
        membership_id: Uuid,
        auto_renew: bool,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET auto_renew = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(membership_id)
        .bind(auto_renew)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("membership"))
    }

    /// IDs das matrículas com renovação automática já vencidas.
    pub async fn due_auto_renewals<'e, E>(&self, executor: E, now: DateTime<Utc>) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM memberships
            WHERE auto_renew AND status = 'active' AND expiry_date < $1
            ORDER BY expiry_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    /// Registra o período no livro de resets. `false` se já existia.
    pub async fn claim_reset_period<'e, E>(&self, executor: E, period: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "INSERT INTO monthly_counter_resets (period) VALUES ($1) ON CONFLICT (period) DO NOTHING",
        )
        .bind(period)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn reset_monthly_counters<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET monthly_check_ins = 0, monthly_spent = 0, monthly_earnings = 0, updated_at = NOW()
            WHERE monthly_check_ins <> 0 OR monthly_spent <> 0 OR monthly_earnings <> 0
            "#,
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
