// src/db/check_in_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::check_in::CheckIn};

#[derive(Clone, Default)]
pub struct CheckInRepository;

impl CheckInRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        club_id: Uuid,
        membership_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CheckIn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (user_id, club_id, membership_id, checked_in_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(club_id)
        .bind(membership_id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, check_in_id: Uuid) -> Result<Option<CheckIn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, CheckIn>("SELECT * FROM check_ins WHERE id = $1 FOR UPDATE")
            .bind(check_in_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn check_out<'e, E>(&self, executor: E, check_in_id: Uuid, now: DateTime<Utc>) -> Result<CheckIn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CheckIn>(
            "UPDATE check_ins SET checked_out_at = $2 WHERE id = $1 AND checked_out_at IS NULL RETURNING *",
        )
        .bind(check_in_id)
        .bind(now)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::StateConflict("already_checked_out"))
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<CheckIn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CheckIn>(
            "SELECT * FROM check_ins WHERE user_id = $1 ORDER BY checked_in_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
