// src/db/trainer_request_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::trainer_request::{TrainerRequest, TrainerRequestDraft, TrainerRequestStatus},
};

#[derive(Clone, Default)]
pub struct TrainerRequestRepository;

impl TrainerRequestRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        draft: &TrainerRequestDraft,
        expires_at: DateTime<Utc>,
    ) -> Result<TrainerRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, TrainerRequest>(
            r#"
            INSERT INTO trainer_requests (
                user_id, membership_id, sport_service_id, request_type,
                trainer_profile_id, club_id, preferred_time_slots, message, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(draft.user_id)
        .bind(draft.membership_id)
        .bind(draft.sport_service_id)
        .bind(draft.request_type)
        .bind(draft.trainer_profile_id)
        .bind(draft.club_id)
        .bind(Json(&draft.preferred_time_slots))
        .bind(draft.message.as_deref())
        .bind(expires_at)
        .fetch_one(executor)
        .await?;
        Ok(request)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, request_id: Uuid) -> Result<Option<TrainerRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, TrainerRequest>("SELECT * FROM trainer_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id)
            .fetch_optional(executor)
            .await?;
        Ok(request)
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<TrainerRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requests = sqlx::query_as::<_, TrainerRequest>(
            "SELECT * FROM trainer_requests WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(requests)
    }

    /// Pedidos pendentes que um treinador pode ver: os dirigidos a ele e
    /// os abertos do esporte dele.
    pub async fn list_open_for_trainer<'e, E>(
        &self,
        executor: E,
        trainer_profile_id: Uuid,
        sport_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrainerRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requests = sqlx::query_as::<_, TrainerRequest>(
            r#"
            SELECT r.* FROM trainer_requests r
            JOIN memberships m ON m.id = r.membership_id
            WHERE r.status = 'pending'
              AND r.expires_at >= $3
              AND (
                    r.trainer_profile_id = $1
                    OR (r.request_type = 'open_request' AND m.sport_id = $2)
                  )
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(trainer_profile_id)
        .bind(sport_id)
        .bind(now)
        .fetch_all(executor)
        .await?;
        Ok(requests)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        status: TrainerRequestStatus,
    ) -> Result<TrainerRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerRequest>(
            "UPDATE trainer_requests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_request"))
    }

    pub async fn mark_accepted<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        trainer_profile_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TrainerRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TrainerRequest>(
            r#"
            UPDATE trainer_requests
            SET status = 'accepted', accepted_by_trainer_id = $2, accepted_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(trainer_profile_id)
        .bind(now)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("trainer_request"))
    }

    /// Expira em lote os pendentes vencidos. Devolve quantos mudaram.
    pub async fn expire_stale<'e, E>(&self, executor: E, now: DateTime<Utc>) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE trainer_requests
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'pending' AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
