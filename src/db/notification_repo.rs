// src/db/notification_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{DomainEvent, Notification},
};

#[derive(Clone, Default)]
pub struct NotificationRepository;

impl NotificationRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<'e, E>(&self, executor: E, event: &DomainEvent) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, body, reference_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event.user_id())
        .bind(event.kind())
        .bind(event.title())
        .bind(event.body())
        .bind(event.reference_id())
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user<'e, E>(&self, executor: E, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Marca como lida; só o dono enxerga a própria notificação.
    pub async fn mark_read<'e, E>(&self, executor: E, notification_id: Uuid, user_id: Uuid) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }
}
