// src/db/event_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::{
        event::{Event, EventRegistration, EventStatus, RegistrationStatus},
        trainer::PaymentStatus,
    },
};

#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub club_id: Uuid,
    pub sport_id: Option<Uuid>,
    pub organizer_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub fee: Decimal,
}

#[derive(Clone, Default)]
pub struct EventRepository;

impl EventRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, event: &NewEvent<'_>) -> Result<Event, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                club_id, sport_id, organizer_id, title, description,
                starts_at, ends_at, capacity, fee
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(event.club_id)
        .bind(event.sport_id)
        .bind(event.organizer_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(event.fee)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find<'e, E>(&self, executor: E, event_id: Uuid) -> Result<Option<Event>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Trava a linha do evento: inscrições concorrentes fazem fila aqui.
    pub async fn find_for_update<'e, E>(&self, executor: E, event_id: Uuid) -> Result<Option<Event>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Eventos publicados, opcionalmente de um clube.
    pub async fn list_published<'e, E>(&self, executor: E, club_id: Option<Uuid>) -> Result<Vec<Event>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'published' AND ($1::uuid IS NULL OR club_id = $1)
            ORDER BY starts_at ASC
            "#,
        )
        .bind(club_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn update_status<'e, E>(&self, executor: E, event_id: Uuid, status: EventStatus) -> Result<Event, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Event>("UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
            .bind(event_id)
            .bind(status)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("event"))
    }

    // --- Inscrições ---

    pub async fn count_active_registrations<'e, E>(&self, executor: E, event_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = $1 AND status = 'registered'",
        )
        .bind(event_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Cria a inscrição. Uma inscrição cancelada do mesmo usuário é reaproveitada.
    pub async fn register<'e, E>(
        &self,
        executor: E,
        event_id: Uuid,
        user_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<EventRegistration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (event_id, user_id, status, payment_status)
            VALUES ($1, $2, 'registered', $3)
            ON CONFLICT (event_id, user_id) DO UPDATE
                SET status = 'registered', payment_status = EXCLUDED.payment_status,
                    payment_reference = NULL, registered_at = NOW(), updated_at = NOW()
                WHERE event_registrations.status = 'cancelled'
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(payment_status)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique_violation(e, &[("event_registrations_event_user_key", "already_registered")]))?
        // Sem linha de volta: já existe inscrição ativa
        .ok_or_else(|| AppError::UniqueConstraintViolation("already_registered".to_string()))
    }

    pub async fn find_registration_for_update<'e, E>(
        &self,
        executor: E,
        registration_id: Uuid,
    ) -> Result<Option<EventRegistration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE id = $1 FOR UPDATE",
        )
        .bind(registration_id)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    pub async fn list_registrations<'e, E>(&self, executor: E, event_id: Uuid) -> Result<Vec<EventRegistration>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC",
        )
        .bind(event_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn update_registration<'e, E>(
        &self,
        executor: E,
        registration_id: Uuid,
        status: RegistrationStatus,
        payment_status: PaymentStatus,
        payment_reference: Option<&str>,
    ) -> Result<EventRegistration, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EventRegistration>(
            r#"
            UPDATE event_registrations
            SET status = $2, payment_status = $3,
                payment_reference = COALESCE($4, payment_reference),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(registration_id)
        .bind(status)
        .bind(payment_status)
        .bind(payment_reference)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("event_registration"))
    }
}
