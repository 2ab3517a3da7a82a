// src/services/event_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{event_repo::NewEvent, ClubRepository, EventRepository, PaymentRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        event::{validate_event_fields, Event, EventRegistration, EventStatus, RegistrationStatus},
        notification::DomainEvent,
        payment::{NewPayment, PaymentType, TransactionStatus},
        trainer::PaymentStatus,
    },
    services::notification_service::NotificationService,
};

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub club_id: Uuid,
    pub sport_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub fee: Decimal,
}

fn can_manage(caller: &AuthenticatedUser, event: &Event) -> bool {
    event.organizer_id == caller.id || caller.is_staff()
}

#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    club_repo: ClubRepository,
    payment_repo: PaymentRepository,
    notifications: NotificationService,
}

impl EventService {
    pub fn new(
        event_repo: EventRepository,
        club_repo: ClubRepository,
        payment_repo: PaymentRepository,
        notifications: NotificationService,
    ) -> Self {
        Self { event_repo, club_repo, payment_repo, notifications }
    }

    pub async fn create(&self, pool: &PgPool, caller: &AuthenticatedUser, input: CreateEvent) -> Result<Event, AppError> {
        caller.require_staff()?;
        validate_event_fields(input.starts_at, input.ends_at, input.capacity, input.fee)?;

        let club = self
            .club_repo
            .find_club(pool, input.club_id)
            .await?
            .ok_or(AppError::NotFound("club"))?;
        if input.sport_id.is_some_and(|sport_id| sport_id != club.sport_id) {
            return Err(AppError::field("sport_id", "club_sport_mismatch"));
        }

        self.event_repo
            .create(
                pool,
                &NewEvent {
                    club_id: club.id,
                    sport_id: Some(input.sport_id.unwrap_or(club.sport_id)),
                    organizer_id: caller.id,
                    title: input.title.trim(),
                    description: input.description.as_deref(),
                    starts_at: input.starts_at,
                    ends_at: input.ends_at,
                    capacity: input.capacity,
                    fee: input.fee,
                },
            )
            .await
    }

    pub async fn get(&self, pool: &PgPool, event_id: Uuid) -> Result<Event, AppError> {
        self.event_repo.find(pool, event_id).await?.ok_or(AppError::NotFound("event"))
    }

    pub async fn list_published(&self, pool: &PgPool, club_id: Option<Uuid>) -> Result<Vec<Event>, AppError> {
        self.event_repo.list_published(pool, club_id).await
    }

    async fn lock_managed(&self, tx: &mut PgConnection, caller: &AuthenticatedUser, event_id: Uuid) -> Result<Event, AppError> {
        let event = self
            .event_repo
            .find_for_update(&mut *tx, event_id)
            .await?
            .ok_or(AppError::NotFound("event"))?;
        if !can_manage(caller, &event) {
            return Err(AppError::Forbidden);
        }
        Ok(event)
    }

    pub async fn publish(&self, pool: &PgPool, caller: &AuthenticatedUser, event_id: Uuid) -> Result<Event, AppError> {
        let mut tx = pool.begin().await?;
        let event = self.lock_managed(&mut tx, caller, event_id).await?;
        let status = event.publish(Utc::now())?;
        let updated = self.event_repo.update_status(&mut *tx, event_id, status).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn complete(&self, pool: &PgPool, caller: &AuthenticatedUser, event_id: Uuid) -> Result<Event, AppError> {
        let mut tx = pool.begin().await?;
        let event = self.lock_managed(&mut tx, caller, event_id).await?;
        let status = event.complete(Utc::now())?;
        let updated = self.event_repo.update_status(&mut *tx, event_id, status).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Cancela o evento e todas as inscrições ativas; as pagas são estornadas.
    pub async fn cancel(&self, pool: &PgPool, caller: &AuthenticatedUser, event_id: Uuid) -> Result<Event, AppError> {
        let mut tx = pool.begin().await?;
        let event = self.lock_managed(&mut tx, caller, event_id).await?;
        let status = event.cancel()?;
        let updated = self.event_repo.update_status(&mut *tx, event_id, status).await?;

        let mut notified = Vec::new();
        for registration in self.event_repo.list_registrations(&mut *tx, event_id).await? {
            if registration.status != RegistrationStatus::Registered {
                continue;
            }
            self.cancel_registration_locked(&mut tx, &updated, &registration).await?;
            notified.push(registration.user_id);
        }
        tx.commit().await?;

        tracing::info!("🚫 Evento {} cancelado ({} inscrições afetadas)", updated.id, notified.len());
        self.notifications.publish(
            notified
                .into_iter()
                .map(|user_id| DomainEvent::EventCancelled {
                    user_id,
                    event_id: updated.id,
                    event_title: updated.title.clone(),
                })
                .collect(),
        );
        Ok(updated)
    }

    // --- Inscrições ---

    pub async fn register(&self, pool: &PgPool, caller: &AuthenticatedUser, event_id: Uuid) -> Result<EventRegistration, AppError> {
        let mut tx = pool.begin().await?;
        // Lock na linha do evento: a contagem de vagas não corre
        let event = self
            .event_repo
            .find_for_update(&mut *tx, event_id)
            .await?
            .ok_or(AppError::NotFound("event"))?;

        let registered = self.event_repo.count_active_registrations(&mut *tx, event_id).await?;
        let payment_status = event.check_registration(registered, Utc::now())?;

        let registration = self
            .event_repo
            .register(&mut *tx, event_id, caller.id, payment_status)
            .await?;
        tx.commit().await?;

        self.notifications.publish(vec![DomainEvent::EventRegistered {
            user_id: registration.user_id,
            registration_id: registration.id,
            event_title: event.title,
        }]);
        Ok(registration)
    }

    async fn lock_registration(
        &self,
        tx: &mut PgConnection,
        caller: &AuthenticatedUser,
        registration_id: Uuid,
    ) -> Result<(EventRegistration, Event), AppError> {
        let registration = self
            .event_repo
            .find_registration_for_update(&mut *tx, registration_id)
            .await?
            .ok_or(AppError::NotFound("event_registration"))?;
        caller.require_self_or_staff(registration.user_id)?;
        let event = self
            .event_repo
            .find(&mut *tx, registration.event_id)
            .await?
            .ok_or(AppError::NotFound("event"))?;
        Ok((registration, event))
    }

    pub async fn confirm_payment(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        registration_id: Uuid,
        payment_reference: &str,
    ) -> Result<EventRegistration, AppError> {
        let mut tx = pool.begin().await?;
        let (registration, event) = self.lock_registration(&mut tx, caller, registration_id).await?;

        let payment_status = registration.confirm_payment()?;
        let updated = self
            .event_repo
            .update_registration(&mut *tx, registration.id, registration.status, payment_status, Some(payment_reference))
            .await?;
        self.payment_repo
            .record(
                &mut *tx,
                &NewPayment {
                    user_id: updated.user_id,
                    payment_type: PaymentType::EventRegistration,
                    reference_id: updated.id,
                    amount: event.fee,
                    status: TransactionStatus::Completed,
                    transaction_reference: Some(payment_reference),
                },
            )
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn cancel_registration(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        registration_id: Uuid,
    ) -> Result<EventRegistration, AppError> {
        let mut tx = pool.begin().await?;
        let (registration, event) = self.lock_registration(&mut tx, caller, registration_id).await?;
        let updated = self.cancel_registration_locked(&mut tx, &event, &registration).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn cancel_registration_locked(
        &self,
        tx: &mut PgConnection,
        event: &Event,
        registration: &EventRegistration,
    ) -> Result<EventRegistration, AppError> {
        let payment_status = registration.cancel()?;
        let updated = self
            .event_repo
            .update_registration(&mut *tx, registration.id, RegistrationStatus::Cancelled, payment_status, None)
            .await?;

        if payment_status == PaymentStatus::Refunded {
            self.payment_repo
                .record(
                    &mut *tx,
                    &NewPayment {
                        user_id: updated.user_id,
                        payment_type: PaymentType::EventRegistration,
                        reference_id: updated.id,
                        amount: event.fee,
                        status: TransactionStatus::Refunded,
                        transaction_reference: updated.payment_reference.as_deref(),
                    },
                )
                .await?;
        }
        Ok(updated)
    }

    pub async fn list_registrations(&self, pool: &PgPool, caller: &AuthenticatedUser, event_id: Uuid) -> Result<Vec<EventRegistration>, AppError> {
        let event = self.get(pool, event_id).await?;
        if !can_manage(caller, &event) {
            return Err(AppError::Forbidden);
        }
        self.event_repo.list_registrations(pool, event_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use chrono::Duration;

    fn event(organizer_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            sport_id: None,
            organizer_id,
            title: "Travessia".into(),
            description: None,
            starts_at: now + Duration::days(3),
            ends_at: now + Duration::days(3) + Duration::hours(2),
            capacity: 10,
            fee: Decimal::ZERO,
            status: EventStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn organizer_and_staff_manage_events() {
        let organizer = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Member, is_trainer: false };
        let member = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Member, is_trainer: false };
        let owner = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Owner, is_trainer: false };
        let e = event(organizer.id);

        assert!(can_manage(&organizer, &e));
        assert!(can_manage(&owner, &e));
        assert!(!can_manage(&member, &e));
    }
}
