// src/services/trainer_service.rs

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    db::{
        trainer_repo::{NewLocation, NewTrainerProfile},
        CatalogRepository, CounterRepository, MembershipRepository, PaymentRepository, TrainerRepository,
        UserRepository,
    },
    middleware::auth::AuthenticatedUser,
    models::{
        membership::Membership,
        notification::DomainEvent,
        payment::{NewPayment, PaymentType, TransactionStatus},
        trainer::{
            validate_availability, validate_draft, Certification, DayOfWeek, PaymentStatus, SessionDraft,
            SessionStatus, Specialty, TrainerAvailability, TrainerLocation, TrainerProfile, TrainerProfileDetail,
            TrainerSession, TrainerStatistics,
        },
    },
    services::notification_service::NotificationService,
};

/// Papel do chamador numa sessão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionParty {
    Trainee,
    Trainer,
    Staff,
}

pub fn session_party(caller: &AuthenticatedUser, trainer_user_id: Uuid, trainee_user_id: Uuid) -> Option<SessionParty> {
    if caller.id == trainee_user_id {
        Some(SessionParty::Trainee)
    } else if caller.id == trainer_user_id {
        Some(SessionParty::Trainer)
    } else if caller.is_staff() {
        Some(SessionParty::Staff)
    } else {
        None
    }
}

/// Dados de agendamento, como chegam da API.
#[derive(Debug, Clone)]
pub struct BookSession {
    pub trainer_profile_id: Uuid,
    pub trainee_membership_id: Uuid,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub duration_minutes: i32,
    pub fee_amount: Decimal,
    pub notes: Option<String>,
}

/// Sessão travada junto com o treinador e a matrícula do aluno.
struct LockedSession {
    session: TrainerSession,
    trainer: TrainerProfile,
    trainee_membership: Membership,
}

#[derive(Clone)]
pub struct TrainerService {
    trainer_repo: TrainerRepository,
    membership_repo: MembershipRepository,
    catalog_repo: CatalogRepository,
    counter_repo: CounterRepository,
    payment_repo: PaymentRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
}

impl TrainerService {
    pub fn new(
        trainer_repo: TrainerRepository,
        membership_repo: MembershipRepository,
        catalog_repo: CatalogRepository,
        counter_repo: CounterRepository,
        payment_repo: PaymentRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self { trainer_repo, membership_repo, catalog_repo, counter_repo, payment_repo, user_repo, notifications }
    }

    // =====================================================================
    //  PERFIL
    // =====================================================================

    pub async fn create_profile(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        profile: NewTrainerProfile<'_>,
    ) -> Result<TrainerProfile, AppError> {
        caller.require_self_or_staff(profile.user_id)?;
        if profile.experience_years < 0 {
            return Err(AppError::field("experience_years", "out_of_range"));
        }

        let mut tx = pool.begin().await?;
        let tier = self
            .catalog_repo
            .find_tier(&mut *tx, profile.tier_id)
            .await?
            .ok_or(AppError::NotFound("tier"))?;
        if tier.sport_id != profile.sport_id {
            return Err(AppError::field("tier_id", "tier_sport_mismatch"));
        }

        let created = self.trainer_repo.create_profile(&mut *tx, &profile).await?;
        self.user_repo.set_trainer(&mut *tx, profile.user_id).await?;
        tx.commit().await?;

        tracing::info!("🏋️ Perfil de treinador criado: {} (usuário {})", created.id, created.user_id);
        Ok(created)
    }

    pub async fn verify(&self, pool: &PgPool, caller: &AuthenticatedUser, profile_id: Uuid, verified: bool) -> Result<TrainerProfile, AppError> {
        caller.require_staff()?;
        self.trainer_repo.set_verified(pool, profile_id, verified).await
    }

    pub async fn set_availability_flag(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        profile_id: Uuid,
        available: bool,
    ) -> Result<TrainerProfile, AppError> {
        self.managed_profile(pool, caller, profile_id).await?;
        self.trainer_repo.set_available(pool, profile_id, available).await
    }

    pub async fn get_profile(&self, pool: &PgPool, profile_id: Uuid) -> Result<TrainerProfileDetail, AppError> {
        let profile = self
            .trainer_repo
            .find_profile(pool, profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;

        Ok(TrainerProfileDetail {
            is_active_trainer: profile.is_active_trainer(),
            availability_status: profile.availability_status(),
            rating_category: profile.rating_category(),
            experience_level: profile.experience_level(),
            certifications: self.trainer_repo.list_certifications(pool, profile_id).await?,
            specialties: self.trainer_repo.list_specialties(pool, profile_id).await?,
            availabilities: self.trainer_repo.list_availabilities(pool, profile_id).await?,
            locations: self.trainer_repo.list_locations(pool, profile_id).await?,
            profile,
        })
    }

    pub async fn list_trainers(&self, pool: &PgPool, sport_id: Option<Uuid>) -> Result<Vec<TrainerProfile>, AppError> {
        self.trainer_repo.list_profiles(pool, sport_id).await
    }

    /// Dono do perfil ou staff.
    async fn managed_profile<'e, E>(&self, executor: E, caller: &AuthenticatedUser, profile_id: Uuid) -> Result<TrainerProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = self
            .trainer_repo
            .find_profile(executor, profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        caller.require_self_or_staff(profile.user_id)?;
        Ok(profile)
    }

    // --- Filhos do perfil ---

    pub async fn add_availability(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        profile_id: Uuid,
        day: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<TrainerAvailability, AppError> {
        let mut tx = pool.begin().await?;
        // Lock no perfil serializa inclusões concorrentes de janelas
        let profile = self
            .trainer_repo
            .find_profile_for_update(&mut *tx, profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        caller.require_self_or_staff(profile.user_id)?;

        let existing = self.trainer_repo.list_availabilities(&mut *tx, profile_id).await?;
        validate_availability(&existing, day, start_time, end_time)?;

        let window = self
            .trainer_repo
            .add_availability(&mut *tx, profile_id, day, start_time, end_time, true)
            .await?;
        tx.commit().await?;
        Ok(window)
    }

    pub async fn add_certification(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        profile_id: Uuid,
        name: &str,
        issuing_organization: &str,
        issue_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Certification, AppError> {
        if expiry_date.is_some_and(|expiry| expiry < issue_date) {
            return Err(AppError::field("expiry_date", "invalid_date_range"));
        }
        self.managed_profile(pool, caller, profile_id).await?;
        self.trainer_repo
            .add_certification(pool, profile_id, name, issuing_organization, issue_date, expiry_date)
            .await
    }

    pub async fn add_specialty(&self, pool: &PgPool, caller: &AuthenticatedUser, profile_id: Uuid, specialty: &str) -> Result<Specialty, AppError> {
        self.managed_profile(pool, caller, profile_id).await?;
        self.trainer_repo.add_specialty(pool, profile_id, specialty.trim()).await
    }

    pub async fn add_location(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        profile_id: Uuid,
        location: NewLocation<'_>,
    ) -> Result<TrainerLocation, AppError> {
        let mut tx = pool.begin().await?;
        self.managed_profile(&mut *tx, caller, profile_id).await?;
        if location.is_primary {
            self.trainer_repo.clear_primary_location(&mut *tx, profile_id).await?;
        }
        let created = self.trainer_repo.add_location(&mut *tx, profile_id, &location).await?;
        tx.commit().await?;
        Ok(created)
    }

    pub async fn is_available_at(&self, pool: &PgPool, profile_id: Uuid, day: DayOfWeek, time: NaiveTime) -> Result<bool, AppError> {
        let profile = self
            .trainer_repo
            .find_profile(pool, profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        let windows = self.trainer_repo.list_availabilities(pool, profile_id).await?;
        Ok(profile.is_available_at(&windows, day, time))
    }

    // =====================================================================
    //  SESSÕES
    // =====================================================================

    pub async fn book_session(&self, pool: &PgPool, caller: &AuthenticatedUser, booking: BookSession) -> Result<TrainerSession, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let trainer = self
            .trainer_repo
            .find_profile(&mut *tx, booking.trainer_profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        let membership = self
            .membership_repo
            .find(&mut *tx, booking.trainee_membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;

        if session_party(caller, trainer.user_id, membership.user_id).is_none() {
            return Err(AppError::Forbidden);
        }

        let draft = SessionDraft {
            trainer_profile_id: trainer.id,
            trainee_membership_id: membership.id,
            session_date: booking.session_date,
            session_time: booking.session_time,
            duration_minutes: booking.duration_minutes,
            status: SessionStatus::Scheduled,
            fee_amount: booking.fee_amount,
            trainee_rating: None,
            notes: booking.notes,
        };

        let mut errors = FieldErrors::new();
        errors.check(membership.is_active(now), "trainee_membership_id", "membership_inactive");
        errors.check(trainer.is_active_trainer(), "trainer_profile_id", "trainer_not_active");
        errors.absorb(validate_draft(&draft, &trainer, &membership, now.date_naive()))?;
        errors.into_result()?;

        let session = self.trainer_repo.create_session(&mut *tx, &draft).await?;
        tx.commit().await?;

        self.notifications.publish(vec![
            DomainEvent::SessionBooked { user_id: membership.user_id, session_id: session.id, starts_at: session.starts_at() },
            DomainEvent::SessionBooked { user_id: trainer.user_id, session_id: session.id, starts_at: session.starts_at() },
        ]);
        Ok(session)
    }

    async fn lock_session(&self, tx: &mut PgConnection, session_id: Uuid) -> Result<LockedSession, AppError> {
        let session = self
            .trainer_repo
            .find_session_for_update(&mut *tx, session_id)
            .await?
            .ok_or(AppError::NotFound("trainer_session"))?;
        let trainer = self
            .trainer_repo
            .find_profile_for_update(&mut *tx, session.trainer_profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        let trainee_membership = self
            .membership_repo
            .find(&mut *tx, session.trainee_membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        Ok(LockedSession { session, trainer, trainee_membership })
    }

    async fn refresh_statistics(&self, tx: &mut PgConnection, profile_id: Uuid) -> Result<(), AppError> {
        let sessions = self.trainer_repo.list_sessions_for_trainer(&mut *tx, profile_id).await?;
        let stats = TrainerStatistics::from_sessions(&sessions);
        self.trainer_repo.write_statistics(&mut *tx, profile_id, &stats).await
    }

    /// Conclui a sessão: gasto do aluno, ganhos do treinador e estatísticas,
    /// tudo na mesma transação.
    pub async fn complete_session(&self, pool: &PgPool, caller: &AuthenticatedUser, session_id: Uuid) -> Result<TrainerSession, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let LockedSession { session, trainer, trainee_membership } = self.lock_session(&mut tx, session_id).await?;

        match session_party(caller, trainer.user_id, trainee_membership.user_id) {
            Some(SessionParty::Trainer | SessionParty::Staff) => {}
            _ => return Err(AppError::Forbidden),
        }
        if !session.can_be_completed(now.date_naive()) {
            return Err(AppError::StateConflict("session_not_completable"));
        }

        let trainer_membership = self
            .membership_repo
            .find_active_for_sport(&mut *tx, trainer.user_id, trainer.sport_id, now)
            .await?;

        let payment_status = if session.fee_amount > Decimal::ZERO { PaymentStatus::Paid } else { PaymentStatus::Waived };
        let completed = self
            .trainer_repo
            .update_session_status(&mut *tx, session.id, SessionStatus::Completed, payment_status)
            .await?;

        for effect in completed.completion_effects(trainer_membership.map(|m| m.id))? {
            self.counter_repo.apply(&mut *tx, &effect).await?;
        }

        if payment_status == PaymentStatus::Paid {
            self.payment_repo
                .record(
                    &mut *tx,
                    &NewPayment {
                        user_id: trainee_membership.user_id,
                        payment_type: PaymentType::TrainerSession,
                        reference_id: completed.id,
                        amount: completed.fee_amount,
                        status: TransactionStatus::Completed,
                        transaction_reference: completed.payment_reference.as_deref(),
                    },
                )
                .await?;
        }

        self.refresh_statistics(&mut tx, trainer.id).await?;
        tx.commit().await?;

        tracing::info!("✅ Sessão {} concluída (treinador {}, valor {})", completed.id, trainer.id, completed.fee_amount);
        self.notifications.publish(vec![DomainEvent::SessionCompleted {
            user_id: trainee_membership.user_id,
            session_id: completed.id,
            fee_amount: completed.fee_amount,
        }]);
        Ok(completed)
    }

    pub async fn cancel_session(&self, pool: &PgPool, caller: &AuthenticatedUser, session_id: Uuid) -> Result<TrainerSession, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let LockedSession { session, trainer, trainee_membership } = self.lock_session(&mut tx, session_id).await?;

        if session_party(caller, trainer.user_id, trainee_membership.user_id).is_none() {
            return Err(AppError::Forbidden);
        }
        if !session.can_be_cancelled(now) {
            return Err(AppError::StateConflict("session_not_cancellable"));
        }

        let payment_status = match session.payment_status {
            PaymentStatus::Paid => PaymentStatus::Refunded,
            other => other,
        };
        let cancelled = self
            .trainer_repo
            .update_session_status(&mut *tx, session.id, SessionStatus::Cancelled, payment_status)
            .await?;
        tx.commit().await?;

        let events = [trainee_membership.user_id, trainer.user_id]
            .into_iter()
            .filter(|user_id| *user_id != caller.id)
            .map(|user_id| DomainEvent::SessionCancelled { user_id, session_id: cancelled.id })
            .collect();
        self.notifications.publish(events);
        Ok(cancelled)
    }

    /// Mesma janela de datas da conclusão, mas sem cobrança.
    pub async fn mark_no_show(&self, pool: &PgPool, caller: &AuthenticatedUser, session_id: Uuid) -> Result<TrainerSession, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;
        let LockedSession { session, trainer, trainee_membership } = self.lock_session(&mut tx, session_id).await?;

        match session_party(caller, trainer.user_id, trainee_membership.user_id) {
            Some(SessionParty::Trainer | SessionParty::Staff) => {}
            _ => return Err(AppError::Forbidden),
        }
        if !session.can_be_completed(now.date_naive()) {
            return Err(AppError::StateConflict("session_not_completable"));
        }

        let updated = self
            .trainer_repo
            .update_session_status(&mut *tx, session.id, SessionStatus::NoShow, session.payment_status)
            .await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn rate_session(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        session_id: Uuid,
        rating: i16,
        feedback: Option<&str>,
    ) -> Result<TrainerSession, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::field("trainee_rating", "invalid_rating"));
        }

        let mut tx = pool.begin().await?;
        let LockedSession { session, trainer, trainee_membership } = self.lock_session(&mut tx, session_id).await?;

        if session_party(caller, trainer.user_id, trainee_membership.user_id) != Some(SessionParty::Trainee) {
            return Err(AppError::Forbidden);
        }
        if !session.can_be_rated() {
            return Err(AppError::StateConflict("session_not_rateable"));
        }

        let rated = self.trainer_repo.rate_session(&mut *tx, session.id, rating, feedback).await?;
        self.refresh_statistics(&mut tx, trainer.id).await?;
        tx.commit().await?;
        Ok(rated)
    }

    /// Só as partes da sessão (aluno, treinador) ou staff.
    pub async fn get_session(&self, pool: &PgPool, caller: &AuthenticatedUser, session_id: Uuid) -> Result<TrainerSession, AppError> {
        let session = self
            .trainer_repo
            .find_session(pool, session_id)
            .await?
            .ok_or(AppError::NotFound("trainer_session"))?;
        let trainer = self
            .trainer_repo
            .find_profile(pool, session.trainer_profile_id)
            .await?
            .ok_or(AppError::NotFound("trainer_profile"))?;
        let trainee_membership = self
            .membership_repo
            .find(pool, session.trainee_membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;

        if session_party(caller, trainer.user_id, trainee_membership.user_id).is_none() {
            return Err(AppError::Forbidden);
        }
        Ok(session)
    }

    pub async fn list_my_sessions(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<TrainerSession>, AppError> {
        self.trainer_repo.list_sessions_for_user(pool, caller.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;

    fn caller(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser { id: Uuid::new_v4(), role, is_trainer: false }
    }

    #[test]
    fn trainee_and_trainer_are_recognised_before_staff() {
        let trainee = caller(UserRole::Member);
        let trainer = caller(UserRole::Owner);

        assert_eq!(session_party(&trainee, trainer.id, trainee.id), Some(SessionParty::Trainee));
        // Treinador que também é staff continua sendo o treinador da sessão
        assert_eq!(session_party(&trainer, trainer.id, trainee.id), Some(SessionParty::Trainer));
    }

    #[test]
    fn strangers_have_no_role_unless_staff() {
        let stranger = caller(UserRole::Member);
        let admin = caller(UserRole::Admin);
        let (trainer_id, trainee_id) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(session_party(&stranger, trainer_id, trainee_id), None);
        assert_eq!(session_party(&admin, trainer_id, trainee_id), Some(SessionParty::Staff));
    }
}
