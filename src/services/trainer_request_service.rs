// src/services/trainer_request_service.rs

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ClubRepository, MembershipRepository, TrainerRepository, TrainerRequestRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        notification::DomainEvent,
        trainer::TrainerProfile,
        trainer_request::{
            validate_request_context, validate_request_shape, RequestTransition, TrainerRequest,
            TrainerRequestDraft, TrainerRequestStatus, TrainerRequestType, TrainerResponse,
        },
    },
    services::notification_service::NotificationService,
};

#[derive(Clone)]
pub struct TrainerRequestService {
    request_repo: TrainerRequestRepository,
    membership_repo: MembershipRepository,
    catalog_repo: CatalogRepository,
    club_repo: ClubRepository,
    trainer_repo: TrainerRepository,
    notifications: NotificationService,
    ttl_days: i64,
}

impl TrainerRequestService {
    pub fn new(
        request_repo: TrainerRequestRepository,
        membership_repo: MembershipRepository,
        catalog_repo: CatalogRepository,
        club_repo: ClubRepository,
        trainer_repo: TrainerRepository,
        notifications: NotificationService,
        ttl_days: i64,
    ) -> Self {
        Self { request_repo, membership_repo, catalog_repo, club_repo, trainer_repo, notifications, ttl_days }
    }

    pub async fn create(&self, pool: &PgPool, caller: &AuthenticatedUser, draft: TrainerRequestDraft) -> Result<TrainerRequest, AppError> {
        caller.require_self_or_staff(draft.user_id)?;
        validate_request_shape(&draft)?;

        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let membership = self
            .membership_repo
            .find(&mut *tx, draft.membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;
        let service = self
            .catalog_repo
            .find_service(&mut *tx, draft.sport_service_id)
            .await?
            .ok_or(AppError::NotFound("sport_service"))?;

        let target_trainer = match (draft.request_type, draft.trainer_profile_id) {
            (TrainerRequestType::SpecificTrainer, Some(profile_id)) => Some(
                self.trainer_repo
                    .find_profile(&mut *tx, profile_id)
                    .await?
                    .ok_or(AppError::NotFound("trainer_profile"))?,
            ),
            _ => None,
        };

        if let (TrainerRequestType::OpenRequest, Some(club_id)) = (draft.request_type, draft.club_id) {
            let club = self
                .club_repo
                .find_club(&mut *tx, club_id)
                .await?
                .ok_or(AppError::NotFound("club"))?;
            if !membership.can_access_club(club.sport_id) {
                return Err(AppError::field("club_id", "club_sport_mismatch"));
            }
        }

        validate_request_context(&draft, &membership, &service, target_trainer.as_ref(), now)?;

        let expires_at = Duration::try_days(self.ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| anyhow::anyhow!("TRAINER_REQUEST_TTL_DAYS fora do intervalo"))?;
        let request = self.request_repo.create(&mut *tx, &draft, expires_at).await?;
        tx.commit().await?;

        tracing::info!("📨 Pedido de treinador {} criado ({:?})", request.id, request.request_type);
        if let Some(trainer) = target_trainer {
            self.notifications.publish(vec![DomainEvent::TrainerRequestReceived {
                user_id: trainer.user_id,
                request_id: request.id,
            }]);
        }
        Ok(request)
    }

    async fn caller_profile(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<TrainerProfile, AppError> {
        self.trainer_repo
            .find_profile_by_user(pool, caller.id)
            .await?
            .ok_or_else(|| AppError::field("trainer_profile_id", "not_a_trainer"))
    }

    pub async fn accept(&self, pool: &PgPool, caller: &AuthenticatedUser, request_id: Uuid) -> Result<TrainerRequest, AppError> {
        self.respond(pool, caller, request_id, TrainerResponse::Accept).await
    }

    pub async fn decline(&self, pool: &PgPool, caller: &AuthenticatedUser, request_id: Uuid) -> Result<TrainerRequest, AppError> {
        self.respond(pool, caller, request_id, TrainerResponse::Decline).await
    }

    async fn respond(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        request_id: Uuid,
        response: TrainerResponse,
    ) -> Result<TrainerRequest, AppError> {
        let trainer = self.caller_profile(pool, caller).await?;
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let request = self
            .request_repo
            .find_for_update(&mut *tx, request_id)
            .await?
            .ok_or(AppError::NotFound("trainer_request"))?;
        let membership = self
            .membership_repo
            .find(&mut *tx, request.membership_id)
            .await?
            .ok_or(AppError::NotFound("membership"))?;

        let updated = match request.respond(&trainer, membership.sport_id, response, now)? {
            RequestTransition::ExpireAndReject => {
                // O expired fica gravado mesmo com o erro devolvido
                self.request_repo
                    .update_status(&mut *tx, request.id, TrainerRequestStatus::Expired)
                    .await?;
                tx.commit().await?;
                return Err(AppError::StateConflict("request_expired"));
            }
            RequestTransition::To(TrainerRequestStatus::Accepted) => {
                self.request_repo.mark_accepted(&mut *tx, request.id, trainer.id, now).await?
            }
            RequestTransition::To(status) => self.request_repo.update_status(&mut *tx, request.id, status).await?,
        };
        tx.commit().await?;

        let event = match updated.status {
            TrainerRequestStatus::Accepted => {
                tracing::info!("🤝 Pedido {} aceito pelo treinador {}", updated.id, trainer.id);
                DomainEvent::TrainerRequestAccepted { user_id: updated.user_id, request_id: updated.id }
            }
            _ => DomainEvent::TrainerRequestDeclined { user_id: updated.user_id, request_id: updated.id },
        };
        self.notifications.publish(vec![event]);
        Ok(updated)
    }

    pub async fn cancel(&self, pool: &PgPool, caller: &AuthenticatedUser, request_id: Uuid) -> Result<TrainerRequest, AppError> {
        let mut tx = pool.begin().await?;
        let request = self
            .request_repo
            .find_for_update(&mut *tx, request_id)
            .await?
            .ok_or(AppError::NotFound("trainer_request"))?;

        let status = request.cancel_by(caller.id)?;
        let cancelled = self.request_repo.update_status(&mut *tx, request.id, status).await?;
        tx.commit().await?;
        Ok(cancelled)
    }

    pub async fn expire_stale(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<u64, AppError> {
        caller.require_staff()?;
        let expired = self.request_repo.expire_stale(pool, Utc::now()).await?;
        tracing::info!("⌛ {} pedidos de treinador expirados", expired);
        Ok(expired)
    }

    pub async fn list_mine(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<TrainerRequest>, AppError> {
        self.request_repo.list_by_user(pool, caller.id).await
    }

    /// Pedidos pendentes visíveis para o treinador chamador.
    pub async fn inbox(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<TrainerRequest>, AppError> {
        let trainer = self.caller_profile(pool, caller).await?;
        self.request_repo
            .list_open_for_trainer(pool, trainer.id, trainer.sport_id, Utc::now())
            .await
    }
}
