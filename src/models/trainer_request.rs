// src/models/trainer_request.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::{catalog::SportService, membership::Membership, trainer::TrainerProfile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "trainer_request_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrainerRequestType {
    SpecificTrainer,
    OpenRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "trainer_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrainerRequestStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    #[schema(value_type = String, example = "10:00:00")]
    pub start: NaiveTime,
    #[schema(value_type = String, example = "11:00:00")]
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainerRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    pub request_type: TrainerRequestType,
    pub trainer_profile_id: Option<Uuid>,
    pub club_id: Option<Uuid>,
    // Lista ordenada, guardada como JSONB
    #[schema(value_type = Vec<TimeSlot>)]
    pub preferred_time_slots: Json<Vec<TimeSlot>>,
    pub message: Option<String>,
    pub status: TrainerRequestStatus,
    pub accepted_by_trainer_id: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pedido candidato, como chega da API.
#[derive(Debug, Clone)]
pub struct TrainerRequestDraft {
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub sport_service_id: Uuid,
    pub request_type: TrainerRequestType,
    pub trainer_profile_id: Option<Uuid>,
    pub club_id: Option<Uuid>,
    pub preferred_time_slots: Vec<TimeSlot>,
    pub message: Option<String>,
}

/// Regras de forma: alvo conforme o tipo e horários bem formados.
pub fn validate_request_shape(draft: &TrainerRequestDraft) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    match draft.request_type {
        TrainerRequestType::SpecificTrainer => {
            errors.check(draft.trainer_profile_id.is_some(), "trainer_profile_id", "required");
        }
        TrainerRequestType::OpenRequest => {
            errors.check(draft.club_id.is_some(), "club_id", "required");
        }
    }

    if draft.preferred_time_slots.is_empty() {
        errors.add("preferred_time_slots", "empty_time_slots");
    } else if draft.preferred_time_slots.iter().any(|slot| slot.end <= slot.start) {
        errors.add("preferred_time_slots", "invalid_time_slot");
    }

    errors.into_result()
}

/// Regras que dependem das entidades carregadas do banco.
pub fn validate_request_context(
    draft: &TrainerRequestDraft,
    membership: &Membership,
    service: &SportService,
    target_trainer: Option<&TrainerProfile>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(membership.user_id == draft.user_id, "membership_id", "membership_not_owned");
    errors.check(membership.is_active(now), "membership_id", "membership_inactive");
    errors.check(service.is_active, "sport_service_id", "service_inactive");
    errors.check(service.sport_id == membership.sport_id, "sport_service_id", "service_sport_mismatch");
    if let Some(trainer) = target_trainer {
        errors.check(trainer.sport_id == membership.sport_id, "trainer_profile_id", "sport_mismatch");
        errors.check(trainer.is_active_trainer(), "trainer_profile_id", "trainer_not_active");
    }
    errors.into_result()
}

/// Resposta de um treinador a um pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerResponse {
    Accept,
    Decline,
}

/// O que fazer com o pedido depois de checar estado e prazo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTransition {
    To(TrainerRequestStatus),
    /// Passou do prazo: grava `expired` e devolve erro ao chamador
    ExpireAndReject,
}

impl TrainerRequest {
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Aceite/recusa por um treinador.
    /// Específico: só o treinador alvo. Aberto: qualquer treinador ativo do
    /// mesmo esporte pode aceitar; recusar não se aplica.
    pub fn respond(
        &self,
        trainer: &TrainerProfile,
        membership_sport_id: Uuid,
        response: TrainerResponse,
        now: DateTime<Utc>,
    ) -> Result<RequestTransition, AppError> {
        if self.status != TrainerRequestStatus::Pending {
            return Err(AppError::StateConflict("request_not_pending"));
        }

        match self.request_type {
            TrainerRequestType::SpecificTrainer => {
                if self.trainer_profile_id != Some(trainer.id) {
                    return Err(AppError::Forbidden);
                }
            }
            TrainerRequestType::OpenRequest => {
                if response == TrainerResponse::Decline {
                    return Err(AppError::field("request_type", "not_request_target"));
                }
                if trainer.sport_id != membership_sport_id {
                    return Err(AppError::field("trainer_profile_id", "sport_mismatch"));
                }
            }
        }

        if self.is_past_deadline(now) {
            return Ok(RequestTransition::ExpireAndReject);
        }

        if response == TrainerResponse::Accept && !trainer.is_active_trainer() {
            return Err(AppError::field("trainer_profile_id", "trainer_not_active"));
        }

        Ok(RequestTransition::To(match response {
            TrainerResponse::Accept => TrainerRequestStatus::Accepted,
            TrainerResponse::Decline => TrainerRequestStatus::Declined,
        }))
    }

    /// Cancelamento pelo próprio solicitante.
    pub fn cancel_by(&self, user_id: Uuid) -> Result<TrainerRequestStatus, AppError> {
        if self.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if self.status != TrainerRequestStatus::Pending {
            return Err(AppError::StateConflict("request_not_pending"));
        }
        Ok(TrainerRequestStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::new_membership;
    use crate::models::membership::tests::{membership_from, tier_for};
    use crate::models::trainer::tests::profile;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft(request_type: TrainerRequestType) -> TrainerRequestDraft {
        TrainerRequestDraft {
            user_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            sport_service_id: Uuid::new_v4(),
            request_type,
            trainer_profile_id: None,
            club_id: None,
            preferred_time_slots: vec![TimeSlot { start: t(10, 0), end: t(11, 0) }],
            message: None,
        }
    }

    fn request(request_type: TrainerRequestType, target: Option<Uuid>, now: DateTime<Utc>) -> TrainerRequest {
        TrainerRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            membership_id: Uuid::new_v4(),
            sport_service_id: Uuid::new_v4(),
            request_type,
            trainer_profile_id: target,
            club_id: Some(Uuid::new_v4()),
            preferred_time_slots: Json(vec![TimeSlot { start: t(10, 0), end: t(11, 0) }]),
            message: None,
            status: TrainerRequestStatus::Pending,
            accepted_by_trainer_id: None,
            accepted_at: None,
            expires_at: now + Duration::days(7),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(sport_id: Uuid) -> SportService {
        let now = Utc::now();
        SportService {
            id: Uuid::new_v4(),
            sport_id,
            name: "Aula particular".into(),
            description: None,
            price: Decimal::new(200, 0),
            duration_minutes: Some(60),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn specific_request_requires_trainer() {
        let d = draft(TrainerRequestType::SpecificTrainer);
        assert!(matches!(validate_request_shape(&d), Err(AppError::FieldValidation(ref m)) if m["trainer_profile_id"] == "required"));

        let mut ok = d.clone();
        ok.trainer_profile_id = Some(Uuid::new_v4());
        assert!(validate_request_shape(&ok).is_ok());
    }

    #[test]
    fn open_request_requires_club() {
        let d = draft(TrainerRequestType::OpenRequest);
        assert!(matches!(validate_request_shape(&d), Err(AppError::FieldValidation(ref m)) if m["club_id"] == "required"));

        let mut ok = d.clone();
        ok.club_id = Some(Uuid::new_v4());
        assert!(validate_request_shape(&ok).is_ok());
    }

    #[test]
    fn time_slots_must_be_present_and_well_formed() {
        let mut d = draft(TrainerRequestType::OpenRequest);
        d.club_id = Some(Uuid::new_v4());

        d.preferred_time_slots.clear();
        assert!(matches!(validate_request_shape(&d), Err(AppError::FieldValidation(ref m)) if m["preferred_time_slots"] == "empty_time_slots"));

        d.preferred_time_slots = vec![
            TimeSlot { start: t(8, 0), end: t(9, 0) },
            TimeSlot { start: t(11, 0), end: t(11, 0) },
        ];
        assert!(matches!(validate_request_shape(&d), Err(AppError::FieldValidation(ref m)) if m["preferred_time_slots"] == "invalid_time_slot"));
    }

    #[test]
    fn context_checks_ownership_and_sport() {
        let now = Utc::now();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut d = draft(TrainerRequestType::SpecificTrainer);
        let membership = membership_from(&new_membership(d.user_id, &tier, false, now).unwrap());
        let trainer = profile(membership.sport_id);
        d.trainer_profile_id = Some(trainer.id);

        assert!(validate_request_context(&d, &membership, &service(membership.sport_id), Some(&trainer), now).is_ok());

        let foreign = service(Uuid::new_v4());
        assert!(matches!(
            validate_request_context(&d, &membership, &foreign, Some(&trainer), now),
            Err(AppError::FieldValidation(ref m)) if m["sport_service_id"] == "service_sport_mismatch"
        ));

        d.user_id = Uuid::new_v4();
        assert!(matches!(
            validate_request_context(&d, &membership, &service(membership.sport_id), None, now),
            Err(AppError::FieldValidation(ref m)) if m["membership_id"] == "membership_not_owned"
        ));
    }

    #[test]
    fn open_request_accepted_by_trainer_of_same_sport() {
        let now = Utc::now();
        let sport = Uuid::new_v4();
        let r = request(TrainerRequestType::OpenRequest, None, now);
        let trainer = profile(sport);

        assert_eq!(
            r.respond(&trainer, sport, TrainerResponse::Accept, now).unwrap(),
            RequestTransition::To(TrainerRequestStatus::Accepted)
        );
        assert!(r.respond(&profile(Uuid::new_v4()), sport, TrainerResponse::Accept, now).is_err());
        assert!(r.respond(&trainer, sport, TrainerResponse::Decline, now).is_err());
    }

    #[test]
    fn specific_request_only_answered_by_target() {
        let now = Utc::now();
        let sport = Uuid::new_v4();
        let target = profile(sport);
        let r = request(TrainerRequestType::SpecificTrainer, Some(target.id), now);

        assert_eq!(
            r.respond(&target, sport, TrainerResponse::Decline, now).unwrap(),
            RequestTransition::To(TrainerRequestStatus::Declined)
        );
        assert!(matches!(
            r.respond(&profile(sport), sport, TrainerResponse::Accept, now),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn late_answers_expire_the_request() {
        let now = Utc::now();
        let sport = Uuid::new_v4();
        let r = request(TrainerRequestType::OpenRequest, None, now);
        let later = now + Duration::days(8);
        assert_eq!(
            r.respond(&profile(sport), sport, TrainerResponse::Accept, later).unwrap(),
            RequestTransition::ExpireAndReject
        );
    }

    #[test]
    fn only_pending_requests_move() {
        let now = Utc::now();
        let sport = Uuid::new_v4();
        let mut r = request(TrainerRequestType::OpenRequest, None, now);
        r.status = TrainerRequestStatus::Accepted;
        assert!(matches!(
            r.respond(&profile(sport), sport, TrainerResponse::Accept, now),
            Err(AppError::StateConflict("request_not_pending"))
        ));
        assert!(r.cancel_by(r.user_id).is_err());
    }

    #[test]
    fn only_requester_cancels() {
        let now = Utc::now();
        let r = request(TrainerRequestType::OpenRequest, None, now);
        assert_eq!(r.cancel_by(r.user_id).unwrap(), TrainerRequestStatus::Cancelled);
        assert!(matches!(r.cancel_by(Uuid::new_v4()), Err(AppError::Forbidden)));
    }
}
