// src/models/check_in.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::FieldErrors},
    models::{club::Club, membership::Membership},
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub club_id: Uuid,
    pub membership_id: Option<Uuid>,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

/// A matrícula usada no check-in precisa ser do usuário, estar ativa e
/// ser do esporte do clube.
pub fn validate_check_in(user_id: Uuid, club: &Club, membership: &Membership, now: DateTime<Utc>) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.check(membership.user_id == user_id, "membership_id", "membership_not_owned");
    errors.check(membership.is_active(now), "membership_id", "membership_inactive");
    errors.check(membership.can_access_club(club.sport_id), "club_id", "club_sport_mismatch");
    errors.into_result()
}

impl CheckIn {
    pub fn check_out(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        if self.checked_out_at.is_some() {
            return Err(AppError::StateConflict("already_checked_out"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::new_membership;
    use crate::models::membership::tests::{membership_from, tier_for};
    use crate::models::membership::MembershipStatus;

    fn club(sport_id: Uuid) -> Club {
        let now = Utc::now();
        Club {
            id: Uuid::new_v4(),
            sport_id,
            owner_id: Uuid::new_v4(),
            name: "Clube Centro".into(),
            description: None,
            address: "Rua A, 1".into(),
            city: "Recife".into(),
            latitude: None,
            longitude: None,
            opening_time: None,
            closing_time: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matching_sport_and_active_membership_is_accepted() {
        let now = Utc::now();
        let user = Uuid::new_v4();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let m = membership_from(&new_membership(user, &tier, false, now).unwrap());
        assert!(validate_check_in(user, &club(m.sport_id), &m, now).is_ok());
    }

    #[test]
    fn other_sport_or_paused_membership_is_rejected() {
        let now = Utc::now();
        let user = Uuid::new_v4();
        let tier = tier_for(Uuid::new_v4(), 1000, 30);
        let mut m = membership_from(&new_membership(user, &tier, false, now).unwrap());

        assert!(matches!(
            validate_check_in(user, &club(Uuid::new_v4()), &m, now),
            Err(AppError::FieldValidation(ref e)) if e["club_id"] == "club_sport_mismatch"
        ));

        m.status = MembershipStatus::Paused;
        assert!(matches!(
            validate_check_in(user, &club(m.sport_id), &m, now),
            Err(AppError::FieldValidation(ref e)) if e["membership_id"] == "membership_inactive"
        ));
    }

    #[test]
    fn check_out_once_by_owner() {
        let user = Uuid::new_v4();
        let mut c = CheckIn {
            id: Uuid::new_v4(),
            user_id: user,
            club_id: Uuid::new_v4(),
            membership_id: None,
            checked_in_at: Utc::now(),
            checked_out_at: None,
        };
        assert!(c.check_out(user).is_ok());
        assert!(matches!(c.check_out(Uuid::new_v4()), Err(AppError::Forbidden)));
        c.checked_out_at = Some(Utc::now());
        assert!(matches!(c.check_out(user), Err(AppError::StateConflict("already_checked_out"))));
    }
}
