// src/services/check_in_service.rs

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CheckInRepository, ClubRepository, CounterRepository, MembershipRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        check_in::{validate_check_in, CheckIn},
        counters::CounterEffect,
    },
};

#[derive(Clone)]
pub struct CheckInService {
    check_in_repo: CheckInRepository,
    club_repo: ClubRepository,
    membership_repo: MembershipRepository,
    counter_repo: CounterRepository,
}

impl CheckInService {
    pub fn new(
        check_in_repo: CheckInRepository,
        club_repo: ClubRepository,
        membership_repo: MembershipRepository,
        counter_repo: CounterRepository,
    ) -> Self {
        Self { check_in_repo, club_repo, membership_repo, counter_repo }
    }

    /// Entrada no clube. Sem matrícula informada, usa a ativa do esporte do clube.
    pub async fn check_in(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        club_id: Uuid,
        membership_id: Option<Uuid>,
    ) -> Result<CheckIn, AppError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let club = self
            .club_repo
            .find_club(&mut *tx, club_id)
            .await?
            .ok_or(AppError::NotFound("club"))?;

        let membership = match membership_id {
            Some(id) => self
                .membership_repo
                .find_for_update(&mut *tx, id)
                .await?
                .ok_or(AppError::NotFound("membership"))?,
            None => self
                .membership_repo
                .find_active_for_sport(&mut *tx, caller.id, club.sport_id, now)
                .await?
                .ok_or_else(|| AppError::field("membership_id", "no_active_membership"))?,
        };

        validate_check_in(caller.id, &club, &membership, now)?;

        let check_in = self
            .check_in_repo
            .create(&mut *tx, caller.id, club.id, membership.id, now)
            .await?;
        self.counter_repo.apply(&mut *tx, &CounterEffect::check_in(membership.id)).await?;
        tx.commit().await?;

        tracing::debug!("Check-in {} no clube {}", check_in.id, club.id);
        Ok(check_in)
    }

    pub async fn check_out(&self, pool: &PgPool, caller: &AuthenticatedUser, check_in_id: Uuid) -> Result<CheckIn, AppError> {
        let mut tx = pool.begin().await?;
        let current = self
            .check_in_repo
            .find_for_update(&mut *tx, check_in_id)
            .await?
            .ok_or(AppError::NotFound("check_in"))?;

        current.check_out(caller.id)?;
        let updated = self.check_in_repo.check_out(&mut *tx, check_in_id, Utc::now()).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn list_mine(&self, pool: &PgPool, caller: &AuthenticatedUser) -> Result<Vec<CheckIn>, AppError> {
        self.check_in_repo.list_by_user(pool, caller.id).await
    }
}
