// src/services/club_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{club_repo::NewClub, CatalogRepository, ClubRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        auth::UserRole,
        club::{Amenity, Club, ClubDetail, ClubImage, Facility},
    },
};

/// Dono do clube ou administrador.
fn can_manage(caller: &AuthenticatedUser, club: &Club) -> bool {
    club.owner_id == caller.id || caller.role == UserRole::Admin
}

#[derive(Clone)]
pub struct ClubService {
    club_repo: ClubRepository,
    catalog_repo: CatalogRepository,
}

impl ClubService {
    pub fn new(club_repo: ClubRepository, catalog_repo: CatalogRepository) -> Self {
        Self { club_repo, catalog_repo }
    }

    pub async fn create_club(&self, pool: &PgPool, caller: &AuthenticatedUser, club: NewClub<'_>) -> Result<Club, AppError> {
        caller.require_staff()?;
        if let (Some(open), Some(close)) = (club.opening_time, club.closing_time) {
            if close <= open {
                return Err(AppError::field("closing_time", "invalid_time_window"));
            }
        }

        self.catalog_repo
            .find_sport(pool, club.sport_id)
            .await?
            .ok_or(AppError::NotFound("sport"))?;

        let created = self.club_repo.create_club(pool, &club).await?;
        tracing::info!("🏟️ Clube criado: {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn list_clubs(&self, pool: &PgPool, sport_id: Option<Uuid>) -> Result<Vec<Club>, AppError> {
        self.club_repo.list_clubs(pool, sport_id).await
    }

    pub async fn get_club(&self, pool: &PgPool, club_id: Uuid) -> Result<ClubDetail, AppError> {
        let club = self
            .club_repo
            .find_club(pool, club_id)
            .await?
            .ok_or(AppError::NotFound("club"))?;

        Ok(ClubDetail {
            images: self.club_repo.list_images(pool, club_id).await?,
            amenities: self.club_repo.list_amenities(pool, club_id).await?,
            facilities: self.club_repo.list_facilities(pool, club_id).await?,
            club,
        })
    }

    async fn managed_club(&self, pool: &PgPool, caller: &AuthenticatedUser, club_id: Uuid) -> Result<Club, AppError> {
        let club = self
            .club_repo
            .find_club(pool, club_id)
            .await?
            .ok_or(AppError::NotFound("club"))?;
        if !can_manage(caller, &club) {
            return Err(AppError::Forbidden);
        }
        Ok(club)
    }

    pub async fn add_image(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        club_id: Uuid,
        url: &str,
        is_primary: bool,
    ) -> Result<ClubImage, AppError> {
        self.managed_club(pool, caller, club_id).await?;

        let mut tx = pool.begin().await?;
        if is_primary {
            self.club_repo.clear_primary_image(&mut *tx, club_id).await?;
        }
        let image = self.club_repo.add_image(&mut *tx, club_id, url, is_primary).await?;
        tx.commit().await?;
        Ok(image)
    }

    pub async fn add_amenity(&self, pool: &PgPool, caller: &AuthenticatedUser, club_id: Uuid, name: &str) -> Result<Amenity, AppError> {
        self.managed_club(pool, caller, club_id).await?;
        self.club_repo.add_amenity(pool, club_id, name).await
    }

    pub async fn add_facility(
        &self,
        pool: &PgPool,
        caller: &AuthenticatedUser,
        club_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Facility, AppError> {
        self.managed_club(pool, caller, club_id).await?;
        self.club_repo.add_facility(pool, club_id, name, description).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn club(owner_id: Uuid) -> Club {
        let now = Utc::now();
        Club {
            id: Uuid::new_v4(),
            sport_id: Uuid::new_v4(),
            owner_id,
            name: "Clube".into(),
            description: None,
            address: "Rua 1".into(),
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
    fn only_the_owner_or_an_admin_manages_a_club() {
        let owner = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Owner, is_trainer: false };
        let other_owner = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Owner, is_trainer: false };
        let admin = AuthenticatedUser { id: Uuid::new_v4(), role: UserRole::Admin, is_trainer: false };
        let c = club(owner.id);

        assert!(can_manage(&owner, &c));
        assert!(can_manage(&admin, &c));
        assert!(!can_manage(&other_owner, &c));
    }
}
