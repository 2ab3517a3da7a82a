// src/db/club_repo.rs

use chrono::NaiveTime;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::club::{Amenity, Club, ClubImage, Facility},
};

#[derive(Debug, Clone)]
pub struct NewClub<'a> {
    pub sport_id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub address: &'a str,
    pub city: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
}

#[derive(Clone, Default)]
pub struct ClubRepository;

impl ClubRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_club<'e, E>(&self, executor: E, club: &NewClub<'_>) -> Result<Club, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let club = sqlx::query_as::<_, Club>(
            r#"
            INSERT INTO clubs (
                sport_id, owner_id, name, description, address, city,
                latitude, longitude, opening_time, closing_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(club.sport_id)
        .bind(club.owner_id)
        .bind(club.name)
        .bind(club.description)
        .bind(club.address)
        .bind(club.city)
        .bind(club.latitude)
        .bind(club.longitude)
        .bind(club.opening_time)
        .bind(club.closing_time)
        .fetch_one(executor)
        .await?;
        Ok(club)
    }

    pub async fn find_club<'e, E>(&self, executor: E, club_id: Uuid) -> Result<Option<Club>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let club = sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE id = $1")
            .bind(club_id)
            .fetch_optional(executor)
            .await?;
        Ok(club)
    }

    /// Lista clubes ativos, com filtro opcional de esporte.
    pub async fn list_clubs<'e, E>(&self, executor: E, sport_id: Option<Uuid>) -> Result<Vec<Club>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clubs = sqlx::query_as::<_, Club>(
            r#"
            SELECT * FROM clubs
            WHERE is_active AND ($1::uuid IS NULL OR sport_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(sport_id)
        .fetch_all(executor)
        .await?;
        Ok(clubs)
    }

    // --- Imagens ---

    /// Tira o "principal" de todas as imagens do clube.
    pub async fn clear_primary_image<'e, E>(&self, executor: E, club_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE club_images SET is_primary = FALSE WHERE club_id = $1 AND is_primary")
            .bind(club_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn add_image<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        url: &str,
        is_primary: bool,
    ) -> Result<ClubImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let image = sqlx::query_as::<_, ClubImage>(
            "INSERT INTO club_images (club_id, url, is_primary) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(club_id)
        .bind(url)
        .bind(is_primary)
        .fetch_one(executor)
        .await?;
        Ok(image)
    }

    pub async fn list_images<'e, E>(&self, executor: E, club_id: Uuid) -> Result<Vec<ClubImage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let images = sqlx::query_as::<_, ClubImage>(
            "SELECT * FROM club_images WHERE club_id = $1 ORDER BY is_primary DESC, created_at ASC",
        )
        .bind(club_id)
        .fetch_all(executor)
        .await?;
        Ok(images)
    }

    // --- Comodidades e instalações ---

    pub async fn add_amenity<'e, E>(&self, executor: E, club_id: Uuid, name: &str) -> Result<Amenity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amenity = sqlx::query_as::<_, Amenity>(
            "INSERT INTO amenities (club_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(club_id)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(amenity)
    }

    pub async fn list_amenities<'e, E>(&self, executor: E, club_id: Uuid) -> Result<Vec<Amenity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let amenities = sqlx::query_as::<_, Amenity>("SELECT * FROM amenities WHERE club_id = $1 ORDER BY name")
            .bind(club_id)
            .fetch_all(executor)
            .await?;
        Ok(amenities)
    }

    pub async fn add_facility<'e, E>(
        &self,
        executor: E,
        club_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Facility, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let facility = sqlx::query_as::<_, Facility>(
            "INSERT INTO facilities (club_id, name, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(club_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(facility)
    }

    pub async fn list_facilities<'e, E>(&self, executor: E, club_id: Uuid) -> Result<Vec<Facility>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let facilities = sqlx::query_as::<_, Facility>("SELECT * FROM facilities WHERE club_id = $1 ORDER BY name")
            .bind(club_id)
            .fetch_all(executor)
            .await?;
        Ok(facilities)
    }
}
