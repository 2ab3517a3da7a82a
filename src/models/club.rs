// src/models/club.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Club (O "Estabelecimento")
// ---
// Cada clube atende um esporte; é isso que define quem pode fazer check-in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Clube Aquático Centro")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "Rua das Flores, 123")]
    pub address: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(value_type = Option<String>, example = "06:00:00")]
    pub opening_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "22:00:00")]
    pub closing_time: Option<NaiveTime>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Só a URL; o upload acontece fora daqui.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubImage {
    pub id: Uuid,
    pub club_id: Uuid,
    pub url: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub id: Uuid,
    pub club_id: Uuid,
    #[schema(example = "Estacionamento")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: Uuid,
    pub club_id: Uuid,
    #[schema(example = "Piscina olímpica")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubDetail {
    #[serde(flatten)]
    pub club: Club,
    pub images: Vec<ClubImage>,
    pub amenities: Vec<Amenity>,
    pub facilities: Vec<Facility>,
}
