use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: uuid::Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub bio: Option<String>,
    pub credits: BigDecimal,
    pub average_rating: Option<f64>, // Database has DEFAULT 0.0, can be NULL
    pub rating_count: Option<i32>,   // Database has DEFAULT 0, can be NULL

    // Geo fields stay unset until the user configures nearby search
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub search_radius_km: Option<f64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
