use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Memory {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Memory fields collected from the multipart form once the photo is hosted.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub trip_id: Uuid,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
}
