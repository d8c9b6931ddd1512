use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ordering::SortOrder;
use super::{deserialize_some, text_enum};
use crate::errors::AppError;
use crate::utils::validation::{validate_latitude, validate_longitude, validate_payload};

text_enum! {
    pub enum ActivityCategory {
        Food => "food",
        Travel => "travel",
        Stay => "stay",
        Explore => "explore",
    }
    default = Explore;
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Activity {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    pub category: ActivityCategory,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct NewActivity {
    pub trip_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub category: ActivityCategory,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewActivity {
    pub fn validate_all(&self) -> Result<(), AppError> {
        validate_payload(self)?;
        if let Some(latitude) = self.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(longitude) = self.longitude {
            validate_longitude(longitude)?;
        }
        Ok(())
    }
}

#[derive(Deserialize, Validate, Debug, Default)]
pub struct ActivityPatch {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub category: Option<ActivityCategory>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub longitude: Option<Option<f64>>,
}

impl ActivityPatch {
    pub fn apply(self, activity: &mut Activity) -> Result<(), AppError> {
        validate_payload(&self)?;
        if let Some(Some(latitude)) = self.latitude {
            validate_latitude(latitude)?;
        }
        if let Some(Some(longitude)) = self.longitude {
            validate_longitude(longitude)?;
        }

        if let Some(title) = self.title {
            activity.title = title;
        }
        if let Some(description) = self.description {
            activity.description = description;
        }
        if let Some(scheduled_time) = self.scheduled_time {
            activity.scheduled_time = scheduled_time;
        }
        if let Some(category) = self.category {
            activity.category = category;
        }
        if let Some(latitude) = self.latitude {
            activity.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            activity.longitude = longitude;
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ReorderRequest {
    pub activity_orders: Vec<SortOrder>,
}
