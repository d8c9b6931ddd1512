use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{deserialize_some, text_enum};
use crate::errors::AppError;
use crate::utils::validation::{validate_payload, validate_tags, validate_url};

text_enum! {
    /// Lifecycle of a trip.
    pub enum TripStatus {
        Planned => "planned",
        Ongoing => "ongoing",
        Completed => "completed",
    }
    default = Planned;
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: TripStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct NewTrip {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTrip {
    pub fn validate_all(&self) -> Result<(), AppError> {
        validate_payload(self)?;
        if let Some(url) = &self.cover_image_url {
            validate_url(url)?;
        }
        validate_tags(&self.tags)?;
        validate_date_range(self.start_date, self.end_date)
    }
}

/// Partial update; nullable fields use a nested `Option` so `null` clears them.
#[derive(Deserialize, Validate, Debug, Default)]
pub struct TripPatch {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub cover_image_url: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<TripStatus>,
    pub tags: Option<Vec<String>>,
}

impl TripPatch {
    /// Merges the patch into `trip`, validating the combined result.
    pub fn apply(self, trip: &mut Trip) -> Result<(), AppError> {
        validate_payload(&self)?;
        if let Some(Some(url)) = &self.cover_image_url {
            validate_url(url)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }

        if let Some(title) = self.title {
            trip.title = title;
        }
        if let Some(description) = self.description {
            trip.description = description;
        }
        if let Some(cover_image_url) = self.cover_image_url {
            trip.cover_image_url = cover_image_url;
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(status) = self.status {
            trip.status = status;
        }
        if let Some(tags) = self.tags {
            trip.tags = tags;
        }

        validate_date_range(trip.start_date, trip.end_date)
    }
}

fn validate_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::BadRequest(
            "End date cannot be before start date".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trip() -> Trip {
        Trip {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Lisbon".to_string(),
            description: Some("Tiles and tarts".to_string()),
            cover_image_url: Some("https://images.example.com/lisbon.jpg".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 5, 7).unwrap()),
            status: TripStatus::Planned,
            tags: vec!["europe".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_defaults_to_planned_and_parses_lowercase() {
        let trip: NewTrip =
            serde_json::from_str(r#"{"title": "Kyoto", "start_date": "2025-04-01"}"#).unwrap();
        assert_eq!(trip.status, TripStatus::Planned);
        assert!(trip.tags.is_empty());

        assert_eq!("ongoing".parse::<TripStatus>(), Ok(TripStatus::Ongoing));
        assert!("Ongoing".parse::<TripStatus>().is_err());
    }

    #[test]
    fn unknown_status_is_rejected_by_deserializer() {
        let result: Result<NewTrip, _> = serde_json::from_str(
            r#"{"title": "Kyoto", "start_date": "2025-04-01", "status": "cancelled"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn patch_leaves_absent_fields_and_clears_nulls() {
        let mut trip = sample_trip();
        let patch: TripPatch =
            serde_json::from_str(r#"{"title": "Porto", "description": null, "status": "completed"}"#)
                .unwrap();

        patch.apply(&mut trip).unwrap();

        assert_eq!(trip.title, "Porto");
        assert_eq!(trip.description, None);
        assert_eq!(trip.status, TripStatus::Completed);
        assert!(trip.cover_image_url.is_some());
        assert_eq!(trip.tags, vec!["europe".to_string()]);
    }

    #[test]
    fn overlong_cover_url_is_rejected_on_create_and_patch() {
        let url = format!("https://example.com/{}", "a".repeat(600));

        let trip: NewTrip = serde_json::from_value(serde_json::json!({
            "title": "Oslo",
            "start_date": "2025-04-01",
            "cover_image_url": url,
        }))
        .unwrap();
        assert!(matches!(trip.validate_all(), Err(AppError::BadRequest(_))));

        let mut existing = sample_trip();
        let patch: TripPatch =
            serde_json::from_value(serde_json::json!({ "cover_image_url": url })).unwrap();
        assert!(matches!(patch.apply(&mut existing), Err(AppError::BadRequest(_))));
        assert_eq!(
            existing.cover_image_url.as_deref(),
            Some("https://images.example.com/lisbon.jpg")
        );
    }

    #[test]
    fn patch_rejects_end_before_start() {
        let mut trip = sample_trip();
        let patch: TripPatch = serde_json::from_str(r#"{"end_date": "2025-04-30"}"#).unwrap();
        assert!(matches!(patch.apply(&mut trip), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn create_rejects_empty_title_and_bad_cover_url() {
        let empty: NewTrip =
            serde_json::from_str(r#"{"title": "", "start_date": "2025-04-01"}"#).unwrap();
        assert!(empty.validate_all().is_err());

        let bad_url: NewTrip = serde_json::from_str(
            r#"{"title": "Oslo", "start_date": "2025-04-01", "cover_image_url": "not a url"}"#,
        )
        .unwrap();
        assert!(bad_url.validate_all().is_err());
    }
}
