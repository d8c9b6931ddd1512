use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;
use crate::errors::AppError;

const MAX_TAGS: usize = 20;
const MAX_TAG_LENGTH: usize = 50;
/// Matches the `VARCHAR(500)` URL columns.
pub const MAX_URL_LENGTH: usize = 500;

lazy_static! {
    static ref URL_RE: Regex =
        Regex::new(r"^https?://[a-zA-Z0-9.-]+(\.[a-zA-Z]{2,}|:[0-9]{1,5})(:[0-9]{1,5})?(/[^\s]*)?$")
            .expect("URL pattern is valid");
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

// Regex validation for image links
pub fn validate_url(uri: &str) -> Result<(), AppError> {
    if uri.len() > MAX_URL_LENGTH {
        return Err(AppError::BadRequest(format!(
            "URL must be at most {} characters",
            MAX_URL_LENGTH
        )));
    }
    if !URL_RE.is_match(uri) {
        return Err(AppError::BadRequest("Invalid URL. It should be an http(s) URL".to_string()));
    }
    Ok(())
}

pub fn validate_latitude(latitude: f64) -> Result<(), AppError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::BadRequest("Latitude must be between -90 and 90".to_string()));
    }
    Ok(())
}

pub fn validate_longitude(longitude: f64) -> Result<(), AppError> {
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest("Longitude must be between -180 and 180".to_string()));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), AppError> {
    if tags.len() > MAX_TAGS {
        return Err(AppError::BadRequest(format!("At most {} tags are allowed", MAX_TAGS)));
    }
    if tags.iter().any(|tag| tag.trim().is_empty() || tag.chars().count() > MAX_TAG_LENGTH) {
        return Err(AppError::BadRequest(format!(
            "Tags must be non-empty and at most {} characters",
            MAX_TAG_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_links() {
        assert!(validate_url("https://images.unsplash.com/photo-1469474968028?w=800").is_ok());
        assert!(validate_url("http://localhost:9000/odyssey/memories/a.jpg").is_ok());
    }

    #[test]
    fn rejects_non_http_links() {
        assert!(validate_url("ftp://example.com/a.jpg").is_err());
        assert!(validate_url("example.com/a.jpg").is_err());
        assert!(validate_url("https://exa mple.com").is_err());
    }

    #[test]
    fn rejects_links_longer_than_the_column() {
        let base = "https://example.com/";
        let fits = format!("{}{}", base, "a".repeat(MAX_URL_LENGTH - base.len()));
        assert!(validate_url(&fits).is_ok());

        let too_long = format!("{}{}", base, "a".repeat(600));
        assert!(matches!(validate_url(&too_long), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn coordinate_bounds_are_inclusive() {
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0001).is_err());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.5).is_err());
        assert!(validate_longitude(f64::NAN).is_err());
    }

    #[test]
    fn tags_must_be_short_and_non_blank() {
        assert!(validate_tags(&["beach".to_string(), "food".to_string()]).is_ok());
        assert!(validate_tags(&["  ".to_string()]).is_err());
        assert!(validate_tags(&["x".repeat(51)]).is_err());
        assert!(validate_tags(&vec!["t".to_string(); 21]).is_err());
    }
}
