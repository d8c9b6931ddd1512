use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures_util::StreamExt;
use log::{error, info};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::memory::{Memory, NewMemory};
use crate::services::{memories, trips};
use crate::utils::jwt::current_user;
use crate::utils::s3::ImageHost;
use crate::utils::validation::{validate_latitude, validate_longitude};

const MAX_TEXT_FIELD_BYTES: usize = 4096;
const PHOTO_FOLDER: &str = "memories";

#[derive(Deserialize)]
pub struct TripQuery {
    trip_id: Uuid,
}

#[derive(Serialize)]
pub struct MemoryListResponse {
    total: usize,
    memories: Vec<Memory>,
}

/// Text fields of the memory upload form, as received.
#[derive(Default, Debug)]
struct MemoryForm {
    trip_id: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    caption: Option<String>,
    taken_at: Option<String>,
    photo: Vec<u8>,
}

impl MemoryForm {
    fn set_text(&mut self, name: &str, value: String) -> Result<(), AppError> {
        let slot = match name {
            "trip_id" => &mut self.trip_id,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            "caption" => &mut self.caption,
            "taken_at" => &mut self.taken_at,
            other => {
                return Err(AppError::BadRequest(format!("Unexpected form field '{}'", other)));
            }
        };
        *slot = Some(value);
        Ok(())
    }

    /// Checks and converts the fields; `photo_url` is filled in after upload.
    fn finish(self) -> Result<(NewMemory, Vec<u8>), AppError> {
        let trip_id = required(self.trip_id, "trip_id")?;
        let trip_id = Uuid::parse_str(trip_id.trim())
            .map_err(|_| AppError::BadRequest("trip_id must be a UUID".to_string()))?;

        let latitude = parse_coordinate(required(self.latitude, "latitude")?, "latitude")?;
        validate_latitude(latitude)?;
        let longitude = parse_coordinate(required(self.longitude, "longitude")?, "longitude")?;
        validate_longitude(longitude)?;

        let taken_at = match self.taken_at.filter(|value| !value.trim().is_empty()) {
            Some(raw) => Some(parse_timestamp(&raw)?),
            None => None,
        };
        let caption = self
            .caption
            .map(|caption| caption.trim().to_string())
            .filter(|caption| !caption.is_empty());

        if self.photo.is_empty() {
            return Err(AppError::BadRequest("Photo file is required".to_string()));
        }

        let memory = NewMemory {
            trip_id,
            photo_url: String::new(),
            latitude,
            longitude,
            caption,
            taken_at,
        };
        Ok((memory, self.photo))
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
}

fn parse_coordinate(raw: String, name: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::BadRequest(format!("{} must be a number", name)))
}

/// Accepts RFC 3339, or a timestamp without offset which is taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::BadRequest("taken_at must be an ISO 8601 timestamp".to_string()))
}

async fn read_form(mut multipart: Multipart, max_photo_bytes: usize) -> Result<MemoryForm, AppError> {
    let mut form = MemoryForm::default();

    while let Some(item) = multipart.next().await {
        let mut field = item.map_err(|err| {
            error!("Invalid multipart field: {:?}", err);
            AppError::BadRequest("Invalid multipart field".to_string())
        })?;
        let name = field.name().to_string();
        let (is_photo, limit) = if name == "photo" {
            (true, max_photo_bytes)
        } else {
            (false, MAX_TEXT_FIELD_BYTES)
        };

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| {
                error!("Failed to read chunk: {:?}", err);
                AppError::BadRequest("Failed to read chunk".to_string())
            })?;
            if data.len() + chunk.len() > limit {
                return Err(AppError::BadRequest(format!(
                    "Field '{}' exceeds the {} byte limit",
                    name, limit
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if is_photo {
            form.photo = data;
        } else {
            let value = String::from_utf8(data)
                .map_err(|_| AppError::BadRequest(format!("Field '{}' must be UTF-8 text", name)))?;
            form.set_text(&name, value)?;
        }
    }

    Ok(form)
}

// GET /api/v1/memories?trip_id=
pub async fn list_memories(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let memories = memories::list_for_trip(&pool, query.trip_id, user.id).await?;

    Ok(HttpResponse::Ok().json(MemoryListResponse {
        total: memories.len(),
        memories,
    }))
}

// GET /api/v1/memories/{memory_id}
pub async fn get_memory(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    memory_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let memory = memories::get(&pool, *memory_id, user.id).await?;
    Ok(HttpResponse::Ok().json(memory))
}

// POST /api/v1/memories (multipart/form-data)
pub async fn create_memory(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    image_host: web::Data<ImageHost>,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;

    let multipart = Multipart::new(req.headers(), payload);
    let form = read_form(multipart, config.max_photo_bytes).await?;
    let (mut memory, photo) = form.finish()?;

    // Nothing is uploaded for trips the caller cannot write to.
    trips::ensure_owned(pool.get_ref(), memory.trip_id, user.id).await?;

    info!("Photo size: {} bytes", photo.len());
    memory.photo_url = image_host.upload_photo(PHOTO_FOLDER, photo).await?;

    let created = memories::create(&pool, user.id, memory).await?;
    Ok(HttpResponse::Created().json(created))
}

// DELETE /api/v1/memories/{memory_id}
pub async fn delete_memory(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    memory_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    memories::delete(&pool, *memory_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
