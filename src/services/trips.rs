use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::trip::{NewTrip, Trip, TripPatch, TripStatus};
use crate::utils::pagination::Page;

fn trip_not_found() -> AppError {
    AppError::NotFound("Trip not found".to_string())
}

/// Fails with `NotFound` unless `trip_id` exists and belongs to `user_id`.
pub async fn ensure_owned<'e, E>(executor: E, trip_id: Uuid, user_id: Uuid) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    let owned: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM trips WHERE id = $1 AND user_id = $2)",
    )
    .bind(trip_id)
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    if owned {
        Ok(())
    } else {
        Err(trip_not_found())
    }
}

/// Returns one page of the user's trips, newest first, plus the total count.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    page: Page,
    status: Option<TripStatus>,
) -> Result<(Vec<Trip>, i64), AppError> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM trips WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    let trips = sqlx::query_as::<_, Trip>(
        "SELECT * FROM trips
        WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3 OFFSET $4",
    )
    .bind(user_id)
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((trips, total))
}

pub async fn get(pool: &PgPool, trip_id: Uuid, user_id: Uuid) -> Result<Trip, AppError> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 AND user_id = $2")
        .bind(trip_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(trip_not_found)
}

pub async fn create(pool: &PgPool, user_id: Uuid, trip: NewTrip) -> Result<Trip, AppError> {
    let created = sqlx::query_as::<_, Trip>(
        "INSERT INTO trips (id, user_id, title, description, cover_image_url, start_date, end_date, status, tags, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(&trip.title)
    .bind(&trip.description)
    .bind(&trip.cover_image_url)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.status)
    .bind(&trip.tags)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Loads the row under a lock, merges the patch and writes every column back.
pub async fn update(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    patch: TripPatch,
) -> Result<Trip, AppError> {
    let mut tx = pool.begin().await?;

    let mut trip = sqlx::query_as::<_, Trip>(
        "SELECT * FROM trips WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(trip_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(trip_not_found)?;

    patch.apply(&mut trip)?;

    let updated = sqlx::query_as::<_, Trip>(
        "UPDATE trips
        SET title = $1, description = $2, cover_image_url = $3, start_date = $4,
            end_date = $5, status = $6, tags = $7, updated_at = NOW()
        WHERE id = $8
        RETURNING *",
    )
    .bind(&trip.title)
    .bind(&trip.description)
    .bind(&trip.cover_image_url)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.status)
    .bind(&trip.tags)
    .bind(trip.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Deletes the trip; activities and memories go with it via ON DELETE CASCADE.
pub async fn delete(pool: &PgPool, trip_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM trips WHERE id = $1 AND user_id = $2")
        .bind(trip_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(trip_not_found());
    }
    Ok(())
}
