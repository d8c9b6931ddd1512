use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityPatch, NewActivity, ReorderRequest};
use crate::services::ordering::{self, TripChildren};
use crate::services::trips;

fn activity_not_found() -> AppError {
    AppError::NotFound("Activity not found".to_string())
}

/// All activities of an owned trip in display order.
pub async fn list_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Activity>, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let activities = sqlx::query_as::<_, Activity>(
        "SELECT * FROM activities WHERE trip_id = $1 ORDER BY sort_order ASC, scheduled_time ASC",
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(activities)
}

pub async fn get(pool: &PgPool, activity_id: Uuid, user_id: Uuid) -> Result<Activity, AppError> {
    sqlx::query_as::<_, Activity>(
        "SELECT a.* FROM activities a
        JOIN trips t ON t.id = a.trip_id
        WHERE a.id = $1 AND t.user_id = $2",
    )
    .bind(activity_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(activity_not_found)
}

/// Appends the activity after the trip's current highest sort order.
pub async fn create(pool: &PgPool, user_id: Uuid, activity: NewActivity) -> Result<Activity, AppError> {
    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, activity.trip_id, user_id).await?;

    let created = sqlx::query_as::<_, Activity>(
        "INSERT INTO activities (id, trip_id, title, description, scheduled_time, category, latitude, longitude, sort_order, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
            (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM activities WHERE trip_id = $2),
            NOW(), NOW())
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(activity.trip_id)
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.scheduled_time)
    .bind(activity.category)
    .bind(activity.latitude)
    .bind(activity.longitude)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}

pub async fn update(
    pool: &PgPool,
    activity_id: Uuid,
    user_id: Uuid,
    patch: ActivityPatch,
) -> Result<Activity, AppError> {
    let mut tx = pool.begin().await?;

    let mut activity = sqlx::query_as::<_, Activity>(
        "SELECT a.* FROM activities a
        JOIN trips t ON t.id = a.trip_id
        WHERE a.id = $1 AND t.user_id = $2
        FOR UPDATE OF a",
    )
    .bind(activity_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(activity_not_found)?;

    patch.apply(&mut activity)?;

    let updated = sqlx::query_as::<_, Activity>(
        "UPDATE activities
        SET title = $1, description = $2, scheduled_time = $3, category = $4,
            latitude = $5, longitude = $6, updated_at = NOW()
        WHERE id = $7
        RETURNING *",
    )
    .bind(&activity.title)
    .bind(&activity.description)
    .bind(activity.scheduled_time)
    .bind(activity.category)
    .bind(activity.latitude)
    .bind(activity.longitude)
    .bind(activity.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete(pool: &PgPool, activity_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "DELETE FROM activities a
        USING trips t
        WHERE a.id = $1 AND a.trip_id = t.id AND t.user_id = $2",
    )
    .bind(activity_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(activity_not_found());
    }
    Ok(())
}

/// Applies the sort keys in one transaction; see [`ordering::reorder`].
pub async fn reorder(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    request: &ReorderRequest,
) -> Result<u64, AppError> {
    ordering::reorder(
        pool,
        TripChildren::Activities,
        trip_id,
        user_id,
        &request.activity_orders,
    )
    .await
}
