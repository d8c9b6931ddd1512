use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::memory::{Memory, NewMemory};
use crate::services::trips;

fn memory_not_found() -> AppError {
    AppError::NotFound("Memory not found".to_string())
}

pub async fn list_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Memory>, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let memories = sqlx::query_as::<_, Memory>(
        "SELECT * FROM memories WHERE trip_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(memories)
}

pub async fn get(pool: &PgPool, memory_id: Uuid, user_id: Uuid) -> Result<Memory, AppError> {
    sqlx::query_as::<_, Memory>(
        "SELECT m.* FROM memories m
        JOIN trips t ON t.id = m.trip_id
        WHERE m.id = $1 AND t.user_id = $2",
    )
    .bind(memory_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(memory_not_found)
}

pub async fn create(pool: &PgPool, user_id: Uuid, memory: NewMemory) -> Result<Memory, AppError> {
    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, memory.trip_id, user_id).await?;

    let created = sqlx::query_as::<_, Memory>(
        "INSERT INTO memories (id, trip_id, photo_url, latitude, longitude, caption, taken_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(memory.trip_id)
    .bind(&memory.photo_url)
    .bind(memory.latitude)
    .bind(memory.longitude)
    .bind(&memory.caption)
    .bind(memory.taken_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}

pub async fn delete(pool: &PgPool, memory_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "DELETE FROM memories m
        USING trips t
        WHERE m.id = $1 AND m.trip_id = t.id AND t.user_id = $2",
    )
    .bind(memory_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(memory_not_found());
    }
    Ok(())
}
