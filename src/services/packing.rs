use log::info;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::packing::{
    BulkToggleRequest, CategoryCount, NewPackingItem, PackingCategory, PackingItem,
    PackingItemPatch, PackingProgress, PackingReorderRequest,
};
use crate::services::ordering::{self, TripChildren};
use crate::services::trips;

fn item_not_found() -> AppError {
    AppError::NotFound("Packing item not found".to_string())
}

/// Items of an owned trip grouped by category, in display order.
pub async fn list_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    category: Option<PackingCategory>,
) -> Result<Vec<PackingItem>, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let items = sqlx::query_as::<_, PackingItem>(
        "SELECT * FROM packing_items
        WHERE trip_id = $1 AND ($2::text IS NULL OR category = $2)
        ORDER BY category ASC, sort_order ASC, created_at ASC",
    )
    .bind(trip_id)
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

pub async fn get(pool: &PgPool, item_id: Uuid, user_id: Uuid) -> Result<PackingItem, AppError> {
    sqlx::query_as::<_, PackingItem>(
        "SELECT p.* FROM packing_items p
        JOIN trips t ON t.id = p.trip_id
        WHERE p.id = $1 AND t.user_id = $2",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(item_not_found)
}

/// Appends the item after the highest sort order within its category.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    item: NewPackingItem,
) -> Result<PackingItem, AppError> {
    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, item.trip_id, user_id).await?;

    let created = sqlx::query_as::<_, PackingItem>(
        "INSERT INTO packing_items (id, trip_id, name, category, is_packed, quantity, notes, sort_order, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7,
            (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM packing_items WHERE trip_id = $2 AND category = $4),
            NOW(), NOW())
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(item.trip_id)
    .bind(&item.name)
    .bind(item.category)
    .bind(item.is_packed)
    .bind(item.quantity)
    .bind(&item.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}

pub async fn update(
    pool: &PgPool,
    item_id: Uuid,
    user_id: Uuid,
    patch: PackingItemPatch,
) -> Result<PackingItem, AppError> {
    let mut tx = pool.begin().await?;

    let mut item = sqlx::query_as::<_, PackingItem>(
        "SELECT p.* FROM packing_items p
        JOIN trips t ON t.id = p.trip_id
        WHERE p.id = $1 AND t.user_id = $2
        FOR UPDATE OF p",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(item_not_found)?;

    patch.apply(&mut item)?;

    let updated = sqlx::query_as::<_, PackingItem>(
        "UPDATE packing_items
        SET name = $1, category = $2, is_packed = $3, quantity = $4, notes = $5, updated_at = NOW()
        WHERE id = $6
        RETURNING *",
    )
    .bind(&item.name)
    .bind(item.category)
    .bind(item.is_packed)
    .bind(item.quantity)
    .bind(&item.notes)
    .bind(item.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Flips `is_packed` in a single statement.
pub async fn toggle(pool: &PgPool, item_id: Uuid, user_id: Uuid) -> Result<PackingItem, AppError> {
    sqlx::query_as::<_, PackingItem>(
        "UPDATE packing_items p
        SET is_packed = NOT p.is_packed, updated_at = NOW()
        FROM trips t
        WHERE p.id = $1 AND p.trip_id = t.id AND t.user_id = $2
        RETURNING p.*",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(item_not_found)
}

/// Sets `is_packed` on every listed item of the trip, or on none of them.
pub async fn bulk_toggle(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    request: &BulkToggleRequest,
) -> Result<u64, AppError> {
    let ids = request.unique_ids();

    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, trip_id, user_id).await?;
    if ids.is_empty() {
        return Ok(0);
    }
    ordering::lock_in_trip(&mut *tx, TripChildren::PackingItems, trip_id, &ids).await?;

    let updated = sqlx::query(
        "UPDATE packing_items
        SET is_packed = $1, updated_at = NOW()
        WHERE trip_id = $2 AND id = ANY($3)",
    )
    .bind(request.is_packed)
    .bind(trip_id)
    .bind(&ids)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    info!("Marked {} packing items in trip {} as packed={}", updated, trip_id, request.is_packed);
    Ok(updated)
}

pub async fn delete(pool: &PgPool, item_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "DELETE FROM packing_items p
        USING trips t
        WHERE p.id = $1 AND p.trip_id = t.id AND t.user_id = $2",
    )
    .bind(item_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(item_not_found());
    }
    Ok(())
}

/// Applies the sort keys in one transaction; see [`ordering::reorder`].
pub async fn reorder(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    request: &PackingReorderRequest,
) -> Result<u64, AppError> {
    ordering::reorder(
        pool,
        TripChildren::PackingItems,
        trip_id,
        user_id,
        &request.item_orders,
    )
    .await
}

pub async fn progress(pool: &PgPool, trip_id: Uuid, user_id: Uuid) -> Result<PackingProgress, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let counts = sqlx::query_as::<_, CategoryCount>(
        "SELECT category, COUNT(*) AS total, COUNT(*) FILTER (WHERE is_packed) AS packed
        FROM packing_items
        WHERE trip_id = $1
        GROUP BY category
        ORDER BY category",
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(PackingProgress::from_counts(counts))
}
