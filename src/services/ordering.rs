use log::info;
use sqlx::{PgConnection, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::ordering::{self, SortOrder};
use crate::services::trips;

/// Trip children that carry a `sort_order` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripChildren {
    Activities,
    PackingItems,
}

impl TripChildren {
    fn table(self) -> &'static str {
        match self {
            TripChildren::Activities => "activities",
            TripChildren::PackingItems => "packing_items",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            TripChildren::Activities => "Activity",
            TripChildren::PackingItems => "Packing item",
        }
    }
}

/// Locks the listed rows and fails with `NotFound` naming the first id that
/// does not belong to `trip_id`.
pub async fn lock_in_trip(
    conn: &mut PgConnection,
    children: TripChildren,
    trip_id: Uuid,
    ids: &[Uuid],
) -> Result<(), AppError> {
    let sql = format!(
        "SELECT id FROM {} WHERE trip_id = $1 AND id = ANY($2) FOR UPDATE",
        children.table()
    );
    let found: Vec<Uuid> = sqlx::query_scalar(&sql)
        .bind(trip_id)
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;

    match first_missing(ids, &found) {
        Some(missing) => Err(AppError::NotFound(format!(
            "{} {} does not belong to trip {}",
            children.noun(),
            missing,
            trip_id
        ))),
        None => Ok(()),
    }
}

/// Rewrites the sort order of every listed row in one transaction.
///
/// The whole batch is rejected, and nothing is written, if any id does not
/// belong to `trip_id`. Overlapping reorders are not coordinated beyond the
/// database's isolation: the last commit wins.
pub async fn reorder(
    pool: &PgPool,
    children: TripChildren,
    trip_id: Uuid,
    user_id: Uuid,
    orders: &[SortOrder],
) -> Result<u64, AppError> {
    ordering::validate_sort_orders(orders)?;

    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, trip_id, user_id).await?;

    let ids = ordering::ids(orders);
    if ids.is_empty() {
        return Ok(0);
    }
    lock_in_trip(&mut *tx, children, trip_id, &ids).await?;

    let sql = format!(
        "UPDATE {} AS c
        SET sort_order = v.sort_order, updated_at = NOW()
        FROM UNNEST($1::uuid[], $2::int4[]) AS v(id, sort_order)
        WHERE c.id = v.id AND c.trip_id = $3",
        children.table()
    );
    let updated = sqlx::query(&sql)
        .bind(&ids)
        .bind(ordering::sort_orders(orders))
        .bind(trip_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    info!("Reordered {} {} in trip {}", updated, children.table(), trip_id);
    Ok(updated)
}

fn first_missing(requested: &[Uuid], found: &[Uuid]) -> Option<Uuid> {
    let found: HashSet<&Uuid> = found.iter().collect();
    requested.iter().find(|id| !found.contains(id)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_missing_reports_the_first_foreign_id() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(first_missing(&[a, b, c], &[c, a]), Some(b));
        assert_eq!(first_missing(&[a, b], &[b, a]), None);
        assert_eq!(first_missing(&[], &[a]), None);
    }

    #[test]
    fn children_map_to_their_tables() {
        assert_eq!(TripChildren::Activities.table(), "activities");
        assert_eq!(TripChildren::PackingItems.table(), "packing_items");
    }
}
