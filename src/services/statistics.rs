use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::ActivityCategory;
use crate::models::expense::{Cents, ExpenseCategory};
use crate::models::packing::progress_percent;
use crate::models::statistics::{
    average_cents, spending_by_category, total_days_traveled, ActivityStatistics,
    ExpenseStatistics, MemoryStatistics, OverallStatistics, PackingStatistics, Timeline,
    TimelineItem, TripSpan, TripStatistics, Window, YearInReview, YearSpans,
};

async fn trip_spans(pool: &PgPool, user_id: Uuid, year: Option<i32>) -> Result<Vec<TripSpan>, AppError> {
    let spans = sqlx::query_as::<_, TripSpan>(
        "SELECT title, start_date, end_date, status FROM trips
        WHERE user_id = $1 AND ($2::int4 IS NULL OR EXTRACT(YEAR FROM start_date)::int4 = $2)
        ORDER BY start_date ASC, id ASC",
    )
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(spans)
}

/// Totals per currency over the user's trips, optionally those starting in `year`.
async fn amount_by_currency(
    pool: &PgPool,
    user_id: Uuid,
    year: Option<i32>,
) -> Result<BTreeMap<String, Cents>, AppError> {
    let rows: Vec<(String, Cents)> = sqlx::query_as(
        "SELECT e.currency, SUM(e.amount_cents)::int8
        FROM expenses e
        JOIN trips t ON t.id = e.trip_id
        WHERE t.user_id = $1 AND ($2::int4 IS NULL OR EXTRACT(YEAR FROM t.start_date)::int4 = $2)
        GROUP BY e.currency",
    )
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

async fn activity_statistics(pool: &PgPool, user_id: Uuid) -> Result<ActivityStatistics, AppError> {
    let counts: Vec<(ActivityCategory, i64)> = sqlx::query_as(
        "SELECT a.category, COUNT(*)
        FROM activities a
        JOIN trips t ON t.id = a.trip_id
        WHERE t.user_id = $1
        GROUP BY a.category",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ActivityStatistics::from_counts(&counts))
}

async fn memory_statistics(
    pool: &PgPool,
    user_id: Uuid,
    current_year: i32,
) -> Result<MemoryStatistics, AppError> {
    let by_trip: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT m.trip_id, COUNT(*)
        FROM memories m
        JOIN trips t ON t.id = m.trip_id
        WHERE t.user_id = $1
        GROUP BY m.trip_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let memories_this_year: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
        FROM memories m
        JOIN trips t ON t.id = m.trip_id
        WHERE t.user_id = $1 AND EXTRACT(YEAR FROM m.created_at)::int4 = $2",
    )
    .bind(user_id)
    .bind(current_year)
    .fetch_one(pool)
    .await?;

    Ok(MemoryStatistics {
        total_memories: by_trip.iter().map(|(_, count)| count).sum(),
        memories_this_year,
        memories_by_trip: by_trip.into_iter().collect(),
    })
}

async fn expense_statistics(pool: &PgPool, user_id: Uuid) -> Result<ExpenseStatistics, AppError> {
    let (total_expenses, total): (i64, Cents) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(e.amount_cents), 0)::int8
        FROM expenses e
        JOIN trips t ON t.id = e.trip_id
        WHERE t.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let by_category: Vec<(ExpenseCategory, Cents)> = sqlx::query_as(
        "SELECT e.category, SUM(e.amount_cents)::int8
        FROM expenses e
        JOIN trips t ON t.id = e.trip_id
        WHERE t.user_id = $1
        GROUP BY e.category",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ExpenseStatistics {
        total_expenses,
        total_amount_by_currency: amount_by_currency(pool, user_id, None).await?,
        expenses_by_category: spending_by_category(&by_category),
        average_expense: average_cents(total, total_expenses),
    })
}

async fn packing_statistics(pool: &PgPool, user_id: Uuid) -> Result<PackingStatistics, AppError> {
    let (total, packed): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE p.is_packed)
        FROM packing_items p
        JOIN trips t ON t.id = p.trip_id
        WHERE t.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(PackingStatistics {
        total_packing_items: total,
        packed_items: packed,
        packing_completion_rate: progress_percent(packed, total),
    })
}

/// Lifetime aggregates over everything the user owns.
pub async fn overall(
    pool: &PgPool,
    user_id: Uuid,
    member_since: NaiveDate,
) -> Result<OverallStatistics, AppError> {
    let current_year = Utc::now().year();
    let spans = trip_spans(pool, user_id, None).await?;

    Ok(OverallStatistics {
        trips: TripStatistics::from_spans(&spans, current_year),
        activities: activity_statistics(pool, user_id).await?,
        memories: memory_statistics(pool, user_id, current_year).await?,
        expenses: expense_statistics(pool, user_id).await?,
        packing: packing_statistics(pool, user_id).await?,
        total_days_traveled: total_days_traveled(&spans),
        member_since,
    })
}

/// Aggregates over the trips starting in `year` and their children.
pub async fn year_in_review(pool: &PgPool, user_id: Uuid, year: i32) -> Result<YearInReview, AppError> {
    let spans = trip_spans(pool, user_id, Some(year)).await?;

    let (total_activities, total_memories): (i64, i64) = sqlx::query_as(
        "SELECT
            (SELECT COUNT(*) FROM activities a JOIN trips t ON t.id = a.trip_id
                WHERE t.user_id = $1 AND EXTRACT(YEAR FROM t.start_date)::int4 = $2),
            (SELECT COUNT(*) FROM memories m JOIN trips t ON t.id = m.trip_id
                WHERE t.user_id = $1 AND EXTRACT(YEAR FROM t.start_date)::int4 = $2)",
    )
    .bind(user_id)
    .bind(year)
    .fetch_one(pool)
    .await?;

    let summary = YearSpans::from_spans(&spans);
    Ok(YearInReview {
        year,
        total_trips: spans.len() as i64,
        total_days_traveled: summary.total_days_traveled,
        total_activities,
        total_memories,
        total_expenses_by_currency: amount_by_currency(pool, user_id, Some(year)).await?,
        longest_trip_days: summary.longest_trip_days,
        longest_trip_title: summary.longest_trip_title,
        most_active_month: summary.most_active_month,
        trips_by_month: summary.trips_by_month,
    })
}

/// The user's trips, latest start first, with child counts.
pub async fn timeline(pool: &PgPool, user_id: Uuid, window: Window) -> Result<Timeline, AppError> {
    let total_trips: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, TimelineItem>(
        "SELECT t.id AS trip_id, t.title, t.start_date, t.end_date, t.status, t.cover_image_url,
            (SELECT COUNT(*) FROM activities a WHERE a.trip_id = t.id) AS activities_count,
            (SELECT COUNT(*) FROM memories m WHERE m.trip_id = t.id) AS memories_count
        FROM trips t
        WHERE t.user_id = $1
        ORDER BY t.start_date DESC, t.id DESC
        LIMIT $2 OFFSET $3",
    )
    .bind(user_id)
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(pool)
    .await?;

    Ok(Timeline { items, total_trips })
}
