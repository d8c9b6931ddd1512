use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::expense::{
    normalize_currency, to_cents, CategoryTotal, Expense, ExpenseCategory, ExpensePatch,
    ExpenseSummary, NewExpense,
};
use crate::services::trips;

fn expense_not_found() -> AppError {
    AppError::NotFound("Expense not found".to_string())
}

/// Expenses of an owned trip, latest first, optionally narrowed to one category.
pub async fn list_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    user_id: Uuid,
    category: Option<ExpenseCategory>,
) -> Result<Vec<Expense>, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let expenses = sqlx::query_as::<_, Expense>(
        "SELECT * FROM expenses
        WHERE trip_id = $1 AND ($2::text IS NULL OR category = $2)
        ORDER BY date DESC, created_at DESC, id DESC",
    )
    .bind(trip_id)
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(expenses)
}

pub async fn get(pool: &PgPool, expense_id: Uuid, user_id: Uuid) -> Result<Expense, AppError> {
    sqlx::query_as::<_, Expense>(
        "SELECT e.* FROM expenses e
        JOIN trips t ON t.id = e.trip_id
        WHERE e.id = $1 AND t.user_id = $2",
    )
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(expense_not_found)
}

pub async fn create(pool: &PgPool, user_id: Uuid, expense: NewExpense) -> Result<Expense, AppError> {
    let amount = to_cents(expense.amount)?;
    let currency = normalize_currency(&expense.currency)?;

    let mut tx = pool.begin().await?;
    trips::ensure_owned(&mut *tx, expense.trip_id, user_id).await?;

    let created = sqlx::query_as::<_, Expense>(
        "INSERT INTO expenses (id, trip_id, title, amount_cents, currency, category, date, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(expense.trip_id)
    .bind(&expense.title)
    .bind(amount)
    .bind(&currency)
    .bind(expense.category)
    .bind(expense.date)
    .bind(&expense.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(created)
}

pub async fn update(
    pool: &PgPool,
    expense_id: Uuid,
    user_id: Uuid,
    patch: ExpensePatch,
) -> Result<Expense, AppError> {
    let mut tx = pool.begin().await?;

    let mut expense = sqlx::query_as::<_, Expense>(
        "SELECT e.* FROM expenses e
        JOIN trips t ON t.id = e.trip_id
        WHERE e.id = $1 AND t.user_id = $2
        FOR UPDATE OF e",
    )
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(expense_not_found)?;

    patch.apply(&mut expense)?;

    let updated = sqlx::query_as::<_, Expense>(
        "UPDATE expenses
        SET title = $1, amount_cents = $2, currency = $3, category = $4, date = $5,
            notes = $6, updated_at = NOW()
        WHERE id = $7
        RETURNING *",
    )
    .bind(&expense.title)
    .bind(expense.amount_cents)
    .bind(&expense.currency)
    .bind(expense.category)
    .bind(expense.date)
    .bind(&expense.notes)
    .bind(expense.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn delete(pool: &PgPool, expense_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query(
        "DELETE FROM expenses e
        USING trips t
        WHERE e.id = $1 AND e.trip_id = t.id AND t.user_id = $2",
    )
    .bind(expense_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(expense_not_found());
    }
    Ok(())
}

/// Spending of an owned trip grouped by category and currency.
pub async fn summary(pool: &PgPool, trip_id: Uuid, user_id: Uuid) -> Result<ExpenseSummary, AppError> {
    trips::ensure_owned(pool, trip_id, user_id).await?;

    let totals = sqlx::query_as::<_, CategoryTotal>(
        "SELECT category, currency, SUM(amount_cents)::int8 AS total_amount, COUNT(*) AS count
        FROM expenses
        WHERE trip_id = $1
        GROUP BY category, currency
        ORDER BY category, currency",
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(ExpenseSummary::from_totals(totals))
}
