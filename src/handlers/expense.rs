use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::expense::{Cents, Expense, ExpenseCategory, ExpensePatch, NewExpense};
use crate::services::expenses;
use crate::utils::jwt::current_user;

#[derive(Deserialize)]
pub struct ListExpensesQuery {
    trip_id: Uuid,
    category: Option<ExpenseCategory>,
}

#[derive(Deserialize)]
pub struct TripQuery {
    trip_id: Uuid,
}

#[derive(Serialize)]
pub struct ExpenseListResponse {
    expenses: Vec<Expense>,
    total: usize,
    total_amount: Cents,
}

// GET /api/v1/expenses?trip_id=&category=
pub async fn list_expenses(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<ListExpensesQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let expenses = expenses::list_for_trip(&pool, query.trip_id, user.id, query.category).await?;

    Ok(HttpResponse::Ok().json(ExpenseListResponse {
        total: expenses.len(),
        total_amount: expenses.iter().map(|e| e.amount_cents).sum(),
        expenses,
    }))
}

// GET /api/v1/expenses/summary?trip_id=
pub async fn expense_summary(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let summary = expenses::summary(&pool, query.trip_id, user.id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

// POST /api/v1/expenses
pub async fn create_expense(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<NewExpense>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    payload.validate_all()?;

    let expense = expenses::create(&pool, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(expense))
}

// GET /api/v1/expenses/{expense_id}
pub async fn get_expense(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    expense_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let expense = expenses::get(&pool, *expense_id, user.id).await?;
    Ok(HttpResponse::Ok().json(expense))
}

// PATCH /api/v1/expenses/{expense_id}
pub async fn update_expense(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    expense_id: web::Path<Uuid>,
    payload: web::Json<ExpensePatch>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let expense = expenses::update(&pool, *expense_id, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(expense))
}

// DELETE /api/v1/expenses/{expense_id}
pub async fn delete_expense(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    expense_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    expenses::delete(&pool, *expense_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
