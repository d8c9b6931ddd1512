use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::statistics::{validate_year, Window};
use crate::services::statistics;
use crate::utils::jwt::current_user;

#[derive(Deserialize)]
pub struct YearQuery {
    year: Option<i32>,
}

#[derive(Deserialize)]
pub struct TimelineQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

// GET /api/v1/statistics
pub async fn overall(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let stats = statistics::overall(&pool, user.id, user.created_at.date_naive()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

// GET /api/v1/statistics/year-in-review?year=
pub async fn year_in_review(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let year = validate_year(query.year.unwrap_or_else(|| Utc::now().year()))?;

    let review = statistics::year_in_review(&pool, user.id, year).await?;
    Ok(HttpResponse::Ok().json(review))
}

// GET /api/v1/statistics/timeline?limit=&offset=
pub async fn timeline(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TimelineQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let window = Window::from_query(query.limit, query.offset)?;

    let timeline = statistics::timeline(&pool, user.id, window).await?;
    Ok(HttpResponse::Ok().json(timeline))
}
