use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::trip::{NewTrip, Trip, TripPatch, TripStatus};
use crate::services::trips;
use crate::utils::jwt::current_user;
use crate::utils::pagination::Page;

#[derive(Deserialize)]
pub struct ListTripsQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    status: Option<TripStatus>,
}

#[derive(Serialize)]
pub struct TripListResponse {
    trips: Vec<Trip>,
    total: i64,
    page: i64,
    page_size: i64,
}

// GET /api/v1/trips
pub async fn list_trips(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<ListTripsQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let page = Page::from_query(query.page, query.page_size)?;

    let (trips, total) = trips::list(&pool, user.id, page, query.status).await?;

    Ok(HttpResponse::Ok().json(TripListResponse {
        trips,
        total,
        page: page.page,
        page_size: page.page_size,
    }))
}

// POST /api/v1/trips
pub async fn create_trip(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<NewTrip>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    payload.validate_all()?;

    let trip = trips::create(&pool, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(trip))
}

// GET /api/v1/trips/{trip_id}
pub async fn get_trip(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    trip_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let trip = trips::get(&pool, *trip_id, user.id).await?;
    Ok(HttpResponse::Ok().json(trip))
}

// PATCH /api/v1/trips/{trip_id}
pub async fn update_trip(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    trip_id: web::Path<Uuid>,
    payload: web::Json<TripPatch>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let trip = trips::update(&pool, *trip_id, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(trip))
}

// DELETE /api/v1/trips/{trip_id}
pub async fn delete_trip(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    trip_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    trips::delete(&pool, *trip_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
