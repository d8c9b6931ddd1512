use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityPatch, NewActivity, ReorderRequest};
use crate::services::activities;
use crate::utils::jwt::current_user;

#[derive(Deserialize)]
pub struct TripQuery {
    trip_id: Uuid,
}

#[derive(Serialize)]
pub struct ActivityListResponse {
    total: usize,
    activities: Vec<Activity>,
}

#[derive(Serialize)]
struct ReorderResponse {
    message: &'static str,
    updated: u64,
}

// GET /api/v1/activities?trip_id=
pub async fn list_activities(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let activities = activities::list_for_trip(&pool, query.trip_id, user.id).await?;

    Ok(HttpResponse::Ok().json(ActivityListResponse {
        total: activities.len(),
        activities,
    }))
}

// POST /api/v1/activities
pub async fn create_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<NewActivity>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    payload.validate_all()?;

    let activity = activities::create(&pool, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(activity))
}

// GET /api/v1/activities/{activity_id}
pub async fn get_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    activity_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let activity = activities::get(&pool, *activity_id, user.id).await?;
    Ok(HttpResponse::Ok().json(activity))
}

// PATCH /api/v1/activities/{activity_id}
pub async fn update_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    activity_id: web::Path<Uuid>,
    payload: web::Json<ActivityPatch>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let activity = activities::update(&pool, *activity_id, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(activity))
}

// DELETE /api/v1/activities/{activity_id}
pub async fn delete_activity(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    activity_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    activities::delete(&pool, *activity_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// PUT /api/v1/activities/reorder?trip_id=
pub async fn reorder_activities(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
    payload: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let updated = activities::reorder(&pool, query.trip_id, user.id, &payload).await?;

    Ok(HttpResponse::Ok().json(ReorderResponse {
        message: "Activities reordered successfully",
        updated,
    }))
}
