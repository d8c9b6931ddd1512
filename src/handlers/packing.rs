use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::packing::{
    BulkToggleRequest, NewPackingItem, PackingCategory, PackingItem, PackingItemPatch,
    PackingReorderRequest,
};
use crate::services::packing;
use crate::utils::jwt::current_user;

#[derive(Deserialize)]
pub struct ListPackingQuery {
    trip_id: Uuid,
    category: Option<PackingCategory>,
}

#[derive(Deserialize)]
pub struct TripQuery {
    trip_id: Uuid,
}

#[derive(Serialize)]
pub struct PackingListResponse {
    items: Vec<PackingItem>,
    total: usize,
    packed_count: usize,
    unpacked_count: usize,
}

#[derive(Serialize)]
struct BatchResponse {
    message: &'static str,
    updated: u64,
}

// GET /api/v1/packing?trip_id=&category=
pub async fn list_items(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<ListPackingQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let items = packing::list_for_trip(&pool, query.trip_id, user.id, query.category).await?;

    let packed_count = items.iter().filter(|item| item.is_packed).count();
    Ok(HttpResponse::Ok().json(PackingListResponse {
        total: items.len(),
        packed_count,
        unpacked_count: items.len() - packed_count,
        items,
    }))
}

// GET /api/v1/packing/progress?trip_id=
pub async fn packing_progress(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let progress = packing::progress(&pool, query.trip_id, user.id).await?;
    Ok(HttpResponse::Ok().json(progress))
}

// POST /api/v1/packing
pub async fn create_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<NewPackingItem>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    payload.validate_all()?;

    let item = packing::create(&pool, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

// GET /api/v1/packing/{item_id}
pub async fn get_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let item = packing::get(&pool, *item_id, user.id).await?;
    Ok(HttpResponse::Ok().json(item))
}

// PATCH /api/v1/packing/{item_id}
pub async fn update_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    item_id: web::Path<Uuid>,
    payload: web::Json<PackingItemPatch>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let item = packing::update(&pool, *item_id, user.id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

// POST /api/v1/packing/{item_id}/toggle
pub async fn toggle_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let item = packing::toggle(&pool, *item_id, user.id).await?;
    Ok(HttpResponse::Ok().json(item))
}

// POST /api/v1/packing/bulk-toggle?trip_id=
pub async fn bulk_toggle(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
    payload: web::Json<BulkToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let updated = packing::bulk_toggle(&pool, query.trip_id, user.id, &payload).await?;

    Ok(HttpResponse::Ok().json(BatchResponse {
        message: "Packing items updated successfully",
        updated,
    }))
}

// PUT /api/v1/packing/reorder?trip_id=
pub async fn reorder_items(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<TripQuery>,
    payload: web::Json<PackingReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    let updated = packing::reorder(&pool, query.trip_id, user.id, &payload).await?;

    Ok(HttpResponse::Ok().json(BatchResponse {
        message: "Packing items reordered successfully",
        updated,
    }))
}

// DELETE /api/v1/packing/{item_id}
pub async fn delete_item(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    packing::delete(&pool, *item_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}
