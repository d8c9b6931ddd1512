use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::services::seed;
use crate::utils::jwt::current_user;

// POST /api/v1/seed/demo-data
pub async fn create_demo_data(
    req: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;

    let demo_trips = seed::build_demo_trips(&mut rand::thread_rng(), Utc::now().date_naive());
    let summary = seed::insert_demo_trips(&pool, user.id, demo_trips).await?;

    info!(
        "Seeded {} trips, {} activities and {} memories for user {}",
        summary.total_trips, summary.total_activities, summary.total_memories, user.id
    );
    Ok(HttpResponse::Created().json(summary))
}
