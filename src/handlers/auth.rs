use actix_web::rt::task::spawn_blocking;
use actix_web::{web, HttpRequest, HttpResponse};
use bcrypt::{hash, verify};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::services::users;
use crate::utils::jwt::{current_user, generate_token};

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: Uuid,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

async fn issue_token(user_id: Uuid, config: &Config) -> Result<TokenResponse, AppError> {
    let secret = config.jwt_secret.clone();
    let expire_minutes = config.jwt_expire_minutes;

    let access_token = spawn_blocking(move || generate_token(user_id, &secret, expire_minutes))
        .await
        .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user_id,
    })
}

// POST /api/v1/auth/register
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    // Duplicates skip the bcrypt work here; the insert still guards races.
    if users::find_by_email(&pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password = req.password.clone();
    let cost = config.bcrypt_cost;
    let password_hash = spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let user = users::create(&pool, &req.email, &password_hash).await?;
    info!("Registered user {}", user.id);

    let token = issue_token(user.id, &config).await?;
    Ok(HttpResponse::Created().json(token))
}

// POST /api/v1/auth/login
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let user = users::find_by_email(&pool, &req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password = req.password.clone();
    let stored_hash = user.password_hash.clone();
    let is_valid = spawn_blocking(move || verify(password.as_str(), &stored_hash))
        .await
        .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !is_valid {
        return Err(invalid_credentials());
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    let token = issue_token(user.id, &config).await?;
    Ok(HttpResponse::Ok().json(token))
}

// GET /api/v1/auth/me
pub async fn me(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let user = current_user(&req, &pool).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}
