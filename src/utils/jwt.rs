use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use log::{debug, error};
use sqlx::PgPool;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::User;
use crate::services::users;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }
}

/// Signs a token for `user_id` that expires `expire_minutes` from now.
pub fn generate_token(
    user_id: Uuid,
    secret: &str,
    expire_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::minutes(expire_minutes)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Validator function for the `HttpAuthentication::bearer` middleware.
/// Valid claims are stashed in the request extensions for the handlers.
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(config) = req.app_data::<web::Data<Config>>().cloned() else {
        error!("Config missing from app data");
        return Err((
            AppError::InternalServerError("Server misconfigured".to_string()).into(),
            req,
        ));
    };

    match validate_token(credentials.token(), &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(err) => {
            debug!("Rejected bearer token: {:?}", err);
            let message = match err.kind() {
                ErrorKind::ExpiredSignature => "Token has expired",
                _ => "Invalid token",
            };
            Err((AppError::Unauthorized(message.to_string()).into(), req))
        }
    }
}

/// Loads the caller behind the validated bearer token.
pub async fn current_user(req: &HttpRequest, pool: &PgPool) -> Result<User, AppError> {
    let user_id = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?
        .user_id()?;

    let user = users::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }
    Ok(user)
}
