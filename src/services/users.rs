use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

/// Emails are compared case-insensitively by storing them lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Inserts a new account; an existing email yields `Conflict`.
pub async fn create(pool: &PgPool, email: &str, password_hash: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, TRUE, NOW(), NOW())
        ON CONFLICT (email) DO NOTHING
        RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(normalize_email(email))
    .bind(password_hash)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Email already registered".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Traveler@Example.COM "), "traveler@example.com");
    }
}
