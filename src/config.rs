use log::{info, warn};
use sqlx::postgres::PgConnectOptions;
use std::{env, fmt, str::FromStr};

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: PgConnectOptions,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub s3_public_url: String,
    pub max_photo_bytes: usize,
    pub cors_origins: Vec<String>,
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "Invalid {}: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;
        let s3_bucket = required("AWS_S3_BUCKET")?;
        let s3_region = optional("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let s3_public_url = optional("AWS_S3_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", s3_bucket, s3_region));

        let bcrypt_cost = parse_or("BCRYPT_COST", 10)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: "must be between 4 and 31".to_string(),
            });
        }

        let jwt_expire_minutes = parse_or("JWT_EXPIRE_MINUTES", 60 * 24 * 7)?;
        if jwt_expire_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRE_MINUTES",
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            database: database_options()?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            jwt_expire_minutes,
            bcrypt_cost,
            s3_bucket,
            s3_region,
            s3_endpoint: optional("AWS_S3_ENDPOINT"),
            s3_public_url,
            max_photo_bytes: parse_or("MAX_PHOTO_BYTES", 10 * 1024 * 1024)?,
            cors_origins: parse_origins(
                &optional("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:3000".to_string()),
            ),
            debug: optional("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false),
            host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match optional(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}

// DATABASE_URL wins; otherwise the options are assembled from the individual parts.
fn database_options() -> Result<PgConnectOptions, ConfigError> {
    if let Some(url) = optional("DATABASE_URL") {
        return url.parse().map_err(|e: sqlx::Error| ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: e.to_string(),
        });
    }

    warn!("DATABASE_URL not set, building it from DATABASE_* variables");
    let host = optional("DATABASE_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = parse_or("DATABASE_PORT", 5432)?;
    let user = optional("DATABASE_USER").unwrap_or_else(|| "postgres".to_string());
    let password = optional("DATABASE_PASSWORD").unwrap_or_default();
    let name = optional("DATABASE_NAME").unwrap_or_else(|| "odyssey".to_string());

    Ok(connect_options(&host, port, &user, &password, &name))
}

pub(crate) fn connect_options(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    name: &str,
) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(user)
        .database(name);
    if password.is_empty() {
        options
    } else {
        options.password(password)
    }
}

pub(crate) fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
