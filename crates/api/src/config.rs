use std::str::FromStr;

use axum::http::HeaderValue;
use lodge_core::booking::DEFAULT_CANCELLATION_LEAD_HOURS;

use crate::auth::jwt::JwtConfig;

/// Default access token lifetime: 24 hours.
const DEFAULT_JWT_EXPIRY_MINS: i64 = 24 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Reservation rules that operators may tune.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Re-run the room, capacity, and overlap checks when staff change the
    /// dates, room, or party of an existing reservation, or reopen a
    /// cancelled one (default: `false`).
    pub revalidate_admin_date_changes: bool,
    /// Minimum hours between now and check-in for guest self-cancellation.
    pub cancellation_lead_hours: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            revalidate_admin_date_changes: false,
            cancellation_lead_hours: DEFAULT_CANCELLATION_LEAD_HOURS,
        }
    }
}

/// First admin account, created at startup when the users table is empty.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub booking: BookingPolicy,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Insert the standard room catalog at startup (default: `false`).
    pub seed_rooms: bool,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `JWT_SECRET`                    | required                |
    /// | `JWT_EXPIRY_MINS`               | `1440`                  |
    /// | `REVALIDATE_ADMIN_DATE_CHANGES` | `false`                 |
    /// | `CANCELLATION_LEAD_HOURS`       | `24`                    |
    /// | `BOOTSTRAP_ADMIN_USERNAME`      | unset                   |
    /// | `BOOTSTRAP_ADMIN_EMAIL`         | unset                   |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`      | unset                   |
    /// | `SEED_ROOMS`                    | `false`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 3000_u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins.iter().find(|o| HeaderValue::from_str(o).is_err()) {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30_u64)?;
        let shutdown_timeout_secs = parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30_u64)?;

        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let expiry_mins = parse_or(&lookup, "JWT_EXPIRY_MINS", DEFAULT_JWT_EXPIRY_MINS)?;
        if expiry_mins <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRY_MINS",
                value: expiry_mins.to_string(),
            });
        }

        let booking = BookingPolicy {
            revalidate_admin_date_changes: parse_flag(&lookup, "REVALIDATE_ADMIN_DATE_CHANGES")?,
            cancellation_lead_hours: parse_or(
                &lookup,
                "CANCELLATION_LEAD_HOURS",
                DEFAULT_CANCELLATION_LEAD_HOURS,
            )?,
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_EMAIL"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(BootstrapAdmin {
                username,
                email,
                password,
            }),
            _ => None,
        };

        let seed_rooms = parse_flag(&lookup, "SEED_ROOMS")?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig {
                secret,
                expiry_mins,
            },
            booking,
            bootstrap_admin,
            seed_rooms,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

fn parse_flag<F>(lookup: &F, var: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::Invalid {
            var,
            value: v.to_string(),
        }),
    }
}
