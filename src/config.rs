use std::env;

use actix_web::cookie::Key;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("SESSION_KEY must be at least 64 bytes long")]
    SessionKeyTooShort,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub session_key: Key,
    pub cookie_secure: bool,
    pub frontend_url: String,
    pub static_dir: String,
    pub reset_token_ttl_minutes: i64,
    pub mail_from: String,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let session_key = match lookup("SESSION_KEY") {
            Some(key) if key.len() < 64 => return Err(ConfigError::SessionKeyTooShort),
            Some(key) => Key::from(key.as_bytes()),
            None => {
                log::warn!("SESSION_KEY not set, sessions will not survive a restart");
                Key::generate()
            }
        };

        let smtp = match lookup("SMTP_HOST") {
            Some(host) if !host.is_empty() => Some(SmtpConfig {
                host,
                port: parse("SMTP_PORT", &var("SMTP_PORT", "587"))?,
                username: lookup("SMTP_USERNAME"),
                password: lookup("SMTP_PASSWORD"),
            }),
            _ => None,
        };

        Ok(Config {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", &var("PORT", "3000"))?,
            database_url: var("DATABASE_URL", "sqlite://mstech.db"),
            session_key,
            cookie_secure: parse("SESSION_COOKIE_SECURE", &var("SESSION_COOKIE_SECURE", "false"))?,
            frontend_url: var("FRONTEND_URL", "http://localhost:3000"),
            static_dir: var("STATIC_DIR", "static"),
            reset_token_ttl_minutes: parse(
                "RESET_TOKEN_TTL_MINUTES",
                &var("RESET_TOKEN_TTL_MINUTES", "60"),
            )?,
            mail_from: var("MAIL_FROM", "mstech-noreply@example.com"),
            smtp,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_owned(),
    })
}
