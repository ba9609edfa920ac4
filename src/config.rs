use std::env;

use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use dotenvy::dotenv;

use crate::domain::clock::{OfficeClock, parse_utc_offset};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    /// Fixed UTC offset of the office; all calendar days are taken on this clock.
    pub office_utc_offset: FixedOffset,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let raw_offset = env_or("OFFICE_UTC_OFFSET", "+05:30");
        let office_utc_offset = parse_utc_offset(&raw_offset)
            .ok_or_else(|| anyhow!("OFFICE_UTC_OFFSET is not a valid offset: {raw_offset}"))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", "86400")?, // default 1 day
            office_utc_offset,
            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", "1000")?,
            api_prefix: env_or("API_PREFIX", "/api"),
            log_dir: env_or("LOG_DIR", "logs"),
        })
    }

    pub fn office_clock(&self) -> OfficeClock {
        OfficeClock::new(self.office_utc_offset)
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .parse()
        .with_context(|| format!("{key} must be a number"))
}

#[cfg(test)]
impl Config {
    /// A config for unit tests; nothing here touches the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/hr_test".into(),
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 900,
            office_utc_offset: parse_utc_offset("+05:30").unwrap(),
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
        }
    }
}
