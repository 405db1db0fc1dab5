use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

use crate::auth::password::hash_password;

/// Longest accepted `ACCESS_TOKEN_TTL`: 30 days.
pub const MAX_ACCESS_TOKEN_TTL: usize = 30 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Desk admin
    pub admin_username: String,
    pub admin_password_hash: String,

    // Rate limiting
    pub rate_login_per_min: u32,

    // Ledger
    pub student_files: Vec<PathBuf>,
    pub class_label: String,
    pub attendance_limit: u32,

    // Scanner
    pub scanner_autostart: bool,
    pub scanner_device: Option<PathBuf>,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let admin_password_hash = match env::var("ADMIN_PASSWORD_HASH") {
            Ok(hash) => hash,
            Err(_) => {
                let plain = env::var("ADMIN_PASSWORD")
                    .context("ADMIN_PASSWORD_HASH or ADMIN_PASSWORD must be set")?;
                hash_password(&plain).map_err(|e| anyhow!("Failed to hash ADMIN_PASSWORD: {e}"))?
            }
        };

        Ok(Self {
            server_addr: env_or("SERVER_ADDR", "0.0.0.0:5000".to_string())?,
            database_url: env_or(
                "DATABASE_URL",
                "sqlite://attendance.db?mode=rwc".to_string(),
            )?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: bounded_ttl(env_or("ACCESS_TOKEN_TTL", 900)?)?, // default 15 min

            admin_username: env_or("ADMIN_USERNAME", "admin".to_string())?,
            admin_password_hash,

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", 60)?,

            student_files: env::var("STUDENT_FILES")
                .map(|v| split_paths(&v))
                .unwrap_or_default(),
            class_label: env_or("CLASS_LABEL", "BCA".to_string())?,
            attendance_limit: env_or("ATTENDANCE_LIMIT", 1000)?,

            scanner_autostart: env_or("SCANNER_AUTOSTART", true)?,
            scanner_device: env::var("SCANNER_DEVICE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            log_dir: env_or("LOG_DIR", "logs".to_string())?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

fn bounded_ttl(ttl: usize) -> Result<usize> {
    if ttl == 0 || ttl > MAX_ACCESS_TOKEN_TTL {
        return Err(anyhow!(
            "ACCESS_TOKEN_TTL must be between 1 and {MAX_ACCESS_TOKEN_TTL} seconds, got {ttl}"
        ));
    }
    Ok(ttl)
}

fn split_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 900,
            admin_username: "admin".to_string(),
            admin_password_hash: hash_password("1234").expect("hash"),
            rate_login_per_min: 600,
            student_files: Vec::new(),
            class_label: "BCA".to_string(),
            attendance_limit: 1000,
            scanner_autostart: false,
            scanner_device: None,
            log_dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_files_are_comma_separated() {
        let paths = split_paths(" a.json, ,b/c.json ");
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("b/c.json")]);
    }

    #[test]
    fn token_ttl_is_bounded() {
        assert_eq!(bounded_ttl(900).unwrap(), 900);
        assert!(bounded_ttl(0).is_err());
        assert!(bounded_ttl(usize::MAX).is_err());
    }

    #[test]
    fn malformed_numbers_are_errors() {
        // unique key so parallel tests do not collide
        unsafe { env::set_var("LIBRARY_ATTENDANCE_TEST_LIMIT", "many") };
        let parsed: Result<u32> = env_or("LIBRARY_ATTENDANCE_TEST_LIMIT", 5);
        assert!(parsed.is_err());

        let fallback: u32 = env_or("LIBRARY_ATTENDANCE_TEST_MISSING", 5).unwrap();
        assert_eq!(fallback, 5);
    }
}
