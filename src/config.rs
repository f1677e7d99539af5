use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub cookie_secret: String,
    pub session_idle_minutes: i64,
    pub currency_symbol: String,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cookie_secret: "change-me-tripsplit-cookie-secret".to_string(),
            session_idle_minutes: 120,
            currency_symbol: "₹".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let listen_addr = match env::var("APP_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?,
            Err(_) => defaults.listen_addr,
        };

        let cookie_secret = env::var("COOKIE_SECRET").unwrap_or(defaults.cookie_secret);

        let session_idle_minutes = match env::var("SESSION_IDLE_MINUTES") {
            Ok(raw) => parse_idle_minutes(&raw)?,
            Err(_) => defaults.session_idle_minutes,
        };

        let currency_symbol = env::var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol);

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        Ok(Self {
            listen_addr,
            cookie_secret,
            session_idle_minutes,
            currency_symbol,
            static_dir,
        })
    }

    pub fn session_idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_idle_minutes)
    }
}

fn parse_idle_minutes(raw: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        Ok(_) => Err(AppError::Config(
            "SESSION_IDLE_MINUTES must be positive".to_string(),
        )),
        Err(err) => Err(AppError::Config(format!(
            "invalid SESSION_IDLE_MINUTES: {err}"
        ))),
    }
}
