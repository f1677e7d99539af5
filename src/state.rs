use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{config::AppConfig, services::sessions::SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionRegistry,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        let sessions = SessionRegistry::new(config.session_idle_timeout());
        Self {
            config,
            sessions,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
