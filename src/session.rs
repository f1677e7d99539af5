use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    PrivateCookieJar,
};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "tripsplit_session";

/// The caller's session. Handlers must hand `jar` back in their response so
/// a freshly issued session cookie reaches the browser.
pub struct CurrentSession {
    pub id: Uuid,
    pub jar: PrivateCookieJar,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        let presented = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
        let (id, created) = state.sessions.resume_or_start(presented).await;

        let jar = if created {
            apply_session_cookie(jar, id)
        } else {
            jar
        };
        Ok(Self { id, jar })
    }
}

pub fn apply_session_cookie(jar: PrivateCookieJar, id: Uuid) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/").build())
}
