pub mod api;
pub mod trips;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    Router::new()
        .merge(trips::router())
        .nest("/api", api::router())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
