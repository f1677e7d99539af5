use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::trip::{MemberAmount, Trip},
    services::split::{self, TripSummary},
    session::CurrentSession,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(list_trips))
        .route("/trips/summary", get(trip_summary))
}

#[derive(Serialize)]
struct TripList {
    trips: Vec<String>,
    current: Option<String>,
}

async fn list_trips(State(state): State<AppState>, session: CurrentSession) -> Response {
    let list = state
        .sessions
        .with_store(session.id, |store| TripList {
            trips: store.trip_names().into_iter().map(str::to_owned).collect(),
            current: store.current().map(str::to_owned),
        })
        .await;
    (session.jar, Json(list)).into_response()
}

#[derive(Deserialize)]
struct SummaryQuery {
    trip: String,
}

#[derive(Serialize)]
struct TripDetail {
    trip: Trip,
    shares: Vec<MemberAmount>,
    give_receive: Vec<MemberAmount>,
    summary: TripSummary,
}

async fn trip_summary(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, AppError> {
    let detail = state
        .sessions
        .with_store(session.id, |store| {
            store.trip(&query.trip).map(|trip| TripDetail {
                trip: trip.clone(),
                shares: split::shares(trip),
                give_receive: split::give_receive(trip),
                summary: split::summarize(trip),
            })
        })
        .await
        .ok_or(AppError::NotFound)?;
    Ok((session.jar, Json(detail)).into_response())
}
