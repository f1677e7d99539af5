use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::AppError,
    services::{
        export::{export_file_name, export_workbook, XLSX_CONTENT_TYPE},
        split,
        store::TripStore,
    },
    session::{clear_session_cookie, CurrentSession},
    state::AppState,
};

pub const INVALID_EXPENSE: &str = "Please fill all fields with valid data.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/trips", post(add_trip))
        .route("/trips/select", post(select_trip))
        .route("/trips/delete", post(delete_trip))
        .route("/members", post(add_member))
        .route("/expenses", post(add_expense))
        .route("/export", get(export))
        .route("/session/reset", post(reset_session))
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    show_error: bool,
    error_message: String,
    trips: Vec<TripOption>,
    trip: Option<TripView>,
}

struct TripOption {
    name: String,
    selected: bool,
}

struct TripView {
    name: String,
    members: Vec<String>,
    member_options: Vec<String>,
    expenses: Vec<ExpenseRow>,
    total: String,
    shares: Vec<AmountRow>,
    balances: Vec<BalanceRow>,
    unattributed: Option<String>,
}

struct ExpenseRow {
    member: String,
    description: String,
    amount: String,
}

struct AmountRow {
    member: String,
    amount: String,
}

struct BalanceRow {
    member: String,
    amount: String,
    direction: &'static str,
}

impl DashboardTemplate {
    fn build(store: &mut TripStore, currency: &str, error: Option<String>) -> Self {
        let selected = store.ensure_selection().map(str::to_owned);
        let trips = store
            .trip_names()
            .into_iter()
            .map(|name| TripOption {
                name: name.to_owned(),
                selected: selected.as_deref() == Some(name),
            })
            .collect();

        let trip = store.current_trip().map(|trip| {
            let summary = split::summarize(trip);
            TripView {
                name: trip.name.clone(),
                members: trip.members.clone(),
                member_options: trip
                    .distinct_members()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
                expenses: trip
                    .expenses
                    .iter()
                    .map(|expense| ExpenseRow {
                        member: expense.member.clone(),
                        description: expense.description.clone(),
                        amount: format_money(currency, expense.amount),
                    })
                    .collect(),
                total: format_money(currency, trip.total_expense),
                shares: split::shares(trip)
                    .into_iter()
                    .map(|item| AmountRow {
                        amount: format_money(currency, item.amount),
                        member: item.member,
                    })
                    .collect(),
                balances: split::give_receive(trip)
                    .into_iter()
                    .map(|item| BalanceRow {
                        amount: format_money(currency, item.amount),
                        direction: direction(item.amount),
                        member: item.member,
                    })
                    .collect(),
                unattributed: (summary.unattributed > 0.0)
                    .then(|| format_money(currency, summary.unattributed)),
            }
        });

        Self {
            show_error: error.is_some(),
            error_message: error.unwrap_or_default(),
            trips,
            trip,
        }
    }
}

async fn render_dashboard(
    state: &AppState,
    session: CurrentSession,
    error: Option<AppError>,
) -> Response {
    let status = error
        .as_ref()
        .map(AppError::status)
        .unwrap_or(StatusCode::OK);
    let message = error.map(|err| err.to_string());
    let currency = state.config.currency_symbol.clone();
    let view = state
        .sessions
        .with_store(session.id, |store| {
            DashboardTemplate::build(store, &currency, message)
        })
        .await;
    (
        status,
        session.jar,
        AskamaTemplateResponse::into_response(view),
    )
        .into_response()
}

async fn dashboard(State(state): State<AppState>, session: CurrentSession) -> Response {
    render_dashboard(&state, session, None).await
}

#[derive(Deserialize)]
struct TripForm {
    #[serde(default)]
    name: String,
}

async fn add_trip(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<TripForm>,
) -> Response {
    let name = form.name.trim().to_string();
    let added = state
        .sessions
        .with_store(session.id, |store| store.add_trip(&name))
        .await;
    if added {
        info!(trip = %name, "trip added");
    }
    (session.jar, Redirect::to("/")).into_response()
}

async fn select_trip(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<TripForm>,
) -> Response {
    state
        .sessions
        .with_store(session.id, |store| store.switch_trip(&form.name))
        .await;
    (session.jar, Redirect::to("/")).into_response()
}

async fn delete_trip(State(state): State<AppState>, session: CurrentSession) -> Response {
    let deleted = state
        .sessions
        .with_store(session.id, |store| {
            let current = store.current()?.to_owned();
            store.delete_trip(&current).then_some(current)
        })
        .await;
    if let Some(name) = deleted {
        info!(trip = %name, "trip deleted");
    }
    (session.jar, Redirect::to("/")).into_response()
}

#[derive(Deserialize)]
struct MemberForm {
    #[serde(default)]
    trip: String,
    #[serde(default)]
    member: String,
}

async fn add_member(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<MemberForm>,
) -> Response {
    let member = form.member.trim().to_string();
    let added = state
        .sessions
        .with_store(session.id, |store| store.add_member(&form.trip, &member))
        .await;
    debug!(trip = %form.trip, member = %member, added, "add member");
    (session.jar, Redirect::to("/")).into_response()
}

#[derive(Deserialize)]
struct ExpenseForm {
    #[serde(default)]
    trip: String,
    #[serde(default)]
    member: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: String,
}

struct NewExpense {
    member: String,
    description: String,
    amount: f64,
}

impl ExpenseForm {
    fn validate(&self) -> Result<NewExpense, AppError> {
        let member = self.member.trim();
        let description = self.description.trim();
        let amount = self.amount.trim().parse::<f64>().ok();
        match amount {
            Some(amount)
                if amount.is_finite()
                    && amount > 0.0
                    && !member.is_empty()
                    && !description.is_empty() =>
            {
                Ok(NewExpense {
                    member: member.to_string(),
                    description: description.to_string(),
                    amount,
                })
            }
            _ => Err(AppError::BadRequest(INVALID_EXPENSE.to_string())),
        }
    }
}

async fn add_expense(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense = match form.validate() {
        Ok(expense) => expense,
        Err(err) => return render_dashboard(&state, session, Some(err)).await,
    };
    let added = state
        .sessions
        .with_store(session.id, |store| {
            store.add_expense(
                &form.trip,
                &expense.member,
                &expense.description,
                expense.amount,
            )
        })
        .await;
    if added {
        info!(trip = %form.trip, member = %expense.member, amount = expense.amount, "expense added");
    }
    (session.jar, Redirect::to("/")).into_response()
}

#[derive(Deserialize)]
struct ExportQuery {
    trip: String,
}

async fn export(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let outcome = state
        .sessions
        .with_store(session.id, |store| {
            let trip = store.trip(&query.trip).ok_or(AppError::NotFound)?;
            export_workbook(
                &trip.expenses,
                &split::shares(trip),
                &split::give_receive(trip),
            )
        })
        .await;

    let bytes = match outcome {
        Ok(bytes) => bytes,
        Err(AppError::NothingToExport) => {
            return Ok(render_dashboard(&state, session, Some(AppError::NothingToExport)).await)
        }
        Err(err) => return Err(err),
    };

    let disposition = content_disposition(&export_file_name(&query.trip))?;
    Ok((
        session.jar,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn reset_session(State(state): State<AppState>, session: CurrentSession) -> Response {
    if state.sessions.end(session.id).await {
        info!(session = %session.id, "session ended");
    }
    (clear_session_cookie(session.jar), Redirect::to("/")).into_response()
}

/// `filename` carries an ASCII fallback, `filename*` the UTF-8 name (RFC 6266).
fn content_disposition(file_name: &str) -> Result<HeaderValue, AppError> {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    let fallback: String = cleaned
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded = urlencoding::encode(&cleaned);
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .map_err(|err| AppError::Other(err.into()))
}

fn format_money(currency: &str, value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded < 0.0 {
        format!("-{currency}{:.2}", -rounded)
    } else {
        format!("{currency}{:.2}", rounded.abs())
    }
}

fn direction(net: f64) -> &'static str {
    if net >= 0.005 {
        "receives"
    } else if net <= -0.005 {
        "gives"
    } else {
        "settled"
    }
}
