use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Export(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("No expenses to export.")]
    NothingToExport,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Io(_) | AppError::Export(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::NothingToExport => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self:?}");
        }
        (status, self.to_string()).into_response()
    }
}
