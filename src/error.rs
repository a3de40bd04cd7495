//! Error type shared by the stores, services and controllers.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("User \"{0}\" already exists.")]
    DuplicateUser(String),

    #[error("Unknown user \"{0}\".")]
    UnknownUser(String),

    #[error("Please log in.")]
    NotAuthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Enter a valid quantity.")]
    InvalidQuantity,

    #[error("Not enough cash. Required: ${required:.2}, available: ${available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Not enough shares. You own {owned}, tried to sell {requested}.")]
    InsufficientShares { owned: i64, requested: u64 },

    #[error("No price data available for {0}.")]
    PriceDataUnavailable(String),

    #[error("could not save {}: {reason}", path.display())]
    PersistenceWriteFailure { path: PathBuf, reason: String },

    #[error("corrupt store {}: {reason}", path.display())]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("price data error in {}: {reason}", path.display())]
    PriceData { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Template(#[from] handlebars::TemplateError),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::UnknownUser(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::InvalidQuantity => StatusCode::BAD_REQUEST,
            AppError::InsufficientFunds { .. } | AppError::InsufficientShares { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::PriceDataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for errors caused by the user's input rather than the server.
    pub fn is_user_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.is_user_error() {
            tracing::error!(error = %self, "request failed");
        }
        (self.status(), Html(self.to_string())).into_response()
    }
}
