//! Error translator - unico punto in cui si sceglie lo status HTTP
//!
//! Ogni errore (input del client, risorsa mancante, autenticazione, database)
//! viene convertito in `AppError` e serializzato nell'envelope
//! `{success: false, error, message}`.

use crate::core::auth::AuthError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::error::ErrorKind;
use tracing::{error, warn};

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorCode<'a> {
    Status(u16),
    Auth {
        code: &'a str,
        description: &'a str,
    },
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    success: bool,
    error: ErrorCode<'a>,
    message: &'a str,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    auth: Option<AuthError>,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: default_message(status),
            auth: None,
            details: None,
        }
    }

    /// Dettagli che finiscono solo nei log, mai nel body della risposta
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        match &self.auth {
            Some(auth) => auth.description(),
            None => self.message,
        }
    }

    // Common error constructors
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn unprocessable() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Resource not found",
        StatusCode::METHOD_NOT_ALLOWED => "Method not allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
        _ => "Internal server error",
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self {
            status: err.status(),
            message: default_message(err.status()),
            details: None,
            auth: Some(err),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::not_found(),

            // constraint violation: la richiesta era ben formata ma incompatibile coi dati
            sqlx::Error::Database(db)
                if matches!(
                    db.kind(),
                    ErrorKind::UniqueViolation
                        | ErrorKind::ForeignKeyViolation
                        | ErrorKind::NotNullViolation
                        | ErrorKind::CheckViolation
                ) =>
            {
                Self::bad_request().with_details(db.message().to_string())
            }

            _ => Self::internal_server_error().with_details(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            JsonRejection::JsonDataError(_) => Self::unprocessable(),
            _ => Self::bad_request(),
        };
        error.with_details(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        // un id non intero non corrisponde a nessuna risorsa
        Self::not_found().with_details(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::unprocessable().with_details(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let details = self.details.as_deref().unwrap_or("-");
        if self.status.is_server_error() {
            error!(status = %self.status, details, "Request failed");
        } else {
            warn!(status = %self.status, details, "Request rejected");
        }

        let error = match &self.auth {
            Some(auth) => ErrorCode::Auth {
                code: auth.code(),
                description: auth.description(),
            },
            None => ErrorCode::Status(self.status.as_u16()),
        };
        let body = Json(ErrorResponse {
            success: false,
            error,
            message: self.message(),
        });
        (self.status, body).into_response()
    }
}
