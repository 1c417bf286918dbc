//! Error handling for the replenishment core
//!
//! One typed taxonomy for every failure the workflow can surface: missing
//! rows, operations invalid for the current ordering state, out-of-range
//! arguments, constraint conflicts, and unexpected storage errors. Each
//! variant maps to a fixed HTTP status with a bilingual response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication / authorization
    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,

    // Target row absent (zero rows affected)
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Operation not valid for the part's current ordering/approval state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // Caller-supplied value out of range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Storage constraint violation or concurrent conflicting write
    #[error("Conflict: {0}")]
    Conflict(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid or missing token".to_string(),
                    message_fr: "Jeton invalide ou manquant".to_string(),
                },
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "FORBIDDEN".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_fr: "Vous n'avez pas la permission d'effectuer cette action"
                        .to_string(),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_fr: format!("{} non trouvée", resource),
                },
            ),
            AppError::InvalidState(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_STATE".to_string(),
                    message_en: msg.clone(),
                    message_fr: format!("Opération invalide pour l'état actuel : {}", msg),
                },
            ),
            AppError::InvalidArgument(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_ARGUMENT".to_string(),
                    message_en: msg.clone(),
                    message_fr: format!("Valeur invalide : {}", msg),
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message_en: msg.clone(),
                    message_fr: format!("Conflit : {}", msg),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_fr: "Une erreur de base de données est survenue".to_string(),
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_fr: "Une erreur interne est survenue".to_string(),
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
