use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T, E = InventoryError> = std::result::Result<T, E>;

/// Errors surfaced by the store, the workflow handlers and the HTTP layer.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid action type: {0}")]
    InvalidAction(String),

    #[error("Invalid or unsupported category: {0}")]
    InvalidCategory(String),

    #[error("Cannot {action} a request in status {from}")]
    IllegalTransition { from: String, action: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(sqlx::Error),
}

impl InventoryError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// HTTP status code for this error.
    ///
    /// Permission failures are reported as 400 to match what the web forms
    /// already expect from the admin-only endpoints.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PermissionDenied(_)
            | Self::InvalidInput(_)
            | Self::InvalidAction(_)
            | Self::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Self::IllegalTransition { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client.
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for InventoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("record already exists ({})", db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict(format!(
                    "record is referenced by other records ({})",
                    db_err.message()
                ));
            }
        }
        Self::Store(err)
    }
}
