use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Application-level error taxonomy. Every handler returns this instead of
/// ad-hoc status tuples so the client always gets a JSON body and server-side
/// failures always get logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input from the client.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session token.
    #[error("Invalid or missing session token")]
    Unauthorized,

    /// Caller is authenticated but does not own the resource.
    #[error("Forbidden")]
    Forbidden,

    /// Resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Write conflicts with existing state (duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// An outbound request (upload-by-link fetch) failed.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// Anything unexpected; details stay server-side.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::Conflict("Already exists".into());
            }
        }
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (self.status(), Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    pub(crate) struct FakeDbError {
        unique: bool,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    pub(crate) fn unique_violation() -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { unique: true }))
    }

    pub(crate) fn foreign_key_violation() -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { unique: false }))
    }
}
