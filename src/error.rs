use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("a movie titled {title:?} is already on the list")]
    DuplicateTitle { title: String },

    #[error("movie {id} not found")]
    NotFound { id: i32 },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("metadata provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("metadata provider returned an unexpected response: {0}")]
    ProviderResponseInvalid(String),

    #[error(transparent)]
    Database(DbErr),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::DuplicateTitle { .. } => "duplicate_title",
            AppError::NotFound { .. } => "not_found",
            AppError::Validation(_) => "validation",
            AppError::ProviderUnavailable(_) => "provider_unavailable",
            AppError::ProviderResponseInvalid(_) => "provider_response_invalid",
            AppError::Database(_) => "database",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateTitle { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ProviderUnavailable(_) | AppError::ProviderResponseInvalid(_) => {
                StatusCode::BAD_GATEWAY
            },
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a failed insert of `title` to `DuplicateTitle` when the unique index fired.
    pub fn from_insert(err: DbErr, title: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::DuplicateTitle { title: title.to_string() }
            },
            _ => AppError::Database(err),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ProviderResponseInvalid(err.to_string())
        } else {
            Self::ProviderUnavailable(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }
        let body = json!({ "error": self.kind(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let dup = AppError::DuplicateTitle { title: "Dune".into() };
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound { id: 3 }.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::ProviderUnavailable("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::ProviderResponseInvalid("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn non_constraint_db_errors_stay_database_errors() {
        let err = AppError::from_insert(DbErr::Custom("disk full".into()), "Dune");
        assert_eq!(err.kind(), "database");
    }
}
