use thiserror::Error;

use crate::{
    config::LoadError,
    domain::error::DomainError,
    infra::{error::InfraError, http::ApiError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("resource not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// The session is gone and the user has to sign in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AppError::Api(err) if err.is_auth_failure())
    }

    /// Process exit code for command-line front ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Validation(_)
            | AppError::Config(_)
            | AppError::Api(ApiError::Precondition(_)) => 2,
            AppError::Api(err) if err.is_auth_failure() => 3,
            AppError::NotFound => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::http::GatewayError;

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = AppError::from(DomainError::validation("0~4 사이의 값을 입력"));
        assert_eq!(err.to_string(), "0~4 사이의 값을 입력");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn expired_session_has_its_own_exit_code() {
        let err = AppError::from(ApiError::Transport {
            fallback: "배너 목록 조회 실패".into(),
            source: GatewayError::SessionExpired,
        });
        assert!(err.is_auth_failure());
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_record_has_its_own_exit_code() {
        assert_eq!(AppError::NotFound.exit_code(), 4);
        assert!(!AppError::NotFound.is_auth_failure());
    }
}
