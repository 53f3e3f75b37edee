use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Client-side rule rejected the input; the message is shown to the user as is.
    #[error("{message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
