//! Admin table workflows built on top of the API traits.

use thiserror::Error;

use crate::api::errors::ApiError;

pub mod gallery;
pub mod list;
pub mod lookup;
pub mod manager;
pub mod mutations;
pub mod selection;
pub mod status;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Type constraint error: {0}")]
    TypeConstraint(String),

    #[error("Not found")]
    NotFound,

    /// The same row or page already has a request outstanding.
    #[error("Busy: {0}")]
    Busy(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Text to show the user for this failure.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Api(err) => err.user_message(fallback),
            ServiceError::Form(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    /// CSS class suffix used by toast widgets.
    pub const fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "danger",
        }
    }
}

/// A message for the user produced by a workflow, drained by the
/// presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
