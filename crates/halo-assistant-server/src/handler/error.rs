//! HTTP error responses.

use std::borrow::Cow;
use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::store::StoreError;

/// Tracing target for error conversions.
const TRACING_TARGET: &str = "halo_assistant_server::handler::error";

/// Result type of every handler.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Categories of handler failures, each mapped to one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Returns the HTTP status code of this kind.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Creates an error of this kind with a message.
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error<'static> {
        Error::new(self).with_message(message)
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

/// Error returned by handlers.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
}

impl Error<'static> {
    /// Creates a new [`Error`] with the specified kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            resource: None,
        }
    }
}

impl<'a> Error<'a> {
    /// Sets a user-facing message.
    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Sets the resource that caused the error.
    pub fn with_resource(self, resource: impl Into<Cow<'a, str>>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.kind.status_code())?;
        if let Some(ref message) = self.message {
            write!(f, ": {message}")?;
        }
        if let Some(ref resource) = self.resource {
            write!(f, " [resource: {resource}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<'a> {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<&'a str>,
}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            name: self.kind.into(),
            message: self.message.as_deref(),
            resource: self.resource.as_deref(),
        };
        (self.kind.status_code(), Json(body)).into_response()
    }
}

impl From<StoreError> for Error<'static> {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => ErrorKind::NotFound
                .with_message("Knowledge item not found")
                .with_resource(id),
            error => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Knowledge store operation failed"
                );
                ErrorKind::InternalServerError.with_message("Failed to save knowledge items")
            }
        }
    }
}
