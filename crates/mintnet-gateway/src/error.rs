//! Error handling for the gateway.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Request, State,
    },
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use mintnet_core::{Error as CoreError, SecurityError};
use serde::Serialize;
use tracing::error;

use crate::locale::{Language, Messages};
use crate::AppState;

/// Class of an error as presented to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 500
    Internal,
}

impl ErrorKind {
    /// HTTP status of the class.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// User-facing message from a bundle.
    pub fn message(&self, messages: &Messages) -> &'static str {
        match self {
            ErrorKind::BadRequest => messages.bad_request,
            ErrorKind::Forbidden => messages.forbidden,
            ErrorKind::NotFound => messages.not_found,
            ErrorKind::Conflict => messages.conflict,
            ErrorKind::Internal => messages.internal,
        }
    }
}

/// Application error type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{detail}")]
pub struct AppError {
    /// Error class.
    pub kind: ErrorKind,
    /// Technical description, in English.
    pub detail: String,
}

impl AppError {
    /// Create an error.
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Malformed request.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, detail)
    }

    /// Missing entity or route target.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, detail)
    }

    fn render(&self, language: Language) -> Response {
        let body = ErrorResponse {
            error: true,
            code: self.kind.code().to_string(),
            message: self.kind.message(language.messages()).to_string(),
            detail: self.detail.clone(),
        };
        let mut response = (self.kind.status(), Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_LANGUAGE, HeaderValue::from_static(language.tag()));
        response
    }
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Localized message.
    pub message: String,
    /// Technical detail.
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.render(Language::En);
        response.extensions_mut().insert(self);
        response
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let kind = match &err {
            CoreError::NotFound { .. } | CoreError::InviteNotFound(_) => ErrorKind::NotFound,

            CoreError::Security(sec) => match sec {
                SecurityError::PermissionDenied(_) => ErrorKind::Forbidden,
                SecurityError::NotAMember { .. } => ErrorKind::NotFound,
                SecurityError::InvalidTransition { .. } => ErrorKind::Conflict,
                SecurityError::UnknownVisibilityField { .. } => ErrorKind::BadRequest,
                SecurityError::VisibilityMismatch { .. } => ErrorKind::Internal,
            },

            CoreError::Protocol(_)
            | CoreError::UnknownField { .. }
            | CoreError::MissingField { .. }
            | CoreError::TypeMismatch { .. }
            | CoreError::ReadOnlyField(_)
            | CoreError::HierarchyCycle(_)
            | CoreError::HierarchyTooDeep { .. } => ErrorKind::BadRequest,

            CoreError::SlugTaken { .. }
            | CoreError::SlugExhausted(_)
            | CoreError::AlreadyMember { .. }
            | CoreError::DuplicateInvite { .. }
            | CoreError::LastAdmin(_) => ErrorKind::Conflict,

            CoreError::Storage(_)
            | CoreError::Serialization(_)
            | CoreError::Deserialization(_)
            | CoreError::MissingVisibility(_)
            | CoreError::UnknownEntity(_)
            | CoreError::Transaction(_) => ErrorKind::Internal,
        };

        if kind == ErrorKind::Internal {
            error!(error = %err, "request failed");
        }
        AppError::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::bad_request(format!("JSON error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

/// Middleware re-rendering error responses in the client's language.
pub async fn localize_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let language = Language::from_accept_language(
        request
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok()),
        state.config.default_language,
    );

    let response = next.run(request).await;
    match response.extensions().get::<AppError>() {
        Some(err) => err.render(language),
        None => response,
    }
}
