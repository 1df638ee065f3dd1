use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    EmailExist,
    UsernameExist,
    WrongCredentials,
    UserNoLongerExist,
    TokenNotProvided,
    InvalidToken,
    PermissionDenied,
    ExchangeNotFound,
    ServiceNotFound,
    NotExchangeParty,
    OnlyProviderMayRespond,
    SelfRequest,
    AlreadyRated,
    ExchangeNotCompleted,
    ChatClosed,
    LocationNotConfigured,
    ConcurrentTransition,
    HashingError,
}

impl ErrorMessage {
    fn to_str(&self) -> String {
        match self {
            ErrorMessage::EmailExist => "User with this email already exists".to_string(),
            ErrorMessage::UsernameExist => "Username is already taken".to_string(),
            ErrorMessage::WrongCredentials => "Email or password is wrong".to_string(),
            ErrorMessage::UserNoLongerExist => {
                "User belonging to this token no longer exists".to_string()
            }
            ErrorMessage::TokenNotProvided => "You are not logged in, please provide a token".to_string(),
            ErrorMessage::InvalidToken => "Authentication token is invalid or expired".to_string(),
            ErrorMessage::PermissionDenied => "You are not allowed to perform this action".to_string(),
            ErrorMessage::ExchangeNotFound => "Exchange not found".to_string(),
            ErrorMessage::ServiceNotFound => "Service not found".to_string(),
            ErrorMessage::NotExchangeParty => {
                "You are not a participant of this exchange".to_string()
            }
            ErrorMessage::OnlyProviderMayRespond => {
                "Only the provider can respond to this request".to_string()
            }
            ErrorMessage::SelfRequest => "You cannot request your own service".to_string(),
            ErrorMessage::AlreadyRated => "You have already rated this exchange".to_string(),
            ErrorMessage::ExchangeNotCompleted => {
                "Ratings are only allowed on completed exchanges".to_string()
            }
            ErrorMessage::ChatClosed => {
                "Chat is only available while the exchange is active".to_string()
            }
            ErrorMessage::LocationNotConfigured => {
                "Set your location and search radius to find nearby services".to_string()
            }
            ErrorMessage::ConcurrentTransition => {
                "The exchange was modified by someone else, please retry".to_string()
            }
            ErrorMessage::HashingError => "Error while hashing password".to_string(),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    pub status: StatusCode,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        HttpError {
            message: message.into(),
            status,
        }
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::NOT_FOUND)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::CONFLICT)
    }

    /// Distinguished from plain bad requests so the UI can prompt
    /// remediation (e.g. "set your location") instead of a generic error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        HttpError::new(message, StatusCode::PRECONDITION_FAILED)
    }

    pub fn into_http_response(self) -> axum::response::Response {
        let json_response = Json(ErrorResponse {
            status: if self.status.is_server_error() {
                "error".to_string()
            } else {
                "fail".to_string()
            },
            message: self.message.clone(),
        });

        (self.status, json_response).into_response()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        self.into_http_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_map_to_expected_status_codes() {
        assert_eq!(HttpError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(HttpError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(HttpError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::conflict("x").status, StatusCode::CONFLICT);
        assert_eq!(
            HttpError::precondition_failed("x").status,
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            HttpError::server_error("x").status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_messages_render_human_text() {
        assert_eq!(
            ErrorMessage::SelfRequest.to_string(),
            "You cannot request your own service"
        );
        assert!(ErrorMessage::LocationNotConfigured
            .to_string()
            .contains("search radius"));
    }
}
