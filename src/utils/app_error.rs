use axum::response::{IntoResponse, Response};
use axum::Json;
use hyper::StatusCode;
use serde_json::json;

/// Error returned by every route handler, rendered as a JSON `{"message"}`
/// body with the matching status code.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: Option<&str>) -> Self {
        Self {
            status,
            message: message.map(str::to_string),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            Some("You have to be connected to perform this action."),
        )
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, Some(message))
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, Some(message))
    }

    pub fn conflict(message: &str) -> Self {
        Self::new(StatusCode::CONFLICT, Some(message))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, Some(message))
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self.message {
            Some(message) => message,
            None => "Something went wrong.".to_string(),
        };

        (self.status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_the_right_status() {
        assert_eq!(AppError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("no").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("no").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("no").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::bad_request("no").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::internal_server_error().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
