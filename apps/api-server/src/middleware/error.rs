//! Error handling - maps every failure to a `{"message": ...}` response.

use std::fmt;
use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chatgate_core::ports::{CompletionError, RateLimitError};
use chatgate_core::DomainError;
use chatgate_shared::ErrorResponse;

pub const RATE_LIMIT_LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    RateLimited {
        limit: u32,
        /// Window description for the message, e.g. `"minute"`.
        per: String,
        retry_after: Duration,
    },
    /// Detail is logged, never sent to the caller.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::RateLimited { limit, per, .. } => {
                write!(f, "Rate limited: {} per {}", limit, per)
            }
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(detail) => {
                HttpResponse::build(self.status_code()).json(ErrorResponse::new(detail.as_str()))
            }
            AppError::RateLimited {
                limit,
                per,
                retry_after,
            } => {
                // Round up so clients never retry inside the same window.
                let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

                HttpResponse::build(self.status_code())
                    .insert_header((RATE_LIMIT_LIMIT_HEADER, limit.to_string()))
                    .insert_header((RATE_LIMIT_REMAINING_HEADER, "0"))
                    .insert_header(("Retry-After", retry_secs.max(1).to_string()))
                    .json(ErrorResponse::too_many_requests(*limit, per))
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                HttpResponse::build(self.status_code()).json(ErrorResponse::internal_error())
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::InvalidArgument(msg) => {
                AppError::Internal(format!("Rate limiter misuse: {}", msg))
            }
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::Internal(format!("Completion provider failure: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, actix_web::http::header::HeaderMap, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_internal_error_hides_detail() {
        let (status, _, body) =
            body_json(AppError::Internal("sk-secret leaked in stack trace".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"message": "Something went wrong"}));
    }

    #[actix_web::test]
    async fn test_rate_limited_headers() {
        let (status, headers, body) = body_json(AppError::RateLimited {
            limit: 5,
            per: "minute".to_string(),
            retry_after: Duration::from_millis(12_300),
        })
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            serde_json::json!({"message": "Too many requests. Limit is 5 per minute."})
        );
        assert_eq!(headers.get("retry-after").unwrap(), "13");
        assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "5");
        assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "0");
    }

    #[test]
    fn test_domain_errors_are_bad_requests() {
        let err = AppError::from(DomainError::EmptyTranscript);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Message is required"));
    }

    #[test]
    fn test_limiter_misuse_is_internal() {
        let err = AppError::from(RateLimitError::InvalidArgument("limit".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
