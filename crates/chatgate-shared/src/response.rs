//! Error response body shared by every failing API call.

use serde::{Deserialize, Serialize};

/// `{"message": "..."}` body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Generic body for failures whose detail must stay server-side.
    pub fn internal_error() -> Self {
        Self::new("Something went wrong")
    }

    /// Throttling body; `per` names the window, e.g. `"minute"`.
    pub fn too_many_requests(limit: u32, per: &str) -> Self {
        Self::new(format!("Too many requests. Limit is {limit} per {per}."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_requests_text() {
        assert_eq!(
            ErrorResponse::too_many_requests(5, "minute").message,
            "Too many requests. Limit is 5 per minute."
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ErrorResponse::internal_error()).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Something went wrong"}));
    }
}
