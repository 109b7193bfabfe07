use serde::{Deserialize, Serialize};

/// Body returned by `GET /health`.
pub const HEALTH_UP: &str = "UP";

/// JSON error envelope used by every non-2xx response that carries a body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error: error.into(),
            message,
        }
    }
}
