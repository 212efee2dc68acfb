use serde::{Deserialize, Serialize};

/// Body of a failed `/validate` request (as opposed to a rejected paper).
#[derive(Serialize)]
pub struct ValidateError {
    pub valid: bool,
    pub error: String,
}

impl ValidateError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct SignQuery {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
}

#[derive(Deserialize)]
pub struct CorrectRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct CorrectResponse {
    pub corrected: String,
}
