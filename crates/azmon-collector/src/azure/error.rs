//! Azure REST error classification
//!
//! Resource Manager failures carry `{"error": {"code": ..., "message": ...}}`
//! bodies; the token endpoint uses the OAuth2 `error`/`error_description`
//! fields instead. Both are classified from the HTTP status first.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AzureError {
    /// Credentials rejected or token not authorized for the resource
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("request throttled: {message}")]
    Throttled { message: String },

    #[error("Azure API error ({status}{}): {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(", {c}")).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ArmErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Extract `(code, message)` from either error body shape
fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    if let Ok(arm) = serde_json::from_str::<ArmErrorBody>(body) {
        return (arm.error.code, arm.error.message);
    }
    if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(body) {
        return (Some(oauth.error), oauth.error_description);
    }
    (None, None)
}

/// Classify a non-success response from its status and body.
pub fn classify_response(status: u16, body: &str) -> AzureError {
    let (code, message) = parse_error_body(body);
    let message = message
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        })
        .unwrap_or_else(|| "no error details".to_string());

    match status {
        401 | 403 => AzureError::Unauthorized { status, message },
        404 => AzureError::NotFound { message },
        429 => AzureError::Throttled { message },
        // The token endpoint reports bad client credentials as 400
        400 if code.as_deref().is_some_and(|c| c.starts_with("invalid_client")) => {
            AzureError::Unauthorized { status, message }
        }
        _ => AzureError::Api {
            status,
            code,
            message,
        },
    }
}
