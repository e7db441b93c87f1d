//! Error types for the Checkout API.
//!
//! ## Response Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiError                    HTTP   code                               │
//! │  ─────────────────────────   ────   ─────────────────────              │
//! │  InvalidInput                400    INVALID_INPUT                      │
//! │  UnsupportedCurrency         400    UNSUPPORTED_CURRENCY               │
//! │  EmptySelection              400    EMPTY_SELECTION                    │
//! │  TamperDetected              400    SECURITY_ERROR                     │
//! │  Gateway                     500    GATEWAY_ERROR                      │
//! │  Internal                    500    INTERNAL_ERROR                     │
//! │                                                                         │
//! │  User-visible messages are generic. The expected-vs-provided detail    │
//! │  of a tamper rejection lives ONLY in the audit record.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crest_core::{Currency, CheckoutError};

use crate::gateway::GatewayError;

/// Checkout API errors, serialized as `{error, code}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    InvalidInput(String),

    /// Currency outside the supported set.
    #[error("Invalid currency: {0}")]
    UnsupportedCurrency(String),

    /// Nothing chargeable selected.
    #[error("No plan or addon selected")]
    EmptySelection,

    /// Amount mismatch beyond tolerance. The message is deliberately
    /// generic; diagnostics are in the audit record.
    #[error("Invalid payment amount detected.")]
    TamperDetected,

    /// The payment gateway call failed after acceptance.
    #[error("Failed to create checkout session")]
    Gateway(#[from] GatewayError),

    /// Anything unexpected.
    #[error("Internal error")]
    Internal(String),
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::UnsupportedCurrency { code } => ApiError::UnsupportedCurrency(code),
            CheckoutError::EmptySelection => ApiError::EmptySelection,
            CheckoutError::Validation(v) => ApiError::InvalidInput(v.to_string()),
        }
    }
}

impl ApiError {
    /// The machine-readable error code in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::UnsupportedCurrency(_) => "UNSUPPORTED_CURRENCY",
            ApiError::EmptySelection => "EMPTY_SELECTION",
            ApiError::TamperDetected => "SECURITY_ERROR",
            ApiError::Gateway(_) => "GATEWAY_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::UnsupportedCurrency(_)
            | ApiError::EmptySelection
            | ApiError::TamperDetected => StatusCode::BAD_REQUEST,
            ApiError::Gateway(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            // Tell the client which currencies would have worked
            ApiError::UnsupportedCurrency(_) => format!(
                "Invalid currency. Supported: {}",
                Currency::ALL
                    .iter()
                    .map(|c| c.code())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ApiError::EmptySelection.code(), "EMPTY_SELECTION");
        assert_eq!(
            ApiError::UnsupportedCurrency("XYZ".to_string()).code(),
            "UNSUPPORTED_CURRENCY"
        );
        assert_eq!(ApiError::TamperDetected.code(), "SECURITY_ERROR");
    }

    #[test]
    fn test_tamper_message_is_generic() {
        let err = ApiError::TamperDetected;
        assert_eq!(err.message(), "Invalid payment amount detected.");
    }

    #[test]
    fn test_checkout_error_mapping() {
        let err: ApiError = CheckoutError::EmptySelection.into();
        assert!(matches!(err, ApiError::EmptySelection));

        let err: ApiError = CheckoutError::UnsupportedCurrency {
            code: "XYZ".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::UnsupportedCurrency(_)));
    }
}
