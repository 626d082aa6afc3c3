use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};

use storefront_types::api::ErrorResponse;
use storefront_types::envelope::{HandlerRequest, HandlerResponse, HttpMethod};

use crate::action::Action;
use crate::error::{ApiError, UNKNOWN_ACTION};

/// CORS preflight answer: no body, no content type.
pub fn preflight() -> HandlerResponse {
    let headers = BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Access-Control-Allow-Methods".to_string(), "GET, POST, OPTIONS".to_string()),
        ("Access-Control-Allow-Headers".to_string(), "Content-Type, Authorization".to_string()),
    ]);

    HandlerResponse {
        status_code: 200,
        headers,
        body: String::new(),
        is_base64_encoded: false,
    }
}

fn json_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

/// JSON response. `serde_json` writes non-ASCII characters as-is.
pub fn json<T: Serialize>(status: u16, payload: &T) -> Result<HandlerResponse, ApiError> {
    let body = serde_json::to_string(payload).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(HandlerResponse {
        status_code: status,
        headers: json_headers(),
        body,
        is_base64_encoded: false,
    })
}

pub fn ok<T: Serialize>(payload: &T) -> Result<HandlerResponse, ApiError> {
    json(200, payload)
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        let payload = ErrorResponse {
            error: err.to_string(),
        };

        HandlerResponse {
            status_code: err.status(),
            headers: json_headers(),
            // A struct with one String field always serializes
            body: serde_json::to_string(&payload).unwrap_or_default(),
            is_base64_encoded: false,
        }
    }
}

/// Shared front half of every handler: answer preflight, resolve the action,
/// run it, and turn any failure into the error envelope.
pub fn respond<A, F>(handler: &str, req: &HandlerRequest, run: F) -> HandlerResponse
where
    A: Action,
    F: FnOnce(A) -> Result<HandlerResponse, ApiError>,
{
    let method = req.method();
    if method == HttpMethod::Options {
        return preflight();
    }

    let name = req.query("action").unwrap_or_default();
    let Some(action) = A::resolve(name, &method) else {
        debug!("{}: unknown action '{}' for {}", handler, name, method);
        return ApiError::Validation(UNKNOWN_ACTION).into();
    };

    match run(action) {
        Ok(resp) => resp,
        Err(err @ ApiError::Internal(_)) => {
            error!("{}/{} failed: {}", handler, action.name(), err);
            err.into()
        }
        Err(err) => {
            debug!("{}/{} rejected ({}): {}", handler, action.name(), err.status(), err);
            err.into()
        }
    }
}
