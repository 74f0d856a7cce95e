//! Error Code Mapping
//!
//! Maps fault codes reported by the bridge script to `BridgeError` variants.

use crate::error::BridgeError;
use serde_json::Value;

/// Maps a bridge fault code and message to a `BridgeError`.
///
/// # Arguments
/// * `code` - The fault code reported by the bridge (e.g., "STALE_REFERENCE")
/// * `message` - The human-readable message, usually the host exception text
/// * `details` - Optional additional details as JSON value
pub fn map_bridge_error(code: &str, message: &str, details: Option<&Value>) -> BridgeError {
    match code {
        "STALE_REFERENCE" => BridgeError::StaleReference {
            target: detail_str(details, "target").unwrap_or_else(|| message.to_string()),
        },
        "NOT_FOUND" => BridgeError::NotFound {
            target: detail_str(details, "target").unwrap_or_else(|| message.to_string()),
        },
        "ATTRIBUTE_UNAVAILABLE" => BridgeError::AttributeUnavailable {
            attribute: detail_str(details, "attribute").unwrap_or_else(|| "unknown".to_string()),
            reason: message.to_string(),
        },
        "APPLICATION_UNAVAILABLE" => BridgeError::ApplicationUnavailable(
            detail_str(details, "application").unwrap_or_else(|| message.to_string()),
        ),
        "SCRIPT_ERROR" => BridgeError::ScriptError(message.to_string()),
        "INVALID_REQUEST" => BridgeError::InvalidRequest(message.to_string()),
        "NOT_SUPPORTED" => BridgeError::NotSupported(message.to_string()),
        _ => BridgeError::Other(format!("{}: {}", code, message)),
    }
}

fn detail_str(details: Option<&Value>, key: &str) -> Option<String> {
    details
        .and_then(|d| d.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
