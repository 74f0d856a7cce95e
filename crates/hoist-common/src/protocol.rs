use crate::error::BridgeError;
use crate::error_mapping::map_bridge_error;
use crate::specifier::Specifier;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Operations understood by the bridge script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeRequest {
    /// Count the elements of a collection. Each element becomes a lazy handle.
    Elements(ElementsRequest),
    /// Evaluate a lazy handle once and read several attributes off the resulting object.
    Read(ReadRequest),
    /// Read one attribute across every element of a collection in one round trip.
    Column(ColumnRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementsRequest {
    pub collection: Specifier,
}

/// The response data is an array aligned with `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub handle: Specifier,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRequest {
    pub collection: Specifier,
    pub attribute: String,
}

impl BridgeRequest {
    pub fn op(&self) -> &'static str {
        match self {
            BridgeRequest::Elements(_) => "elements",
            BridgeRequest::Read(_) => "read",
            BridgeRequest::Column(_) => "column",
        }
    }
}

/// Responses received from the bridge script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BridgeResponse {
    Ok {
        #[serde(default)]
        data: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<Value>,
    },
}

impl BridgeResponse {
    pub fn ok(data: Value) -> Self {
        BridgeResponse::Ok { data }
    }

    /// Encode an error so that `into_result` gives the same error back.
    pub fn error(err: &BridgeError) -> Self {
        let (message, details) = match err {
            BridgeError::StaleReference { target } | BridgeError::NotFound { target } => {
                (err.to_string(), Some(json!({ "target": target })))
            }
            BridgeError::AttributeUnavailable { attribute, reason } => {
                (reason.clone(), Some(json!({ "attribute": attribute })))
            }
            BridgeError::ApplicationUnavailable(application) => {
                (err.to_string(), Some(json!({ "application": application })))
            }
            BridgeError::ScriptError(message)
            | BridgeError::InvalidRequest(message)
            | BridgeError::NotSupported(message) => (message.clone(), None),
            _ => (err.to_string(), None),
        };
        BridgeResponse::Error {
            code: err.code().to_string(),
            message,
            details,
        }
    }

    pub fn into_result(self) -> Result<Value, BridgeError> {
        match self {
            BridgeResponse::Ok { data } => Ok(data),
            BridgeResponse::Error {
                code,
                message,
                details,
            } => Err(map_bridge_error(&code, &message, details.as_ref())),
        }
    }
}

/// Payload of a successful `elements` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCount {
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_is_tagged_by_op() {
        let req = BridgeRequest::Read(ReadRequest {
            handle: Specifier::application("Hookmark"),
            attributes: vec!["name".into(), "address".into()],
        });
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["op"], "read");
        assert_eq!(value["attributes"], json!(["name", "address"]));
        assert_eq!(req.op(), "read");
    }

    #[test]
    fn test_error_response_maps_code() {
        let raw = json!({
            "status": "error",
            "code": "STALE_REFERENCE",
            "message": "Can't get object.",
            "details": {"target": "hookedBookmarks()[0]()"}
        });
        let resp: BridgeResponse = serde_json::from_value(raw).unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(
            err,
            BridgeError::StaleReference {
                target: "hookedBookmarks()[0]()".into()
            }
        );
    }

    #[test]
    fn test_error_encoding_is_lossless_for_item_faults() {
        let errors = [
            BridgeError::StaleReference {
                target: "hookedBookmarks()[1]()".into(),
            },
            BridgeError::NotFound {
                target: "folders.byName(\"Work\")".into(),
            },
            BridgeError::AttributeUnavailable {
                attribute: "address".into(),
                reason: "Can't get address.".into(),
            },
            BridgeError::ApplicationUnavailable("OmniFocus".into()),
            BridgeError::ScriptError("Error: boom".into()),
        ];
        for err in errors {
            let decoded = BridgeResponse::error(&err).into_result().unwrap_err();
            assert_eq!(decoded, err);
        }
    }

    #[test]
    fn test_ok_response_without_data() {
        let resp: BridgeResponse = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }
}
