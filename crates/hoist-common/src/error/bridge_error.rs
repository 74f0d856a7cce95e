use thiserror::Error;

/// Errors raised while talking to a scriptable application through a bridge.
///
/// Variants fall in two groups. Item faults concern a single remote reference or attribute
/// (the file behind a hook was moved, a property is missing) and are expected during normal
/// operation. Session faults mean the bridge itself cannot answer and abort the whole query.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BridgeError {
    // ============================================================
    // Item Faults
    // ============================================================
    #[error("Stale reference: {target}")]
    StaleReference { target: String },

    #[error("Not found: {target}")]
    NotFound { target: String },

    #[error("Attribute '{attribute}' unavailable: {reason}")]
    AttributeUnavailable { attribute: String, reason: String },

    #[error("Script error: {0}")]
    ScriptError(String),

    // ============================================================
    // Session Faults
    // ============================================================
    #[error("Application unavailable: {0}")]
    ApplicationUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not ready")]
    NotReady,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Other: {0}")]
    Other(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl BridgeError {
    /// Returns the wire error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::StaleReference { .. } => "STALE_REFERENCE",
            BridgeError::NotFound { .. } => "NOT_FOUND",
            BridgeError::AttributeUnavailable { .. } => "ATTRIBUTE_UNAVAILABLE",
            BridgeError::ScriptError(_) => "SCRIPT_ERROR",
            BridgeError::ApplicationUnavailable(_) => "APPLICATION_UNAVAILABLE",
            BridgeError::InvalidRequest(_) => "INVALID_REQUEST",
            BridgeError::NotReady => "NOT_READY",
            BridgeError::Io(_) => "IO_ERROR",
            BridgeError::Serialization(_) => "SERIALIZATION_ERROR",
            BridgeError::Other(_) => "INTERNAL_ERROR",
            BridgeError::NotSupported(_) => "NOT_SUPPORTED",
        }
    }

    /// Whether this fault is scoped to a single remote item.
    ///
    /// Item faults are dropped by the resolver and the per-object extractor; everything else
    /// propagates to the caller.
    pub fn is_item_fault(&self) -> bool {
        matches!(
            self,
            BridgeError::StaleReference { .. }
                | BridgeError::NotFound { .. }
                | BridgeError::AttributeUnavailable { .. }
                | BridgeError::ScriptError(_)
        )
    }
}
