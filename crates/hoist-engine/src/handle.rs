use crate::backend::{Bridge, BridgeError};
use hoist_common::specifier::Specifier;
use serde_json::Value;
use std::fmt;

/// A lazy reference to a remote object. Evaluating it may fail.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteHandle {
    specifier: Specifier,
}

/// A remote object whose reference evaluated successfully, with the attribute values read from
/// it during that same evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    origin: Specifier,
    values: Vec<Value>,
}

/// Outcome of evaluating a single handle.
#[derive(Debug)]
pub enum Resolution {
    Live(RemoteObject),
    /// The reference was broken or its object unreadable. Carries the fault for diagnostics only.
    Dropped(BridgeError),
}

impl RemoteHandle {
    pub fn new(specifier: Specifier) -> Self {
        Self { specifier }
    }

    pub fn specifier(&self) -> &Specifier {
        &self.specifier
    }

    /// Evaluate this handle once, reading `attributes` off the object in the same round trip.
    ///
    /// Item faults become `Resolution::Dropped`; session faults are returned as errors.
    pub async fn resolve<B: Bridge + ?Sized>(
        &self,
        bridge: &mut B,
        attributes: &[&str],
    ) -> Result<Resolution, BridgeError> {
        match bridge.read(self, attributes).await {
            Ok(values) => Ok(Resolution::Live(RemoteObject::new(
                self.specifier.clone(),
                values,
            ))),
            Err(e) if e.is_item_fault() => Ok(Resolution::Dropped(e)),
            Err(e) => Err(e),
        }
    }
}

impl RemoteObject {
    pub fn new(origin: Specifier, values: Vec<Value>) -> Self {
        Self { origin, values }
    }

    /// The handle this object was resolved from.
    pub fn origin(&self) -> &Specifier {
        &self.origin
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.specifier.fmt(f)
    }
}

impl fmt::Display for RemoteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.origin.fmt(f)
    }
}
