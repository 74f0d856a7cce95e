use crate::handle::RemoteHandle;
use async_trait::async_trait;
pub use hoist_common::error::BridgeError;
use hoist_common::protocol::{
    BridgeRequest, BridgeResponse, ColumnRequest, ElementCount, ElementsRequest, ReadRequest,
};
use hoist_common::specifier::Specifier;
use serde_json::Value;

/// The Bridge trait is the interface every remote object-model bridge implements.
///
/// Implementors only provide the session lifecycle and `execute`; the typed operations are
/// expressed in terms of raw requests so every bridge speaks the same protocol.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Open the session (locate and compile scripts, load fixtures, etc.)
    async fn launch(&mut self) -> Result<(), BridgeError>;

    /// Close the session and cleanup resources.
    async fn close(&mut self) -> Result<(), BridgeError>;

    /// Check if the bridge is ready to accept requests.
    async fn is_ready(&self) -> bool;

    /// Execute a raw bridge request.
    async fn execute(&mut self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError>;

    /// Enumerate a collection into lazy handles, one per element.
    async fn elements(&mut self, collection: &Specifier) -> Result<Vec<RemoteHandle>, BridgeError> {
        let data = self
            .execute(BridgeRequest::Elements(ElementsRequest {
                collection: collection.clone(),
            }))
            .await?
            .into_result()?;
        let ElementCount { count } = serde_json::from_value(data)?;
        Ok((0..count)
            .map(|i| RemoteHandle::new(collection.clone().index(i)))
            .collect())
    }

    /// Evaluate a handle once and read `attributes` off the object it yields, all in one round
    /// trip. Fails if the reference is stale or any attribute is unreadable.
    async fn read(
        &mut self,
        handle: &RemoteHandle,
        attributes: &[&str],
    ) -> Result<Vec<Value>, BridgeError> {
        let data = self
            .execute(BridgeRequest::Read(ReadRequest {
                handle: handle.specifier().clone(),
                attributes: attributes.iter().map(|a| a.to_string()).collect(),
            }))
            .await?
            .into_result()?;
        match data {
            Value::Array(values) if values.len() == attributes.len() => Ok(values),
            other => Err(BridgeError::Serialization(format!(
                "read of {} did not return {} values: {}",
                handle,
                attributes.len(),
                other
            ))),
        }
    }

    /// Read one attribute for every element of a collection.
    async fn column(
        &mut self,
        collection: &Specifier,
        attribute: &str,
    ) -> Result<Vec<Value>, BridgeError> {
        let data = self
            .execute(BridgeRequest::Column(ColumnRequest {
                collection: collection.clone(),
                attribute: attribute.to_string(),
            }))
            .await?
            .into_result()?;
        match data {
            Value::Array(values) => Ok(values),
            other => Err(BridgeError::Serialization(format!(
                "column '{}' is not an array: {}",
                attribute, other
            ))),
        }
    }
}
