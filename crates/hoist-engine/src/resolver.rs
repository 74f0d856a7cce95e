//! Best-effort evaluation of remote handles.
//!
//! References to file-backed resources go stale between enumeration and evaluation (the file was
//! moved or deleted). A stale handle is an ordinary per-item outcome: it is dropped and the rest
//! of the query carries on.

use crate::backend::{Bridge, BridgeError};
use crate::handle::{RemoteHandle, RemoteObject, Resolution};
use tracing::debug;

/// Live objects produced from a handle sequence.
#[derive(Debug, Default)]
pub struct Resolved {
    /// Live objects in the order of their originating handles.
    pub objects: Vec<RemoteObject>,
    /// Number of handles that failed to evaluate.
    pub dropped: usize,
}

pub struct Resolver;

impl Resolver {
    /// Evaluate every handle exactly once, in order, dropping the ones that fault.
    ///
    /// `attributes` are read off each object during its single evaluation, so every live object
    /// carries values from one and the same remote object. Session faults (the bridge itself is
    /// gone) abort and are returned.
    pub async fn resolve_all<B: Bridge + ?Sized>(
        bridge: &mut B,
        handles: &[RemoteHandle],
        attributes: &[&str],
    ) -> Result<Resolved, BridgeError> {
        let mut resolved = Resolved {
            objects: Vec::with_capacity(handles.len()),
            dropped: 0,
        };

        for handle in handles {
            match handle.resolve(bridge, attributes).await? {
                Resolution::Live(object) => resolved.objects.push(object),
                Resolution::Dropped(fault) => {
                    debug!("Dropping unresolvable handle {}: {}", handle, fault);
                    resolved.dropped += 1;
                }
            }
        }

        Ok(resolved)
    }
}
