pub mod backend;
pub mod runner;

/// The bridge script. Each request is one run of this script, compiled once per session.
pub const BRIDGE_JS: &str = include_str!("bridge.js");
