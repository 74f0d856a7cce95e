pub mod backend;
pub mod config;
pub mod executor;
pub mod extract;
pub mod fixture;
pub mod handle;
pub mod query;
pub mod resolver;
pub mod serialize;

pub use hoist_common::error_mapping;
pub use hoist_common::protocol;
pub use hoist_common::record;
pub use hoist_common::specifier;
pub use hoist_common::status;
