pub mod error;
pub mod error_mapping;
pub mod protocol;
pub mod record;
pub mod specifier;
pub mod status;
