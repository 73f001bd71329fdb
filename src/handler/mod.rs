//! Request handler module
//!
//! HTTP entry point: method and size checks, parameter extraction, and
//! hand-off to the V3 or V4 front controller by URL prefix.

pub mod params;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
