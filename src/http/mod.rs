//! HTTP protocol layer module
//!
//! Response builders for the status codes the front controllers produce.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_413_response, build_error_response,
    build_html_response, build_options_response, ALLOWED_METHODS, STATE_CHANGING_METHODS,
};
