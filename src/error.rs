//! Dispatch and render error types

use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No controller registered for the request path
    #[error("no controller registered for '{path}'")]
    RouteNotFound { path: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error("failed to encode model value: {0}")]
    ModelEncoding(#[from] serde_json::Error),

    #[error("failed to read template '{path}': {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render template '{path}': {source}")]
    TemplateRender {
        path: String,
        #[source]
        source: tera::Error,
    },
}

impl Error {
    /// HTTP status reported to the client for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MissingParameter(_) | Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::ModelEncoding(_) | Self::TemplateRead { .. } | Self::TemplateRender { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the failure happened while producing output
    pub const fn is_render_failure(&self) -> bool {
        matches!(self, Self::TemplateRead { .. } | Self::TemplateRender { .. })
    }
}
