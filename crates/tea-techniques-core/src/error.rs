use thiserror::Error;

use crate::validate::ValidationReport;

/// Failures while turning raw catalog data into techniques or artifacts.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{origin}: invalid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} validation error(s) in technique data", .0.errors.len())]
    Invalid(ValidationReport),

    #[error("{origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("two artifacts map to the same path: {path}")]
    PathCollision { path: String },

    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
