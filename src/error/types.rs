//! Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown feature: {0}. Expected: reviews, wishlist, chat, or notifications")]
    UnknownFeature(String),

    #[error("Unknown API service: {0}. Expected: geodir, wordpress, or dokan")]
    UnknownService(String),

    #[error("Invalid build mode: {0}. Expected: development or production")]
    InvalidMode(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidNumber { key: &'static str, value: f64 },

    #[error("Invalid URL for {key}: {value:?}")]
    InvalidUrl { key: &'static str, value: String },

    #[error("Default page size {default_per_page} exceeds maximum {max_per_page}")]
    InvalidPagination {
        default_per_page: f64,
        max_per_page: f64,
    },

    #[error("Token store error: {0}")]
    TokenStore(#[from] std::io::Error),

    #[error("Token store encoding error: {0}")]
    TokenEncoding(#[from] serde_json::Error),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
