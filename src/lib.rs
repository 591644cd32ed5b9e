//! ShopLocal storefront configuration library

// Public modules
pub mod auth;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use auth::{FileTokenStore, MemoryTokenStore, NoTokenStore, TokenStore, AUTH_TOKEN_KEY};
pub use config::{ApiService, BuildMode, Config, Feature};
pub use error::ConfigError;
