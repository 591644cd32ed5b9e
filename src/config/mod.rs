//! Configuration management module
//!
//! This module loads the storefront configuration from environment
//! variables and `.env` files.

pub mod env;
pub mod settings;

pub use env::{get_boolean, get_number, get_string, DotenvEnv, EnvSource, MapEnv, ProcessEnv};
pub use settings::{
    AnalyticsConfig, ApiConfig, ApiService, AppConfig, AuthConfig, BuildMode, Config,
    EmailConfig, Feature, FeatureFlags, PaginationConfig, SecurityConfig, ServicesConfig,
    StorageConfig,
};
