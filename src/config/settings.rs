//! Storefront configuration
//!
//! This module builds the storefront configuration from environment
//! variables, with a fixed default for every value. Loading never fails:
//! a missing or empty variable falls back to its default.

use crate::auth::{TokenStore, AUTH_TOKEN_KEY};
use crate::config::env::{
    get_boolean, get_number, get_string, split_list, DotenvEnv, EnvSource, MapEnv, ProcessEnv,
};
use crate::error::{ConfigError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_GEODIR_API_URL: &str = "https://shoplocal.com/wp-json/geodir/v2";
pub const DEFAULT_WP_API_URL: &str = "https://shoplocal.com/wp-json/wp/v2";
pub const DEFAULT_DOKAN_API_URL: &str = "https://shoplocal.com/wp-json/dokan/v1";

/// Host build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[value(alias = "dev")]
    Development,
    #[value(alias = "prod")]
    Production,
}

impl BuildMode {
    /// Debug builds run in development mode, release builds in production mode
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Optional storefront features that can be toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Feature {
    Reviews,
    Wishlist,
    Chat,
    Notifications,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Reviews,
        Feature::Wishlist,
        Feature::Chat,
        Feature::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Reviews => "reviews",
            Feature::Wishlist => "wishlist",
            Feature::Chat => "chat",
            Feature::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Feature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFeature(s.to_string()))
    }
}

/// Backend APIs the storefront talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ApiService {
    Geodir,
    Wordpress,
    Dokan,
}

impl ApiService {
    pub const ALL: [ApiService; 3] = [ApiService::Geodir, ApiService::Wordpress, ApiService::Dokan];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiService::Geodir => "geodir",
            ApiService::Wordpress => "wordpress",
            ApiService::Dokan => "dokan",
        }
    }
}

impl fmt::Display for ApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApiService {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiService::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownService(s.to_string()))
    }
}

/// Backend API endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiConfig {
    pub geodir_url: String,
    pub wordpress_url: String,
    pub dokan_url: String,
    /// Request timeout in milliseconds
    pub timeout: f64,
}

/// Credentials used to authenticate against the WordPress APIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthConfig {
    pub wp_username: String,
    #[serde(skip_serializing)]
    pub wp_app_password: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiration: String,
}

/// Third-party service keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicesConfig {
    pub unsplash_access_key: String,
    pub google_maps_api_key: String,
    pub stripe_publishable_key: String,
    #[serde(skip_serializing)]
    pub stripe_secret_key: String,
    pub paypal_client_id: String,
    #[serde(skip_serializing)]
    pub paypal_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub env: String,
    pub url: String,
    pub is_development: bool,
    pub is_production: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationConfig {
    pub default_per_page: f64,
    pub max_per_page: f64,
}

/// Feature flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFlags {
    pub reviews: bool,
    pub wishlist: bool,
    pub chat: bool,
    pub notifications: bool,
}

/// Outgoing mail settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: f64,
    pub smtp_user: String,
    #[serde(skip_serializing)]
    pub smtp_password: String,
    pub from: String,
    pub from_name: String,
}

/// Asset storage settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageConfig {
    pub cdn_url: String,
    pub aws_access_key_id: String,
    #[serde(skip_serializing)]
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub aws_s3_bucket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsConfig {
    pub ga_tracking_id: String,
    pub fb_pixel_id: String,
    pub sentry_dsn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: f64,
    /// Rate limit window in milliseconds
    pub rate_limit_window: f64,
    #[serde(skip_serializing)]
    pub session_secret: String,
}

/// Complete storefront configuration
///
/// Built once and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub app: AppConfig,
    pub pagination: PaginationConfig,
    pub features: FeatureFlags,
    pub email: EmailConfig,
    pub storage: StorageConfig,
    pub analytics: AnalyticsConfig,
    pub security: SecurityConfig,
}

static GLOBAL: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Build the configuration from an environment source
    pub fn from_source(env: &dyn EnvSource, mode: BuildMode) -> Self {
        Self {
            api: ApiConfig {
                geodir_url: get_string(env, "VITE_GEODIR_API_URL", DEFAULT_GEODIR_API_URL),
                wordpress_url: get_string(env, "VITE_WP_API_URL", DEFAULT_WP_API_URL),
                dokan_url: get_string(env, "VITE_DOKAN_API_URL", DEFAULT_DOKAN_API_URL),
                timeout: get_number(env, "VITE_API_TIMEOUT", 10000.0),
            },

            auth: AuthConfig {
                wp_username: get_string(env, "VITE_WP_USERNAME", ""),
                wp_app_password: get_string(env, "VITE_WP_APP_PASSWORD", ""),
                api_token: get_string(env, "VITE_API_AUTH_TOKEN", ""),
                jwt_secret: get_string(env, "VITE_JWT_SECRET", ""),
                jwt_expiration: get_string(env, "VITE_JWT_EXPIRATION", "7d"),
            },

            services: ServicesConfig {
                unsplash_access_key: get_string(env, "VITE_UNSPLASH_ACCESS_KEY", ""),
                google_maps_api_key: get_string(env, "VITE_GOOGLE_MAPS_API_KEY", ""),
                stripe_publishable_key: get_string(env, "VITE_STRIPE_PUBLISHABLE_KEY", ""),
                stripe_secret_key: get_string(env, "VITE_STRIPE_SECRET_KEY", ""),
                paypal_client_id: get_string(env, "VITE_PAYPAL_CLIENT_ID", ""),
                paypal_secret: get_string(env, "VITE_PAYPAL_SECRET", ""),
            },

            app: AppConfig {
                env: get_string(env, "VITE_APP_ENV", "development"),
                url: get_string(env, "VITE_APP_URL", "http://localhost:5173"),
                is_development: mode == BuildMode::Development,
                is_production: mode == BuildMode::Production,
            },

            pagination: PaginationConfig {
                default_per_page: get_number(env, "VITE_DEFAULT_PER_PAGE", 20.0),
                max_per_page: get_number(env, "VITE_MAX_PER_PAGE", 100.0),
            },

            features: FeatureFlags {
                reviews: get_boolean(env, "VITE_ENABLE_REVIEWS", true),
                wishlist: get_boolean(env, "VITE_ENABLE_WISHLIST", true),
                chat: get_boolean(env, "VITE_ENABLE_CHAT", false),
                notifications: get_boolean(env, "VITE_ENABLE_NOTIFICATIONS", true),
            },

            email: EmailConfig {
                smtp_host: get_string(env, "VITE_SMTP_HOST", ""),
                smtp_port: get_number(env, "VITE_SMTP_PORT", 587.0),
                smtp_user: get_string(env, "VITE_SMTP_USER", ""),
                smtp_password: get_string(env, "VITE_SMTP_PASSWORD", ""),
                from: get_string(env, "VITE_SMTP_FROM", "noreply@shoplocal.com"),
                from_name: get_string(env, "VITE_SMTP_FROM_NAME", "ShopLocal Marketplace"),
            },

            storage: StorageConfig {
                cdn_url: get_string(env, "VITE_CDN_URL", ""),
                aws_access_key_id: get_string(env, "VITE_AWS_ACCESS_KEY_ID", ""),
                aws_secret_access_key: get_string(env, "VITE_AWS_SECRET_ACCESS_KEY", ""),
                aws_region: get_string(env, "VITE_AWS_REGION", "us-east-1"),
                aws_s3_bucket: get_string(env, "VITE_AWS_S3_BUCKET", ""),
            },

            analytics: AnalyticsConfig {
                ga_tracking_id: get_string(env, "VITE_GA_TRACKING_ID", ""),
                fb_pixel_id: get_string(env, "VITE_FB_PIXEL_ID", ""),
                sentry_dsn: get_string(env, "VITE_SENTRY_DSN", ""),
            },

            security: SecurityConfig {
                cors_origins: split_list(&get_string(env, "VITE_CORS_ORIGINS", "")),
                rate_limit_requests: get_number(env, "VITE_RATE_LIMIT_REQUESTS", 100.0),
                rate_limit_window: get_number(env, "VITE_RATE_LIMIT_WINDOW", 900000.0),
                session_secret: get_string(env, "VITE_SESSION_SECRET", ""),
            },
        }
    }

    /// Load from the process environment layered over the dotenv files in `root`
    pub fn load(root: impl AsRef<Path>, mode: BuildMode) -> Self {
        let env = DotenvEnv::load(root, mode.as_str());
        Self::from_source(&env, mode)
    }

    /// Load from the process environment only
    pub fn from_process_env(mode: BuildMode) -> Self {
        Self::from_source(&ProcessEnv, mode)
    }

    /// Process-wide configuration, loaded on first use from the working
    /// directory's dotenv files and the process environment.
    pub fn global() -> &'static Config {
        GLOBAL.get_or_init(|| Self::load(".", BuildMode::current()))
    }

    /// Value for the `Authorization` header, or an empty string when no
    /// credentials are available.
    ///
    /// Sources are tried in order: configured API token, WordPress username
    /// and application password, then the token persisted under
    /// [`AUTH_TOKEN_KEY`] in `store`.
    pub fn auth_header(&self, store: &dyn TokenStore) -> String {
        let auth = &self.auth;

        if !auth.api_token.is_empty() {
            return format!("Basic {}", auth.api_token);
        }

        if !auth.wp_username.is_empty() && !auth.wp_app_password.is_empty() {
            let credentials = format!("{}:{}", auth.wp_username, auth.wp_app_password);
            return format!("Basic {}", BASE64.encode(credentials));
        }

        match store.get(AUTH_TOKEN_KEY) {
            Some(token) if !token.is_empty() => format!("Basic {}", token),
            _ => String::new(),
        }
    }

    pub fn is_feature_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Reviews => self.features.reviews,
            Feature::Wishlist => self.features.wishlist,
            Feature::Chat => self.features.chat,
            Feature::Notifications => self.features.notifications,
        }
    }

    /// Base URL of a backend API
    pub fn api_url(&self, service: ApiService) -> &str {
        match service {
            ApiService::Geodir => &self.api.geodir_url,
            ApiService::Wordpress => &self.api.wordpress_url,
            ApiService::Dokan => &self.api.dokan_url,
        }
    }

    /// Check the configuration for values that would misbehave downstream.
    ///
    /// Loading never runs this; callers opt in to fail fast.
    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("VITE_API_TIMEOUT", self.api.timeout),
            ("VITE_DEFAULT_PER_PAGE", self.pagination.default_per_page),
            ("VITE_MAX_PER_PAGE", self.pagination.max_per_page),
            ("VITE_SMTP_PORT", self.email.smtp_port),
            ("VITE_RATE_LIMIT_REQUESTS", self.security.rate_limit_requests),
            ("VITE_RATE_LIMIT_WINDOW", self.security.rate_limit_window),
        ];
        for (key, value) in numbers {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidNumber { key, value });
            }
        }

        if self.security.rate_limit_requests == 0.0 {
            return Err(ConfigError::InvalidNumber {
                key: "VITE_RATE_LIMIT_REQUESTS",
                value: self.security.rate_limit_requests,
            });
        }
        if self.security.rate_limit_window == 0.0 {
            return Err(ConfigError::InvalidNumber {
                key: "VITE_RATE_LIMIT_WINDOW",
                value: self.security.rate_limit_window,
            });
        }

        if self.pagination.default_per_page > self.pagination.max_per_page {
            return Err(ConfigError::InvalidPagination {
                default_per_page: self.pagination.default_per_page,
                max_per_page: self.pagination.max_per_page,
            });
        }

        let urls = [
            ("VITE_GEODIR_API_URL", &self.api.geodir_url),
            ("VITE_WP_API_URL", &self.api.wordpress_url),
            ("VITE_DOKAN_API_URL", &self.api.dokan_url),
            ("VITE_APP_URL", &self.app.url),
        ];
        for (key, value) in urls {
            if !is_http_url(value) {
                return Err(ConfigError::InvalidUrl {
                    key,
                    value: value.clone(),
                });
            }
        }

        if self.app.is_production && self.security.session_secret.is_empty() {
            tracing::warn!("Running in production without VITE_SESSION_SECRET!");
        }

        Ok(())
    }
}

impl Default for Config {
    /// Every value at its default, for the current build mode
    fn default() -> Self {
        Self::from_source(&MapEnv::new(), BuildMode::current())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
