use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Field-validation bounds applied by the validation gate.
///
/// These are the knobs the gate checks request fields against; the gate
/// itself is pure and receives them as arguments.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Short string fields (names, categories, alt texts): min length
    #[serde(default = "default_string_min")]
    pub string_min: usize,
    /// Short string fields: max length
    #[serde(default = "default_string_max")]
    pub string_max: usize,

    /// Long text fields (article bodies, descriptions): min length
    #[serde(default = "default_text_min")]
    pub text_min: usize,
    /// Long text fields: max length
    #[serde(default = "default_text_max")]
    pub text_max: usize,

    /// Product price range (inclusive)
    #[serde(default = "default_price_min")]
    pub price_min: f64,
    #[serde(default = "default_price_max")]
    pub price_max: f64,

    /// Password length policy
    #[serde(default = "default_pass_min")]
    pub pass_min: usize,
    #[serde(default = "default_pass_max")]
    pub pass_max: usize,

    /// Length of generated replacement passwords
    #[serde(default = "default_generate_length")]
    pub generate_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            string_min: default_string_min(),
            string_max: default_string_max(),
            text_min: default_text_min(),
            text_max: default_text_max(),
            price_min: default_price_min(),
            price_max: default_price_max(),
            pass_min: default_pass_min(),
            pass_max: default_pass_max(),
            generate_length: default_generate_length(),
        }
    }
}

/// Stored-image and thumbnail encode parameters.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Base directory holding img/, thumb/ and tmp/ partitions
    #[serde(default = "default_media_root")]
    pub root: String,

    /// Extension (and thereby format) of stored full-size images
    #[serde(default = "default_image_ext")]
    pub image_ext: String,
    /// Bounding width for stored full-size images
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    /// Bounding height for stored full-size images
    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Extension of derived thumbnails
    #[serde(default = "default_image_ext")]
    pub thumb_ext: String,
    /// Fixed thumbnail width
    #[serde(default = "default_thumb_size")]
    pub thumb_width: u32,
    /// Fixed thumbnail height
    #[serde(default = "default_thumb_size")]
    pub thumb_height: u32,
    /// Thumbnail fit: "cover" (crop to fill) or "contain" (fit inside)
    #[serde(default = "default_thumb_fit")]
    #[validate(custom = "validate_thumb_fit")]
    pub thumb_fit: String,
    /// Crop anchor when fit is "cover": "start", "center" or "end"
    #[serde(default = "default_thumb_position")]
    #[validate(custom = "validate_thumb_position")]
    pub thumb_position: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            image_ext: default_image_ext(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            thumb_ext: default_image_ext(),
            thumb_width: default_thumb_size(),
            thumb_height: default_thumb_size(),
            thumb_fit: default_thumb_fit(),
            thumb_position: default_thumb_position(),
        }
    }
}

/// SMTP transport parameters. An empty host disables outbound mail and the
/// process falls back to a logging transport (useful in development).
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    /// Use implicit TLS instead of STARTTLS
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT signing secret
    #[validate(length(min = 32), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT expiration time in seconds
    pub jwt_expiration: u64,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Field-validation bounds
    #[serde(default)]
    #[validate]
    pub limits: LimitsConfig,

    /// Image and thumbnail encode parameters
    #[serde(default)]
    #[validate]
    pub media: MediaConfig,

    /// SMTP transport parameters
    #[serde(default)]
    #[validate]
    pub mail: MailConfig,
}

impl AppConfig {
    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_string_min() -> usize {
    2
}
fn default_string_max() -> usize {
    50
}
fn default_text_min() -> usize {
    8
}
fn default_text_max() -> usize {
    5000
}
fn default_price_min() -> f64 {
    1.0
}
fn default_price_max() -> f64 {
    9999.0
}
fn default_pass_min() -> usize {
    8
}
fn default_pass_max() -> usize {
    50
}
fn default_generate_length() -> usize {
    12
}

fn default_media_root() -> String {
    "media".to_string()
}
fn default_image_ext() -> String {
    "webp".to_string()
}
fn default_image_width() -> u32 {
    1920
}
fn default_image_height() -> u32 {
    1080
}
fn default_thumb_size() -> u32 {
    200
}
fn default_thumb_fit() -> String {
    "cover".to_string()
}
fn default_thumb_position() -> String {
    "center".to_string()
}
fn default_mail_port() -> u16 {
    587
}

fn validate_thumb_fit(value: &str) -> Result<(), ValidationError> {
    match value {
        "cover" | "contain" => Ok(()),
        _ => {
            let mut err = ValidationError::new("thumb_fit");
            err.message = Some("Must be one of: cover, contain".into());
            Err(err)
        }
    }
}

fn validate_thumb_position(value: &str) -> Result<(), ValidationError> {
    match value {
        "start" | "center" | "end" => Ok(()),
        _ => {
            let mut err = ValidationError::new("thumb_position");
            err.message = Some("Must be one of: start, center, end".into());
            Err(err)
        }
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if trimmed.len() < 32 {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be at least 32 characters".into());
        return Err(err);
    }

    // Reject trivially weak secrets
    if let Some(first) = trimmed.chars().next() {
        if trimmed.chars().all(|c| c == first) {
            let mut err = ValidationError::new("jwt_secret");
            err.message = Some("JWT secret cannot be a repeated character sequence".into());
            return Err(err);
        }
    }

    let lower = trimmed.to_ascii_lowercase();
    let weak_fragments = ["changeme", "password", "default", "12345", "secret"];
    if weak_fragments.iter().any(|pattern| lower.contains(pattern)) {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some(
            "JWT secret appears to be weak; use a cryptographically strong random string".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("vitrine_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    // NOTE: jwt_secret has no default - it MUST be provided via environment
    // variable or config file.
    let config = Config::builder()
        .set_default("database_url", "sqlite://vitrine.db?mode=rwc")?
        .set_default("jwt_expiration", 3600)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    if config.get_string("jwt_secret").is_err() {
        error!("JWT secret is not configured. Set APP__JWT_SECRET with a secure random string.");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "jwt_secret is required but not configured. Set APP__JWT_SECRET environment variable."
                .into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "0f1e2d3c4b5a69788796a5b4c3d2e1f0deadbeefcafe".into(),
            jwt_expiration: 3600,
            host: "127.0.0.1".into(),
            port: 8080,
            environment: "development".into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            limits: LimitsConfig::default(),
            media: MediaConfig::default(),
            mail: MailConfig::default(),
        }
    }

    #[test]
    fn base_config_validates() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn weak_jwt_secret_rejected() {
        let mut cfg = base_config();
        cfg.jwt_secret = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".into();
        assert!(cfg.validate().is_err());

        cfg.jwt_secret = "short".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn thumb_fit_validated() {
        let mut cfg = base_config();
        cfg.media.thumb_fit = "stretch".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn mail_disabled_when_host_empty() {
        assert!(!MailConfig::default().is_configured());
        let cfg = MailConfig {
            host: "mail.example.com".into(),
            ..Default::default()
        };
        assert!(cfg.is_configured());
    }
}
