pub mod app_config;
pub mod config;
pub mod deals;
pub mod retailers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::{sort_by_unit_price, CanonicalDeal, PRICE_FALLBACK};
pub use retailers::{
    load_retailers, FieldMap, PricingKind, PricingKinds, RetailerRules, RetailersFile,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[source] serde_yaml::Error),

    #[error("retailer rules validation failed: {0}")]
    Validation(String),
}
