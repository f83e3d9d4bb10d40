use grocer_core::ConfigError;
use thiserror::Error;

/// Failures at the engine boundary. Record data never produces one of
/// these; only a defective rule table does.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid rule table for retailer \"{retailer}\": {source}")]
    InvalidRules {
        retailer: String,
        #[source]
        source: ConfigError,
    },

    #[error("no rule table configured for retailer \"{retailer}\"")]
    UnknownRetailer { retailer: String },
}
