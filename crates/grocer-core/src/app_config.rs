use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Settings consumed by whatever process hosts the normalization engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// `tracing` filter directive handed to the host's subscriber, e.g. `"info"`.
    pub log_level: String,
    /// Location of the YAML rule tables, one entry per retailer feed.
    pub retailers_path: PathBuf,
}
