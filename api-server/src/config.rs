//! Configuration module

use std::env;
use std::path::PathBuf;

use exoplanet_core::constants;
use exoplanet_core::EngineConfig;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,

    /// Directory of the scientist feedback log
    pub feedback_dir: PathBuf,

    /// Model / explainer / dataset artifacts
    pub engine: EngineConfig,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            cors_origins: constants::parse_list(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),

            feedback_dir: constants::get_feedback_dir(),

            engine: EngineConfig::from_env()?,

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
