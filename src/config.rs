/// Configuration system for project-qa
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
///
/// Scoring weights and the relevance floor are deliberately configuration,
/// not contract: they are tuned empirically against the retrieval scenarios
/// in the integration tests.
use crate::error::{ConfigError, QaError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "project-qa.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Retrieval scoring configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,
}

/// Retrieval scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Bonus when the unit's identifier appears verbatim in the question
    #[serde(default = "default_name_weight")]
    pub name_weight: f32,

    /// Weight of the query-token overlap ratio
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f32,

    /// Bonus for definition units when the question asks about behavior
    #[serde(default = "default_kind_bonus")]
    pub kind_bonus: f32,

    /// Units scoring at or below this floor are excluded even if the
    /// result limit is not yet filled
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Result limit used when the caller does not supply one
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

/// Context assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum assembled context size in characters
    #[serde(default = "default_char_budget")]
    pub char_budget: usize,
}

// Default value functions
fn default_name_weight() -> f32 {
    3.0
}

fn default_overlap_weight() -> f32 {
    2.0
}

fn default_kind_bonus() -> f32 {
    0.5
}

fn default_min_score() -> f32 {
    0.05
}

fn default_top_k() -> usize {
    5
}

fn default_char_budget() -> usize {
    8_000
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            name_weight: default_name_weight(),
            overlap_weight: default_overlap_weight(),
            kind_bonus: default_kind_bonus(),
            min_score: default_min_score(),
            default_top_k: default_top_k(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            char_budget: default_char_budget(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, QaError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the default location if present, otherwise use defaults
    pub fn load_or_default() -> Result<Self, QaError> {
        let config_path = Path::new(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), QaError> {
        if self.retrieval.name_weight < 0.0 || self.retrieval.overlap_weight < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.name_weight / retrieval.overlap_weight".to_string(),
                reason: "weights must be non-negative".to_string(),
            }
            .into());
        }

        if self.retrieval.kind_bonus < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.kind_bonus".to_string(),
                reason: format!("must be non-negative, got {}", self.retrieval.kind_bonus),
            }
            .into());
        }

        if self.retrieval.min_score < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.min_score".to_string(),
                reason: format!("must be non-negative, got {}", self.retrieval.min_score),
            }
            .into());
        }

        if self.retrieval.default_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retrieval.default_top_k".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.context.char_budget == 0 {
            return Err(ConfigError::InvalidValue {
                key: "context.char_budget".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PROJECT_QA_NAME_WEIGHT") {
            if let Ok(w) = v.parse() {
                self.retrieval.name_weight = w;
            }
        }

        if let Ok(v) = std::env::var("PROJECT_QA_OVERLAP_WEIGHT") {
            if let Ok(w) = v.parse() {
                self.retrieval.overlap_weight = w;
            }
        }

        if let Ok(v) = std::env::var("PROJECT_QA_KIND_BONUS") {
            if let Ok(b) = v.parse() {
                self.retrieval.kind_bonus = b;
            }
        }

        if let Ok(v) = std::env::var("PROJECT_QA_MIN_SCORE") {
            if let Ok(s) = v.parse() {
                self.retrieval.min_score = s;
            }
        }

        if let Ok(v) = std::env::var("PROJECT_QA_TOP_K") {
            if let Ok(k) = v.parse() {
                self.retrieval.default_top_k = k;
            }
        }

        if let Ok(v) = std::env::var("PROJECT_QA_CHAR_BUDGET") {
            if let Ok(b) = v.parse() {
                self.context.char_budget = b;
            }
        }
    }

    /// Create a new Config with file defaults and environment overrides
    pub fn new() -> Result<Self, QaError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
