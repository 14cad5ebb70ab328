use crate::core::aggregator::{FailurePolicy, DEFAULT_CONCURRENT_REQUESTS};
use crate::core::dashboard::DEFAULT_COMPETITION;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub backend: BackendConfig,
    pub aggregator: AggregatorConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub concurrent_requests: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub default_competition: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_competition: DEFAULT_COMPETITION.to_string(),
        }
    }
}

impl ScoutConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoutError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.aggregator.failure_policy
    }

    pub fn default_competition(&self) -> &str {
        &self.dashboard.default_competition
    }
}

impl ConfigProvider for ScoutConfig {
    fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.backend.request_timeout_seconds
    }

    fn concurrent_requests(&self) -> usize {
        self.aggregator.concurrent_requests
    }
}

impl Validate for ScoutConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("backend.base_url", &self.backend.base_url)?;
        validation::validate_positive_number(
            "backend.request_timeout_seconds",
            self.backend.request_timeout_seconds as usize,
            1,
        )?;
        validation::validate_positive_number(
            "aggregator.concurrent_requests",
            self.aggregator.concurrent_requests,
            1,
        )?;
        validation::validate_competition_code(
            "dashboard.default_competition",
            &self.dashboard.default_competition,
        )?;
        Ok(())
    }
}
