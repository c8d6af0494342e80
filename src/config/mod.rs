//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `CTRLMAP_*` environment variables; the
//! CLI applies its flags on top of the result.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::constants::DEFAULT_TOP_N;
use crate::query::QueryConfig;
use crate::ranking::Bm25Params;
use crate::verifier::{VerifierConfig, VerifierKind};

/// Mapper configuration loaded from environment variables.
///
/// Use [`MapperConfig::from_env`] to read `CTRLMAP_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Lexical candidates kept per request. Default: `10`.
    pub top_n: usize,

    /// BM25 scoring parameters.
    pub bm25: Bm25Params,

    /// Section markers and excerpt bounds.
    pub query: QueryConfig,

    /// Verifier strategy, subset size and timeout.
    pub verifier: VerifierConfig,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            bm25: Bm25Params::default(),
            query: QueryConfig::default(),
            verifier: VerifierConfig::default(),
        }
    }
}

impl MapperConfig {
    const ENV_TOP_N: &'static str = "CTRLMAP_TOP_N";
    const ENV_VERIFY_TOP_N: &'static str = "CTRLMAP_VERIFY_TOP_N";
    const ENV_VERIFIER: &'static str = "CTRLMAP_VERIFIER";
    const ENV_VERIFIER_TIMEOUT_SECS: &'static str = "CTRLMAP_VERIFIER_TIMEOUT_SECS";
    const ENV_LLM_ENDPOINT: &'static str = "CTRLMAP_LLM_ENDPOINT";
    const ENV_LLM_MODEL: &'static str = "CTRLMAP_LLM_MODEL";
    const ENV_LLM_API_KEY: &'static str = "CTRLMAP_LLM_API_KEY";
    const ENV_LLM_TEMPERATURE: &'static str = "CTRLMAP_LLM_TEMPERATURE";
    const ENV_BM25_K1: &'static str = "CTRLMAP_BM25_K1";
    const ENV_BM25_B: &'static str = "CTRLMAP_BM25_B";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let top_n = Self::parse_count_from_env(Self::ENV_TOP_N, defaults.top_n)?;
        let verify_top_n =
            Self::parse_count_from_env(Self::ENV_VERIFY_TOP_N, defaults.verifier.verify_top_n)?;
        let kind = Self::parse_verifier_kind_from_env(defaults.verifier.kind)?;
        let timeout = Self::parse_timeout_from_env(defaults.verifier.timeout)?;
        let llm_endpoint = Self::parse_optional_string_from_env(Self::ENV_LLM_ENDPOINT);
        let llm_model = Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.verifier.llm_model);
        let llm_api_key = Self::parse_optional_string_from_env(Self::ENV_LLM_API_KEY);
        let temperature =
            Self::parse_f32_from_env(Self::ENV_LLM_TEMPERATURE, defaults.verifier.temperature)?;
        let k1 = Self::parse_f32_from_env(Self::ENV_BM25_K1, defaults.bm25.k1)?;
        let b = Self::parse_f32_from_env(Self::ENV_BM25_B, defaults.bm25.b)?;

        Ok(Self {
            top_n,
            bm25: Bm25Params::new(k1, b),
            query: defaults.query,
            verifier: VerifierConfig {
                kind,
                verify_top_n,
                timeout,
                llm_endpoint,
                llm_model,
                llm_api_key,
                temperature,
            },
        })
    }

    /// Validates component configs. Runs before any catalog or document work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bm25
            .validate()
            .map_err(|reason| ConfigError::InvalidBm25 { reason })?;
        self.query
            .validate()
            .map_err(|reason| ConfigError::InvalidQuery { reason })?;
        self.verifier
            .validate()
            .map_err(|reason| ConfigError::InvalidVerifier { reason })?;
        Ok(())
    }

    /// Verification subset size, clamped to the lexical candidate count.
    pub fn effective_verify_top_n(&self) -> usize {
        self.verifier.verify_top_n.min(self.top_n)
    }

    fn parse_count_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidCount {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f32_from_env(var_name: &'static str, default: f32) -> Result<f32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidNumber {
                    name: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_verifier_kind_from_env(default: VerifierKind) -> Result<VerifierKind, ConfigError> {
        match env::var(Self::ENV_VERIFIER) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::UnknownVerifier { value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_timeout_from_env(default: Duration) -> Result<Duration, ConfigError> {
        match env::var(Self::ENV_VERIFIER_TIMEOUT_SECS) {
            Ok(value) => match value.trim().parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(Duration::from_secs_f64(secs)),
                _ => Err(ConfigError::InvalidTimeout { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }
}
