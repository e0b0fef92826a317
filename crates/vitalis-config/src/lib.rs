use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment keys
// ─────────────────────────────────────────────────────────────────────────────

pub const HOST_VAR: &str = "VITALIS_HOST";
pub const PORT_VAR: &str = "VITALIS_PORT";
pub const ARTIFACT_DIR_VAR: &str = "VITALIS_ARTIFACT_DIR";
pub const REQUIRE_ARTIFACTS_VAR: &str = "VITALIS_REQUIRE_ARTIFACTS";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

// ─────────────────────────────────────────────────────────────────────────────
// Load Policy
// ─────────────────────────────────────────────────────────────────────────────

/// What the predictor does when no artifacts exist on disk.
///
/// Partial or unreadable artifacts are an error under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Train a fallback model and persist it.
    #[default]
    TrainIfMissing,
    /// Fail with a storage error.
    RequireArtifacts,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Structs
// ─────────────────────────────────────────────────────────────────────────────

/// Hyperparameters of the synthetic fallback training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    pub n_samples: usize,
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_samples: 1000,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Where artifacts live and how to treat their absence.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub artifact_dir: PathBuf,
    pub load_policy: LoadPolicy,
    pub training: TrainingConfig,
}

impl ModelConfig {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            load_policy: LoadPolicy::default(),
            training: TrainingConfig::default(),
        }
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model: ModelConfig,
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.into());
        let port = parse_or(&lookup, PORT_VAR, DEFAULT_PORT)?;
        let artifact_dir = lookup(ARTIFACT_DIR_VAR).unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.into());

        let load_policy = match lookup(REQUIRE_ARTIFACTS_VAR) {
            None => LoadPolicy::default(),
            Some(raw) => match parse_flag(&raw) {
                Some(true) => LoadPolicy::RequireArtifacts,
                Some(false) => LoadPolicy::TrainIfMissing,
                None => return Err(invalid(REQUIRE_ARTIFACTS_VAR, raw)),
            },
        };

        Ok(Self {
            host,
            port,
            model: ModelConfig::new(artifact_dir).with_load_policy(load_policy),
        })
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, raw)),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: String) -> ConfigError {
    ConfigError::InvalidValue { key: key.into(), value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.model.artifact_dir, PathBuf::from("artifacts"));
        assert_eq!(config.model.load_policy, LoadPolicy::TrainIfMissing);
        assert_eq!(config.model.training, TrainingConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (HOST_VAR, "127.0.0.1"),
            (PORT_VAR, "9100"),
            (ARTIFACT_DIR_VAR, "/var/lib/vitalis"),
            (REQUIRE_ARTIFACTS_VAR, "true"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert_eq!(config.model.artifact_dir, PathBuf::from("/var/lib/vitalis"));
        assert_eq!(config.model.load_policy, LoadPolicy::RequireArtifacts);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[(PORT_VAR, "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { key: PORT_VAR.into(), value: "eighty".into() }
        );
    }

    #[test]
    fn test_invalid_flag() {
        let err = ServerConfig::from_lookup(lookup(&[(REQUIRE_ARTIFACTS_VAR, "maybe")])).unwrap_err();
        assert!(err.to_string().contains(REQUIRE_ARTIFACTS_VAR));
    }
}
