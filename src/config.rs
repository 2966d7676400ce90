//! Runtime configuration read from `GALINDEX_*` environment variables.

use crate::domain::error::DomainError;
use crate::domain::values::metric::Metric;
use crate::infrastructure::embeddings::hashing;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Hashing,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashing" | "local" => Ok(ProviderKind::Hashing),
            "openai" => Ok(ProviderKind::OpenAi),
            _ => Err(format!("Unknown embedding provider: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub metric: Metric,
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub dimension: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./database"),
            metric: Metric::Cosine,
            provider: ProviderKind::Hashing,
            api_key: String::new(),
            model: None,
            base_url: None,
            dimension: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, DomainError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();
        let defaults = Self::default();

        let metric = match get("GALINDEX_METRIC") {
            Some(m) => m.parse().map_err(DomainError::InvalidInput)?,
            None => defaults.metric,
        };
        let provider = match get("GALINDEX_EMBEDDING_PROVIDER") {
            Some(p) => p.parse().map_err(DomainError::InvalidInput)?,
            None => defaults.provider,
        };
        let dimension = get("GALINDEX_EMBEDDING_DIMENSION")
            .map(|d| {
                d.parse::<usize>()
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| DomainError::InvalidInput(format!("Invalid embedding dimension: {d}")))
            })
            .transpose()?;

        Ok(Self {
            data_dir: get("GALINDEX_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            metric,
            provider,
            api_key: get("GALINDEX_EMBEDDING_API_KEY").unwrap_or_default(),
            model: get("GALINDEX_EMBEDDING_MODEL"),
            base_url: get("GALINDEX_EMBEDDING_BASE_URL"),
            dimension,
        })
    }

    pub fn hashing_dimension(&self) -> usize {
        self.dimension.unwrap_or(hashing::DEFAULT_DIMENSION)
    }
}
