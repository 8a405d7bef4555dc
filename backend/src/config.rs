use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/rf_pipeline.json";
pub const DEFAULT_DATA_PATH: &str = "data/loan_approval_dataset.csv";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8501,http://127.0.0.1:8501";
pub const DEFAULT_JSON_LIMIT: usize = 64 * 1024;

#[derive(Debug, Error, PartialEq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
    pub data_path: PathBuf,
    pub cors_origins: Vec<String>,
    pub json_limit: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source; unset keys fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let workers = parse_or("WORKERS", lookup("WORKERS"), num_cpus::get())?;
        if workers == 0 {
            return Err(ConfigError {
                key: "WORKERS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let json_limit = parse_or("JSON_LIMIT", lookup("JSON_LIMIT"), DEFAULT_JSON_LIMIT)?;

        let model_path = lookup("LOAN_MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.into());
        let data_path = lookup("LOAN_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.into());
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(ServiceConfig {
            host,
            port,
            workers,
            model_path: model_path.into(),
            data_path: data_path.into(),
            cors_origins,
            json_limit,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
