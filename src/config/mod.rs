#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ServiceSettings;
use crate::utils::error::{PredictorError, Result};
use crate::utils::validation::Validate;
use std::net::SocketAddr;
use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/heart_disease_model.json";
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 合併預設值、TOML 檔與命令列參數後的最終設定
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub log_level: String,
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ServerConfig {
    /// 以 TOML 中有設定的欄位覆寫
    pub fn merge_toml(mut self, toml: &TomlConfig) -> Self {
        if let Some(host) = toml.host() {
            self.host = host.to_string();
        }
        if let Some(port) = toml.port() {
            self.port = port;
        }
        if let Some(path) = toml.model_path() {
            self.model_path = path.to_string();
        }
        if let Some(level) = toml.log_level() {
            self.log_level = level.to_string();
        }
        if let Some(json) = toml.json_logs() {
            self.json_logs = json;
        }
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
            .parse()
            .map_err(|e| PredictorError::InvalidConfigValueError {
                field: "server.host".to_string(),
                value: self.host.clone(),
                reason: format!("Not a valid listen address: {}", e),
            })
    }
}

impl ServiceSettings for ServerConfig {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn model_path(&self) -> &str {
        &self.model_path
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("server.host", &self.host)?;
        validate_positive_number("server.port", self.port as usize, 1)?;
        validate_path("model.path", &self.model_path)?;
        validate_one_of("logging.level", &self.log_level, &LOG_LEVELS)?;
        self.socket_addr()?;

        tracing::debug!("✅ Server configuration validation passed");
        Ok(())
    }
}
