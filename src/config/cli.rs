use super::toml_config::TomlConfig;
use super::ServerConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "heart-predictor")]
#[command(about = "HTTP service serving a trained heart disease classification pipeline")]
pub struct CliConfig {
    #[arg(long, short, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the JSON model artifact")]
    pub model_path: Option<String>,

    #[arg(long, help = "Address to bind")]
    pub host: Option<String>,

    #[arg(long, short, help = "Port to listen on")]
    pub port: Option<u16>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 預設值 <- TOML 檔 <- 命令列
    pub fn resolve(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        if let Some(path) = &self.config {
            let toml = TomlConfig::from_file(path)?;
            toml.validate()?;
            config = config.merge_toml(&toml);
        }

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.model_path {
            config.model_path = path.clone();
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }
        if self.json_logs {
            config.json_logs = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 9000\nhost = \"127.0.0.1\"\n[model]\npath = \"a.json\"\n")
            .unwrap();

        let cli = CliConfig::parse_from([
            "heart-predictor",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--model-path",
            "b.json",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.model_path, "b.json");
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = CliConfig::parse_from(["heart-predictor"]);
        assert_eq!(cli.resolve().unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_verbose_and_json_flags() {
        let config = CliConfig::parse_from(["heart-predictor", "--verbose", "--json-logs"])
            .resolve()
            .unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliConfig::parse_from(["heart-predictor", "--config", "/no/such/file.toml"]);
        assert!(cli.resolve().is_err());
    }
}
