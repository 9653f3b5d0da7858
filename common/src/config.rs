// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_UPLOAD_SOURCE: &str = "df-new-gh-pages-uploader";

/// Process configuration for the uploader service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub web_server_addr: String,
    /// Location of the configuration descriptor, a file path or an http(s) URL
    pub descriptor: String,
    pub identity_base_url: String,
    /// Tag stamped into every uploaded level record
    pub upload_source: String,

    pub session: SessionConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            descriptor: "./api.json".to_string(),
            identity_base_url: DEFAULT_IDENTITY_BASE_URL.to_string(),
            upload_source: DEFAULT_UPLOAD_SOURCE.to_string(),
            session: SessionConfig {
                path: "./data/account_settings.json".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let defaults = Self::default();

        let config = ConfigFile::builder()
            .set_default("web_server_addr", defaults.web_server_addr)?
            .set_default("descriptor", defaults.descriptor)?
            .set_default("identity_base_url", defaults.identity_base_url)?
            .set_default("upload_source", defaults.upload_source)?
            .set_default("session.path", defaults.session.path)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Environment variables with prefix "APP", e.g. APP__SESSION__PATH
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let defaults = Self::default();

                Self {
                    web_server_addr: env::var("WEB_SERVER_ADDR")
                        .unwrap_or(defaults.web_server_addr),
                    descriptor: env::var("API_DESCRIPTOR")
                        .unwrap_or(defaults.descriptor),
                    identity_base_url: env::var("IDENTITY_BASE_URL")
                        .unwrap_or(defaults.identity_base_url),
                    upload_source: env::var("UPLOAD_SOURCE")
                        .unwrap_or(defaults.upload_source),
                    session: SessionConfig {
                        path: env::var("SESSION_PATH")
                            .unwrap_or(defaults.session.path),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_public_services() {
        let config = Config::default();
        assert_eq!(config.identity_base_url, DEFAULT_IDENTITY_BASE_URL);
        assert_eq!(config.descriptor, "./api.json");
        assert_eq!(config.upload_source, "df-new-gh-pages-uploader");
    }

    #[test]
    fn test_load_reads_toml_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "web_server_addr = \"0.0.0.0:9000\"\n[session]\npath = \"/tmp/s.json\"\n",
        )
        .unwrap();

        env::set_var("CONFIG_DIR", dir.path());
        let config = Config::load().unwrap();
        env::remove_var("CONFIG_DIR");

        assert_eq!(config.web_server_addr, "0.0.0.0:9000");
        assert_eq!(config.session.path, "/tmp/s.json");
        assert_eq!(config.descriptor, "./api.json");
    }
}
