use anyhow::Result;
use figment::{providers::{Env, Format, Serialized, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::dataset::{CategoryColumns, LoadOptions, TextEncoding};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub cors_origin: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            request_timeout_secs: 30,
            enable_cors: false,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub encoding: TextEncoding,
    pub delimiter: char,
    /// Rows returned by the preview when no limit is requested.
    pub preview_rows: usize,
    pub max_preview_rows: usize,
    pub columns: CategoryColumns,
}

impl DatasetConfig {
    pub fn load_options(&self) -> Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("dataset delimiter must be an ASCII character, got {:?}", self.delimiter);
        }
        Ok(LoadOptions {
            encoding: self.encoding,
            delimiter: self.delimiter as u8,
            columns: self.columns.clone(),
        })
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nsc_data.csv"),
            encoding: TextEncoding::Latin1,
            delimiter: ',',
            preview_rows: 50,
            max_preview_rows: 1000,
            columns: CategoryColumns::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("models/load_model.json") }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::figment().extract().map_err(Into::into)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("EESP__").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_nsc_dataset() {
        let cfg = Config::default();
        assert_eq!(cfg.dataset.path, PathBuf::from("nsc_data.csv"));
        assert_eq!(cfg.dataset.encoding, TextEncoding::Latin1);
        assert_eq!(cfg.dataset.preview_rows, 50);
        assert_eq!(cfg.dataset.columns.phase, "APPPHASE");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8501);
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let cfg = DatasetConfig { delimiter: 'é', ..Default::default() };
        assert!(cfg.load_options().is_err());

        let cfg = DatasetConfig { delimiter: ';', ..Default::default() };
        assert_eq!(cfg.load_options().unwrap().delimiter, b';');
    }

    #[test]
    fn test_figment_overrides_from_toml() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [dataset]
                encoding = "utf-8"
                preview_rows = 10

                [server]
                port = 9000
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(cfg.dataset.encoding, TextEncoding::Utf8);
        assert_eq!(cfg.dataset.preview_rows, 10);
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }
}
