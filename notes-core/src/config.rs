use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotesConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub environment: String,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "data/notes.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Empty means no CORS layer is installed.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl HttpConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl NotesConfig {
    /// Load config from an optional TOML file, then apply `NOTES_*` env overrides
    /// (e.g. `NOTES_HTTP__PORT=8080`).
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?;
        s.try_deserialize()
    }
}

/// `NOTES_` prefix, `__` between nested keys, comma-separated CORS origins.
fn env_source() -> Environment {
    Environment::with_prefix("NOTES")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("http.cors_allowed_origins")
        .try_parsing(true)
}
