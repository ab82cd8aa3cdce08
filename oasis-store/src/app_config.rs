use serde::Deserialize;
use std::env;

use oasis_core::DEFAULT_BREAKFAST_PRICE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reset: ResetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            run_migrations: false,
        }
    }
}

fn default_max_connections() -> u32 { 5 }

/// Where the reset writes to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResetConfig {
    #[serde(default)]
    pub backend: ResetBackend,
    pub seed_dir: Option<String>, // bundled seeds when unset
    #[serde(default = "default_breakfast_price")]
    pub breakfast_price: i32,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            backend: ResetBackend::default(),
            seed_dir: None,
            breakfast_price: default_breakfast_price(),
        }
    }
}

fn default_breakfast_price() -> i32 { DEFAULT_BREAKFAST_PRICE }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `OASIS__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("OASIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Connection string for the Postgres backend
    pub fn database_url(&self) -> Result<&str, config::ConfigError> {
        self.database
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| config::ConfigError::NotFound("database.url".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_source() {
        let cfg: Config = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.reset.backend, ResetBackend::Postgres);
        assert_eq!(cfg.reset.breakfast_price, 15);
        assert_eq!(cfg.database.max_connections, 5);
        assert!(cfg.database_url().is_err());
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [database]
            url = "postgres://demo@localhost/oasis"
            run_migrations = true

            [reset]
            backend = "memory"
            seed_dir = "seed"
            breakfast_price = 18
        "#;

        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.database_url().unwrap(), "postgres://demo@localhost/oasis");
        assert!(cfg.database.run_migrations);
        assert_eq!(cfg.reset.backend, ResetBackend::Memory);
        assert_eq!(cfg.reset.seed_dir.as_deref(), Some("seed"));
        assert_eq!(cfg.reset.breakfast_price, 18);
    }
}
