//! # Settings
//!
//! Layered settings for processes that open the rental database.
//!
//! ```text
//! defaults ──► TOML file (optional) ──► RENTAL_* environment ──► CLI flags
//!  lowest                                                        highest
//! ```
//!
//! | Key                        | Env var                           | Default     |
//! |----------------------------|-----------------------------------|-------------|
//! | `database_path`            | `RENTAL_DATABASE_PATH`            | `rental.db` |
//! | `database_max_connections` | `RENTAL_DATABASE_MAX_CONNECTIONS` | `5`         |
//! | `log_level`                | `RENTAL_LOG_LEVEL`                | `info`      |
//!
//! CLI overrides are applied by the binary after loading.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::pool::DbConfig;

const ENV_PREFIX: &str = "RENTAL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RentalSettings {
    pub database_path: PathBuf,
    pub database_max_connections: u32,
    /// An `EnvFilter` directive such as `info` or `rental_db=debug`.
    pub log_level: String,
}

impl RentalSettings {
    /// Loads settings from defaults, the optional file and the process
    /// environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(file, None)
    }

    /// Like [`load`](Self::load) but reads `RENTAL_*` variables from `env`
    /// instead of the process environment when given.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database_path", "rental.db")?
            .set_default("database_max_connections", 5)?
            .set_default("log_level", "info")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        let settings: RentalSettings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "database_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database_max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.database_max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn temp_toml(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = RentalSettings::load_from(None, env(&[])).unwrap();
        assert_eq!(settings.database_path, PathBuf::from("rental.db"));
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let settings = RentalSettings::load_from(
            None,
            env(&[
                ("RENTAL_DATABASE_PATH", "/var/lib/rental.db"),
                ("RENTAL_DATABASE_MAX_CONNECTIONS", "8"),
                ("RENTAL_LOG_LEVEL", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/var/lib/rental.db"));
        assert_eq!(settings.database_max_connections, 8);
        assert_eq!(settings.log_level, "debug");

        let db = settings.db_config();
        assert_eq!(db.max_connections, 8);
    }

    #[test]
    fn test_file_then_env() {
        let path = temp_toml(
            "rental-settings",
            "database_path = \"fleet.db\"\nlog_level = \"warn\"\n",
        );
        let settings =
            RentalSettings::load_from(Some(path.as_path()), env(&[("RENTAL_LOG_LEVEL", "trace")])).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.database_path, PathBuf::from("fleet.db"));
        assert_eq!(settings.log_level, "trace");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            RentalSettings::load_from(None, env(&[("RENTAL_DATABASE_MAX_CONNECTIONS", "0")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RentalSettings::load_from(None, env(&[("RENTAL_DATABASE_MAX_CONNECTIONS", "lots")])),
            Err(ConfigError::Source(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let missing = std::env::temp_dir().join("rental-no-such-settings.toml");
        assert!(RentalSettings::load_from(Some(missing.as_path()), env(&[])).is_err());
    }
}
