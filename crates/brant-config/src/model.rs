use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the gateway and the migration runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    /// Base directory for runtime data. Defaults to `~/.brant/data` when
    /// unset and no explicit database path is configured.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8790,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit path to the SQLite database file. Takes precedence over
    /// `data_dir` resolution.
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Resolved location of the SQLite database file: the explicit configured
    /// path, else `<data_dir>/brant.db`, else `~/.brant/data/brant.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        let data_dir = self.data_dir.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".brant").join("data")
        });
        data_dir.join("brant.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_loopback() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 8790);
        assert!(config.database.path.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig = serde_yaml::from_str("gateway:\n  port: 9000\n").unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn explicit_database_path_wins() {
        let mut config = AppConfig::default();
        config.data_dir = Some(PathBuf::from("/srv/brant"));
        config.database.path = Some(PathBuf::from("/var/lib/app.db"));
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/app.db"));
    }

    #[test]
    fn data_dir_holds_the_default_database() {
        let mut config = AppConfig::default();
        config.data_dir = Some(PathBuf::from("/srv/brant"));
        assert_eq!(config.database_path(), PathBuf::from("/srv/brant/brant.db"));
    }
}
