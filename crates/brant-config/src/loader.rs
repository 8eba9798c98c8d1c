use std::path::{Path, PathBuf};

use brant_common::{Error, Result};
use tracing::{info, warn};

use crate::model::AppConfig;

const CONFIG_BASENAMES: &[&str] = &["config.yml", "config.yaml", "config.toml"];

/// Loads `AppConfig` from a config directory, with environment overrides
/// applied on top of whatever the file (or the defaults) provided.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(config_dir: &Path) -> Result<AppConfig> {
        let mut config = match Self::find_config_file(config_dir) {
            Some(path) => {
                info!("loading config from {}", path.display());
                Self::parse_file(&path)?
            }
            None => {
                info!(
                    "no config file found in {}, using defaults",
                    config_dir.display()
                );
                AppConfig::default()
            }
        };

        apply_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Return the first config file present in `dir`, in preference order.
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_BASENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn parse_file(path: &Path) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("YAML parse error: {e}"))),
            "toml" => toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("TOML parse error: {e}"))),
            other => Err(Error::Config(format!(
                "unsupported config extension: {other}"
            ))),
        }
    }
}

/// Apply `BRANT_*` environment overrides. `lookup` is injected so tests can
/// exercise this without mutating process state.
fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("BRANT_DATABASE")
        && !path.is_empty()
    {
        config.database.path = Some(PathBuf::from(path));
    }

    if let Some(host) = lookup("BRANT_HOST")
        && !host.is_empty()
    {
        config.gateway.host = host;
    }

    if let Some(port) = lookup("BRANT_PORT") {
        match port.parse() {
            Ok(port) => config.gateway.port = port,
            Err(_) => warn!("ignoring invalid BRANT_PORT value: {port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("brant-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_yaml_config() {
        let path = write_temp_config(
            "config.yml",
            "gateway:\n  host: 0.0.0.0\n  port: 9100\ndatabase:\n  path: /var/lib/app.db\n",
        );
        let config = ConfigLoader::parse_file(&path).unwrap();
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/var/lib/app.db"))
        );
    }

    #[test]
    fn parses_toml_config() {
        let path = write_temp_config(
            "config.toml",
            "[gateway]\nhost = \"0.0.0.0\"\nport = 9200\n",
        );
        let config = ConfigLoader::parse_file(&path).unwrap();
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 9200);
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = write_temp_config("config.ini", "gateway\n");
        let err = ConfigLoader::parse_file(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config extension"));
    }

    #[test]
    fn missing_config_dir_falls_back_to_defaults() {
        let config = ConfigLoader::load(Path::new("/nonexistent/brant-test")).unwrap();
        assert_eq!(config.gateway.port, 8790);
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BRANT_DATABASE", "/tmp/override.db"),
            ("BRANT_PORT", "9999"),
        ]);
        let mut config = AppConfig::default();
        apply_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.database.path.as_deref(),
            Some(Path::new("/tmp/override.db"))
        );
        assert_eq!(config.gateway.port, 9999);
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = AppConfig::default();
        apply_overrides(&mut config, |key| {
            (key == "BRANT_PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.gateway.port, 8790);
    }
}
