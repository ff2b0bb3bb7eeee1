//! Graph connection configuration.
//!
//! Resolution order: command-line flag or environment variable, then the
//! optional TOML file, then built-in defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use zdb_graph::GraphConfig;

/// Layout of the `--config` file.
///
/// ```toml
/// [neo4j]
/// uri = "bolt://graph.internal:7687"
/// user = "neo4j"
/// password = "secret"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub neo4j: GraphConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Connection settings given explicitly on the command line or environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub uri: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<GraphConfig> {
    let base = match file {
        Some(path) => FileConfig::load(path)?.neo4j,
        None => GraphConfig::default(),
    };

    Ok(GraphConfig {
        uri: overrides.uri.unwrap_or(base.uri),
        user: overrides.user.unwrap_or(base.user),
        password: overrides.password.unwrap_or(base.password),
        database: overrides.database.unwrap_or(base.database),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file_or_overrides() {
        let config = resolve(None, Overrides::default()).unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn test_file_values_apply_and_flags_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[neo4j]\nuri = \"bolt://graph:7687\"\npassword = \"from-file\"").unwrap();

        let config = resolve(
            Some(file.path()),
            Overrides { password: Some("from-flag".to_string()), ..Overrides::default() },
        )
        .unwrap();

        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.password, "from-flag");
        assert_eq!(config.user, "neo4j");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve(Some(&dir.path().join("absent.toml")), Overrides::default()).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[neo4j]\nuri = 42").unwrap();
        assert!(resolve(Some(file.path()), Overrides::default()).is_err());
    }
}
