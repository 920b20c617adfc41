//! Static synchronization configuration, loaded once at startup

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// The full rule set: source-to-destination mappings plus exclusion patterns.
///
/// Loaded from a TOML file at process start and never reloaded; the engine
/// and mapper borrow it during construction, so a running session always
/// sees one immutable rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ordered sync rules (`[[rule]]` tables)
    #[serde(rename = "rule")]
    pub rules: Vec<SyncRule>,
    /// Ordered exclusion patterns, matched at the start of candidate paths
    #[serde(default = "default_exclude_patterns")]
    pub exclude: Vec<String>,
}

/// One source root mapped to one or more destination roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRule {
    /// Absolute source root, used as a regex-anchored prefix
    pub source: String,
    /// Destination roots receiving mirrored content, in order
    pub destinations: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::path_error(path, format!("Failed to read configuration: {}", e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the rule set before constructing a mapper or engine.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            if rule.source.is_empty() {
                return Err(SyncError::config_error("sync rule source root cannot be empty"));
            }
            if !Path::new(&rule.source).is_absolute() {
                return Err(SyncError::config_error(format!(
                    "source root '{}' must be an absolute path",
                    rule.source
                )));
            }
            if rule.destinations.is_empty() {
                return Err(SyncError::config_error(format!(
                    "source root '{}' has no destination roots",
                    rule.source
                )));
            }
            for dest in &rule.destinations {
                if dest.is_empty() || !Path::new(dest).is_absolute() {
                    return Err(SyncError::config_error(format!(
                        "destination root '{}' for source '{}' must be an absolute path",
                        dest, rule.source
                    )));
                }
                // Mismatched trailing separators would mangle substituted paths
                if rule.source.ends_with('/') != dest.ends_with('/') {
                    return Err(SyncError::config_error(format!(
                        "destination root '{}' must carry the same trailing separator as source root '{}'",
                        dest, rule.source
                    )));
                }
            }
        }
        for pattern in &self.exclude {
            if pattern.is_empty() {
                return Err(SyncError::config_error("exclusion patterns cannot be empty"));
            }
        }
        Ok(())
    }
}

/// The stock exclusion set: hidden entries, common documentation names,
/// backup files, doxygen build profiles, and editor backups.
pub fn default_exclude_patterns() -> Vec<String> {
    [
        // directories and files starting with a dot
        r".*/\.",
        // files
        r".*/(AUTHORS|README|LICENSE)",
        r".*\.bak",
        r".*\.doxyfile",
        r".*~",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [[rule]]
            source = "/home/user/project/"
            destinations = ["/srv/www/project/"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].source, "/home/user/project/");
        assert_eq!(config.rules[0].destinations, vec!["/srv/www/project/"]);
        // Stock exclusion set applies when none is configured
        assert_eq!(config.exclude, default_exclude_patterns());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_fan_out_and_custom_exclude() {
        let toml = r#"
            exclude = [".*\\.tmp"]

            [[rule]]
            source = "/work/site/"
            destinations = ["/mnt/a/site/", "/mnt/b/site/"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.rules[0].destinations.len(), 2);
        assert_eq!(config.exclude, vec![r".*\.tmp".to_string()]);
        config.validate().unwrap();
    }

    #[test]
    fn test_rule_order_preserved() {
        let toml = r#"
            [[rule]]
            source = "/first/"
            destinations = ["/dst/first/"]

            [[rule]]
            source = "/second/"
            destinations = ["/dst/second/"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.rules[0].source, "/first/");
        assert_eq!(config.rules[1].source, "/second/");
    }

    #[test]
    fn test_validate_rejects_relative_source() {
        let config = Config {
            rules: vec![SyncRule {
                source: "project/".to_string(),
                destinations: vec!["/srv/project/".to_string()],
            }],
            exclude: default_exclude_patterns(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_destinations() {
        let config = Config {
            rules: vec![SyncRule {
                source: "/home/user/project/".to_string(),
                destinations: Vec::new(),
            }],
            exclude: default_exclude_patterns(),
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_trailing_separator_mismatch() {
        let config = Config {
            rules: vec![SyncRule {
                source: "/home/user/project/".to_string(),
                destinations: vec!["/srv/www/project".to_string()],
            }],
            exclude: default_exclude_patterns(),
        };

        assert!(config.validate().is_err());
    }
}
