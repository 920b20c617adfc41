//! Path mapping and exclusion filtering over the configured rule set

use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex, RegexSet};

use crate::config::Config;
use crate::error::{Result, SyncError};

/// One compiled rule: an anchored source-root pattern and its destination roots.
#[derive(Debug)]
pub(crate) struct CompiledRule {
    source_root: String,
    pattern: Regex,
    destinations: Vec<String>,
}

impl CompiledRule {
    pub(crate) fn source_root(&self) -> &Path {
        Path::new(&self.source_root)
    }

    /// True when `path` is the source root itself or lies under it.
    ///
    /// A trailing-separator root like `/src/` does not match the bare string
    /// `/src`, so the root spelled without its separator is retried with one
    /// appended.
    pub(crate) fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path) || self.pattern.is_match(&format!("{path}/"))
    }

    /// Substitute the source-root prefix of `path` with each destination root.
    pub(crate) fn map(&self, path: &str) -> Vec<PathBuf> {
        if self.pattern.is_match(path) {
            self.destinations
                .iter()
                .map(|dest| {
                    PathBuf::from(self.pattern.replacen(path, 1, NoExpand(dest)).into_owned())
                })
                .collect()
        } else if self.pattern.is_match(&format!("{path}/")) {
            // the path is the source root spelled without its trailing separator
            self.destinations
                .iter()
                .map(|dest| PathBuf::from(dest.trim_end_matches('/')))
                .collect()
        } else {
            Vec::new()
        }
    }
}

/// Resolves concrete filesystem paths to their synchronization targets and
/// decides exclusion, using the anchored-prefix semantics of the rule set.
///
/// Built once from an immutable [`Config`]; compilation failures surface at
/// construction, never during a sync.
#[derive(Debug)]
pub struct PathMapper {
    rules: Vec<CompiledRule>,
    exclude: RegexSet,
}

impl PathMapper {
    /// Compile the configured rules and exclusion patterns.
    pub fn new(config: &Config) -> Result<Self> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                let pattern = Regex::new(&format!("^(?:{})", rule.source)).map_err(|e| {
                    SyncError::pattern_error(&rule.source, format!("Failed to compile source root: {}", e))
                })?;
                Ok(CompiledRule {
                    source_root: rule.source.clone(),
                    pattern,
                    destinations: rule.destinations.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Compile individually first so a bad pattern is reported by name
        for pattern in &config.exclude {
            Regex::new(&format!("^(?:{pattern})"))
                .map_err(|e| SyncError::pattern_error(pattern, e.to_string()))?;
        }
        let anchored: Vec<String> = config
            .exclude
            .iter()
            .map(|pattern| format!("^(?:{pattern})"))
            .collect();
        let exclude = RegexSet::new(&anchored)
            .map_err(|e| SyncError::pattern_error("exclusion set", e.to_string()))?;

        Ok(Self { rules, exclude })
    }

    /// All destination paths `path` maps to, across every matching rule in
    /// configuration order. Empty when no rule's source root matches.
    pub fn find_destinations(&self, path: &Path) -> Vec<PathBuf> {
        let Some(path) = path.to_str() else {
            return Vec::new();
        };
        self.rules.iter().flat_map(|rule| rule.map(path)).collect()
    }

    /// True iff any exclusion pattern matches at the start of `path`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.to_str()
            .map(|path| self.exclude.is_match(path))
            .unwrap_or(false)
    }

    /// Rules whose source root contains `path`, in configuration order.
    pub(crate) fn matching_rules(&self, path: &Path) -> Vec<&CompiledRule> {
        let Some(path) = path.to_str() else {
            return Vec::new();
        };
        self.rules.iter().filter(|rule| rule.matches(path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_exclude_patterns, SyncRule};
    use std::path::PathBuf;
    use test_case::test_case;

    fn mapper_for(rules: Vec<SyncRule>) -> PathMapper {
        let config = Config {
            rules,
            exclude: default_exclude_patterns(),
        };
        PathMapper::new(&config).unwrap()
    }

    fn single_rule_mapper() -> PathMapper {
        mapper_for(vec![SyncRule {
            source: "/home/user/project/".to_string(),
            destinations: vec!["/srv/www/project/".to_string()],
        }])
    }

    #[test]
    fn test_destination_preserves_relative_subpath() {
        let mapper = single_rule_mapper();

        let destinations = mapper.find_destinations(Path::new("/home/user/project/a/b.txt"));

        assert_eq!(destinations, vec![PathBuf::from("/srv/www/project/a/b.txt")]);
    }

    #[test]
    fn test_fan_out_to_multiple_destinations() {
        let mapper = mapper_for(vec![SyncRule {
            source: "/work/site/".to_string(),
            destinations: vec!["/mnt/a/site/".to_string(), "/mnt/b/site/".to_string()],
        }]);

        let destinations = mapper.find_destinations(Path::new("/work/site/index.html"));

        assert_eq!(
            destinations,
            vec![
                PathBuf::from("/mnt/a/site/index.html"),
                PathBuf::from("/mnt/b/site/index.html"),
            ]
        );
    }

    #[test]
    fn test_no_matching_rule_yields_nothing() {
        let mapper = single_rule_mapper();

        assert!(mapper.find_destinations(Path::new("/outside/file.txt")).is_empty());
    }

    #[test]
    fn test_all_matching_rules_contribute_in_order() {
        let mapper = mapper_for(vec![
            SyncRule {
                source: "/home/user/project/".to_string(),
                destinations: vec!["/srv/a/".to_string()],
            },
            SyncRule {
                source: "/home/user/".to_string(),
                destinations: vec!["/srv/b/".to_string()],
            },
        ]);

        let destinations = mapper.find_destinations(Path::new("/home/user/project/f.txt"));

        assert_eq!(
            destinations,
            vec![PathBuf::from("/srv/a/f.txt"), PathBuf::from("/srv/b/project/f.txt")]
        );
    }

    #[test]
    fn test_trailing_separator_root_matches_bare_root() {
        let mapper = single_rule_mapper();

        let destinations = mapper.find_destinations(Path::new("/home/user/project"));

        assert_eq!(destinations, vec![PathBuf::from("/srv/www/project")]);
    }

    #[test]
    fn test_matching_rules_finds_containing_root() {
        let mapper = single_rule_mapper();

        assert_eq!(mapper.matching_rules(Path::new("/home/user/project/src/main.c")).len(), 1);
        assert_eq!(mapper.matching_rules(Path::new("/home/user/project")).len(), 1);
        assert!(mapper.matching_rules(Path::new("/elsewhere/file")).is_empty());
    }

    #[test_case("/src/.git/config" ; "hidden directory contents")]
    #[test_case("/src/.hidden" ; "hidden file")]
    #[test_case("/src/docs/AUTHORS" ; "authors file")]
    #[test_case("/src/README" ; "readme file")]
    #[test_case("/src/README.md" ; "readme with extension, prefix match")]
    #[test_case("/src/LICENSE" ; "license file")]
    #[test_case("/src/notes.bak" ; "backup file")]
    #[test_case("/src/build.doxyfile" ; "doxygen profile")]
    #[test_case("/src/main.c~" ; "editor backup")]
    fn test_default_patterns_exclude(path: &str) {
        let mapper = single_rule_mapper();
        assert!(mapper.is_excluded(Path::new(path)));
    }

    #[test_case("/src/main.c" ; "plain source file")]
    #[test_case("/src/a/b.txt" ; "nested text file")]
    #[test_case("/src/bakery/bread.txt" ; "bak as substring of a directory")]
    fn test_default_patterns_keep(path: &str) {
        let mapper = single_rule_mapper();
        assert!(!mapper.is_excluded(Path::new(path)));
    }

    #[test]
    fn test_exclusion_is_logical_or_over_patterns() {
        let config = Config {
            rules: Vec::new(),
            exclude: vec![r".*\.tmp".to_string(), r".*\.log".to_string()],
        };
        let mapper = PathMapper::new(&config).unwrap();

        assert!(mapper.is_excluded(Path::new("/x/a.tmp")));
        assert!(mapper.is_excluded(Path::new("/x/a.log")));
        assert!(!mapper.is_excluded(Path::new("/x/a.txt")));
    }

    #[test]
    fn test_invalid_exclusion_pattern_is_reported_by_name() {
        let config = Config {
            rules: Vec::new(),
            exclude: vec![r"(unclosed".to_string()],
        };

        let err = PathMapper::new(&config).unwrap_err();

        match err {
            SyncError::Pattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected pattern error, got {other:?}"),
        }
    }
}
