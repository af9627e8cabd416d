//! # Configuration
//!
//! Settings for the lifecycle hook, loaded from YAML with environment variable
//! overrides on top.
//!
//! ## File format
//!
//! ```yaml
//! enabled_environments: [dev]
//! excluded_routes: [_wdt, _profiler]
//! excluded_route_patterns: ["^_debug_"]
//! html_only: false
//! include_defaults: true
//! title: multi-dump
//! ```
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ## Environment Variables
//!
//! - `MULTIDUMP_ENVIRONMENTS` - comma-separated allow-list, replaces `enabled_environments`
//! - `MULTIDUMP_EXCLUDED_ROUTES` - comma-separated, replaces `excluded_routes`
//! - `MULTIDUMP_HTML_ONLY` - `true`/`false`
//! - `MULTIDUMP_INCLUDE_DEFAULTS` - `true`/`false`

use std::env;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MultiDumpError, Result};
use crate::inject::DEFAULT_TITLE;

/// Lifecycle hook settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiDumpConfig {
    /// Environments the panel may be injected in
    pub enabled_environments: Vec<String>,
    /// Route names never receiving the panel
    pub excluded_routes: Vec<String>,
    /// Regexes over route names never receiving the panel
    pub excluded_route_patterns: Vec<String>,
    /// Only inject into responses whose content type is `text/html`
    pub html_only: bool,
    /// Dump request defaults (user, session, POST body, cookies...) at render time
    pub include_defaults: bool,
    /// Label of the trigger button
    pub title: String,
}

impl Default for MultiDumpConfig {
    fn default() -> Self {
        Self {
            enabled_environments: vec!["dev".to_string()],
            excluded_routes: vec!["_wdt".to_string(), "_profiler".to_string()],
            excluded_route_patterns: Vec::new(),
            html_only: false,
            include_defaults: true,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl MultiDumpConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).map_err(|e| MultiDumpError::Config {
            path: None,
            message: e.to_string(),
        })
    }

    /// Load a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source).map_err(|err| match err {
            MultiDumpError::Config { message, .. } => MultiDumpError::Config {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Apply `MULTIDUMP_*` overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Apply `MULTIDUMP_*` overrides from an arbitrary lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(list) = lookup("MULTIDUMP_ENVIRONMENTS") {
            self.enabled_environments = split_list(&list);
        }
        if let Some(list) = lookup("MULTIDUMP_EXCLUDED_ROUTES") {
            self.excluded_routes = split_list(&list);
        }
        if let Some(flag) = lookup("MULTIDUMP_HTML_ONLY") {
            match flag.trim().parse() {
                Ok(value) => self.html_only = value,
                Err(_) => warn!(value = %flag, "ignoring invalid MULTIDUMP_HTML_ONLY"),
            }
        }
        if let Some(flag) = lookup("MULTIDUMP_INCLUDE_DEFAULTS") {
            match flag.trim().parse() {
                Ok(value) => self.include_defaults = value,
                Err(_) => warn!(value = %flag, "ignoring invalid MULTIDUMP_INCLUDE_DEFAULTS"),
            }
        }
        self
    }

    pub fn is_enabled_for(&self, environment: &str) -> bool {
        self.enabled_environments.iter().any(|e| e == environment)
    }

    /// Compile the route exclusions, rejecting invalid patterns.
    pub fn route_exclusions(&self) -> Result<RouteExclusions> {
        let patterns = self
            .excluded_route_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| MultiDumpError::InvalidRoutePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RouteExclusions {
            exact: self.excluded_routes.clone(),
            patterns,
        })
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled route exclusion rules
#[derive(Debug, Clone, Default)]
pub struct RouteExclusions {
    exact: Vec<String>,
    patterns: Vec<Regex>,
}

impl RouteExclusions {
    /// Unnamed routes are never excluded.
    pub fn is_excluded(&self, route: Option<&str>) -> bool {
        let Some(route) = route else {
            return false;
        };
        self.exact.iter().any(|r| r == route) || self.patterns.iter().any(|re| re.is_match(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MultiDumpConfig::default();
        assert!(config.is_enabled_for("dev"));
        assert!(!config.is_enabled_for("prod"));
        assert!(config.include_defaults);
        assert_eq!(config.title, "multi-dump");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = MultiDumpConfig::from_yaml_str("html_only: true\n").unwrap();
        assert!(config.html_only);
        assert_eq!(config.excluded_routes, vec!["_wdt", "_profiler"]);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MULTIDUMP_ENVIRONMENTS", "dev, test ,"),
            ("MULTIDUMP_HTML_ONLY", "true"),
            ("MULTIDUMP_INCLUDE_DEFAULTS", "nope"),
        ]
        .into_iter()
        .collect();
        let config = MultiDumpConfig::default()
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.enabled_environments, vec!["dev", "test"]);
        assert!(config.html_only);
        assert!(config.include_defaults);
    }

    #[test]
    fn test_route_exclusions() {
        let config = MultiDumpConfig {
            excluded_route_patterns: vec!["^_debug_".to_string()],
            ..MultiDumpConfig::default()
        };
        let exclusions = config.route_exclusions().unwrap();
        assert!(exclusions.is_excluded(Some("_wdt")));
        assert!(exclusions.is_excluded(Some("_debug_panel")));
        assert!(!exclusions.is_excluded(Some("home")));
        assert!(!exclusions.is_excluded(None));
    }

    #[test]
    fn test_invalid_route_pattern() {
        let config = MultiDumpConfig {
            excluded_route_patterns: vec!["(".to_string()],
            ..MultiDumpConfig::default()
        };
        match config.route_exclusions() {
            Err(MultiDumpError::InvalidRoutePattern { pattern, .. }) => assert_eq!(pattern, "("),
            other => panic!("expected invalid pattern, got {other:?}"),
        }
    }
}
