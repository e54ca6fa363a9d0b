//! Analysis configuration
//!
//! Loaded from an optional YAML file. Every field has a default, so an
//! empty file (or no file) gives the standard analysis: POST/PUT operations
//! tagged `PRODUCTION`, classified with the default rule order.

use crate::catalog::EndpointKey;
use crate::classify::{default_rules, CategoryRule, Classifier};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analysis configuration (`apigap.yaml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// HTTP methods whose body parameters are analyzed
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,

    /// Environment tag that marks an operation as available in production
    #[serde(default = "default_production_tag")]
    pub production_tag: String,

    /// Operation fields holding environment tags
    #[serde(default = "default_environment_fields")]
    pub environment_fields: Vec<String>,

    /// Only report endpoints whose path appears in the implementation
    #[serde(default)]
    pub require_endpoint_reference: bool,

    /// Endpoint keys (`"METHOD /path"`) listed first in the missing report
    #[serde(default)]
    pub priority_endpoints: Vec<String>,

    /// Ordered classification rules, first match wins
    #[serde(default = "default_rules")]
    pub categories: Vec<CategoryRule>,

    /// Report file names
    #[serde(default)]
    pub outputs: OutputConfig,
}

fn default_methods() -> Vec<String> {
    vec!["POST".to_string(), "PUT".to_string()]
}

fn default_production_tag() -> String {
    "PRODUCTION".to_string()
}

fn default_environment_fields() -> Vec<String> {
    vec!["apiStatus".to_string()]
}

/// File names of the three reports, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputConfig {
    #[serde(default = "default_catalog_output")]
    pub catalog: String,

    #[serde(default = "default_missing_output")]
    pub missing: String,

    #[serde(default = "default_body_output")]
    pub body: String,
}

fn default_catalog_output() -> String {
    "catalog.txt".to_string()
}

fn default_missing_output() -> String {
    "missing.txt".to_string()
}

fn default_body_output() -> String {
    "body.txt".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_output(),
            missing: default_missing_output(),
            body: default_body_output(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            production_tag: default_production_tag(),
            environment_fields: default_environment_fields(),
            require_endpoint_reference: false,
            priority_endpoints: Vec::new(),
            categories: default_rules(),
            outputs: OutputConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse configuration from YAML; an empty document gives the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AnalysisConfig = serde_norway::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(Error::Config("methods must not be empty".into()));
        }
        if self.production_tag.is_empty() {
            return Err(Error::Config("production_tag must not be empty".into()));
        }
        self.priority_keys()?;
        self.classifier()?;
        Ok(())
    }

    /// Parsed priority endpoint keys, in configured order without repeats
    pub fn priority_keys(&self) -> Result<Vec<EndpointKey>> {
        let mut keys: Vec<EndpointKey> = Vec::new();
        for s in &self.priority_endpoints {
            let key = EndpointKey::parse(s).ok_or_else(|| {
                Error::Config(format!(
                    "priority endpoint '{}' is not of the form 'METHOD /path'",
                    s
                ))
            })?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    pub fn classifier(&self) -> Result<Classifier> {
        Classifier::from_rules(&self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PathPredicate;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AnalysisConfig::from_yaml("").unwrap(), AnalysisConfig::default());
        assert_eq!(
            AnalysisConfig::from_yaml("{}").unwrap(),
            AnalysisConfig::default()
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config = AnalysisConfig::from_yaml(
            r#"
methods: [POST]
production_tag: STABLE
require_endpoint_reference: true
priority_endpoints:
  - "POST /dedicatedCloud/{serviceName}/datacenter/{datacenterId}/backup/disable"
categories:
  - category: network
    rule:
      matches: "/(vlan|ip)"
  - category: service-level
    rule:
      service_level: serviceName
outputs:
  missing: gaps.txt
"#,
        )
        .unwrap();

        assert_eq!(config.methods, vec!["POST"]);
        assert_eq!(config.production_tag, "STABLE");
        assert!(config.require_endpoint_reference);
        assert_eq!(
            config.categories[0].rule,
            PathPredicate::Matches("/(vlan|ip)".into())
        );
        assert_eq!(config.outputs.missing, "gaps.txt");
        assert_eq!(config.outputs.catalog, "catalog.txt");
        assert_eq!(config.priority_keys().unwrap()[0].method, "POST");
        assert_eq!(config.environment_fields, vec!["apiStatus"]);
    }

    #[test]
    fn test_invalid_priority_endpoint() {
        let err = AnalysisConfig::from_yaml("priority_endpoints: [\"nospace\"]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = AnalysisConfig::from_yaml("methods: [POST").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
        let err = AnalysisConfig::from_yaml("categories:\n  - category: x\n    rule: { near: y }\n")
            .unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_priority_keys_without_repeats() {
        let config = AnalysisConfig::from_yaml(
            "priority_endpoints:\n  - \"POST /a\"\n  - \"PUT /b\"\n  - \"post  /a\"\n",
        )
        .unwrap();
        let keys: Vec<String> = config
            .priority_keys()
            .unwrap()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["POST /a", "PUT /b"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = AnalysisConfig::from_yaml(
            "categories:\n  - category: bad\n    rule:\n      matches: \"(\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/apigap.yaml")).unwrap_err();
        assert!(matches!(err, Error::InputUnreadable { .. }));
    }
}
