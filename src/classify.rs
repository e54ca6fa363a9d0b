//! Endpoint classification by path rules
//!
//! Rules form an explicit ordered list of `(predicate, category)` pairs. The
//! first rule whose predicate matches the path template wins, and paths
//! matching no rule fall into [`OTHER`]. Order is significant: a backup
//! operation under a VM sub-path is `backup` only because the backup rule
//! comes first.

use crate::error::{Error, Result};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category of endpoints that match no rule
pub const OTHER: &str = "other";

/// Placeholder marking the service segment of a path
pub const SERVICE_PLACEHOLDER: &str = "serviceName";

/// Predicate over a path template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PathPredicate {
    /// Case-sensitive substring containment
    Contains(String),
    /// Regular expression search
    Matches(String),
    /// Path holds `{<placeholder>}` and no further placeholder after it
    ServiceLevel(String),
}

/// A configured classification rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryRule {
    pub category: String,
    /// Written as a one-key map, e.g. `rule: { contains: "/backup" }`
    #[serde(with = "serde_norway::with::singleton_map")]
    #[schemars(with = "PathPredicate")]
    pub rule: PathPredicate,
}

impl CategoryRule {
    pub fn new(category: impl Into<String>, rule: PathPredicate) -> Self {
        Self {
            category: category.into(),
            rule,
        }
    }
}

/// The default rule order
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("backup", PathPredicate::Contains("/backup".into())),
        CategoryRule::new(
            "disaster-recovery",
            PathPredicate::Contains("/disasterRecovery".into()),
        ),
        CategoryRule::new("user", PathPredicate::Contains("/user".into())),
        CategoryRule::new("vm", PathPredicate::Contains("/vm/".into())),
        CategoryRule::new(
            "service-level",
            PathPredicate::ServiceLevel(SERVICE_PLACEHOLDER.into()),
        ),
    ]
}

#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Matches(Regex),
    ServiceLevel(String),
}

impl Matcher {
    fn compile(predicate: &PathPredicate) -> Result<Self> {
        Ok(match predicate {
            PathPredicate::Contains(needle) => Matcher::Contains(needle.clone()),
            PathPredicate::Matches(pattern) => Matcher::Matches(
                Regex::new(pattern).map_err(|e| Error::Pattern(format!("{pattern}: {e}")))?,
            ),
            PathPredicate::ServiceLevel(name) => Matcher::ServiceLevel(format!("{{{name}}}")),
        })
    }

    fn is_match(&self, path: &str) -> bool {
        match self {
            Matcher::Contains(needle) => path.contains(needle.as_str()),
            Matcher::Matches(re) => re.is_match(path),
            Matcher::ServiceLevel(placeholder) => match path.find(placeholder.as_str()) {
                Some(at) => !path[at + placeholder.len()..].contains('{'),
                None => false,
            },
        }
    }
}

/// Ordered, first-match-wins path classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(Matcher, String)>,
}

impl Default for Classifier {
    fn default() -> Self {
        // Default rules contain no regular expressions
        Self {
            rules: default_rules()
                .iter()
                .filter_map(|r| Some((Matcher::compile(&r.rule).ok()?, r.category.clone())))
                .collect(),
        }
    }
}

impl Classifier {
    /// Compile rules, failing on an invalid regular expression
    pub fn from_rules(rules: &[CategoryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|r| Ok((Matcher::compile(&r.rule)?, r.category.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Category of the first rule matching `path`, else [`OTHER`]
    pub fn classify(&self, path: &str) -> &str {
        self.rules
            .iter()
            .find(|(matcher, _)| matcher.is_match(path))
            .map(|(_, category)| category.as_str())
            .unwrap_or(OTHER)
    }

    /// Category names in rule order, without repeats, ending with [`OTHER`]
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (_, category) in &self.rules {
            if !names.contains(&category.as_str()) {
                names.push(category);
            }
        }
        if !names.contains(&OTHER) {
            names.push(OTHER);
        }
        names
    }
}
