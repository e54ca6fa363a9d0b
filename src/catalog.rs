//! Schema catalog — endpoints and parameters read from the schema corpus
//!
//! The catalog is built once from scanned blocks and never mutated
//! afterwards. Reference resolution and classification derive their own
//! annotations from it.

use crate::scan::{BlockKind, BlockScanner, FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Where a parameter is carried in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Body,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::Path, Location::Query, Location::Body];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Location::Path),
            "query" => Some(Location::Query),
            "body" => Some(Location::Body),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Body => "body",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data type recorded when a parameter declares none
pub const DEFAULT_DATA_TYPE: &str = "string";

/// An operation parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: Location,
    pub data_type: String,
    /// Absent `required` fields read as `true`
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// Why a parameter block did not produce a [`Parameter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSkip {
    MissingName,
    MissingParamType,
    UnknownParamType(String),
}

impl Parameter {
    /// Read a parameter from its record
    pub fn from_record(record: &Record<'_>) -> Result<Self, ParameterSkip> {
        let name = record
            .scalar("name")
            .filter(|n| !n.is_empty())
            .ok_or(ParameterSkip::MissingName)?;
        let param_type = record
            .scalar("paramType")
            .ok_or(ParameterSkip::MissingParamType)?;
        let location = Location::parse(param_type)
            .ok_or_else(|| ParameterSkip::UnknownParamType(param_type.to_string()))?;

        let data_type = record
            .scalar("dataType")
            .or_else(|| record.scalar("type"))
            .unwrap_or(DEFAULT_DATA_TYPE);
        let required = !matches!(record.scalar("required"), Some("false"));

        Ok(Parameter {
            name: name.to_string(),
            location,
            data_type: data_type.to_string(),
            required,
            description: record.scalar("description").unwrap_or_default().to_string(),
        })
    }

    /// Write the parameter back as a corpus record
    pub fn to_block(&self) -> String {
        format!(
            "-{{\n  name: \"{}\"\n  paramType: \"{}\"\n  dataType: \"{}\"\n  required: {}\n  description: \"{}\"\n}}",
            escape(&self.name),
            self.location,
            escape(&self.data_type),
            self.required,
            escape(&self.description),
        )
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Unique `(method, path)` key of an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointKey {
    pub method: String,
    pub path: String,
}

impl EndpointKey {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Parse `"METHOD /path"`
    pub fn parse(s: &str) -> Option<Self> {
        let (method, path) = s.trim().split_once(char::is_whitespace)?;
        Some(Self::new(method.to_ascii_uppercase(), path.trim()))
    }
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Method shown for operations that declare no `httpMethod`
pub const UNKNOWN_METHOD: &str = "UNKNOWN";

/// One operation on one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    /// Upper-cased `httpMethod`, `None` when the operation declares none
    pub method: Option<String>,
    pub description: String,
    /// Environment tags in declaration order, without repeats
    pub environments: Vec<String>,
    pub parameters: Vec<Parameter>,
}

impl Endpoint {
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(
            self.method.as_deref().unwrap_or(UNKNOWN_METHOD),
            self.path.clone(),
        )
    }

    pub fn is_available_in(&self, environment: &str) -> bool {
        self.environments.iter().any(|e| e == environment)
    }

    /// Whether the method is one of `methods` (compared case-insensitively)
    pub fn has_method_in(&self, methods: &[String]) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| methods.iter().any(|allowed| allowed.eq_ignore_ascii_case(m)))
    }

    pub fn parameters_in(&self, location: Location) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    pub fn body_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters_in(Location::Body)
    }
}

/// Counts gathered while building a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub path_blocks: usize,
    pub operation_blocks: usize,
    pub parameter_blocks: usize,
    /// Parameters dropped because they declare no `paramType`
    pub missing_param_type: usize,
    /// Parameters dropped because their `paramType` is not path/query/body
    pub unsupported_location: usize,
    /// Later parameters collapsed into an earlier one of the same name
    pub duplicate_parameters: usize,
    /// Later operations collapsed into an earlier one with the same key
    pub duplicate_endpoints: usize,
    pub operations_without_method: usize,
    /// Unbalanced records and parameter records without a name
    pub malformed_blocks: usize,
}

/// Immutable endpoint catalog
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    endpoints: Vec<Endpoint>,
    stats: BuildStats,
}

impl Catalog {
    /// Build a catalog with the default environment field
    pub fn from_corpus(text: &str) -> Self {
        CatalogBuilder::default().build(text)
    }

    /// Endpoints in corpus order
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, key: &EndpointKey) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| &e.key() == key)
    }

    /// Endpoints with one of `methods` that are available in `environment`
    pub fn eligible<'a>(
        &'a self,
        methods: &'a [String],
        environment: &'a str,
    ) -> impl Iterator<Item = &'a Endpoint> + 'a {
        self.endpoints
            .iter()
            .filter(move |e| e.has_method_in(methods) && e.is_available_in(environment))
    }
}

/// Walks path, operation and parameter blocks into a [`Catalog`]
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    environment_fields: Vec<String>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            environment_fields: vec!["apiStatus".to_string()],
        }
    }
}

impl CatalogBuilder {
    pub fn new(environment_fields: Vec<String>) -> Self {
        Self { environment_fields }
    }

    pub fn build(&self, text: &str) -> Catalog {
        let mut stats = BuildStats::default();
        let mut endpoints: Vec<Endpoint> = Vec::new();
        let mut seen: HashSet<EndpointKey> = HashSet::new();

        let mut paths = BlockScanner::new(BlockKind::Path, text);
        for path_block in paths.by_ref() {
            stats.path_blocks += 1;
            let record = path_block.record();
            let Some(path) = record.scalar("path") else {
                continue;
            };

            let mut operations = BlockScanner::new(BlockKind::Operation, path_block.text);
            for op_block in operations.by_ref() {
                stats.operation_blocks += 1;
                let endpoint =
                    self.build_endpoint(path, &op_block.record(), op_block.text, &mut stats);
                if seen.insert(endpoint.key()) {
                    endpoints.push(endpoint);
                } else {
                    debug!(endpoint = %endpoint.key(), "duplicate operation collapsed");
                    stats.duplicate_endpoints += 1;
                }
            }
            stats.malformed_blocks += operations.malformed();
        }
        stats.malformed_blocks += paths.malformed();

        info!(
            paths = stats.path_blocks,
            endpoints = endpoints.len(),
            parameters = stats.parameter_blocks,
            "catalog built"
        );
        if stats.missing_param_type > 0 {
            warn!(
                count = stats.missing_param_type,
                "parameters without paramType dropped"
            );
        }

        Catalog { endpoints, stats }
    }

    fn build_endpoint(
        &self,
        path: &str,
        record: &Record<'_>,
        text: &str,
        stats: &mut BuildStats,
    ) -> Endpoint {
        let method = record.scalar("httpMethod").map(str::to_ascii_uppercase);
        if method.is_none() {
            stats.operations_without_method += 1;
        }

        let mut parameters: Vec<Parameter> = Vec::new();
        let mut scanner = BlockScanner::new(BlockKind::Parameter, text);
        for block in scanner.by_ref() {
            stats.parameter_blocks += 1;
            match Parameter::from_record(&block.record()) {
                Ok(param) => {
                    let duplicate = parameters
                        .iter()
                        .any(|p| p.name == param.name && p.location == param.location);
                    if duplicate {
                        stats.duplicate_parameters += 1;
                    } else {
                        parameters.push(param);
                    }
                }
                Err(ParameterSkip::MissingParamType) => {
                    debug!(path, "parameter without paramType dropped");
                    stats.missing_param_type += 1;
                }
                Err(ParameterSkip::UnknownParamType(kind)) => {
                    debug!(path, param_type = %kind, "parameter with unsupported paramType dropped");
                    stats.unsupported_location += 1;
                }
                Err(ParameterSkip::MissingName) => {
                    stats.malformed_blocks += 1;
                }
            }
        }
        stats.malformed_blocks += scanner.malformed();

        Endpoint {
            path: path.to_string(),
            method,
            description: record.scalar("description").unwrap_or_default().to_string(),
            environments: self.environments(record),
            parameters,
        }
    }

    fn environments(&self, record: &Record<'_>) -> Vec<String> {
        let mut tags = Vec::new();
        for field in &self.environment_fields {
            for value in record.get_all(field) {
                collect_tags(value, &mut tags);
            }
        }
        tags
    }
}

/// A scalar is a tag, a record contributes its `value`, a list each element
fn collect_tags(value: &FieldValue<'_>, tags: &mut Vec<String>) {
    match value {
        FieldValue::Scalar(tag) => {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        FieldValue::Nested(_) if value.is_list() => {
            for item in value.items() {
                collect_tags(&item, tags);
            }
        }
        FieldValue::Nested(span) => {
            let inner = Record::parse(span);
            for v in inner.get_all("value") {
                collect_tags(v, tags);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CORPUS: &str = r#"
models: { }
apis: [
  -{
    path: "/widget/{id}"
    operations: [
      -{
        httpMethod: "post"
        apiStatus: {
          description: "Stable production version"
          value: "PRODUCTION"
        }
        description: "Create a widget"
        parameters: [
          -{
            name: "id"
            paramType: "path"
            dataType: "long"
            required: true
            description: "Widget id"
          }
          -{
            name: "label"
            paramType: "body"
            dataType: "string"
            required: true
            description: "First label"
          }
          -{
            name: "label"
            paramType: "body"
            dataType: "string"
            description: "Second label"
          }
          -{
            name: "size"
            paramType: "body"
            dataType: "long"
            required: false
            description: ""
          }
          -{
            name: "orphan"
            dataType: "string"
          }
          -{
            name: "token"
            paramType: "header"
          }
        ]
      }
      -{
        apiStatus: { value: "BETA" }
        description: "No method"
        parameters: []
      }
    ]
  }
]
"#;

    #[test]
    fn test_build_endpoints() {
        let catalog = Catalog::from_corpus(CORPUS);
        assert_eq!(catalog.len(), 2);

        let post = &catalog.endpoints()[0];
        assert_eq!(post.key().to_string(), "POST /widget/{id}");
        assert_eq!(post.description, "Create a widget");
        assert_eq!(post.environments, vec!["PRODUCTION".to_string()]);

        let names: Vec<_> = post.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label", "size"]);

        let unknown = &catalog.endpoints()[1];
        assert_eq!(unknown.method, None);
        assert_eq!(unknown.key().method, UNKNOWN_METHOD);
        assert!(unknown.is_available_in("BETA"));
    }

    #[test]
    fn test_duplicate_parameter_keeps_first() {
        let catalog = Catalog::from_corpus(CORPUS);
        let label = catalog.endpoints()[0]
            .body_parameters()
            .find(|p| p.name == "label")
            .unwrap();
        assert_eq!(label.description, "First label");
        assert_eq!(catalog.stats().duplicate_parameters, 1);
    }

    #[test]
    fn test_defaults_and_drops() {
        let catalog = Catalog::from_corpus(CORPUS);
        let size = catalog.endpoints()[0]
            .body_parameters()
            .find(|p| p.name == "size")
            .unwrap();
        assert!(!size.required);
        assert_eq!(size.data_type, "long");

        let stats = catalog.stats();
        assert_eq!(stats.missing_param_type, 1);
        assert_eq!(stats.unsupported_location, 1);
        assert_eq!(stats.operations_without_method, 1);
        assert_eq!(stats.parameter_blocks, 6);
    }

    #[test]
    fn test_missing_required_defaults_to_true() {
        let record = Record::parse(r#"{ name: "x", paramType: "query" }"#);
        let param = Parameter::from_record(&record).unwrap();
        assert!(param.required);
        assert_eq!(param.data_type, DEFAULT_DATA_TYPE);
        assert_eq!(param.description, "");
    }

    #[test]
    fn test_environment_list_and_scalar_forms() {
        let text = r#"
apis: [ { path: "/a", operations: [
  { httpMethod: PUT, apiStatus: ["PRODUCTION", "BETA"] },
  { httpMethod: GET, apiStatus: "DEPRECATED" }
] } ]"#;
        let catalog = Catalog::from_corpus(text);
        assert_eq!(
            catalog.endpoints()[0].environments,
            vec!["PRODUCTION".to_string(), "BETA".to_string()]
        );
        assert_eq!(
            catalog.endpoints()[1].environments,
            vec!["DEPRECATED".to_string()]
        );
    }

    #[test]
    fn test_duplicate_endpoint_collapsed() {
        let text = r#"
apis: [
  { path: "/a", operations: [ { httpMethod: "POST", description: "first" } ] }
  { path: "/a", operations: [ { httpMethod: "POST", description: "second" } ] }
]"#;
        let catalog = Catalog::from_corpus(text);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.endpoints()[0].description, "first");
        assert_eq!(catalog.stats().duplicate_endpoints, 1);
    }

    #[test]
    fn test_eligible_filters_method_and_environment() {
        let catalog = Catalog::from_corpus(CORPUS);
        let methods = vec!["POST".to_string(), "PUT".to_string()];
        let eligible: Vec<_> = catalog.eligible(&methods, "PRODUCTION").collect();
        assert_eq!(eligible.len(), 1);
        assert_eq!(catalog.eligible(&methods, "BETA").count(), 0);
    }

    #[test]
    fn test_endpoint_key_parse() {
        let key = EndpointKey::parse("post /dedicatedCloud/{serviceName}/vm").unwrap();
        assert_eq!(key, EndpointKey::new("POST", "/dedicatedCloud/{serviceName}/vm"));
        assert_eq!(EndpointKey::parse("POST"), None);
    }

    #[test]
    fn test_to_block_reparses() {
        let param = Parameter {
            name: "label".into(),
            location: Location::Body,
            data_type: "string".into(),
            required: false,
            description: "A \"quoted\" {brace}\\".into(),
        };
        let block = param.to_block();
        assert_eq!(Parameter::from_record(&Record::parse(&block)), Ok(param));
    }
}
