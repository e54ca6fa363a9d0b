//! Gap analysis — body parameters the implementation never references
//!
//! Joins the catalog, the reference resolver and the classifier. Only
//! endpoints with a configured method that are tagged with the production
//! environment take part; everything else contributes nothing, however many
//! parameters it declares.

use crate::catalog::{Catalog, EndpointKey, Parameter};
use crate::classify::Classifier;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::resolve::ReferenceResolver;
use crate::util::fingerprint;
use serde::Serialize;
use tracing::{debug, info};

/// An endpoint with at least one unreferenced body parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointGap {
    pub endpoint: EndpointKey,
    pub description: String,
    pub category: String,
    /// Listed in the configured priority endpoints
    pub priority: bool,
    /// Unreferenced body parameters, sorted by name
    pub missing: Vec<Parameter>,
}

/// Per-category totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub endpoints: usize,
    pub parameters: usize,
}

/// Gap analysis totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapSummary {
    /// Eligible endpoints examined
    pub endpoints_examined: usize,
    /// Body parameters of eligible endpoints
    pub body_parameters: usize,
    pub endpoints_with_gaps: usize,
    pub missing_parameters: usize,
    /// In category order, including empty categories
    pub categories: Vec<CategoryCount>,
}

/// Result of a gap analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapReport {
    pub schema_hash: String,
    pub implementation_hash: String,
    /// Sorted by endpoint key
    pub gaps: Vec<EndpointGap>,
    /// Priority endpoints with gaps, in configured order
    pub priority: Vec<EndpointKey>,
    pub summary: GapSummary,
}

impl GapReport {
    /// Gaps of one category, sorted by endpoint key
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a EndpointGap> {
        self.gaps.iter().filter(move |g| g.category == category)
    }

    pub fn get(&self, key: &EndpointKey) -> Option<&EndpointGap> {
        self.gaps.iter().find(|g| &g.endpoint == key)
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Computes [`GapReport`]s for one configuration
#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    config: AnalysisConfig,
    classifier: Classifier,
    priority: Vec<EndpointKey>,
}

impl GapAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self {
            classifier: config.classifier()?,
            priority: config.priority_keys()?,
            config: config.clone(),
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Analyze `catalog` against the implementation text
    ///
    /// `schema` is only fingerprinted; the catalog must have been built from
    /// it.
    pub fn analyze(&self, catalog: &Catalog, schema: &str, implementation: &str) -> GapReport {
        let resolver = ReferenceResolver::new(implementation);
        let mut endpoints_examined = 0;
        let mut body_parameters = 0;
        let mut gaps = Vec::new();

        for endpoint in catalog.eligible(&self.config.methods, &self.config.production_tag) {
            if self.config.require_endpoint_reference && !resolver.endpoint_referenced(endpoint) {
                debug!(endpoint = %endpoint.key(), "endpoint not referenced, skipped");
                continue;
            }
            endpoints_examined += 1;

            let results = resolver.resolve(endpoint);
            body_parameters += results.len();

            let mut missing: Vec<Parameter> = results
                .into_iter()
                .filter(|r| !r.referenced)
                .map(|r| r.parameter.clone())
                .collect();
            if missing.is_empty() {
                continue;
            }
            missing.sort_by(|a, b| a.name.cmp(&b.name));

            let key = endpoint.key();
            gaps.push(EndpointGap {
                category: self.classifier.classify(&endpoint.path).to_string(),
                priority: self.priority.contains(&key),
                description: endpoint.description.clone(),
                endpoint: key,
                missing,
            });
        }
        gaps.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

        let priority: Vec<EndpointKey> = self
            .priority
            .iter()
            .filter(|key| gaps.iter().any(|g| &g.endpoint == *key))
            .cloned()
            .collect();

        let categories = self
            .classifier
            .categories()
            .into_iter()
            .map(|category| {
                let in_category = gaps.iter().filter(|g| g.category == category);
                CategoryCount {
                    category: category.to_string(),
                    endpoints: in_category.clone().count(),
                    parameters: in_category.map(|g| g.missing.len()).sum(),
                }
            })
            .collect();

        let summary = GapSummary {
            endpoints_examined,
            body_parameters,
            endpoints_with_gaps: gaps.len(),
            missing_parameters: gaps.iter().map(|g| g.missing.len()).sum(),
            categories,
        };
        info!(
            endpoints = summary.endpoints_with_gaps,
            parameters = summary.missing_parameters,
            "gap analysis complete"
        );

        GapReport {
            schema_hash: fingerprint(schema),
            implementation_hash: fingerprint(implementation),
            gaps,
            priority,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Location;

    const SCHEMA: &str = r#"
apis: [
  -{
    path: "/dedicatedCloud/{serviceName}/vm/{vmId}/backup/enable"
    operations: [
      -{
        httpMethod: "POST"
        apiStatus: { value: "PRODUCTION" }
        parameters: [
          -{ name: "backupDays", paramType: "body", dataType: "long" }
          -{ name: "vmId", paramType: "path", dataType: "long" }
        ]
      }
      -{
        httpMethod: "PUT"
        apiStatus: { value: "BETA" }
        parameters: [
          -{ name: "a", paramType: "body" }
          -{ name: "b", paramType: "body" }
        ]
      }
      -{
        httpMethod: "GET"
        apiStatus: { value: "PRODUCTION" }
        parameters: [ -{ name: "filter", paramType: "body" } ]
      }
    ]
  }
  -{
    path: "/dedicatedCloud/{serviceName}/changeProperties"
    operations: [
      -{
        httpMethod: "POST"
        apiStatus: { value: "PRODUCTION" }
        parameters: [
          -{ name: "zeta", paramType: "body", required: false }
          -{ name: "alpha", paramType: "body" }
          -{ name: "known", paramType: "body" }
        ]
      }
    ]
  }
]
"#;

    fn analyze(config: &AnalysisConfig, implementation: &str) -> GapReport {
        let catalog = Catalog::from_corpus(SCHEMA);
        GapAnalyzer::new(config)
            .unwrap()
            .analyze(&catalog, SCHEMA, implementation)
    }

    #[test]
    fn test_gaps_sorted_and_classified() {
        let report = analyze(&AnalysisConfig::default(), "body['known']");
        assert_eq!(report.gaps.len(), 2);

        let first = &report.gaps[0];
        assert_eq!(
            first.endpoint.to_string(),
            "POST /dedicatedCloud/{serviceName}/changeProperties"
        );
        assert_eq!(first.category, "service-level");
        let names: Vec<_> = first.missing.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let second = &report.gaps[1];
        assert_eq!(second.category, "backup");
        assert_eq!(second.missing.len(), 1);
        assert_eq!(second.missing[0].location, Location::Body);
    }

    #[test]
    fn test_non_production_contributes_nothing() {
        let report = analyze(&AnalysisConfig::default(), "");
        assert!(report.gaps.iter().all(|g| g.endpoint.method != "PUT"));
        assert!(report.gaps.iter().all(|g| g.endpoint.method != "GET"));
        assert_eq!(report.summary.endpoints_examined, 2);
        assert_eq!(report.summary.body_parameters, 4);
        assert_eq!(report.summary.missing_parameters, 4);
    }

    #[test]
    fn test_summary_categories_include_empty() {
        let report = analyze(&AnalysisConfig::default(), "");
        let backup = &report.summary.categories[0];
        assert_eq!(backup.category, "backup");
        assert_eq!(backup.endpoints, 1);
        let user = report
            .summary
            .categories
            .iter()
            .find(|c| c.category == "user")
            .unwrap();
        assert_eq!(user.endpoints, 0);
        assert_eq!(report.summary.categories.last().unwrap().category, "other");
    }

    #[test]
    fn test_priority_in_configured_order() {
        let config = AnalysisConfig {
            priority_endpoints: vec![
                "POST /nowhere".into(),
                "POST /dedicatedCloud/{serviceName}/vm/{vmId}/backup/enable".into(),
                "POST /dedicatedCloud/{serviceName}/changeProperties".into(),
            ],
            ..AnalysisConfig::default()
        };
        let report = analyze(&config, "");
        let priority: Vec<_> = report.priority.iter().map(|k| k.path.as_str()).collect();
        assert_eq!(
            priority,
            vec![
                "/dedicatedCloud/{serviceName}/vm/{vmId}/backup/enable",
                "/dedicatedCloud/{serviceName}/changeProperties"
            ]
        );
        assert!(report.gaps.iter().all(|g| g.priority));
    }

    #[test]
    fn test_repeated_priority_key_listed_once() {
        let key = "POST /dedicatedCloud/{serviceName}/changeProperties";
        let config = AnalysisConfig {
            priority_endpoints: vec![key.into(), key.into()],
            ..AnalysisConfig::default()
        };
        let report = analyze(&config, "");
        assert_eq!(report.priority.len(), 1);

        let text = crate::report::missing_report(&report);
        assert_eq!(text.matches(&format!("### {key}\n")).count(), 2);
    }

    #[test]
    fn test_require_endpoint_reference() {
        let config = AnalysisConfig {
            require_endpoint_reference: true,
            ..AnalysisConfig::default()
        };
        let report = analyze(&config, "post('/dedicatedCloud/changeProperties')");
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].category, "service-level");
        assert_eq!(report.summary.endpoints_examined, 1);
    }
}
