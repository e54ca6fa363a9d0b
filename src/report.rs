//! Report rendering
//!
//! Three plain-text documents, all deterministic: endpoints are sorted by
//! key and parameters by name, so corpus order never leaks into the output.
//!
//! - [`catalog_report`]: every eligible endpoint with its path, query and
//!   body parameters
//! - [`missing_report`]: unreferenced body parameters grouped by category,
//!   priority endpoints first
//! - [`body_report`]: endpoint → comma-joined body parameter names

use crate::catalog::{BuildStats, Catalog, Endpoint, Location, Parameter};
use crate::config::AnalysisConfig;
use crate::gap::GapReport;
use crate::util::section_title;

fn push_parameter(out: &mut String, param: &Parameter) {
    let req = if param.required {
        "Required"
    } else {
        "Optional"
    };
    out.push_str(&format!(
        "- `{}` ({}) - {}\n",
        param.name, param.data_type, req
    ));
    if !param.description.is_empty() {
        out.push_str(&format!(
            "  Description: {}\n",
            param.description.replace('\n', " ")
        ));
    }
}

fn push_parameters<'a>(out: &mut String, params: impl IntoIterator<Item = &'a Parameter>) {
    let mut sorted: Vec<&Parameter> = params.into_iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    for param in sorted {
        push_parameter(out, param);
    }
}

/// Eligible endpoints sorted by path, then method
fn eligible_sorted<'a>(catalog: &'a Catalog, config: &'a AnalysisConfig) -> Vec<&'a Endpoint> {
    let mut endpoints: Vec<&Endpoint> = catalog
        .eligible(&config.methods, &config.production_tag)
        .collect();
    endpoints.sort_by(|a, b| (&a.path, a.key()).cmp(&(&b.path, b.key())));
    endpoints
}

fn location_heading(location: Location) -> &'static str {
    match location {
        Location::Path => "Path Parameters",
        Location::Query => "Query Parameters",
        Location::Body => "Body Parameters",
    }
}

fn push_build_stats(out: &mut String, catalog: &Catalog) {
    let BuildStats {
        operation_blocks,
        missing_param_type,
        unsupported_location,
        duplicate_parameters,
        duplicate_endpoints,
        operations_without_method,
        malformed_blocks,
        ..
    } = catalog.stats();

    out.push_str(&format!("- Catalogued operations: {}\n", catalog.len()));
    out.push_str(&format!("- Operation blocks scanned: {}\n", operation_blocks));
    out.push_str(&format!(
        "- Operations without httpMethod: {}\n",
        operations_without_method
    ));
    out.push_str(&format!(
        "- Parameters dropped (no paramType): {}\n",
        missing_param_type
    ));
    out.push_str(&format!(
        "- Parameters dropped (unsupported paramType): {}\n",
        unsupported_location
    ));
    out.push_str(&format!(
        "- Duplicate parameters collapsed: {}\n",
        duplicate_parameters
    ));
    out.push_str(&format!(
        "- Duplicate operations collapsed: {}\n",
        duplicate_endpoints
    ));
    out.push_str(&format!("- Malformed blocks skipped: {}\n", malformed_blocks));
}

/// Full parameter catalog of the eligible endpoints
pub fn catalog_report(catalog: &Catalog, config: &AnalysisConfig) -> String {
    let methods = config.methods.join("/");
    let endpoints = eligible_sorted(catalog, config);
    let mut out = String::new();

    out.push_str(&format!("# {} Parameter Catalog\n\n", methods));
    out.push_str(&format!(
        "All {} endpoints available in {}, with their parameters.\n",
        methods, config.production_tag
    ));

    for endpoint in &endpoints {
        out.push_str(&format!("\n## {}\n", endpoint.key()));
        out.push_str(&format!("**Description**: {}\n\n", endpoint.description));

        for location in Location::ALL {
            let params: Vec<&Parameter> = endpoint.parameters_in(location).collect();
            if params.is_empty() {
                continue;
            }
            out.push_str(&format!("### {}:\n", location_heading(location)));
            push_parameters(&mut out, params);
            out.push('\n');
        }
        out.push_str("---\n");
    }

    let with_body = endpoints
        .iter()
        .filter(|e| e.body_parameters().next().is_some())
        .count();
    let body_params: usize = endpoints.iter().map(|e| e.body_parameters().count()).sum();

    out.push_str("\n## SUMMARY STATISTICS\n\n");
    out.push_str(&format!("- Total {} endpoints: {}\n", methods, endpoints.len()));
    out.push_str(&format!("- Endpoints with body parameters: {}\n", with_body));
    out.push_str(&format!("- Total body parameters: {}\n", body_params));
    push_build_stats(&mut out, catalog);

    out
}

/// Unreferenced body parameters grouped by category
pub fn missing_report(report: &GapReport) -> String {
    let mut out = String::new();

    out.push_str("# Missing Body Parameters Report\n\n");
    out.push_str("Endpoints with body parameters not referenced by the implementation.\n\n");
    out.push_str(&format!("- Schema corpus: {}\n", report.schema_hash));
    out.push_str(&format!(
        "- Implementation corpus: {}\n",
        report.implementation_hash
    ));

    out.push_str("\n## PRIORITY ENDPOINTS\n\n");
    if report.priority.is_empty() {
        out.push_str("No priority endpoint has missing parameters.\n");
    }
    for key in &report.priority {
        if let Some(gap) = report.get(key) {
            out.push_str(&format!("### {}\n", gap.endpoint));
            out.push_str("**Missing Parameters:**\n");
            push_parameters(&mut out, &gap.missing);
            out.push('\n');
        }
    }

    for count in &report.summary.categories {
        if count.endpoints == 0 {
            continue;
        }
        out.push_str(&format!("\n## {}\n\n", section_title(&count.category)));
        for gap in report.in_category(&count.category) {
            out.push_str(&format!("### {}\n", gap.endpoint));
            out.push_str("**Missing Parameters:**\n");
            push_parameters(&mut out, &gap.missing);
            out.push('\n');
        }
    }

    let summary = &report.summary;
    out.push_str("\n## SUMMARY\n\n");
    out.push_str(&format!(
        "- Endpoints examined: {}\n",
        summary.endpoints_examined
    ));
    out.push_str(&format!(
        "- Body parameters examined: {}\n",
        summary.body_parameters
    ));
    out.push_str(&format!(
        "- Total endpoints with missing parameters: {}\n",
        summary.endpoints_with_gaps
    ));
    out.push_str(&format!(
        "- Total missing parameters: {}\n",
        summary.missing_parameters
    ));
    for count in &summary.categories {
        out.push_str(&format!(
            "- {}: {} endpoints, {} parameters\n",
            count.category, count.endpoints, count.parameters
        ));
    }

    out
}

/// Compact listing of eligible endpoints that take body parameters
pub fn body_report(catalog: &Catalog, config: &AnalysisConfig) -> String {
    let mut endpoints = eligible_sorted(catalog, config);
    endpoints.retain(|e| e.body_parameters().next().is_some());
    endpoints.sort_by_key(|e| e.key());

    let mut out = String::from("# Endpoints With Body Parameters\n\n");
    for endpoint in endpoints {
        let names: Vec<&str> = endpoint.body_parameters().map(|p| p.name.as_str()).collect();
        out.push_str(&format!("### {}\n", endpoint.key()));
        out.push_str(&format!("Body params: {}\n\n", names.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::GapAnalyzer;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"
apis: [
  -{
    path: "/widget/{id}"
    operations: [
      -{
        httpMethod: "POST"
        apiStatus: { value: "PRODUCTION" }
        description: "Create"
        parameters: [
          -{ name: "size", paramType: "body", dataType: "long", required: false }
          -{ name: "label", paramType: "body", dataType: "string", description: "Shown\nname" }
          -{ name: "id", paramType: "path", dataType: "long" }
        ]
      }
    ]
  }
]
"#;

    #[test]
    fn test_body_report_keeps_declaration_order() {
        let catalog = Catalog::from_corpus(SCHEMA);
        let text = body_report(&catalog, &AnalysisConfig::default());
        assert_eq!(
            text,
            "# Endpoints With Body Parameters\n\n### POST /widget/{id}\nBody params: size, label\n\n"
        );
    }

    #[test]
    fn test_catalog_report_sections() {
        let catalog = Catalog::from_corpus(SCHEMA);
        let text = catalog_report(&catalog, &AnalysisConfig::default());
        let expected = "\
## POST /widget/{id}
**Description**: Create

### Path Parameters:
- `id` (long) - Required

### Body Parameters:
- `label` (string) - Required
  Description: Shown name
- `size` (long) - Optional

---
";
        assert!(text.contains(expected), "{text}");
        assert!(text.contains("- Total POST/PUT endpoints: 1\n"));
        assert!(text.contains("- Total body parameters: 2\n"));
    }

    #[test]
    fn test_missing_report_lists_only_gaps() {
        let catalog = Catalog::from_corpus(SCHEMA);
        let report = GapAnalyzer::new(&AnalysisConfig::default())
            .unwrap()
            .analyze(&catalog, SCHEMA, "{ \"label\": x }");
        let text = missing_report(&report);
        assert!(text.contains(
            "## OTHER OPERATIONS\n\n### POST /widget/{id}\n**Missing Parameters:**\n- `size` (long) - Optional\n\n"
        ));
        assert!(!text.contains("`label`"));
        assert!(!text.contains("## BACKUP OPERATIONS"));
        assert!(text.contains("- other: 1 endpoints, 1 parameters\n"));
        assert!(text.contains("No priority endpoint has missing parameters.\n"));
    }
}
