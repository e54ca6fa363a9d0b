//! Reference resolution against the implementation corpus
//!
//! The implementation is opaque text. A parameter counts as referenced when
//! its bare name appears anywhere in the corpus wrapped in single or double
//! quotes. This is a lower bound on "possibly used": a quoted name in an
//! unrelated context still counts. Reports downstream are calibrated against
//! exactly this heuristic.

use crate::catalog::{Endpoint, EndpointKey, Location, Parameter};
use serde::Serialize;

/// Whether `corpus` contains `'name'` or `"name"`
pub fn is_referenced(name: &str, corpus: &str) -> bool {
    corpus.contains(&format!("'{name}'")) || corpus.contains(&format!("\"{name}\""))
}

/// Resolution of one parameter
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceResult<'e> {
    pub endpoint: EndpointKey,
    pub parameter: &'e Parameter,
    pub referenced: bool,
}

/// Resolves catalog parameters against one implementation corpus
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'c> {
    corpus: &'c str,
}

impl<'c> ReferenceResolver<'c> {
    pub fn new(corpus: &'c str) -> Self {
        Self { corpus }
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        is_referenced(name, self.corpus)
    }

    /// Resolve every body parameter of `endpoint`, in declaration order
    pub fn resolve<'e>(&self, endpoint: &'e Endpoint) -> Vec<ReferenceResult<'e>> {
        self.resolve_in(endpoint, Location::Body)
    }

    pub fn resolve_in<'e>(
        &self,
        endpoint: &'e Endpoint,
        location: Location,
    ) -> Vec<ReferenceResult<'e>> {
        let key = endpoint.key();
        endpoint
            .parameters_in(location)
            .map(|parameter| ReferenceResult {
                endpoint: key.clone(),
                parameter,
                referenced: self.is_referenced(&parameter.name),
            })
            .collect()
    }

    /// Whether the implementation mentions the endpoint's path
    ///
    /// Accepts the template itself, or the template with its
    /// `{serviceName}/` segment removed and remaining braces stripped.
    pub fn endpoint_referenced(&self, endpoint: &Endpoint) -> bool {
        let path = endpoint.path.as_str();
        if self.corpus.contains(path) {
            return true;
        }
        let short = path.replace("{serviceName}/", "").replace(['{', '}'], "");
        !short.is_empty() && self.corpus.contains(&short)
    }
}
