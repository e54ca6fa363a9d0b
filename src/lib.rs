// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # apigap — API parameter gap analysis
//!
//! Catalogs the operations of an HTTP API from its schema corpus and finds
//! the body parameters a client implementation never references.
//!
//! ## Core Concept
//!
//! The **schema corpus** is a JSON-superset dump of an API: path records
//! holding operations, operations holding parameters, with bare keys and
//! `-{` record markers. The **implementation corpus** is any text, usually
//! the client's source. apigap:
//!
//! - **Scans** the schema with a depth-aware block scanner
//! - **Catalogs** endpoints `(method, path)` and their parameters
//! - **Resolves** each body parameter against the implementation by a
//!   quoted-name substring check
//! - **Classifies** endpoints with ordered path rules
//! - **Reports** the gaps as deterministic text documents
//!
//! ## Quick Start
//!
//! ```rust
//! use apigap::{analyze, missing_report, AnalysisConfig};
//!
//! let schema = r#"
//! apis: [
//!   -{
//!     path: "/widget/{id}"
//!     operations: [
//!       -{
//!         httpMethod: "POST"
//!         apiStatus: { value: "PRODUCTION" }
//!         parameters: [
//!           -{ name: "label", paramType: "body", dataType: "string" }
//!           -{ name: "size", paramType: "body", dataType: "long", required: false }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! "#;
//! let implementation = r#"body: { "label": label }"#;
//!
//! let config = AnalysisConfig::default();
//! let analysis = analyze(schema, implementation, &config)?;
//! assert_eq!(analysis.gaps.summary.missing_parameters, 1);
//!
//! let text = missing_report(&analysis.gaps);
//! assert!(text.contains("- `size` (long) - Optional"));
//! # Ok::<(), apigap::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  SCHEMA TEXT                                                │
//! │       │                                                     │
//! │       └──► BlockScanner ──► CatalogBuilder ──► Catalog      │
//! │                                                  │          │
//! │  IMPLEMENTATION TEXT ──► ReferenceResolver ──┐   │          │
//! │                                              ▼   ▼          │
//! │                    Classifier ──────────► GapAnalyzer       │
//! │                                              │              │
//! │                                              ▼              │
//! │                 catalog / missing / body reports            │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// Core modules
pub mod catalog;
pub mod config;
pub mod error;
pub mod scan;
pub mod util;

// Operations
pub mod classify;
pub mod gap;
pub mod pipeline;
pub mod report;
pub mod resolve;

// Re-exports
pub use catalog::{
    BuildStats, Catalog, CatalogBuilder, Endpoint, EndpointKey, Location, Parameter,
};
pub use classify::{CategoryRule, Classifier, PathPredicate};
pub use config::{AnalysisConfig, OutputConfig};
pub use error::{Error, Result};
pub use gap::{CategoryCount, EndpointGap, GapAnalyzer, GapReport, GapSummary};
pub use pipeline::{analyze, read_corpus, run, Analysis, Reports};
pub use report::{body_report, catalog_report, missing_report};
pub use resolve::{is_referenced, ReferenceResolver, ReferenceResult};
pub use scan::{next_block, Block, BlockKind, BlockScanner, FieldValue, Record};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
