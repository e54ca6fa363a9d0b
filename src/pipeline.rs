//! End-to-end analysis pipeline
//!
//! Both corpora are read in full before any parsing starts, and all three
//! reports are rendered in memory before any of them is written. An
//! unreadable input therefore aborts the run with no partial output.

use crate::catalog::{Catalog, CatalogBuilder};
use crate::config::{AnalysisConfig, OutputConfig};
use crate::error::{Error, Result};
use crate::gap::{GapAnalyzer, GapReport};
use crate::report::{body_report, catalog_report, missing_report};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Read a corpus file in full
pub fn read_corpus(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Catalog plus gap analysis of one run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub catalog: Catalog,
    pub gaps: GapReport,
}

/// Build the catalog from `schema` and analyze it against `implementation`
pub fn analyze(schema: &str, implementation: &str, config: &AnalysisConfig) -> Result<Analysis> {
    let analyzer = GapAnalyzer::new(config)?;
    let catalog = CatalogBuilder::new(config.environment_fields.clone()).build(schema);
    let gaps = analyzer.analyze(&catalog, schema, implementation);
    Ok(Analysis { catalog, gaps })
}

impl Analysis {
    pub fn render(&self, config: &AnalysisConfig) -> Reports {
        Reports {
            catalog: catalog_report(&self.catalog, config),
            missing: missing_report(&self.gaps),
            body: body_report(&self.catalog, config),
        }
    }
}

/// The three rendered reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reports {
    pub catalog: String,
    pub missing: String,
    pub body: String,
}

impl Reports {
    /// Write every report into `dir`, returning the written paths
    pub fn write_to(&self, dir: &Path, outputs: &OutputConfig) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for (name, content) in [
            (&outputs.catalog, &self.catalog),
            (&outputs.missing, &self.missing),
            (&outputs.body, &self.body),
        ] {
            let path = dir.join(name);
            fs::write(&path, content)?;
            info!(path = %path.display(), "report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Read both corpora, analyze, and write the reports into `out_dir`
pub fn run(
    schema_path: &Path,
    implementation_path: &Path,
    out_dir: &Path,
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>> {
    let schema = read_corpus(schema_path)?;
    let implementation = read_corpus(implementation_path)?;
    info!(
        schema = %schema_path.display(),
        implementation = %implementation_path.display(),
        "corpora loaded"
    );

    let analysis = analyze(&schema, &implementation, config)?;
    analysis.render(config).write_to(out_dir, &config.outputs)
}
