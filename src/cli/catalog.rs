//! Commands that need only the schema corpus: catalog, body

use super::util::{load_config, parse_output_arg, positional_args, write_output};
use apigap::*;
use std::path::Path;

fn load_catalog(args: &[String], usage: &str) -> Result<(Catalog, AnalysisConfig)> {
    let schema_path = positional_args(args)
        .first()
        .copied()
        .ok_or_else(|| Error::Other(usage.to_string()))?;
    let config = load_config(args)?;
    let schema = read_corpus(Path::new(schema_path))?;
    let catalog = CatalogBuilder::new(config.environment_fields.clone()).build(&schema);
    Ok((catalog, config))
}

pub fn cmd_catalog(args: &[String]) -> Result<()> {
    let (catalog, config) =
        load_catalog(args, "Usage: apigap catalog <schema> [--config f] [--output f]")?;
    write_output(&parse_output_arg(args), &catalog_report(&catalog, &config))
}

pub fn cmd_body(args: &[String]) -> Result<()> {
    let (catalog, config) =
        load_catalog(args, "Usage: apigap body <schema> [--config f] [--output f]")?;
    write_output(&parse_output_arg(args), &body_report(&catalog, &config))
}
