//! Config and schema CLI commands

use apigap::*;
use std::path::Path;

pub fn cmd_config(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err("Usage: apigap config <check|schema> [file]".into());
    }

    match args[0].as_str() {
        "check" => {
            let path = args
                .get(1)
                .ok_or("Usage: apigap config check <file>")?;
            let config = AnalysisConfig::load(Path::new(path))?;
            println!("✓ Configuration is valid");
            println!("  Methods: {}", config.methods.join(", "));
            println!("  Production tag: {}", config.production_tag);
            println!(
                "  Categories: {}",
                config.classifier()?.categories().join(", ")
            );
            println!("  Priority endpoints: {}", config.priority_endpoints.len());
            Ok(())
        }
        "schema" => cmd_schema(),
        cmd => Err(format!(
            "Unknown config subcommand: {}. Use 'check' or 'schema'.",
            cmd
        )
        .into()),
    }
}

pub fn cmd_schema() -> Result<()> {
    let schema = schemars::schema_for!(AnalysisConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
