//! Commands that need both corpora: analyze, missing

use super::util::{
    has_flag, load_config, parse_flag_value, parse_output_arg, positional_args, write_output,
};
use apigap::*;
use std::path::{Path, PathBuf};

pub fn cmd_analyze(args: &[String]) -> Result<()> {
    let positional = positional_args(args);
    let [schema_path, impl_path, ..] = positional.as_slice() else {
        return Err(
            "Usage: apigap analyze <schema> <impl> [--config f] [--out-dir d] [--json]".into(),
        );
    };

    let config = load_config(args)?;
    let out_dir = parse_flag_value(args, "--out-dir", "-d")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if has_flag(args, "--json") {
        let schema = read_corpus(Path::new(schema_path))?;
        let implementation = read_corpus(Path::new(impl_path))?;
        let analysis = analyze(&schema, &implementation, &config)?;
        println!("{}", serde_json::to_string_pretty(&analysis.gaps)?);
        return Ok(());
    }

    let written = run(
        Path::new(schema_path),
        Path::new(impl_path),
        &out_dir,
        &config,
    )?;
    for path in written {
        println!("✓ {}", path.display());
    }
    Ok(())
}

pub fn cmd_missing(args: &[String]) -> Result<()> {
    let positional = positional_args(args);
    let [schema_path, impl_path, ..] = positional.as_slice() else {
        return Err(
            "Usage: apigap missing <schema> <impl> [--config f] [--output f] [--json]".into(),
        );
    };

    let config = load_config(args)?;
    let output = parse_output_arg(args);
    let schema = read_corpus(Path::new(schema_path))?;
    let implementation = read_corpus(Path::new(impl_path))?;

    let analysis = analyze(&schema, &implementation, &config)?;

    if has_flag(args, "--json") {
        let json = serde_json::to_string_pretty(&analysis.gaps)?;
        write_output(&output, &json)?;
    } else {
        write_output(&output, &missing_report(&analysis.gaps))?;
    }
    Ok(())
}
