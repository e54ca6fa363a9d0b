//! CLI utility helpers

use apigap::{AnalysisConfig, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Flags that consume the following argument
const VALUE_FLAGS: &[&str] = &["--config", "-c", "--output", "-o", "--out-dir", "-d"];

/// Value following `long` or `short`, if given
pub fn parse_flag_value(args: &[String], long: &str, short: &str) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if arg == long || arg == short {
            if let Some(value) = args.get(i + 1) {
                return Some(value.clone());
            }
        }
    }
    None
}

/// Parse --output argument to determine output file path
pub fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    parse_flag_value(args, "--output", "-o").map(PathBuf::from)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are neither flags nor flag values
pub fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with('-') {
            positional.push(arg.as_str());
        }
    }
    positional
}

/// Load --config if given, else the defaults
pub fn load_config(args: &[String]) -> Result<AnalysisConfig> {
    match parse_flag_value(args, "--config", "-c") {
        Some(path) => AnalysisConfig::load(Path::new(&path)),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Write content to file or stdout
pub fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content).map_err(Error::Io)?;
            eprintln!("Written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_args_skip_flag_values() {
        let a = args(&["api.json", "--config", "c.yaml", "impl.ts", "--json"]);
        assert_eq!(positional_args(&a), vec!["api.json", "impl.ts"]);
    }

    #[test]
    fn test_parse_flag_value() {
        let a = args(&["x", "-o", "out.txt"]);
        assert_eq!(parse_output_arg(&a), Some(PathBuf::from("out.txt")));
        assert_eq!(parse_flag_value(&a, "--config", "-c"), None);
        assert!(has_flag(&args(&["--json"]), "--json"));
    }
}
