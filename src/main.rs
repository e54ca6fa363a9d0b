//! apigap CLI - Command-line interface
//!
//! Commands:
//!   analyze  - Write the catalog, missing and body reports
//!   missing  - Print the missing body parameters report
//!   catalog  - Print the parameter catalog
//!   body     - Print the body parameter listing
//!   config   - Check or describe a configuration file

mod cli;

use apigap::VERSION;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "analyze" => cli::cmd_analyze(&args[2..]),
        "missing" => cli::cmd_missing(&args[2..]),
        "catalog" => cli::cmd_catalog(&args[2..]),
        "body" => cli::cmd_body(&args[2..]),
        "config" => cli::cmd_config(&args[2..]),
        "schema" => cli::cmd_schema(),
        "version" | "--version" | "-v" => {
            println!("apigap {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
apigap - API parameter gap analysis

USAGE:
    apigap <COMMAND> [OPTIONS]

COMMANDS:
    analyze <schema> <impl>          Write catalog, missing and body reports
    missing <schema> <impl>          Print the missing body parameters report
    catalog <schema>                 Print the parameter catalog
    body <schema>                    Print endpoints with their body parameters
    config check <file>              Validate a configuration file
    schema                           Print JSON schema of the configuration
    version                          Print version

OPTIONS:
    --config <file>                   Configuration file (YAML)
    --out-dir <dir>                   Report directory for analyze (default: .)
    --output <file>                   Output file (default: stdout)
    --json                            JSON output (analyze, missing)

ENVIRONMENT:
    RUST_LOG                          Log filter (default: info)

EXAMPLES:
    apigap analyze dedicatedcloud.json nodes/OvhPrivateCloud/OvhPrivateCloud.node.ts
    apigap missing api.json client.ts --config apigap.yaml --output missing.txt
    apigap body api.json
"#
    );
}
