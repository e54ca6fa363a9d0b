//! CLI command implementations
//!
//! - `analyze`: Commands that need both corpora (analyze, missing)
//! - `catalog`: Commands that need only the schema corpus (catalog, body)
//! - `config`: Configuration commands (config check, schema)
//! - `util`: Shared argument and output helpers

pub mod analyze;
pub mod catalog;
pub mod config;
pub mod util;

pub use analyze::{cmd_analyze, cmd_missing};
pub use catalog::{cmd_body, cmd_catalog};
pub use config::{cmd_config, cmd_schema};
