//! Rule ingestion from JSON values, strings, files and directories

pub mod errors;
pub mod files;
pub mod parser;

pub use errors::IngestError;
pub use files::{discover_rule_files, load_rule_file, load_rules};
pub use parser::{parse_rules_str, parse_rules_value};
