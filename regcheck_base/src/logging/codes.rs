//! Log codes and their classification metadata
//!
//! Every error, warning and success event carries a [`Code`]. The metadata
//! table below is the single place where a code's category, severity and
//! recommended action are defined.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code attached to a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

/// Severity of a coded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Metadata for one code
#[derive(Debug, Clone)]
pub struct CodeMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const CONFIG_FILE_UNREADABLE: Code = Code::new("E010");
    pub const CONFIG_PARSE_ERROR: Code = Code::new("E011");
    pub const CONFIG_LIMIT_VIOLATION: Code = Code::new("E012");
}

/// Rule ingestion codes
pub mod ingest {
    use super::Code;

    pub const RULE_FILE_NOT_FOUND: Code = Code::new("E020");
    pub const RULE_FILE_TOO_LARGE: Code = Code::new("E021");
    pub const RULE_SET_NOT_A_SEQUENCE: Code = Code::new("E022");
    pub const RULE_JSON_INVALID: Code = Code::new("E023");
    pub const RULE_LIMIT_EXCEEDED: Code = Code::new("E024");
    pub const MALFORMED_RULE_ENTRY: Code = Code::new("W025");
}

/// Registry access codes
pub mod registry {
    use super::Code;

    pub const VALUE_NOT_FOUND: Code = Code::new("E030");
    pub const ACCESS_DENIED: Code = Code::new("E031");
    pub const PLATFORM_READ_FAILURE: Code = Code::new("E032");
    pub const ROOT_KEY_DEFAULTED: Code = Code::new("W033");
    pub const KEY_NOT_PRESENT: Code = Code::new("W034");
}

/// Rule evaluation codes
pub mod evaluation {
    use super::Code;

    pub const EVALUATOR_PANIC: Code = Code::new("E040");
    pub const RULE_NOT_EVALUATED: Code = Code::new("W041");
    pub const RULE_NON_COMPLIANT: Code = Code::new("E042");
}

/// Host identity codes
pub mod identity {
    use super::Code;

    pub const SID_RESOLUTION_FAILED: Code = Code::new("E050");
    pub const COMMAND_BLOCKED: Code = Code::new("E051");
}

/// Reporting codes
pub mod reporting {
    use super::Code;

    pub const REPORT_WRITE_FAILED: Code = Code::new("E060");
}

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const CONFIG_LOADED: Code = Code::new("I010");
    pub const RULES_LOADED: Code = Code::new("I020");
    pub const BATCH_EVALUATION_COMPLETE: Code = Code::new("I040");
    pub const RULE_COMPLIANT: Code = Code::new("I041");
    pub const SID_RESOLVED: Code = Code::new("I050");
    pub const REPORT_WRITTEN: Code = Code::new("I060");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

type Row = (
    &'static str,
    &'static str,
    Severity,
    bool,
    &'static str,
    &'static str,
);

const CODE_TABLE: &[Row] = &[
    ("ERR001", "System", Severity::Critical, false,
        "Critical internal system error",
        "File a bug report with the log output"),
    ("ERR002", "System", Severity::Critical, false,
        "Subsystem failed to initialize",
        "Check configuration and restart the checker"),
    ("E010", "Configuration", Severity::High, true,
        "Configuration file could not be read",
        "Verify the configuration path and its permissions"),
    ("E011", "Configuration", Severity::High, true,
        "Configuration file is not valid TOML",
        "Fix the syntax reported in the error context"),
    ("E012", "Configuration", Severity::High, true,
        "Configuration value outside permitted limits",
        "Lower the value to within the documented limit"),
    ("E020", "Ingestion", Severity::High, true,
        "Rule file or directory not found",
        "Verify the rule path"),
    ("E021", "Ingestion", Severity::High, true,
        "Rule file exceeds the maximum permitted size",
        "Split the rule set into smaller files"),
    ("E022", "Ingestion", Severity::High, true,
        "Rule set is not a JSON array",
        "Supply rules as a JSON array of rule objects"),
    ("E023", "Ingestion", Severity::High, true,
        "Rule set is not valid JSON",
        "Re-run rule extraction or fix the JSON by hand"),
    ("E024", "Ingestion", Severity::High, true,
        "Rule set exceeds the maximum number of rules",
        "Split the rule set into smaller batches"),
    ("W025", "Ingestion", Severity::Low, true,
        "Rule entry is malformed and will not be evaluated",
        "Review the extracted rule for missing or mistyped fields"),
    ("E030", "Registry", Severity::Medium, true,
        "Registry key or value does not exist",
        "Create the value or confirm the rule targets the right hive"),
    ("E031", "Registry", Severity::Medium, true,
        "Access to the registry key was denied",
        "Run the checker with sufficient privileges"),
    ("E032", "Registry", Severity::High, true,
        "Registry read failed at the platform level",
        "Inspect the platform error in the event context"),
    ("W033", "Registry", Severity::Low, true,
        "Registry path has no recognized root key; HKEY_LOCAL_MACHINE assumed",
        "Prefix the rule's registry path with its hive"),
    ("W034", "Registry", Severity::Low, true,
        "Registry key is not present",
        "None; the value read is still attempted"),
    ("E040", "Evaluation", Severity::Critical, true,
        "Registry backend panicked while evaluating a rule",
        "File a bug report for the registry backend"),
    ("W041", "Evaluation", Severity::Low, true,
        "Rule was not evaluated",
        "Complete the rule's registry fields or check type"),
    ("E042", "Evaluation", Severity::Medium, true,
        "Rule is not compliant",
        "Apply the expected registry value"),
    ("E050", "Identity", Severity::Medium, true,
        "Current user SID could not be resolved",
        "Check that whoami or wmic is available"),
    ("E051", "Identity", Severity::High, false,
        "Command outside the execution whitelist was refused",
        "Only whitelisted identity commands may run"),
    ("E060", "Reporting", Severity::High, true,
        "Report could not be written",
        "Verify the output path and its permissions"),
    ("I001", "Success", Severity::Low, true, "System initialized", ""),
    ("I010", "Success", Severity::Low, true, "Configuration loaded", ""),
    ("I020", "Success", Severity::Low, true, "Rules loaded", ""),
    ("I040", "Success", Severity::Low, true, "Batch evaluation complete", ""),
    ("I041", "Success", Severity::Low, true, "Rule is compliant", ""),
    ("I050", "Success", Severity::Low, true, "Current user SID resolved", ""),
    ("I060", "Success", Severity::Low, true, "Report written", ""),
];

static CODE_REGISTRY: OnceLock<HashMap<&'static str, CodeMetadata>> = OnceLock::new();

fn get_code_registry() -> &'static HashMap<&'static str, CodeMetadata> {
    CODE_REGISTRY.get_or_init(|| {
        CODE_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, description, recommended_action)| {
                    (
                        code,
                        CodeMetadata {
                            code,
                            category,
                            severity,
                            recoverable,
                            description,
                            recommended_action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_metadata(code: &str) -> Option<&'static CodeMetadata> {
    get_code_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn get_description(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown code")
}

pub fn get_action(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .filter(|action| !action.is_empty())
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
