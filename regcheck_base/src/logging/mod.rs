//! Global logging for the registry compliance checker
//!
//! Thread-safe global logging service with per-thread rule context and a
//! small macro interface. Events emitted before initialization are dropped.

pub mod codes;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::CheckerPreferences;
use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

#[cfg(feature = "logging")]
pub use service::FacadeLogger;

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static RULE_CONTEXT: RefCell<Option<RuleContext>> = const { RefCell::new(None) };
}

/// Rule being evaluated on the current thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContext {
    pub rule_name: String,
    pub rule_index: usize,
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from preferences
pub fn init_global_logging(preferences: &CheckerPreferences) -> Result<(), String> {
    let service = Arc::new(LoggingService::from_preferences(preferences));

    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether events at `level` would currently be emitted
pub fn is_enabled(level: LogLevel) -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(level))
        .unwrap_or(false)
}

// ============================================================================
// RULE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_rule_context(rule_name: &str, rule_index: usize) {
    RULE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(RuleContext {
            rule_name: rule_name.to_string(),
            rule_index,
        });
    });
}

pub fn clear_rule_context() {
    RULE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Execute function with rule context set for the current thread
pub fn with_rule_context<F, R>(rule_name: &str, rule_index: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_rule_context();
    set_rule_context(rule_name, rule_index);
    let result = f();
    RULE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_rule_context() -> Option<RuleContext> {
    RULE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach_rule_context(event: LogEvent) -> LogEvent {
    match get_current_rule_context() {
        Some(rule) => event
            .with_context("rule", &rule.rule_name)
            .with_context("rule_index", &rule.rule_index.to_string()),
        None => event,
    }
}

/// Attach context pairs and the current rule, then emit
pub fn emit(event: LogEvent, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    if !logger.should_log(event.level) {
        return;
    }

    let mut event = event;
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_rule_context(event));
}

/// Error logging that falls back to stderr when uninitialized
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_rule_context(LogEvent::error(code, message)));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}
