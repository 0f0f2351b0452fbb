//! Windows command executor configuration
//!
//! Provides a whitelisted command executor for resolving the current user's
//! security identifier.

use regcheck_base::commands::SystemCommandExecutor;
use std::time::Duration;

/// Create command executor configured for identity lookups
///
/// Whitelist includes:
/// - whoami: Current user and SID
/// - wmic: Account database fallback
pub fn create_windows_command_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(Duration::from_secs(5));

    executor.allow_commands(&[
        "whoami", // Current user SID
        "wmic",   // Account lookup
    ]);

    // whoami and wmic fail without these on a cleared environment
    for name in ["SystemRoot", "USERNAME", "USERPROFILE"] {
        executor.preserve_env(name);
    }

    executor
}
