//! Whitelisted command execution with timeout and sanitized environment
//!
//! Used for host identity lookups (`whoami`, `wmic`). Programs must be
//! whitelisted by name before they can run; the child sees only a restricted
//! search path and an explicit set of preserved variables.

use crate::logging::codes;
use crate::{log_debug, log_error};
use std::collections::{BTreeSet, HashSet};
use std::env;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[cfg(windows)]
fn default_search_path() -> String {
    let root = env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
    format!("{root}\\System32;{root}\\System32\\Wbem")
}

#[cfg(not(windows))]
fn default_search_path() -> String {
    "/usr/bin:/bin:/usr/sbin:/sbin".to_string()
}

#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    default_timeout: Duration,
    allowed_commands: HashSet<String>,
    search_path: String,
    preserved_env: BTreeSet<String>,
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCommandExecutor {
    /// Empty whitelist, 5 second timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            allowed_commands: HashSet::new(),
            search_path: default_search_path(),
            preserved_env: BTreeSet::new(),
        }
    }

    pub fn allow_command(&mut self, command: impl Into<String>) {
        self.allowed_commands.insert(command.into());
    }

    pub fn allow_commands(&mut self, commands: &[&str]) {
        for cmd in commands {
            self.allowed_commands.insert(cmd.to_string());
        }
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowed_commands.contains(command)
    }

    /// Pass an environment variable through to children when it is set
    pub fn preserve_env(&mut self, name: impl Into<String>) {
        self.preserved_env.insert(name.into());
    }

    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run a whitelisted program and capture its output
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            log_error!(
                codes::identity::COMMAND_BLOCKED,
                "Blocked command outside whitelist",
                "program" => program
            );
            return Err(CommandError::SecurityViolation {
                reason: format!("Command '{}' not in whitelist", program),
            });
        }

        let timeout_duration = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        log_debug!("Executing command", "program" => program, "args" => args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .env("PATH", &self.search_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for name in &self.preserved_env {
            if let Ok(value) = env::var(name) {
                cmd.env(name, value);
            }
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                program: program.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                program: program.to_string(),
            },
            _ => CommandError::ExecutionFailed {
                program: program.to_string(),
                reason: e.to_string(),
            },
        })?;

        let status = wait_timeout::ChildExt::wait_timeout(&mut child, timeout_duration).map_err(
            |e| CommandError::ExecutionFailed {
                program: program.to_string(),
                reason: e.to_string(),
            },
        )?;

        let Some(status) = status else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::Timeout {
                program: program.to_string(),
                timeout_ms: timeout_duration.as_millis() as u64,
            });
        };

        let output = child
            .wait_with_output()
            .map_err(|e| CommandError::ExecutionFailed {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("'{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_whitelist_management() {
        let mut executor = SystemCommandExecutor::new();
        assert!(!executor.is_allowed("whoami"));

        executor.allow_command("whoami");
        assert!(executor.is_allowed("whoami"));
        assert!(!executor.is_allowed("wmic"));

        executor.allow_commands(&["wmic", "reg"]);
        assert!(executor.is_allowed("wmic"));
        assert!(executor.is_allowed("reg"));
    }

    #[test]
    fn test_unlisted_command_is_refused() {
        let executor = SystemCommandExecutor::new();
        assert_matches!(
            executor.execute("reg", &["delete", "HKLM\\Software"], None),
            Err(CommandError::SecurityViolation { .. })
        );
    }

    #[test]
    fn test_missing_program() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("regcheck-no-such-program");
        assert_matches!(
            executor.execute("regcheck-no-such-program", &[], None),
            Err(CommandError::ProgramNotFound { .. })
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_environment_is_sanitized() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("sh");
        executor.preserve_env("HOME");

        let output = executor
            .execute("sh", &["-c", "echo \"$PATH|${REGCHECK_TEST_SECRET:-unset}\""], None)
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "/usr/bin:/bin:/usr/sbin:/sbin|unset");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("sleep");

        assert_matches!(
            executor.execute("sleep", &["5"], Some(Duration::from_millis(100))),
            Err(CommandError::Timeout { timeout_ms: 100, .. })
        );
    }
}
