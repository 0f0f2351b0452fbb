//! Current user security identifier
//!
//! Asks `whoami /user` first and falls back to `wmic useraccount` for the
//! account named by `USERNAME`. Only domain or local account SIDs
//! (`S-1-5-21-...`) are accepted.

use regcheck_base::commands::{CommandError, SystemCommandExecutor};
use regcheck_base::logging::codes;
use regcheck_base::{log_debug, log_error, log_success};
use regex::Regex;

const ACCOUNT_SID_PATTERN: &str = r"\bS-1-5-21(?:-\d+)+\b";
const WMIC_SID_PATTERN: &str = r"(?im)^\s*sid=(S-1-5-21(?:-\d+)+)\s*$";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Identity command failed: {0}")]
    Command(#[from] CommandError),

    #[error("Invalid SID pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Could not resolve SID for user '{username}'")]
    NotResolved { username: String },
}

/// First account SID in `whoami /user` output
pub fn parse_whoami_sid(output: &str) -> Result<Option<String>, IdentityError> {
    let pattern = Regex::new(ACCOUNT_SID_PATTERN)?;
    Ok(pattern.find(output).map(|m| m.as_str().to_string()))
}

/// `SID=` line of `wmic ... get sid /value` output
pub fn parse_wmic_sid(output: &str) -> Result<Option<String>, IdentityError> {
    let pattern = Regex::new(WMIC_SID_PATTERN)?;
    Ok(pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}

fn current_username() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_default()
}

pub fn resolve_current_user_sid(
    executor: &SystemCommandExecutor,
) -> Result<String, IdentityError> {
    let username = current_username();

    match lookup(executor, &username) {
        Ok(Some(sid)) => {
            log_success!(
                codes::success::SID_RESOLVED,
                "Resolved current user SID",
                "user" => &username,
                "sid" => &sid
            );
            Ok(sid)
        }
        Ok(None) => {
            log_error!(
                codes::identity::SID_RESOLUTION_FAILED,
                "No account SID found",
                "user" => &username
            );
            Err(IdentityError::NotResolved { username })
        }
        Err(e) => {
            log_error!(
                codes::identity::SID_RESOLUTION_FAILED,
                "SID lookup failed",
                "user" => &username,
                "error" => &e
            );
            Err(e)
        }
    }
}

fn lookup(
    executor: &SystemCommandExecutor,
    username: &str,
) -> Result<Option<String>, IdentityError> {
    match executor.execute("whoami", &["/user"], None) {
        Ok(output) if output.success() => {
            if let Some(sid) = parse_whoami_sid(&output.stdout)? {
                return Ok(Some(sid));
            }
        }
        Ok(output) => {
            log_debug!("whoami returned non-zero", "exit_code" => output.exit_code);
        }
        Err(e) => {
            log_debug!("whoami unavailable", "error" => &e);
        }
    }

    // The name is embedded in a WQL string literal
    if username.is_empty() || username.contains('"') {
        return Ok(None);
    }

    let filter = format!("name=\"{}\"", username);
    let output = executor.execute(
        "wmic",
        &["useraccount", "where", &filter, "get", "sid", "/value"],
        None,
    )?;
    if !output.success() {
        return Ok(None);
    }
    parse_wmic_sid(&output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const WHOAMI_OUTPUT: &str = "\r\nUSER INFORMATION\r\n----------------\r\n\r\n\
        User Name      SID\r\n\
        ============== ==============================================\r\n\
        desktop\\alice S-1-5-21-1004336348-1177238915-682003330-1001\r\n";

    #[test]
    fn test_parse_whoami() {
        assert_eq!(
            parse_whoami_sid(WHOAMI_OUTPUT).unwrap().as_deref(),
            Some("S-1-5-21-1004336348-1177238915-682003330-1001")
        );
        assert_eq!(
            parse_whoami_sid("nt authority\\system S-1-5-18").unwrap(),
            None
        );
        assert_eq!(parse_whoami_sid("").unwrap(), None);
    }

    #[test]
    fn test_parse_wmic() {
        let output = "\r\r\n\r\r\nSID=S-1-5-21-3623811015-3361044348-30300820-1013\r\r\n\r\r\n";
        assert_eq!(
            parse_wmic_sid(output).unwrap().as_deref(),
            Some("S-1-5-21-3623811015-3361044348-30300820-1013")
        );
        assert_eq!(parse_wmic_sid("No Instance(s) Available.\r\n").unwrap(), None);
        assert_eq!(parse_wmic_sid("SID=S-1-5-18\r\n").unwrap(), None);
    }

    #[test]
    fn test_blocked_lookups_surface_as_errors() {
        let executor = SystemCommandExecutor::new();
        assert_matches!(
            lookup(&executor, "alice"),
            Err(IdentityError::Command(CommandError::SecurityViolation { .. }))
        );
    }

    #[test]
    fn test_unsafe_username_skips_fallback() {
        let executor = SystemCommandExecutor::new();
        assert_matches!(lookup(&executor, "a\"b"), Ok(None));
        assert_matches!(lookup(&executor, ""), Ok(None));
    }
}
