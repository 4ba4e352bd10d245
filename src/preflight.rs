//! Pre-flight Check
//!
//! Verifies the Claude CLI can be started before the bot goes live, so a
//! missing install shows up in the startup log instead of on the first prompt.

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const INSTALL_HINT: &str = "npm install -g @anthropic-ai/claude-code";

/// Result of the CLI check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightResult {
    Ready { version: String },
    Missing { binary: String, reason: String },
}

impl PreflightResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Format as a log / chat friendly line
    pub fn describe(&self) -> String {
        match self {
            Self::Ready { version } => format!("Claude CLI available: {}", version),
            Self::Missing { binary, reason } => format!(
                "Claude CLI not usable ({}): {}. Install with: {}",
                binary, reason, INSTALL_HINT
            ),
        }
    }
}

/// Pre-flight checker for the configured CLI binary
pub struct PreflightChecker {
    binary: String,
    timeout: Duration,
}

impl PreflightChecker {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Run `<binary> --version`
    pub async fn check_claude_cli(&self) -> PreflightResult {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let missing = |reason: String| PreflightResult::Missing {
            binary: self.binary.clone(),
            reason,
        };

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                debug!("{} --version: {}", self.binary, version);
                PreflightResult::Ready { version }
            }
            Ok(Ok(output)) => missing(format!("exited with {}", output.status)),
            Ok(Err(e)) => missing(e.to_string()),
            Err(_) => missing(format!("no answer within {:?}", self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary() {
        let checker = PreflightChecker::new("/nonexistent/claude");
        let result = checker.check_claude_cli().await;
        assert!(!result.is_ready());
        assert!(result.describe().contains(INSTALL_HINT));
    }

    #[test]
    fn test_ready_description() {
        let result = PreflightResult::Ready {
            version: "1.0.0 (Claude Code)".into(),
        };
        assert!(result.is_ready());
        assert_eq!(result.describe(), "Claude CLI available: 1.0.0 (Claude Code)");
    }
}
