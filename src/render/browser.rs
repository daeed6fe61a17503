//! agent-browser CLI session wrapper
//!
//! All rendering goes through the `agent-browser` binary, one short-lived
//! invocation per browser action, addressed by a shared session name. Every
//! invocation gets a fixed timeout; output is the trimmed stdout.

use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Install instructions shown when agent-browser is missing.
pub const AGENT_BROWSER_INSTALL_HINT: &str = "  npm:      npm install -g agent-browser";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle on a named agent-browser session.
pub struct BrowserSession {
    session: String,
}

impl BrowserSession {
    /// Create a handle, verifying the binary is on PATH first.
    pub fn new(session: &str) -> Result<Self> {
        if which::which("agent-browser").is_err() {
            return Err(Error::ToolUnavailable {
                tool: "agent-browser",
                hint: AGENT_BROWSER_INSTALL_HINT,
            });
        }
        Ok(Self {
            session: session.to_string(),
        })
    }

    /// Run one agent-browser command for this session.
    async fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(session = %self.session, ?args, "agent-browser");

        let output = tokio::time::timeout(
            COMMAND_TIMEOUT,
            Command::new("agent-browser")
                .arg("--session")
                .arg(&self.session)
                .args(args)
                .output(),
        )
        .await
        .map_err(|_| Error::ToolFailed {
            tool: "agent-browser",
            reason: format!(
                "{} timed out after {}s",
                args.first().copied().unwrap_or("command"),
                COMMAND_TIMEOUT.as_secs()
            ),
        })?
        .map_err(|e| Error::ToolFailed {
            tool: "agent-browser",
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: "agent-browser",
                reason: format!(
                    "{} failed: {}",
                    args.first().copied().unwrap_or("command"),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Navigate the session to a URL.
    pub async fn open(&self, url: &str) -> Result<()> {
        self.run(&["open", url]).await.map(|_| ())
    }

    /// Set the viewport size.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        self.run(&["set", "viewport", &width.to_string(), &height.to_string()])
            .await
            .map(|_| ())
    }

    /// Give the page time to fetch CDN scripts and settle its layout.
    pub async fn settle(&self, millis: u64) -> Result<()> {
        let script = format!("new Promise(r => setTimeout(r, {millis}))");
        self.run(&["eval", &script]).await.map(|_| ())
    }

    /// Capture a screenshot to the given path.
    pub async fn screenshot(&self, path: &Path, full_page: bool) -> Result<()> {
        let path = path.to_string_lossy();
        let mut args = vec!["screenshot", path.as_ref()];
        if full_page {
            args.push("--full");
        }
        self.run(&args).await.map(|_| ())
    }

    /// Close the session. Failures are swallowed so cleanup can run
    /// unconditionally after an error.
    pub async fn close_quietly(&self) {
        if let Err(e) = self.run(&["close"]).await {
            tracing::debug!(error = %e, "session close failed");
        }
    }
}
