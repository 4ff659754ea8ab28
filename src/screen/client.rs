use std::collections::BTreeSet;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::parser;
use super::SessionEntry;
use crate::config::ScreenConfig;
use crate::error::{Result, ScreenError};

/// Executes screen with a set of arguments and returns its stdout
pub trait CommandRunner {
    fn run(&self, args: &[String]) -> Result<String>;
}

/// Runs the real screen binary.
///
/// Exit codes are ignored: `screen -ls` exits non-zero on a perfectly
/// normal listing. Only a failure to spawn is an error.
pub struct ProcessRunner {
    binary: String,
}

impl ProcessRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("screen")
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, args: &[String]) -> Result<String> {
        debug!(binary = %self.binary, ?args, "running screen");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| ScreenError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            debug!(status = ?output.status.code(), ?args, "screen exited non-zero");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Client for interacting with screen via CLI
#[derive(Clone)]
pub struct ScreenClient {
    runner: Arc<dyn CommandRunner + Send + Sync>,
    config: ScreenConfig,
}

impl ScreenClient {
    pub fn new(config: ScreenConfig) -> Self {
        let runner = ProcessRunner::new(config.binary.clone());
        Self::with_runner(Arc::new(runner), config)
    }

    pub fn with_runner(runner: Arc<dyn CommandRunner + Send + Sync>, config: ScreenConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Raw `screen -ls` output
    pub fn list_raw(&self) -> Result<String> {
        self.runner.run(&["-ls".to_string()])
    }

    /// Names of all sessions currently listed
    pub fn list_session_names(&self) -> Result<BTreeSet<String>> {
        Ok(parser::parse_names(&self.list_raw()?))
    }

    /// Every listed session with its id, status and date
    pub fn list_sessions(&self) -> Result<Vec<SessionEntry>> {
        Ok(parser::parse_listing(&self.list_raw()?))
    }

    /// Start a detached session with UTF-8 enabled
    pub fn create_session(&self, name: &str) -> Result<()> {
        self.runner
            .run(&["-Udm".to_string(), name.to_string()])
            .map(drop)
    }

    /// Detach every client from a session
    pub fn detach_session(&self, name: &str) -> Result<()> {
        self.runner.run(&["-d".to_string(), name.to_string()])?;
        self.settle();
        Ok(())
    }

    /// Send one `-X` directive to window 0 of a session.
    ///
    /// `directive` is the screen command and its arguments, one argv item each.
    pub fn send_directive(&self, name: &str, directive: &[&str]) -> Result<()> {
        let mut args: Vec<String> = ["-r", name, "-p", "0", "-X"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.extend(directive.iter().map(|s| s.to_string()));

        debug!(session = name, ?directive, "screen directive");
        self.runner.run(&args)?;
        self.settle();
        Ok(())
    }

    fn settle(&self) {
        let delay = self.config.settle_delay();
        if delay > Duration::ZERO {
            std::thread::sleep(delay);
        }
    }
}

impl Default for ScreenClient {
    fn default() -> Self {
        Self::new(ScreenConfig::default())
    }
}
