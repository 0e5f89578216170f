//! Filesystem-permission fallback: "could the token's subject do this locally?"
//!
//! The evaluator never fails a request on its own. A probe that errors or
//! times out counts as "no", and the engine moves on to scope matching.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use super::Operation;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("refusing to impersonate subject {0:?}")]
    InvalidSubject(String),
    #[error("failed to launch permission check: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("permission check timed out after {0:?}")]
    Timeout(Duration),
}

/// Identity-aware permission check on a local path.
#[async_trait]
pub trait PermissionProbe: Send + Sync {
    // Only called with `Operation::Read` or `Operation::Write`.
    async fn permits(
        &self,
        subject: &str,
        operation: Operation,
        path: &str,
    ) -> Result<bool, ProbeError>;
}

/// Runs `sudo -n -u <subject> test -r|-w <path>`; exit status 0 means permitted.
#[derive(Debug, Clone)]
pub struct SudoTestProbe {
    program: String,
}

impl Default for SudoTestProbe {
    fn default() -> Self {
        Self {
            program: "sudo".to_string(),
        }
    }
}

impl SudoTestProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

// Subjects are handed to sudo as a user name, never as an option.
fn usable_subject(subject: &str) -> bool {
    !subject.is_empty()
        && !subject.starts_with('-')
        && !subject.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[async_trait]
impl PermissionProbe for SudoTestProbe {
    async fn permits(
        &self,
        subject: &str,
        operation: Operation,
        path: &str,
    ) -> Result<bool, ProbeError> {
        if !usable_subject(subject) {
            return Err(ProbeError::InvalidSubject(subject.to_string()));
        }
        let flag = match operation {
            Operation::Read => "-r",
            Operation::Write => "-w",
            Operation::Unknown => return Ok(false),
        };

        let status = Command::new(&self.program)
            .args(["-n", "-u", subject, "test", flag, path])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;

        Ok(status.success())
    }
}

/// Wraps a probe with the fall-through policy and a time bound.
#[derive(Clone)]
pub struct ImpersonationEvaluator {
    probe: Arc<dyn PermissionProbe>,
    timeout: Duration,
}

impl std::fmt::Debug for ImpersonationEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpersonationEvaluator")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ImpersonationEvaluator {
    pub fn new(probe: Arc<dyn PermissionProbe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    pub async fn check(&self, subject: &str, operation: Operation, path: &str) -> bool {
        if operation == Operation::Unknown {
            return false;
        }

        let result = match tokio::time::timeout(
            self.timeout,
            self.probe.permits(subject, operation, path),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };

        match result {
            Ok(permitted) => {
                tracing::debug!(subject, %operation, path, permitted, "impersonation probe");
                permitted
            }
            Err(err) => {
                tracing::warn!(error = %err, subject, %operation, path, "impersonation probe failed");
                false
            }
        }
    }
}
