//! Provider that runs actions as executables on disk.
//!
//! Layout: `<actions_dir>/<name>/<name>`. The executable runs with its own
//! directory as the working directory and receives the call arguments as argv.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ActionError;
use crate::provider::{ActionProvider, Invocable};
use crate::types::validate_action_name;

pub struct ProcessProvider {
    actions_dir: PathBuf,
}

impl ProcessProvider {
    pub fn new(actions_dir: impl Into<PathBuf>) -> Self {
        Self {
            actions_dir: actions_dir.into(),
        }
    }

    pub fn actions_dir(&self) -> &Path {
        &self.actions_dir
    }

    fn action_dir(&self, name: &str) -> PathBuf {
        self.actions_dir.join(name)
    }
}

impl ActionProvider for ProcessProvider {
    fn lookup(&self, name: &str) -> Result<Arc<dyn Invocable>, ActionError> {
        // An invalid name cannot name anything on disk.
        if validate_action_name(name).is_err() {
            return Err(ActionError::NotFound(name.to_string()));
        }

        let dir = self.action_dir(name);
        if !dir.is_dir() {
            return Err(ActionError::NotFound(name.to_string()));
        }

        let executable = dir.join(name);
        let metadata = std::fs::metadata(&executable).map_err(|e| ActionError::ResolutionFailed {
            name: name.to_string(),
            reason: format!("cannot read {}: {}", executable.display(), e),
        })?;
        if !metadata.is_file() {
            return Err(ActionError::ResolutionFailed {
                name: name.to_string(),
                reason: format!("{} is not a file", executable.display()),
            });
        }
        if !is_executable(&metadata) {
            return Err(ActionError::ResolutionFailed {
                name: name.to_string(),
                reason: format!("{} is not executable", executable.display()),
            });
        }

        tracing::debug!(action = %name, path = %executable.display(), "Resolved process action");
        Ok(Arc::new(ProcessAction {
            executable,
            workdir: dir,
        }))
    }

    fn list(&self) -> Result<BTreeSet<String>, ActionError> {
        let entries = match std::fs::read_dir(&self.actions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_action_name(name).is_ok() {
                    names.insert(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// A resolved on-disk action.
struct ProcessAction {
    executable: PathBuf,
    workdir: PathBuf,
}

#[async_trait]
impl Invocable for ProcessAction {
    async fn call(&self, args: &[String]) -> Result<String, ActionError> {
        let output = Command::new(&self.executable)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ActionError::Invocation(format!(
                    "failed to start {}: {}",
                    self.executable.display(),
                    e
                ))
            })?;

        if output.status.success() {
            let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if stdout.ends_with('\n') {
                stdout.pop();
                if stdout.ends_with('\r') {
                    stdout.pop();
                }
            }
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                Err(ActionError::Invocation(format!(
                    "action exited with {}",
                    output.status
                )))
            } else {
                Err(ActionError::Invocation(stderr))
            }
        }
    }
}
