//! Creates new on-disk actions for [`ProcessProvider`](crate::ProcessProvider).

use std::path::{Path, PathBuf};

use crate::error::ActionError;
use crate::types::validate_action_name;

fn template(name: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Gantry action: {name}\n\
         # Arguments arrive as positional parameters. Print the result on\n\
         # stdout and exit non-zero with a message on stderr to fail.\n\
         \n\
         echo \"Action {name} executed with args: $*\"\n"
    )
}

/// Create `<actions_dir>/<name>/<name>` as an executable starter script.
///
/// Returns the path of the new executable. Refuses to touch an existing
/// action directory.
pub fn scaffold_action(actions_dir: &Path, name: &str) -> Result<PathBuf, ActionError> {
    validate_action_name(name)?;

    let dir = actions_dir.join(name);
    if dir.exists() {
        return Err(ActionError::AlreadyExists(name.to_string()));
    }
    std::fs::create_dir_all(&dir)?;

    let executable = dir.join(name);
    std::fs::write(&executable, template(name))?;
    make_executable(&executable)?;

    tracing::info!(action = %name, path = %executable.display(), "Created action");
    Ok(executable)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_creates_script() {
        let tmp = tempfile::tempdir().unwrap();
        let path = scaffold_action(tmp.path(), "greet").unwrap();

        assert_eq!(path, tmp.path().join("greet").join("greet"));
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("#!/bin/sh\n"));
        assert!(body.contains("Action greet executed with args: $*"));
    }

    #[test]
    fn test_scaffold_refuses_existing() {
        let tmp = tempfile::tempdir().unwrap();
        scaffold_action(tmp.path(), "greet").unwrap();
        let err = scaffold_action(tmp.path(), "greet").unwrap_err();
        assert!(matches!(err, ActionError::AlreadyExists(_)));
    }

    #[test]
    fn test_scaffold_rejects_bad_name() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scaffold_action(tmp.path(), "../escape").unwrap_err();
        assert!(matches!(err, ActionError::InvalidName(_)));
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scaffolded_action_runs() {
        use crate::provider::{ActionProvider, ProcessProvider};

        let tmp = tempfile::tempdir().unwrap();
        scaffold_action(tmp.path(), "greet").unwrap();

        let provider = ProcessProvider::new(tmp.path());
        assert!(provider.list().unwrap().contains("greet"));
        let out = provider
            .lookup("greet")
            .unwrap()
            .call(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out, "Action greet executed with args: a b");
    }
}
