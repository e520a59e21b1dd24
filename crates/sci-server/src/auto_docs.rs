//! Git hook installation for auto-docs.
//!
//! Installs minimal `pre-commit` and `post-commit` hooks into an external
//! project that shell out to this service via curl. Hook bodies stay under
//! ten lines and are written with the executable bit set.

use std::path::Path;

use sci_domain::error::{Error, Result};
use serde_json::{json, Value};

fn pre_commit_hook(project: &str, service_url: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Auto-docs generation, delegated to the semantic code intelligence service\n\
         curl -s -X POST {service_url}/api/auto-docs/generate \
         -d '{{\"project\":\"{project}\"}}' -H \"Content-Type: application/json\" \
         || echo \"Auto-docs generation failed\"\n"
    )
}

fn post_commit_hook(project: &str, service_url: &str) -> String {
    format!(
        "#!/bin/sh\n\
         # Violation detection, delegated to the semantic code intelligence service\n\
         curl -s \"{service_url}/check/violation?action=commit&context={project}\" \
         || echo \"Violation check failed\"\n"
    )
}

fn write_hook(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Install both hooks into `<project_path>/.git/hooks`.
///
/// # Errors
///
/// Fails when the path does not exist or is not a git repository.
pub fn setup_project_hooks(project_path: &str, service_url: &str) -> Result<Value> {
    let project_path = Path::new(project_path);
    if !project_path.exists() {
        return Err(Error::invalid_argument(format!(
            "Project path not found: {}",
            project_path.display()
        )));
    }

    let git_dir = project_path.join(".git");
    if !git_dir.exists() {
        return Err(Error::invalid_argument(format!(
            "Not a git repository: {}",
            project_path.display()
        )));
    }

    let hooks_dir = git_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)?;

    let project_name = project_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    write_hook(
        &hooks_dir.join("pre-commit"),
        &pre_commit_hook(&project_name, service_url),
    )?;
    write_hook(
        &hooks_dir.join("post-commit"),
        &post_commit_hook(&project_name, service_url),
    )?;

    Ok(json!({
        "success": true,
        "project": project_name,
        "hooks_installed": ["pre-commit", "post-commit"],
        "service_url": service_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_are_installed_executable_and_short() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(".git")).expect("git dir");

        let report = setup_project_hooks(
            &dir.path().to_string_lossy(),
            "http://localhost:8000",
        )
        .expect("setup");
        assert_eq!(report["success"], true);

        for hook in ["pre-commit", "post-commit"] {
            let path = dir.path().join(".git/hooks").join(hook);
            let content = std::fs::read_to_string(&path).expect("hook exists");
            assert!(content.starts_with("#!/bin/sh"));
            assert!(content.contains("curl"));
            assert!(content.lines().count() <= 10);

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = std::fs::metadata(&path).expect("meta").permissions().mode();
                assert_eq!(mode & 0o777, 0o755);
            }
        }
    }

    #[test]
    fn non_git_directories_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = setup_project_hooks(&dir.path().to_string_lossy(), "http://localhost:8000");
        assert!(result.is_err());
    }
}
