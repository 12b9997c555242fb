use crate::errors::WhoisError;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::process::Command;
use tracing::{debug, info};

/// What happened when asking the desktop to show the output folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    /// Absolute folder path, for display.
    pub path: PathBuf,
    /// The folder did not exist and was created first.
    pub created: bool,
    /// Launcher that succeeded; `None` means the user has to navigate there.
    pub opened_with: Option<String>,
}

impl OpenOutcome {
    pub fn needs_manual_open(&self) -> bool {
        self.opened_with.is_none()
    }
}

/// A file-manager command and its leading arguments; the folder is appended.
pub type Launcher = (&'static str, &'static [&'static str]);

#[cfg(target_os = "windows")]
pub const LAUNCHERS: &[Launcher] = &[("explorer", &[])];

#[cfg(target_os = "macos")]
pub const LAUNCHERS: &[Launcher] = &[("open", &[])];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const LAUNCHERS: &[Launcher] = &[
    ("nautilus", &[]),
    ("gio", &["open"]),
    ("xdg-open", &[]),
    ("dolphin", &[]),
    ("thunar", &[]),
];

/// Best-effort: create the folder if missing, then try the platform's file
/// managers in order.
pub async fn open_output_folder(folder: &Path) -> Result<OpenOutcome, WhoisError> {
    open_with(folder, LAUNCHERS).await
}

pub async fn open_with(folder: &Path, launchers: &[Launcher]) -> Result<OpenOutcome, WhoisError> {
    let path = if folder.is_absolute() {
        folder.to_path_buf()
    } else {
        std::env::current_dir()?.join(folder)
    };

    let created = !path.exists();
    if created {
        tokio::fs::create_dir_all(&path).await.map_err(|source| WhoisError::Output {
            path: path.clone(),
            source,
        })?;
        info!("Created output folder {}", path.display());
    }

    for (program, args) in launchers {
        // Keep the child off the terminal; the TUI owns stdin and the screen.
        let status = Command::new(program)
            .args(*args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status_accepted(program, status) => {
                debug!("Opened {} with {}", path.display(), program);
                return Ok(OpenOutcome {
                    path,
                    created,
                    opened_with: Some(program.to_string()),
                });
            }
            Ok(status) => debug!("{} exited with {}", program, status),
            Err(e) => debug!("Could not run {}: {}", program, e),
        }
    }

    Ok(OpenOutcome {
        path,
        created,
        opened_with: None,
    })
}

// explorer.exe reports exit code 1 even when the window opened.
fn status_accepted(program: &str, status: std::process::ExitStatus) -> bool {
    status.success() || program == "explorer"
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_folder_and_uses_first_working_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("individual_results");
        let launchers: &[Launcher] = &[("definitely-not-a-file-manager", &[]), ("false", &[]), ("true", &[])];

        let outcome = open_with(&folder, launchers).await.unwrap();

        assert!(folder.is_dir());
        assert!(outcome.created);
        assert_eq!(outcome.opened_with.as_deref(), Some("true"));
        assert!(!outcome.needs_manual_open());
    }

    #[tokio::test]
    async fn test_manual_open_when_nothing_works() {
        let dir = tempfile::tempdir().unwrap();
        let launchers: &[Launcher] = &[("false", &[])];

        let outcome = open_with(dir.path(), launchers).await.unwrap();

        assert!(!outcome.created);
        assert!(outcome.needs_manual_open());
        assert_eq!(outcome.path, dir.path());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_launcher_gets_no_terminal_streams() {
        let dir = tempfile::tempdir().unwrap();
        // Succeeds only when stdin, stdout and stderr all point at /dev/null.
        const SCRIPT: &str = "for fd in 0 1 2; do [ \"$(readlink /proc/$$/fd/$fd)\" = /dev/null ] || exit 1; done";
        let launchers: &[Launcher] = &[("sh", &["-c", SCRIPT])];

        let outcome = open_with(dir.path(), launchers).await.unwrap();

        assert_eq!(outcome.opened_with.as_deref(), Some("sh"));
    }
}
