// Subprocess launcher implementation
// reason: tokio::process for async pipes that feed the record channel
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

use ninite_core::port::{
    ExitOutcome, LaunchError, LaunchedProcess, ProcessHandle, ProcessLauncher,
};

/// Starts the Classic executable as a child process with piped stdout/stderr
#[derive(Debug, Clone, Default)]
pub struct SubprocessLauncher;

impl SubprocessLauncher {
    pub fn new() -> Self {
        Self
    }
}

/// Wraps the tokio child so the core only sees `ProcessHandle`
struct ChildHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for ChildHandle {
    async fn wait(&mut self) -> std::io::Result<ExitOutcome> {
        let status = self.child.wait().await?;
        Ok(ExitOutcome {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[async_trait]
impl ProcessLauncher for SubprocessLauncher {
    async fn launch(&self, program: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(LaunchError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(LaunchError::MissingPipe("stderr"))?;

        debug!(
            program = %program.display(),
            pid = ?child.id(),
            "Child process started"
        );

        Ok(LaunchedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            handle: Box::new(ChildHandle { child }),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_launch_captures_both_pipes() {
        let launcher = SubprocessLauncher::new();
        let args = vec![
            "-c".to_string(),
            "echo 'Firefox : OK'; echo oops >&2; exit 3".to_string(),
        ];

        let mut process = launcher.launch(Path::new("sh"), &args).await.unwrap();

        let mut stdout = String::new();
        process.stdout.read_to_string(&mut stdout).await.unwrap();
        let mut stderr = String::new();
        process.stderr.read_to_string(&mut stderr).await.unwrap();
        let exit = process.handle.wait().await.unwrap();

        assert_eq!(stdout, "Firefox : OK\n");
        assert_eq!(stderr, "oops\n");
        assert_eq!(exit, ExitOutcome { success: false, code: Some(3) });
    }

    #[tokio::test]
    async fn test_launch_missing_program() {
        let launcher = SubprocessLauncher::new();

        let result = launcher
            .launch(Path::new("/nonexistent/NinitePro.exe"), &[])
            .await;

        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
    }
}
