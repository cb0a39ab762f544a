// Process Launcher Port
// Abstraction over starting the Classic executable with piped output

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Readable end of one of the child's output pipes
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub success: bool,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

/// Launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Spawn failed for {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Child process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// Handle to a started process. Must be awaited to reap the child.
#[async_trait]
pub trait ProcessHandle: Send {
    async fn wait(&mut self) -> std::io::Result<ExitOutcome>;
}

/// A started process with both output pipes attached
pub struct LaunchedProcess {
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub handle: Box<dyn ProcessHandle>,
}

/// Process Launcher trait
///
/// Implementations:
/// - SubprocessLauncher (infra-system): tokio child process
/// - mocks::ScriptedLauncher: canned output for tests
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Start `program` with `args`
    ///
    /// # Errors
    /// - LaunchError::Spawn if the OS refuses to start the process
    /// - LaunchError::MissingPipe if stdout or stderr could not be captured
    async fn launch(&self, program: &Path, args: &[String]) -> Result<LaunchedProcess, LaunchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, ReadBuf};

    /// Reader that fails on first use, standing in for a broken pipe
    struct BrokenPipe;

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout pipe reset",
            )))
        }
    }

    struct FixedExit {
        outcome: ExitOutcome,
        waits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProcessHandle for FixedExit {
        async fn wait(&mut self) -> std::io::Result<ExitOutcome> {
            self.waits.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    /// Launcher that replays a fixed stdout/stderr/exit script
    #[derive(Clone)]
    pub struct ScriptedLauncher {
        stdout: String,
        stderr: String,
        exit: ExitOutcome,
        break_stdout: bool,
        spawn_error: Option<String>,
        calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
        waits: Arc<AtomicUsize>,
    }

    impl ScriptedLauncher {
        /// Process that prints `stdout` and exits 0
        pub fn new(stdout: impl Into<String>) -> Self {
            Self {
                stdout: stdout.into(),
                stderr: String::new(),
                exit: ExitOutcome::from_code(0),
                break_stdout: false,
                spawn_error: None,
                calls: Arc::new(Mutex::new(Vec::new())),
                waits: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Launcher whose every launch fails with a spawn error
        pub fn spawn_failure(message: impl Into<String>) -> Self {
            Self {
                spawn_error: Some(message.into()),
                ..Self::new("")
            }
        }

        pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
            self.stderr = stderr.into();
            self
        }

        pub fn with_exit_code(mut self, code: i32) -> Self {
            self.exit = ExitOutcome::from_code(code);
            self
        }

        /// Stdout yields the scripted text, then an I/O error instead of EOF
        pub fn with_broken_stdout(mut self) -> Self {
            self.break_stdout = true;
            self
        }

        /// Every (program, args) pair passed to `launch`, in call order
        pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }

        /// How many times any launched process was waited on
        pub fn waits(&self) -> usize {
            self.waits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProcessLauncher for ScriptedLauncher {
        async fn launch(
            &self,
            program: &Path,
            args: &[String],
        ) -> Result<LaunchedProcess, LaunchError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec()));

            if let Some(message) = &self.spawn_error {
                return Err(LaunchError::Spawn {
                    program: program.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, message.clone()),
                });
            }

            let stdout_text = Cursor::new(self.stdout.clone().into_bytes());
            let stdout: OutputStream = if self.break_stdout {
                Box::new(stdout_text.chain(BrokenPipe))
            } else {
                Box::new(stdout_text)
            };

            Ok(LaunchedProcess {
                stdout,
                stderr: Box::new(Cursor::new(self.stderr.clone().into_bytes())),
                handle: Box::new(FixedExit {
                    outcome: self.exit,
                    waits: Arc::clone(&self.waits),
                }),
            })
        }
    }
}
