// Port Layer - Interfaces for external dependencies

pub mod process_launcher;
pub mod time_provider; // For deterministic durations in tests

// Re-exports
pub use process_launcher::{
    ExitOutcome, LaunchError, LaunchedProcess, OutputStream, ProcessHandle, ProcessLauncher,
};
pub use time_provider::TimeProvider;
