// Central Error Type for Classic invocations

use std::path::PathBuf;
use thiserror::Error;

pub use crate::port::LaunchError;

/// Failure of a single Classic operation.
///
/// Variants are ordered by the phase in which they can occur: discovery,
/// option checks, launch, reading standard output, then exit/stderr aggregation.
#[derive(Error, Debug)]
pub enum ClassicError {
    #[error("Executable not found at {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rejected before anything is launched
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("Failed to read process output: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Process exited with {}", describe_code(.code))]
    ProcessExit { code: Option<i32> },

    /// Clean exit, but the tool wrote to standard error. The text is kept verbatim.
    #[error("{0}")]
    Stderr(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias using ClassicError
pub type Result<T> = std::result::Result<T, ClassicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_message() {
        let err = ClassicError::ProcessExit { code: Some(3) };
        assert_eq!(err.to_string(), "Process exited with exit code 3");

        let err = ClassicError::ProcessExit { code: None };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_invalid_options_message() {
        let err = ClassicError::InvalidOptions("freeze needs an output file".to_string());
        assert_eq!(err.to_string(), "Invalid options: freeze needs an output file");
    }

    #[test]
    fn test_stderr_is_opaque() {
        let err = ClassicError::Stderr("License expired\r\n".to_string());
        assert_eq!(err.to_string(), "License expired\r\n");
    }
}
