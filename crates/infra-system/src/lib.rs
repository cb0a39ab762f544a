// Ninite Classic Infrastructure - System Adapters
// Implements: ProcessLauncher, executable discovery

pub mod discovery;
pub mod subprocess_launcher;

pub use discovery::locate_executable;
pub use subprocess_launcher::SubprocessLauncher;

use ninite_core::{Classic, ClassicError};
use std::path::Path;
use std::sync::Arc;

/// Classic bound to the executable at `path` (file, or directory holding
/// `NinitePro.exe`), launched as a real subprocess.
pub fn open(path: impl AsRef<Path>) -> Result<Classic, ClassicError> {
    let executable = locate_executable(path)?;
    Ok(Classic::new(executable, Arc::new(SubprocessLauncher::new())))
}
