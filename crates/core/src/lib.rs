// Ninite Classic Core - Records, Options, Parsing & Ports
// NO process or filesystem access here: launching lives behind `port::ProcessLauncher`

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{Classic, RecordStream};
pub use domain::{AppAudit, AppVersion, ClassicOptions, Status, Verb};
pub use error::{ClassicError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
