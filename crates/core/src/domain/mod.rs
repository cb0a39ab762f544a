// Domain Layer - Records, invocation options and line parsing

pub mod options;
pub mod parser;
pub mod records;

// Re-exports
pub use options::{ClassicOptions, Verb};
pub use parser::{AuditParser, FreezeParser, LineParser, StatusParser, VersionParser};
pub use records::{AppAudit, AppVersion, Status};
