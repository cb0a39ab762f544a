// Application Layer - Classic operations

pub mod classic;
pub mod constants;
pub mod stream;

// Re-exports
pub use classic::{Classic, RecordStream};
pub use stream::RunSummary;
