// Classic constants (no magic values)

/// File name looked up when the executable path points at a directory
pub const DEFAULT_EXECUTABLE_NAME: &str = "NinitePro.exe";

/// Initial capacity of the per-line read buffer; report lines are short
pub const LINE_BUFFER_CAPACITY: usize = 256;
