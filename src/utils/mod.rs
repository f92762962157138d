// Re-export all utility modules
pub mod display;
pub mod logging;
pub mod options;
pub mod process;

// Re-export commonly used items for convenience
pub use display::{PluginTable, print_banner};
pub use logging::{MemorySink, Sink, StdoutSink, debug};
pub use options::PluginOptions;
pub use process::HostCommand;
