use std::env;
use std::sync::Mutex;

pub const DEBUG_ENV: &str = "HOSTPLUG_DEBUG";

/// Print a debug message if debug mode is enabled
pub fn debug(message: &str) {
    if env::var(DEBUG_ENV).is_ok() {
        println!("{}", message);
    }
}

/// Destination for the human readable diagnostics plugins report
pub trait Sink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes diagnostics to standard output, one line each
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps diagnostics in memory so callers can inspect them afterwards
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        match self.lines.lock() {
            Ok(mut lines) => lines.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Sink for MemorySink {
    fn emit(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
