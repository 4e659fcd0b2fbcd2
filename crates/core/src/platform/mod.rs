pub mod command;
pub mod linux;

use crate::error::Result;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Host I/O seam used by discovery and sampling
pub trait PlatformProvider: Send + Sync {
    /// Read the whole file as text, trimmed
    fn read_text(&self, path: &Path) -> io::Result<String>;

    /// Run a command and capture its stdout.
    ///
    /// Fails when the program cannot be started, exits unsuccessfully, or
    /// outlives `timeout` (the child is killed in that case).
    fn run_command(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String>;

    /// CPU model string from a cpuinfo text source
    fn cpu_model(&self, cpuinfo: &Path) -> Option<String> {
        let text = self.read_text(cpuinfo).ok()?;
        model_name_from_cpuinfo(&text)
    }

    /// Get platform name
    fn platform_name(&self) -> &'static str;
}

/// First `model name` line of a cpuinfo listing, value part trimmed
pub fn model_name_from_cpuinfo(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get the provider for the current system
pub fn get_platform_provider() -> Arc<dyn PlatformProvider> {
    Arc::new(linux::LinuxProvider::new())
}
