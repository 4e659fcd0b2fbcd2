use super::{command, PlatformProvider};
use crate::error::Result;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// sysfs/procfs backed provider
pub struct LinuxProvider;

impl LinuxProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformProvider for LinuxProvider {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).map(|s| s.trim().to_string())
    }

    fn run_command(&self, program: &str, args: &[&str], timeout: Duration) -> Result<String> {
        command::run_with_timeout(program, args, timeout)
    }

    fn cpu_model(&self, cpuinfo: &Path) -> Option<String> {
        #[cfg(feature = "linux_procfs")]
        {
            if cpuinfo == Path::new("/proc/cpuinfo") {
                match self.cpu_model_procfs() {
                    Ok(model) => return model,
                    Err(e) => log::debug!("procfs cpuinfo unavailable, scanning text: {}", e),
                }
            }
        }

        let text = self.read_text(cpuinfo).ok()?;
        super::model_name_from_cpuinfo(&text)
    }

    fn platform_name(&self) -> &'static str {
        "linux"
    }
}

#[cfg(feature = "linux_procfs")]
impl LinuxProvider {
    fn cpu_model_procfs(&self) -> Result<Option<String>> {
        use procfs::Current;

        let info = procfs::CpuInfo::current()?;
        Ok(info
            .model_name(0)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}
