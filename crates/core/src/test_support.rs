//! Fixtures shared by the unit tests: a scripted platform and a fake sysfs tree.

use crate::config::PlatformPaths;
use crate::error::{CoreError, Result};
use crate::platform::{linux::LinuxProvider, PlatformProvider};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Real file reads, scripted command results
#[derive(Default)]
pub struct FakePlatform {
    commands: Mutex<HashMap<String, std::result::Result<String, String>>>,
    command_calls: Mutex<Vec<String>>,
    command_delay: Mutex<Duration>,
    reads: AtomicUsize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the stdout of `program args...`
    pub fn with_output(self, command_line: &str, stdout: &str) -> Self {
        self.set_output(command_line, stdout);
        self
    }

    /// Script a failure of `program args...`
    pub fn with_failure(self, command_line: &str) -> Self {
        self.set_failure(command_line);
        self
    }

    pub fn set_output(&self, command_line: &str, stdout: &str) {
        self.commands
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Ok(stdout.to_string()));
    }

    pub fn set_failure(&self, command_line: &str) {
        self.commands
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Err(format!("{} exited with 1", command_line)));
    }

    /// Make every later command take `delay` before answering
    pub fn set_command_delay(&self, delay: Duration) {
        *self.command_delay.lock().unwrap() = delay;
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.command_calls.lock().unwrap().clone()
    }
}

impl PlatformProvider for FakePlatform {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        LinuxProvider::new().read_text(path)
    }

    fn run_command(&self, program: &str, args: &[&str], _timeout: Duration) -> Result<String> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.command_calls.lock().unwrap().push(line.clone());

        let delay = *self.command_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        match self.commands.lock().unwrap().get(&line) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(msg)) => Err(CoreError::command(msg.clone())),
            None => Err(CoreError::command(format!("{} could not be started", program))),
        }
    }

    fn platform_name(&self) -> &'static str {
        "fake"
    }
}

/// A temporary sysfs-like tree
pub struct FakeSysfs {
    dir: TempDir,
}

impl FakeSysfs {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn hwmon_root(&self) -> PathBuf {
        self.root().join("class/hwmon")
    }

    /// Write `contents` at `rel` below the root, creating parents
    pub fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.root().join(rel)).unwrap();
    }

    /// Write a file inside hwmon container `container`
    pub fn hwmon(&self, container: &str, file: &str, contents: &str) -> &Self {
        self.write(&format!("class/hwmon/{}/{}", container, file), contents)
    }

    pub fn paths(&self) -> PlatformPaths {
        PlatformPaths {
            hwmon_root: self.hwmon_root(),
            board_vendor: self.root().join("class/dmi/id/board_vendor"),
            board_name: self.root().join("class/dmi/id/board_name"),
            cpuinfo: self.root().join("proc/cpuinfo"),
        }
    }
}
