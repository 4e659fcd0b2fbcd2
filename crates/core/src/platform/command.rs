use crate::error::{CoreError, Result};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Spawn `program`, wait at most `timeout` and return its stdout.
///
/// Stdout is drained on a helper thread so a chatty child cannot block on a
/// full pipe while we poll for its exit.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CoreError::command(format!("{} could not be started: {}", program, e)))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| CoreError::command(format!("{} has no stdout pipe", program)))?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let start = Instant::now();
    let status = loop {
        let polled = match child.try_wait() {
            Ok(polled) => polled,
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(CoreError::command(format!("{} could not be polled: {}", program, e)));
            }
        };
        match polled {
            Some(status) => break status,
            None if start.elapsed() >= timeout => {
                kill_and_reap(&mut child);
                return Err(CoreError::command(format!(
                    "{} timed out after {} ms",
                    program,
                    timeout.as_millis()
                )));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    let output = reader
        .join()
        .map_err(|_| CoreError::command(format!("{} output reader panicked", program)))??;

    if !status.success() {
        return Err(CoreError::command(format!("{} exited with {}", program, status)));
    }

    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Kill the child and wait for it so no zombie is left behind.
///
/// The reader thread is not joined: a grandchild may still hold the pipe, and
/// the thread exits on its own once the last writer closes it.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
