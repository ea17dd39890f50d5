use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// 30 seconds per emulator run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// How a bounded emulator run ended. A timed-out run is killed but its
/// partial output is kept: targets often print the report before wedging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed { success: bool },
    TimedOut,
}

/// Seam to the external build tool and emulator. The orchestrator only ever
/// talks to this trait; tests substitute a scripted implementation.
pub trait Driver {
    fn clean(&self) -> Result<()>;
    fn build(&self, target: &str, with_tests: bool) -> Result<()>;
    fn run_under_emulator(
        &self,
        target: &str,
        output: &Path,
        timeout: Duration,
    ) -> Result<RunStatus>;
}

/// Drives `make` for clean/build and the qemu test-mode target for runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeDriver;

impl MakeDriver {
    fn run_make(&self, args: &[String]) -> Result<()> {
        debug!("running make {}", args.join(" "));
        let status = Command::new("make")
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .context("failed to start 'make'")?;
        if status.success() {
            Ok(())
        } else {
            Err(anyhow!("make {} exited with {}", args.join(" "), status))
        }
    }
}

impl Driver for MakeDriver {
    fn clean(&self) -> Result<()> {
        self.run_make(&["clean".to_string()])
    }

    fn build(&self, target: &str, with_tests: bool) -> Result<()> {
        let mut args = vec![format!("target={target}")];
        if with_tests {
            args.push("TESTS=TRUE".to_string());
        }
        self.run_make(&args)
    }

    fn run_under_emulator(
        &self,
        target: &str,
        output: &Path,
        timeout: Duration,
    ) -> Result<RunStatus> {
        let file = File::create(output)
            .with_context(|| format!("failed to create run output '{}'", output.display()))?;
        let stdout = file
            .try_clone()
            .context("failed to clone the run output handle")?;

        debug!("running make target={target} qemu-test-mode");
        let mut child = Command::new("make")
            .arg(format!("target={target}"))
            .arg("qemu-test-mode")
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::null())
            .spawn()
            .context("failed to start the emulator run")?;

        let status = match child
            .wait_timeout(timeout)
            .context("failed to wait on the emulator run")?
        {
            Some(status) => RunStatus::Completed {
                success: status.success(),
            },
            None => {
                warn!("emulator run still alive after {}s, killing it", timeout.as_secs());
                let _ = child.kill();
                let _ = child.wait();
                RunStatus::TimedOut
            }
        };

        // The console output crossed a process boundary; force it to disk
        // before the extractor reads the file back.
        file.sync_all()
            .with_context(|| format!("failed to flush run output '{}'", output.display()))?;

        Ok(status)
    }
}
