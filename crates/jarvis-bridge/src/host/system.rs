//! Executes host actions against the real operating system.

use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;

use super::platform::{CommandSpec, Completion, PlatformCommands};
use super::{HostAction, HostControl, HostError, HostResult};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs actions through the platform's native commands.
#[derive(Debug)]
pub struct SystemHost {
    platform: Box<dyn PlatformCommands>,
}

impl SystemHost {
    pub fn new(platform: Box<dyn PlatformCommands>) -> Self {
        Self { platform }
    }

    /// Host for the platform this binary was built for.
    pub fn detect(shutdown_delay_secs: u32) -> Self {
        Self::new(super::current_platform(shutdown_delay_secs))
    }

    async fn execute(&self, spec: CommandSpec) -> HostResult<()> {
        let mut command = Command::new(&spec.program);
        apply_args(&mut command, &spec);
        command.stdin(Stdio::null());

        hide_console(&mut command, spec.hide_window);

        match spec.completion {
            Completion::Detached => {
                let mut child = command
                    .spawn()
                    .map_err(|e| HostError::spawn(&spec.program, e))?;
                let pid = child.id();
                debug!("started `{}` (pid {:?})", spec, pid);

                // Reap in the background; the caller has already been answered.
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if status.success() => {
                            debug!("`{}` (pid {:?}) finished", spec, pid)
                        }
                        Ok(status) => warn!("`{}` (pid {:?}) exited with {}", spec, pid, status),
                        Err(e) => warn!("error waiting for `{}` (pid {:?}): {}", spec, pid, e),
                    }
                });
                Ok(())
            }
            Completion::WaitIgnored => {
                let status = command
                    .status()
                    .await
                    .map_err(|e| HostError::spawn(&spec.program, e))?;
                debug!("`{}` exited with {}", spec, status);
                Ok(())
            }
            Completion::WaitChecked => {
                let status = command
                    .status()
                    .await
                    .map_err(|e| HostError::spawn(&spec.program, e))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(HostError::ExitStatus {
                        program: spec.program,
                        status,
                    })
                }
            }
        }
    }
}

#[cfg(windows)]
fn apply_args(command: &mut Command, spec: &CommandSpec) {
    if spec.raw_args {
        for arg in &spec.args {
            command.raw_arg(arg);
        }
    } else {
        command.args(&spec.args);
    }
}

#[cfg(not(windows))]
fn apply_args(command: &mut Command, spec: &CommandSpec) {
    command.args(&spec.args);
}

#[cfg(windows)]
fn hide_console(command: &mut Command, hide: bool) {
    if hide {
        command.creation_flags(CREATE_NO_WINDOW);
    }
}

#[cfg(not(windows))]
fn hide_console(_command: &mut Command, _hide: bool) {}

#[async_trait]
impl HostControl for SystemHost {
    fn name(&self) -> &str {
        self.platform.name()
    }

    async fn dispatch(&self, action: HostAction) -> HostResult<()> {
        let spec = self.platform.command_for(&action);
        info!("{}: {} -> `{}`", self.platform.name(), action, spec);
        self.execute(spec).await
    }
}
