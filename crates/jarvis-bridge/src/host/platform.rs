//! Per-OS command construction.
//!
//! Each supported operating system gets one [`PlatformCommands`]
//! implementation that turns a [`HostAction`] into a concrete program
//! invocation. Construction is pure, so every platform can be tested on any
//! build target; only [`current_platform`] looks at the compile target.

use std::fmt;

use super::{HostAction, PowerAction};

/// How the executor treats the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Wait for exit and fail on a non-zero status.
    WaitChecked,
    /// Wait for exit but ignore the status.
    WaitIgnored,
    /// Return as soon as the process has started.
    Detached,
}

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub completion: Completion,
    /// Suppress the console window (Windows only).
    pub hide_window: bool,
    /// Pass `args` to the child verbatim instead of applying MSVC argv
    /// quoting (Windows only). `cmd /C` parses its own command line.
    pub raw_args: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, completion: Completion) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            completion,
            hide_window: false,
            raw_args: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hide_window = true;
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw_args = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Command construction for one operating system.
pub trait PlatformCommands: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn print(&self, path: &str) -> CommandSpec;

    fn shell(&self, command: &str, completion: Completion) -> CommandSpec;

    fn open_app(&self, app: &str) -> CommandSpec;

    fn power(&self, action: PowerAction) -> CommandSpec;

    fn command_for(&self, action: &HostAction) -> CommandSpec {
        match action {
            HostAction::Print { path } => self.print(path),
            HostAction::RunCommand { command } => self.shell(command, Completion::WaitIgnored),
            HostAction::SpawnCommand { command } => self.shell(command, Completion::Detached),
            HostAction::OpenApp { app } => self.open_app(app),
            HostAction::Power(power) => self.power(*power),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Windows {
    /// Grace period passed to `shutdown /t`.
    pub shutdown_delay_secs: u32,
}

impl PlatformCommands for Windows {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn print(&self, path: &str) -> CommandSpec {
        CommandSpec::new("notepad", ["/p", path], Completion::WaitChecked)
    }

    fn shell(&self, command: &str, completion: Completion) -> CommandSpec {
        let spec = CommandSpec::new("cmd", ["/C", command], completion).raw();
        if completion == Completion::Detached {
            spec.hidden()
        } else {
            spec
        }
    }

    fn open_app(&self, app: &str) -> CommandSpec {
        CommandSpec::new("cmd", ["/C", "start", "", app], Completion::Detached).hidden()
    }

    fn power(&self, action: PowerAction) -> CommandSpec {
        let flag = match action {
            PowerAction::Shutdown => "/s",
            PowerAction::Restart => "/r",
        };
        let delay = self.shutdown_delay_secs.to_string();
        CommandSpec::new("shutdown", [flag, "/t", delay.as_str()], Completion::Detached)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MacOs;

impl PlatformCommands for MacOs {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn print(&self, path: &str) -> CommandSpec {
        CommandSpec::new("lp", [path], Completion::WaitChecked)
    }

    fn shell(&self, command: &str, completion: Completion) -> CommandSpec {
        CommandSpec::new("sh", ["-c", command], completion)
    }

    fn open_app(&self, app: &str) -> CommandSpec {
        CommandSpec::new("open", ["-a", app], Completion::Detached)
    }

    fn power(&self, action: PowerAction) -> CommandSpec {
        let flag = match action {
            PowerAction::Shutdown => "-h",
            PowerAction::Restart => "-r",
        };
        CommandSpec::new("sudo", ["shutdown", flag, "now"], Completion::Detached)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Linux;

impl PlatformCommands for Linux {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn print(&self, path: &str) -> CommandSpec {
        CommandSpec::new("lp", [path], Completion::WaitChecked)
    }

    fn shell(&self, command: &str, completion: Completion) -> CommandSpec {
        CommandSpec::new("sh", ["-c", command], completion)
    }

    // Goes through the shell so both bare names on PATH and full command
    // lines work.
    fn open_app(&self, app: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", app], Completion::Detached)
    }

    fn power(&self, action: PowerAction) -> CommandSpec {
        let flag = match action {
            PowerAction::Shutdown => "-h",
            PowerAction::Restart => "-r",
        };
        CommandSpec::new("shutdown", [flag, "now"], Completion::Detached)
    }
}

/// Command set for the operating system this binary was built for.
pub fn current_platform(shutdown_delay_secs: u32) -> Box<dyn PlatformCommands> {
    if cfg!(target_os = "windows") {
        Box::new(Windows {
            shutdown_delay_secs,
        })
    } else if cfg!(target_os = "macos") {
        Box::new(MacOs)
    } else {
        Box::new(Linux)
    }
}
