//! Host side effects.
//!
//! Handlers never touch the operating system directly. They describe what
//! they want as a [`HostAction`] and hand it to a [`HostControl`], which
//! either runs it ([`SystemHost`]) or just records it ([`DryRunHost`]).
//! Results are dispatch-level only: "started without error" or "failed to
//! start", never the eventual outcome of a detached process.

mod dry_run;
mod error;
mod platform;
mod system;

use std::fmt;

use async_trait::async_trait;

pub use dry_run::DryRunHost;
pub use error::{HostError, HostResult};
pub use platform::{CommandSpec, Completion, Linux, MacOs, PlatformCommands, Windows, current_platform};
pub use system::SystemHost;

/// Power state change requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Shutdown,
    Restart,
}

impl PowerAction {
    /// Interpret a client-supplied action name.
    ///
    /// Matching is case-insensitive. Only "restart" restarts; every other
    /// value, including none at all, shuts down.
    pub fn parse(action: &str) -> Self {
        if action.eq_ignore_ascii_case("restart") {
            Self::Restart
        } else {
            Self::Shutdown
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::Restart => f.write_str("restart"),
        }
    }
}

/// An OS side effect the bridge can be asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Send a file to the default printer and wait for the spooler command.
    Print { path: String },
    /// Run a shell command to completion, ignoring its exit status.
    RunCommand { command: String },
    /// Start a shell command in the background.
    SpawnCommand { command: String },
    /// Launch an application by name or path.
    OpenApp { app: String },
    /// Shut down or restart the machine.
    Power(PowerAction),
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print { path } => write!(f, "print {path}"),
            Self::RunCommand { command } => write!(f, "run `{command}`"),
            Self::SpawnCommand { command } => write!(f, "spawn `{command}`"),
            Self::OpenApp { app } => write!(f, "open {app}"),
            Self::Power(action) => write!(f, "power {action}"),
        }
    }
}

/// Something that can carry out host actions.
#[async_trait]
pub trait HostControl: Send + Sync {
    /// Short label for logs (platform name, "dry-run", ...).
    fn name(&self) -> &str;

    /// Dispatch a single action.
    async fn dispatch(&self, action: HostAction) -> HostResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_action_parse() {
        assert_eq!(PowerAction::parse("restart"), PowerAction::Restart);
        assert_eq!(PowerAction::parse("RESTART"), PowerAction::Restart);
        assert_eq!(PowerAction::parse("shutdown"), PowerAction::Shutdown);
        assert_eq!(PowerAction::parse("hibernate"), PowerAction::Shutdown);
        assert_eq!(PowerAction::parse(""), PowerAction::Shutdown);
    }

    #[test]
    fn test_action_display() {
        let action = HostAction::SpawnCommand {
            command: "echo hi".to_string(),
        };
        assert_eq!(action.to_string(), "spawn `echo hi`");
        assert_eq!(
            HostAction::Power(PowerAction::Restart).to_string(),
            "power restart"
        );
    }
}
