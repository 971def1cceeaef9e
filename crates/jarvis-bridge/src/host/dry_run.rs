//! A host that records actions instead of performing them.

use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;

use super::{HostAction, HostControl, HostResult};

/// Logs and remembers every dispatched action. Nothing reaches the OS.
#[derive(Debug, Default)]
pub struct DryRunHost {
    actions: Mutex<Vec<HostAction>>,
}

impl DryRunHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action dispatched so far, oldest first.
    pub async fn actions(&self) -> Vec<HostAction> {
        self.actions.lock().await.clone()
    }
}

#[async_trait]
impl HostControl for DryRunHost {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn dispatch(&self, action: HostAction) -> HostResult<()> {
        info!("dry-run: would {}", action);
        self.actions.lock().await.push(action);
        Ok(())
    }
}
