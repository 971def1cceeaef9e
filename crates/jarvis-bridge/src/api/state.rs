//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::host::HostControl;
use crate::notifications::NotificationQueue;

/// Request-independent settings the handlers read.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Port advertised in the mobile URL.
    pub port: u16,
    /// Host name advertised in the mobile URL instead of the detected IP.
    pub advertise_host: Option<String>,
    pub default_print_path: String,
    pub default_notification_title: String,
    pub cors: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl BridgeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            port: config.server.port,
            advertise_host: config.server.advertise_host.clone(),
            default_print_path: config.print.default_path.clone(),
            default_notification_title: config.notifications.default_title.clone(),
            cors: config.server.cors,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Where OS side effects go.
    pub host: Arc<dyn HostControl>,
    /// Host-to-mobile mailbox.
    pub notifications: Arc<NotificationQueue>,
    pub settings: Arc<BridgeSettings>,
}

impl AppState {
    pub fn new(host: Arc<dyn HostControl>, settings: BridgeSettings) -> Self {
        Self {
            host,
            notifications: Arc::new(NotificationQueue::new()),
            settings: Arc::new(settings),
        }
    }
}
