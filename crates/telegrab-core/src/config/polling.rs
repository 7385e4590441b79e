use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::*;

/// Extra time the HTTP client waits beyond the server-side long-poll timeout.
const LONG_POLL_GRACE_SECS: u64 = 10;

/// Long-polling behavior of the update loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Maximum number of updates per `getUpdates` batch (1-100).
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Seconds to sleep after a successful poll.
    #[serde(default)]
    pub interval: u64,
    /// Server-side long-poll duration in seconds. 0 = short polling.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Seconds to sleep after a failed poll. 0 = retry immediately.
    #[serde(default = "default_retry_timeout", alias = "retryTimeout")]
    pub retry_timeout: u64,
    /// Upper bound on concurrently running handlers. 0 = unbounded.
    #[serde(default)]
    pub max_handlers: usize,
    /// Seconds to wait for in-flight handlers when the bot shuts down.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            interval: 0,
            timeout: default_timeout(),
            retry_timeout: default_retry_timeout(),
            max_handlers: 0,
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl PollingConfig {
    /// HTTP timeout for one `getUpdates` call: the long-poll duration plus slack.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.saturating_add(LONG_POLL_GRACE_SECS))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_timeout)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace)
    }
}
