use tokio::sync::Mutex;

use crosspost_agent::PublishCoordinator;

use crate::allow::Allowlist;

/// Shared state injected into every handler invocation.
pub struct BotContext {
    pub coordinator: PublishCoordinator,
    pub allowlist: Allowlist,
    /// Held for the whole of a pipeline run; submissions are processed one at a time.
    pub run_lock: Mutex<()>,
}

impl BotContext {
    pub fn new(coordinator: PublishCoordinator, allowlist: Allowlist) -> Self {
        Self {
            coordinator,
            allowlist,
            run_lock: Mutex::new(()),
        }
    }
}
