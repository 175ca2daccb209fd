use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::analytics::EffectDispatcher;

/// 等待 Ctrl+C
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, draining pending side effects...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 等待已投递的副作用执行完毕，超时后放弃
pub async fn drain_dispatcher(dispatcher: &EffectDispatcher, drain_timeout: Duration) {
    match timeout(drain_timeout, dispatcher.wait_idle()).await {
        Ok(()) => {
            info!("Effect dispatcher drained: {:?}", dispatcher.stats());
        }
        Err(_) => {
            error!(
                "Effect dispatcher drain timed out after {:?}, {} events abandoned",
                drain_timeout,
                dispatcher.stats().pending
            );
        }
    }
}
