use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::LinkService;
use crate::store::{KvStore, create_store};

pub struct StartupContext {
    pub store: Arc<dyn KvStore>,
    pub link_service: Arc<LinkService>,
}

/// 准备服务器启动的上下文：存储后端与业务服务
///
/// 必须在 tokio 运行时内调用（会启动副作用分发器）。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    let store = create_store(&config.store)
        .await
        .context("Failed to create store backend")?;
    info!("Using store backend: {}", store.backend_name());

    let link_service = Arc::new(LinkService::new(store.clone(), config));
    debug!(
        "LinkService initialized (alias length {}, max attempts {}, public base {})",
        config.shortener.alias_length,
        config.shortener.max_alias_attempts,
        config.shortener.public_base()
    );

    info!("Pre-startup completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        store,
        link_service,
    })
}
