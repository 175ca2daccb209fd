//! 副作用分发器
//!
//! - 有界 mpsc 队列接收事件，单个后台循环取出后各自 spawn 执行
//! - Semaphore 限制同时执行的任务数
//! - 队列满时不丢弃，直接 spawn 独立任务执行
//! - 失败只记录日志，不重试、不回滚

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Notify, Semaphore, mpsc};
use tracing::{debug, trace, warn};

use super::LinkEvent;
use crate::config::DispatcherConfig;
use crate::errors::Result;
use crate::services::link_store::LinkStore;
use crate::services::stats::StatsAggregator;

/// 将单个事件应用到存储
#[derive(Clone)]
pub struct EffectHandler {
    links: LinkStore,
    stats: StatsAggregator,
}

impl EffectHandler {
    pub fn new(links: LinkStore, stats: StatsAggregator) -> Self {
        Self { links, stats }
    }

    pub async fn apply(&self, event: &LinkEvent) -> Result<()> {
        match event {
            LinkEvent::Created(record) => {
                self.stats
                    .on_create(
                        &record.user_id,
                        &record.event_id,
                        &record.long_url,
                        &record.interaction,
                    )
                    .await
            }
            LinkEvent::Clicked(record) => {
                // 两组写入互不依赖，其中一个失败不影响另一个
                let (clicks, stats) = tokio::join!(
                    self.links.increment_clicks(&record.key),
                    self.stats.on_click(
                        &record.user_id,
                        &record.event_id,
                        &record.long_url,
                        &record.interaction,
                    )
                );
                clicks?;
                stats
            }
        }
    }
}

/// 分发器计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub pending: usize,
    pub applied: u64,
    pub failed: u64,
    pub overflowed: u64,
}

struct DispatchState {
    /// 已接收但尚未执行完的事件数
    pending: AtomicUsize,
    idle: Notify,
    applied: AtomicU64,
    failed: AtomicU64,
    overflowed: AtomicU64,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
            applied: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            overflowed: AtomicU64::new(0),
        }
    }

    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

pub struct EffectDispatcher {
    tx: mpsc::Sender<LinkEvent>,
    state: Arc<DispatchState>,
    handler: EffectHandler,
}

impl EffectDispatcher {
    /// 创建分发器并启动后台循环（需要在 tokio 运行时内调用）
    pub fn start(handler: EffectHandler, config: &DispatcherConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let state = Arc::new(DispatchState::new());
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));

        tokio::spawn(Self::run(rx, handler.clone(), state.clone(), permits));

        debug!(
            "EffectDispatcher started with queue capacity {} and concurrency {}",
            config.queue_capacity, config.max_concurrency
        );

        Arc::new(Self { tx, state, handler })
    }

    async fn run(
        mut rx: mpsc::Receiver<LinkEvent>,
        handler: EffectHandler,
        state: Arc<DispatchState>,
        permits: Arc<Semaphore>,
    ) {
        while let Some(event) = rx.recv().await {
            let Ok(permit) = permits.clone().acquire_owned().await else {
                break;
            };
            let handler = handler.clone();
            let state = state.clone();
            tokio::spawn(async move {
                let _permit = permit;
                Self::apply_tracked(&handler, &state, event).await;
            });
        }
        debug!("EffectDispatcher loop stopped");
    }

    async fn apply_tracked(handler: &EffectHandler, state: &DispatchState, event: LinkEvent) {
        match handler.apply(&event).await {
            Ok(()) => {
                state.applied.fetch_add(1, Ordering::Relaxed);
                trace!("Applied {} event for {}", event.kind(), event.record().key);
            }
            Err(e) => {
                state.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Failed to apply {} event for {}: {}",
                    event.kind(),
                    event.record().key,
                    e
                );
            }
        }
        state.finish_one();
    }

    /// 投递事件，立即返回
    pub fn dispatch(&self, event: LinkEvent) {
        self.state.pending.fetch_add(1, Ordering::SeqCst);

        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.state.overflowed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Effect queue full, applying {} event for {} out of band",
                    event.kind(),
                    event.record().key
                );
                let handler = self.handler.clone();
                let state = self.state.clone();
                tokio::spawn(async move {
                    Self::apply_tracked(&handler, &state, event).await;
                });
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    "Effect queue closed, dropping {} event for {}",
                    event.kind(),
                    event.record().key
                );
                self.state.finish_one();
            }
        }
    }

    /// 等待所有已投递事件执行完毕
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.state.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            pending: self.state.pending.load(Ordering::SeqCst),
            applied: self.state.applied.load(Ordering::Relaxed),
            failed: self.state.failed.load(Ordering::Relaxed),
            overflowed: self.state.overflowed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InteractionType, LinkRecord};
    use crate::store::{KvStore, MemoryStore};

    struct Fixture {
        memory: Arc<MemoryStore>,
        links: LinkStore,
        stats: StatsAggregator,
        dispatcher: Arc<EffectDispatcher>,
    }

    fn setup(capacity: usize) -> Fixture {
        let memory = Arc::new(MemoryStore::new());
        let links = LinkStore::new(memory.clone(), "http://localhost");
        let stats = StatsAggregator::new(memory.clone());
        let config = DispatcherConfig {
            queue_capacity: capacity,
            max_concurrency: 4,
            drain_timeout_secs: 1,
        };
        let dispatcher =
            EffectDispatcher::start(EffectHandler::new(links.clone(), stats.clone()), &config);
        Fixture {
            memory,
            links,
            stats,
            dispatcher,
        }
    }

    async fn stored(links: &LinkStore) -> LinkRecord {
        links
            .put("abcde", "http://example.com/a", "e1", "u1", InteractionType::Invite)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_wait_idle_without_events() {
        let f = setup(8);
        f.dispatcher.wait_idle().await;
        assert_eq!(f.dispatcher.stats(), DispatcherStats::default());
    }

    #[tokio::test]
    async fn test_clicks_are_applied() {
        let f = setup(8);
        let record = stored(&f.links).await;
        f.dispatcher.dispatch(LinkEvent::Created(record.clone()));
        for _ in 0..3 {
            f.dispatcher.dispatch(LinkEvent::Clicked(record.clone()));
        }
        f.dispatcher.wait_idle().await;

        assert_eq!(f.links.get("abcde").await.unwrap().clicks, 3);
        let event = f.stats.event_stats("e1").await.unwrap();
        assert_eq!(event.invites_count, 1);
        assert_eq!(event.invites_clicks, 3);
        assert_eq!(f.dispatcher.stats().applied, 4);
    }

    #[tokio::test]
    async fn test_overflow_is_not_dropped() {
        let f = setup(1);
        let record = stored(&f.links).await;
        for _ in 0..50 {
            f.dispatcher.dispatch(LinkEvent::Clicked(record.clone()));
        }
        f.dispatcher.wait_idle().await;

        assert_eq!(f.links.get("abcde").await.unwrap().clicks, 50);
        let snapshot = f.dispatcher.stats();
        assert_eq!(snapshot.applied, 50);
        assert_eq!(snapshot.pending, 0);
    }

    #[tokio::test]
    async fn test_failures_are_logged_and_counted() {
        let f = setup(8);
        let record = stored(&f.links).await;

        // Clicks 不是整数时 HINCRBY 失败
        f.memory
            .hset_multiple("link:abcde", &[("Clicks", "many".to_string())])
            .await
            .unwrap();

        f.dispatcher.dispatch(LinkEvent::Clicked(record));
        f.dispatcher.wait_idle().await;

        let snapshot = f.dispatcher.stats();
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.pending, 0);
        // 统计部分照常写入
        assert_eq!(f.stats.event_stats("e1").await.unwrap().invites_clicks, 1);
    }
}
