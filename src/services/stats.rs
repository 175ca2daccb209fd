//! 统计聚合
//!
//! - 用户维度：`user:<user>:<type>` 哈希，longUrl -> 点击数
//! - 事件维度：`event:<event>` 哈希，{Invite,Share,Attend} × {Count,Clicks}
//!
//! 所有写入都是单字段原子操作（HSETNX / HINCRBY），不做读-改-写。
//! `InteractionType::Unknown` 不参与聚合，直接跳过。

use std::sync::Arc;

use tracing::trace;

use crate::errors::Result;
use crate::models::{EventStats, InteractionType, UserStats};
use crate::store::KvStore;
use crate::store::keys::{event_stats_key, user_stats_key};

/// 事件哈希中的全部计数字段
const EVENT_FIELDS: [&str; 6] = [
    "InviteCount",
    "InviteClicks",
    "ShareCount",
    "ShareClicks",
    "AttendCount",
    "AttendClicks",
];

#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn KvStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 新短链创建
    ///
    /// 用户哈希中 `longUrl` 不存在时置 0；事件哈希懒初始化 6 个计数器为 0，
    /// 再对对应类型的 Count 自增。
    pub async fn on_create(
        &self,
        user_id: &str,
        event_id: &str,
        long_url: &str,
        interaction: &InteractionType,
    ) -> Result<()> {
        let Some(fields) = interaction.stat_fields() else {
            trace!("Skipping create stats for untracked type '{}'", interaction);
            return Ok(());
        };

        self.store
            .hset_nx(&user_stats_key(user_id, interaction), long_url, "0")
            .await?;

        let event_key = event_stats_key(event_id);
        self.ensure_event_counters(&event_key).await?;
        self.store.hincr(&event_key, fields.created, 1).await?;
        Ok(())
    }

    /// 短链被点击：用户哈希与事件哈希各自原子 +1
    pub async fn on_click(
        &self,
        user_id: &str,
        event_id: &str,
        long_url: &str,
        interaction: &InteractionType,
    ) -> Result<()> {
        let Some(fields) = interaction.stat_fields() else {
            trace!("Skipping click stats for untracked type '{}'", interaction);
            return Ok(());
        };

        self.store
            .hincr(&user_stats_key(user_id, interaction), long_url, 1)
            .await?;
        self.store
            .hincr(&event_stats_key(event_id), fields.clicks, 1)
            .await?;
        Ok(())
    }

    /// 读取用户统计；从未初始化时返回空 map
    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let mut stats = UserStats::default();

        for interaction in InteractionType::TRACKED {
            let raw = self
                .store
                .hgetall(&user_stats_key(user_id, &interaction))
                .await?;
            if let Some(target) = stats.for_type_mut(&interaction) {
                target.extend(
                    raw.into_iter()
                        .map(|(url, count)| (url, count.parse().unwrap_or(0))),
                );
            }
        }

        Ok(stats)
    }

    /// 读取事件统计；从未初始化时全部为 0
    pub async fn event_stats(&self, event_id: &str) -> Result<EventStats> {
        let values = self
            .store
            .hmget(&event_stats_key(event_id), &EVENT_FIELDS)
            .await?;

        let mut stats = EventStats::default();
        for (field, value) in EVENT_FIELDS.iter().zip(values) {
            let count = value.and_then(|v| v.parse().ok()).unwrap_or(0);
            stats.apply_field(field, count);
        }
        Ok(stats)
    }

    async fn ensure_event_counters(&self, event_key: &str) -> Result<()> {
        // 每个字段独立 HSETNX，与并发的 HINCRBY 交错也不会丢失计数
        for field in EVENT_FIELDS {
            self.store.hset_nx(event_key, field, "0").await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn aggregator() -> (Arc<MemoryStore>, StatsAggregator) {
        let memory = Arc::new(MemoryStore::new());
        (memory.clone(), StatsAggregator::new(memory))
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let (_, stats) = aggregator();
        assert_eq!(stats.user_stats("nobody").await.unwrap(), UserStats::default());
        assert_eq!(stats.event_stats("none").await.unwrap(), EventStats::default());
    }

    #[tokio::test]
    async fn test_create_initializes_counters() {
        let (memory, stats) = aggregator();
        stats
            .on_create("u1", "e1", "http://example.com/a", &InteractionType::Share)
            .await
            .unwrap();

        let event = stats.event_stats("e1").await.unwrap();
        assert_eq!(event.shares_count, 1);
        assert_eq!(event.invites_count, 0);
        assert_eq!(event.shares_clicks, 0);
        assert_eq!(memory.hgetall("event:e1").await.unwrap().len(), 6);

        let user = stats.user_stats("u1").await.unwrap();
        assert_eq!(user.shares.get("http://example.com/a"), Some(&0));
        assert!(user.invites.is_empty());
    }

    #[tokio::test]
    async fn test_counts_and_clicks() {
        let (_, stats) = aggregator();
        let invite = InteractionType::Invite;
        for i in 0..3 {
            stats
                .on_create("u1", "e1", &format!("http://example.com/{}", i), &invite)
                .await
                .unwrap();
        }
        for _ in 0..5 {
            stats
                .on_click("u1", "e1", "http://example.com/0", &invite)
                .await
                .unwrap();
        }

        let event = stats.event_stats("e1").await.unwrap();
        assert_eq!(event.invites_count, 3);
        assert_eq!(event.invites_clicks, 5);

        let user = stats.user_stats("u1").await.unwrap();
        assert_eq!(user.invites.len(), 3);
        assert_eq!(user.invites["http://example.com/0"], 5);
        assert_eq!(user.invites["http://example.com/1"], 0);
    }

    #[tokio::test]
    async fn test_repeated_create_keeps_click_count() {
        let (_, stats) = aggregator();
        let attend = InteractionType::Attend;
        stats.on_create("u1", "e1", "http://x/", &attend).await.unwrap();
        stats.on_click("u1", "e1", "http://x/", &attend).await.unwrap();
        stats.on_create("u1", "e1", "http://x/", &attend).await.unwrap();

        assert_eq!(stats.user_stats("u1").await.unwrap().attends["http://x/"], 1);
    }

    #[tokio::test]
    async fn test_unknown_type_is_ignored() {
        let (memory, stats) = aggregator();
        let like = InteractionType::Unknown("like".to_string());
        stats.on_create("u1", "e1", "http://x/", &like).await.unwrap();
        stats.on_click("u1", "e1", "http://x/", &like).await.unwrap();

        assert!(memory.is_empty());
        assert_eq!(stats.event_stats("e1").await.unwrap(), EventStats::default());
    }
}
