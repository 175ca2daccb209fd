//! 短链接记录存储
//!
//! 每个短码对应一个哈希键 `link:<alias>`，字段：
//! LongUrl, EventId, UserId, Type, ShortUrl, CreationDate, Clicks。
//! `ShortUrl` 兼作存在性标记：短码预留时先原子写入该字段。

use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{KurzError, Result};
use crate::models::{InteractionType, LinkRecord};
use crate::store::KvStore;
use crate::store::keys::{LINK_PREFIX, alias_from_link_key, link_key};

pub const FIELD_LONG_URL: &str = "LongUrl";
pub const FIELD_EVENT_ID: &str = "EventId";
pub const FIELD_USER_ID: &str = "UserId";
pub const FIELD_TYPE: &str = "Type";
pub const FIELD_SHORT_URL: &str = "ShortUrl";
pub const FIELD_CREATION_DATE: &str = "CreationDate";
pub const FIELD_CLICKS: &str = "Clicks";

/// 存在性标记字段
pub const MARKER_FIELD: &str = FIELD_SHORT_URL;

const ALL_FIELDS: [&str; 7] = [
    FIELD_LONG_URL,
    FIELD_EVENT_ID,
    FIELD_USER_ID,
    FIELD_TYPE,
    FIELD_SHORT_URL,
    FIELD_CREATION_DATE,
    FIELD_CLICKS,
];

#[derive(Clone)]
pub struct LinkStore {
    store: Arc<dyn KvStore>,
    /// ShortUrl 前缀，例如 `http://localhost`
    public_base: String,
}

impl LinkStore {
    pub fn new(store: Arc<dyn KvStore>, public_base: impl Into<String>) -> Self {
        Self {
            store,
            public_base: public_base.into(),
        }
    }

    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.public_base, alias)
    }

    /// 原子预留短码：只有存在性标记不存在时才写入
    ///
    /// 返回 false 表示短码已被占用。
    pub async fn reserve(&self, alias: &str) -> Result<bool> {
        self.store
            .hset_nx(&link_key(alias), MARKER_FIELD, &self.short_url(alias))
            .await
    }

    pub async fn exists(&self, alias: &str) -> Result<bool> {
        self.store.hexists(&link_key(alias), MARKER_FIELD).await
    }

    /// 创建并写入一条新记录（Clicks = 0，CreationDate = 当前纳秒时间）
    ///
    /// 存储层允许覆盖同名短码；正常流程中调用方已通过 `reserve` 保证唯一。
    pub async fn put(
        &self,
        alias: &str,
        long_url: &str,
        event_id: &str,
        user_id: &str,
        interaction: InteractionType,
    ) -> Result<LinkRecord> {
        let record = LinkRecord {
            key: alias.to_string(),
            short_url: self.short_url(alias),
            long_url: long_url.to_string(),
            event_id: event_id.to_string(),
            user_id: user_id.to_string(),
            interaction,
            creation_date: chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            clicks: 0,
        };

        let fields = [
            (FIELD_LONG_URL, record.long_url.clone()),
            (FIELD_EVENT_ID, record.event_id.clone()),
            (FIELD_USER_ID, record.user_id.clone()),
            (FIELD_TYPE, record.interaction.to_string()),
            (FIELD_SHORT_URL, record.short_url.clone()),
            (FIELD_CREATION_DATE, record.creation_date.to_string()),
            (FIELD_CLICKS, record.clicks.to_string()),
        ];
        self.store.hset_multiple(&link_key(alias), &fields).await?;

        debug!("Stored link {} -> {}", alias, record.long_url);
        Ok(record)
    }

    /// 一次批量读取全部 7 个字段
    ///
    /// 标记字段缺失、或任意字段缺失/无法解析，均视为 NotFound。
    pub async fn get(&self, alias: &str) -> Result<LinkRecord> {
        let values = self.store.hmget(&link_key(alias), &ALL_FIELDS).await?;

        match Self::parse_record(alias, values) {
            Some(record) => Ok(record),
            None => {
                trace!("Link not found or incomplete: {}", alias);
                Err(KurzError::not_found(format!("unknown key: {}", alias)))
            }
        }
    }

    fn parse_record(alias: &str, values: Vec<Option<String>>) -> Option<LinkRecord> {
        let [long_url, event_id, user_id, interaction, short_url, creation_date, clicks]: [Option<String>; 7] =
            values.try_into().ok()?;

        Some(LinkRecord {
            key: alias.to_string(),
            short_url: short_url?,
            long_url: long_url?,
            event_id: event_id?,
            user_id: user_id?,
            interaction: InteractionType::from(interaction?),
            creation_date: creation_date?.parse().ok()?,
            clicks: clicks?.parse().ok()?,
        })
    }

    /// 点击数原子 +1（依赖存储自身的 HINCRBY，绝不读-改-写）
    pub async fn increment_clicks(&self, alias: &str) -> Result<i64> {
        self.store.hincr(&link_key(alias), FIELD_CLICKS, 1).await
    }

    /// 枚举全部短码（全量扫描）
    pub async fn aliases(&self) -> Result<Vec<String>> {
        let keys = self.store.scan_prefix(LINK_PREFIX).await?;
        Ok(keys
            .iter()
            .filter_map(|k| alias_from_link_key(k))
            .map(str::to_string)
            .collect())
    }
}
