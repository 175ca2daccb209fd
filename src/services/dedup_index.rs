use std::sync::Arc;

use tracing::trace;

use crate::errors::{KurzError, Result};
use crate::models::InteractionType;
use crate::store::KvStore;
use crate::store::keys::dedup_key;

/// 去重索引：(user, type, 规范化 URL) -> alias
///
/// 同一三元组重复申请短链时直接返回已有 alias。
#[derive(Clone)]
pub struct DedupIndex {
    store: Arc<dyn KvStore>,
}

impl DedupIndex {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn lookup(
        &self,
        user_id: &str,
        interaction: &InteractionType,
        long_url: &str,
    ) -> Result<String> {
        match self
            .store
            .get(&dedup_key(user_id, interaction, long_url))
            .await?
        {
            Some(alias) if !alias.is_empty() => Ok(alias),
            _ => Err(KurzError::not_found(format!(
                "no link for user '{}' type '{}' url '{}'",
                user_id, interaction, long_url
            ))),
        }
    }

    /// 写入映射（仅当三元组尚无映射时）
    ///
    /// 返回 false 表示并发请求已抢先写入，调用方应改用 `lookup` 的结果。
    pub async fn record(
        &self,
        user_id: &str,
        interaction: &InteractionType,
        long_url: &str,
        alias: &str,
    ) -> Result<bool> {
        let written = self
            .store
            .set_nx(&dedup_key(user_id, interaction, long_url), alias)
            .await?;
        trace!(
            "Dedup entry {} for ({}, {}, {}) -> {}",
            if written { "recorded" } else { "already present" },
            user_id,
            interaction,
            long_url,
            alias
        );
        Ok(written)
    }

    /// 覆盖已有映射，仅用于修复指向缺失记录的去重项
    pub async fn replace(
        &self,
        user_id: &str,
        interaction: &InteractionType,
        long_url: &str,
        alias: &str,
    ) -> Result<()> {
        self.store
            .set(&dedup_key(user_id, interaction, long_url), alias)
            .await
    }
}
