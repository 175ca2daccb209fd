//! 键值存储适配层
//!
//! 存储本身是外部依赖（生产环境为 Redis），这里只定义核心逻辑需要的最小原语：
//! 哈希字段的读写/自增/存在性检查、字符串键读写，以及键枚举。
//! 单个字段的写入与自增是原子的；跨字段、跨键没有事务保证。

pub mod keys;
pub mod memory;
pub mod redis;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::errors::{KurzError, Result};

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// 后端名称（用于日志与健康检查）
    fn backend_name(&self) -> &'static str;

    /// 一次写入多个哈希字段（已存在的字段被覆盖）
    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<()>;

    /// 字段不存在时才写入，返回是否写入成功
    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// 批量读取字段，顺序与 `fields` 一致
    async fn hmget(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>>;

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    /// 原子自增，字段不存在时按 0 计算，返回自增后的值
    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// 键不存在时才写入，返回是否写入成功
    async fn set_nx(&self, key: &str, value: &str) -> Result<bool>;

    /// 枚举以 `prefix` 开头的所有键（全量扫描，仅适合小规模数据）
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    async fn ping(&self) -> Result<()>;
}

/// 根据配置创建存储后端
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend.as_str() {
        "redis" => {
            let store = RedisStore::connect(&config.redis).await?;
            info!("Using redis store (prefix '{}')", config.redis.key_prefix);
            Ok(Arc::new(store))
        }
        "memory" => {
            warn!("Using in-memory store, data will be lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        other => Err(KurzError::config(format!(
            "Unknown store backend: '{}'. Valid: redis, memory",
            other
        ))),
    }
}
