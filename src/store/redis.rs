use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use super::KvStore;
use super::keys::escape_glob;
use crate::config::RedisConfig;
use crate::errors::{KurzError, Result};

/// SCAN 每批返回的键数量提示
const SCAN_BATCH: usize = 200;

pub struct RedisStore {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStore {
    /// 创建客户端并用 PING 验证连接
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.clone()).map_err(|e| {
            KurzError::config(format!("Invalid redis url '{}': {}", config.url, e))
        })?;

        let store = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
        };

        if let Err(e) = store.ping().await {
            error!(
                "Failed to ping Redis server: {}. Check Redis server status and store.redis.url",
                e
            );
            return Err(e);
        }

        debug!("RedisStore created with prefix: '{}'", store.key_prefix);
        Ok(store)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| KurzError::store_unavailable(e.to_string()))?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 执行一条命令；连接类错误时重置连接，下次调用重新建立
    async fn query<T: redis::FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T> {
        let mut conn = self.get_connection().await?;
        match cmd.query_async::<T>(&mut conn).await {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("Redis command failed: {}", e);
                if e.is_connection_dropped() || e.is_io_error() || e.is_timeout() {
                    self.reset_connection().await;
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("HSET");
        cmd.arg(self.make_key(key));
        for (field, value) in fields {
            cmd.arg(*field).arg(value);
        }
        self.query::<i64>(cmd).await?;
        trace!("HSET {} ({} fields)", key, fields.len());
        Ok(())
    }

    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut cmd = redis::cmd("HSETNX");
        cmd.arg(self.make_key(key)).arg(field).arg(value);
        self.query::<bool>(cmd).await
    }

    async fn hmget(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(self.make_key(key)).arg(fields);
        self.query::<Vec<Option<String>>>(cmd).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(self.make_key(key));
        self.query::<HashMap<String, String>>(cmd).await
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut cmd = redis::cmd("HEXISTS");
        cmd.arg(self.make_key(key)).arg(field);
        self.query::<bool>(cmd).await
    }

    async fn hincr(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        let mut cmd = redis::cmd("HINCRBY");
        cmd.arg(self.make_key(key)).arg(field).arg(delta);
        self.query::<i64>(cmd).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(self.make_key(key));
        self.query::<Option<String>>(cmd).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.make_key(key)).arg(value);
        self.query::<()>(cmd).await
    }

    async fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        let mut cmd = redis::cmd("SETNX");
        cmd.arg(self.make_key(key)).arg(value);
        self.query::<bool>(cmd).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}*", escape_glob(&self.make_key(prefix)));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            let (next, batch): (u64, Vec<String>) = self.query(cmd).await?;

            keys.extend(
                batch
                    .into_iter()
                    .filter_map(|k| k.strip_prefix(&self.key_prefix).map(str::to_string)),
            );

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN 可能重复返回同一个键
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }

    async fn ping(&self) -> Result<()> {
        let response: String = self.query(redis::cmd("PING")).await?;
        trace!("Redis PING -> {}", response);
        Ok(())
    }
}
