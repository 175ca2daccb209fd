use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{KurzError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "kurz.toml";

/// 环境变量前缀，分隔符为 `__`
pub const ENV_PREFIX: &str = "KURZ";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - shortener: 对外短链域名、短码长度、重试上限
/// - routes: 回退地址与静态文件目录
/// - store: 键值存储后端
/// - dispatcher: 异步副作用队列
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：KURZ，分隔符：__
    /// 示例：KURZ__SERVER__PORT=9999
    ///
    /// 显式指定的配置文件必须存在；未指定时 `kurz.toml` 可选。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        use config::{Config, Environment, File};

        let file_source = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<()> {
        if self.shortener.alias_length == 0 {
            return Err(KurzError::config("shortener.alias_length must be at least 1"));
        }
        if self.shortener.max_alias_attempts == 0 {
            return Err(KurzError::config(
                "shortener.max_alias_attempts must be at least 1",
            ));
        }
        if self.shortener.public_host.trim().is_empty() {
            return Err(KurzError::config("shortener.public_host cannot be empty"));
        }
        if self.dispatcher.queue_capacity == 0 || self.dispatcher.max_concurrency == 0 {
            return Err(KurzError::config(
                "dispatcher.queue_capacity and dispatcher.max_concurrency must be at least 1",
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(KurzError::config(format!(
                "Invalid logging.format: '{}'. Valid: text, json",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 短链生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    /// 短链对外域名（可带端口），用于拼接 ShortUrl
    #[serde(default = "default_public_host")]
    pub public_host: String,
    #[serde(default = "default_scheme")]
    pub public_scheme: String,
    /// 输入 URL 缺少协议时补全的协议
    #[serde(default = "default_scheme")]
    pub default_scheme: String,
    #[serde(default = "default_alias_length")]
    pub alias_length: usize,
    /// 短码冲突时的最大重试次数
    #[serde(default = "default_max_alias_attempts")]
    pub max_alias_attempts: u32,
}

impl ShortenerConfig {
    /// ShortUrl 前缀，例如 `http://localhost`
    pub fn public_base(&self) -> String {
        format!(
            "{}://{}",
            self.public_scheme,
            self.public_host.trim_end_matches('/')
        )
    }
}

/// 路由配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// 短码不存在或 URL 非法时的回退地址
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// 静态文件目录，空字符串表示不提供静态文件
    #[serde(default)]
    pub static_directory: String,
    #[serde(default = "default_document")]
    pub default_document: String,
}

/// 存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// redis | memory
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// 数据库编号与密码写在 URL 中：redis://:password@host:6379/0
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 副作用分发队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// 关闭时等待队列排空的最长时间（秒）
    #[serde(default = "default_drain_timeout")]
    pub drain_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    9999
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_public_host() -> String {
    "localhost".to_string()
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_alias_length() -> usize {
    5
}

fn default_max_alias_attempts() -> u32 {
    10
}

fn default_fallback_url() -> String {
    "http://localhost:9999/index.htm".to_string()
}

fn default_document() -> String {
    "index.htm".to_string()
}

fn default_store_backend() -> String {
    "redis".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

fn default_redis_key_prefix() -> String {
    "kurz:".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_concurrency() -> usize {
    32
}

fn default_drain_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            public_host: default_public_host(),
            public_scheme: default_scheme(),
            default_scheme: default_scheme(),
            alias_length: default_alias_length(),
            max_alias_attempts: default_max_alias_attempts(),
        }
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            fallback_url: default_fallback_url(),
            static_directory: String::new(),
            default_document: default_document(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            redis: RedisConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_concurrency: default_max_concurrency(),
            drain_timeout_secs: default_drain_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
