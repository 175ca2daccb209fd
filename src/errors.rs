use std::fmt;

#[derive(Debug, Clone)]
pub enum KurzError {
    InvalidUrl(String),
    NotFound(String),
    StoreUnavailable(String),
    StoreOperation(String),
    AliasExhausted(String),
    Config(String),
    FileOperation(String),
    Serialization(String),
}

impl KurzError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            KurzError::InvalidUrl(_) => "E001",
            KurzError::NotFound(_) => "E002",
            KurzError::StoreUnavailable(_) => "E003",
            KurzError::StoreOperation(_) => "E004",
            KurzError::AliasExhausted(_) => "E005",
            KurzError::Config(_) => "E006",
            KurzError::FileOperation(_) => "E007",
            KurzError::Serialization(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            KurzError::InvalidUrl(_) => "Invalid URL",
            KurzError::NotFound(_) => "Resource Not Found",
            KurzError::StoreUnavailable(_) => "Store Unavailable",
            KurzError::StoreOperation(_) => "Store Operation Error",
            KurzError::AliasExhausted(_) => "Alias Space Exhausted",
            KurzError::Config(_) => "Configuration Error",
            KurzError::FileOperation(_) => "File Operation Error",
            KurzError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            KurzError::InvalidUrl(msg) => msg,
            KurzError::NotFound(msg) => msg,
            KurzError::StoreUnavailable(msg) => msg,
            KurzError::StoreOperation(msg) => msg,
            KurzError::AliasExhausted(msg) => msg,
            KurzError::Config(msg) => msg,
            KurzError::FileOperation(msg) => msg,
            KurzError::Serialization(msg) => msg,
        }
    }

    /// 后端故障（连接、超时、容量）而非调用方输入问题
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            KurzError::StoreUnavailable(_)
                | KurzError::StoreOperation(_)
                | KurzError::AliasExhausted(_)
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for KurzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for KurzError {}

// 便捷的构造函数
impl KurzError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        KurzError::InvalidUrl(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        KurzError::NotFound(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        KurzError::StoreUnavailable(msg.into())
    }

    pub fn store_operation<T: Into<String>>(msg: T) -> Self {
        KurzError::StoreOperation(msg.into())
    }

    pub fn alias_exhausted<T: Into<String>>(msg: T) -> Self {
        KurzError::AliasExhausted(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        KurzError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        KurzError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        KurzError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<redis::RedisError> for KurzError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            KurzError::StoreUnavailable(err.to_string())
        } else {
            KurzError::StoreOperation(err.to_string())
        }
    }
}

impl From<std::io::Error> for KurzError {
    fn from(err: std::io::Error) -> Self {
        KurzError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for KurzError {
    fn from(err: serde_json::Error) -> Self {
        KurzError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for KurzError {
    fn from(err: config::ConfigError) -> Self {
        KurzError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KurzError>;
