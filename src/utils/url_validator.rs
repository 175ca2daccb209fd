//! URL 校验与规范化
//!
//! 缺少协议时补全默认协议，阻止危险协议，最终以 `url` crate 的规范形式存储。

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for crate::errors::KurzError {
    fn from(err: UrlValidationError) -> Self {
        crate::errors::KurzError::invalid_url(err.to_string())
    }
}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 输入是否以 `scheme://` 开头（路径或查询里嵌套的 URL 不算）
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// 校验并规范化长链接
///
/// 1. 去除首尾空白，空串拒绝
/// 2. 拒绝危险协议（javascript:, data:, file: 等）
/// 3. 没有 `scheme://` 时补全 `default_scheme`
/// 4. 只允许 http / https
/// 5. 能被解析为合法 URL，返回规范化字符串
pub fn normalize_url(raw: &str, default_scheme: &str) -> Result<String, UrlValidationError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let lower = raw.to_lowercase();
    for proto in DANGEROUS_PROTOCOLS {
        if lower.starts_with(proto) {
            return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
        }
    }

    let candidate = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("{}://{}", default_scheme, raw)
    };

    let parsed =
        Url::parse(&candidate).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(format!("{}:", other))),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat("missing host".to_string()));
    }

    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_prepended() {
        assert_eq!(
            normalize_url("example.com/a", "http").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("example.com/a", "https").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_scheme_is_prepended_with_nested_url() {
        assert_eq!(
            normalize_url("example.com/redirect?to=https://other.org/x", "http").unwrap(),
            "http://example.com/redirect?to=https://other.org/x"
        );
        assert_eq!(
            normalize_url("web.archive.org/web/2020/https://example.com/", "http").unwrap(),
            "http://web.archive.org/web/2020/https://example.com/"
        );
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("svn+ssh://host/repo"));
        assert!(!has_scheme("example.com/a"));
        assert!(!has_scheme("example.com/?u=http://x"));
        assert!(!has_scheme("://example.com"));
    }

    #[test]
    fn test_existing_scheme_kept() {
        assert_eq!(
            normalize_url("https://example.com/path?query=1", "http").unwrap(),
            "https://example.com/path?query=1"
        );
        assert_eq!(
            normalize_url("HTTP://Example.com", "http").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            normalize_url("  example.com  ", "http").unwrap(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(normalize_url("", "http"), Err(UrlValidationError::EmptyUrl));
        assert_eq!(normalize_url("   ", "http"), Err(UrlValidationError::EmptyUrl));
    }

    #[test]
    fn test_dangerous_protocols() {
        assert!(matches!(
            normalize_url("javascript:alert(1)", "http"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            normalize_url("JAVASCRIPT:alert(1)", "http"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            normalize_url("file:///etc/passwd", "http"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
    }

    #[test]
    fn test_invalid_protocols() {
        assert!(matches!(
            normalize_url("ftp://example.com", "http"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_unparsable() {
        assert!(matches!(
            normalize_url("http://exa mple.com", "http"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            normalize_url("http://", "http"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }
}
