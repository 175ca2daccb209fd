//! 逻辑键布局
//!
//! - `link:<alias>`                 短链接哈希（7 个字段）
//! - `dedup:<user>:<type>:<url>`    去重索引，值为 alias
//! - `user:<user>:<type>`           用户统计哈希，url -> 点击数
//! - `event:<event>`                事件统计哈希，6 个计数器
//!
//! 自由文本部分做百分号编码，避免 `:` 造成键冲突。

use crate::models::InteractionType;

pub const LINK_PREFIX: &str = "link:";
pub const DEDUP_PREFIX: &str = "dedup:";
pub const USER_PREFIX: &str = "user:";
pub const EVENT_PREFIX: &str = "event:";

#[inline]
fn encode(part: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(part)
}

pub fn link_key(alias: &str) -> String {
    format!("{}{}", LINK_PREFIX, alias)
}

/// 从 link 键还原 alias
pub fn alias_from_link_key(key: &str) -> Option<&str> {
    key.strip_prefix(LINK_PREFIX).filter(|s| !s.is_empty())
}

pub fn dedup_key(user_id: &str, interaction: &InteractionType, long_url: &str) -> String {
    format!(
        "{}{}:{}:{}",
        DEDUP_PREFIX,
        encode(user_id),
        encode(interaction.as_str()),
        encode(long_url)
    )
}

pub fn user_stats_key(user_id: &str, interaction: &InteractionType) -> String {
    format!(
        "{}{}:{}",
        USER_PREFIX,
        encode(user_id),
        encode(interaction.as_str())
    )
}

pub fn event_stats_key(event_id: &str) -> String {
    format!("{}{}", EVENT_PREFIX, encode(event_id))
}

/// 转义 Redis glob 元字符
pub fn escape_glob(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_key_roundtrip() {
        let key = link_key("aB3x9");
        assert_eq!(key, "link:aB3x9");
        assert_eq!(alias_from_link_key(&key), Some("aB3x9"));
        assert_eq!(alias_from_link_key("link:"), None);
        assert_eq!(alias_from_link_key("event:e1"), None);
    }

    #[test]
    fn test_colons_do_not_collide() {
        let a = dedup_key("u:1", &InteractionType::Share, "http://x/");
        let b = dedup_key("u", &InteractionType::Unknown("1:share".into()), "http://x/");
        assert_ne!(a, b);
    }

    #[test]
    fn test_user_stats_key_per_type() {
        assert_eq!(
            user_stats_key("u1", &InteractionType::Invite),
            "user:u1:invite"
        );
        assert_ne!(
            user_stats_key("u1", &InteractionType::Invite),
            user_stats_key("u1", &InteractionType::Share)
        );
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("kurz:"), "kurz:");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }
}
