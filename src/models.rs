//! 短链接领域模型
//!
//! JSON 字段命名保持与现有客户端兼容：
//! - `LinkRecord` 使用 PascalCase（`LongUrl`, `ShortUrl`, ...）
//! - `EventStats` 使用 camelCase（`invitesCount`, ...）

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 交互类型
///
/// 只有 `Invite` / `Share` / `Attend` 参与统计聚合；其它取值保留原始字符串，
/// 照常创建短链接，但统计时跳过。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionType {
    Invite,
    Share,
    Attend,
    Unknown(String),
}

/// 单个交互类型对应的统计字段名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatFields {
    /// 事件哈希中的创建计数字段
    pub created: &'static str,
    /// 事件哈希中的点击计数字段
    pub clicks: &'static str,
}

impl InteractionType {
    /// 参与聚合的全部类型
    pub const TRACKED: [InteractionType; 3] = [
        InteractionType::Invite,
        InteractionType::Share,
        InteractionType::Attend,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Invite => "invite",
            Self::Share => "share",
            Self::Attend => "attend",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// 事件统计字段；`Unknown` 返回 None
    pub fn stat_fields(&self) -> Option<StatFields> {
        match self {
            Self::Invite => Some(StatFields {
                created: "InviteCount",
                clicks: "InviteClicks",
            }),
            Self::Share => Some(StatFields {
                created: "ShareCount",
                clicks: "ShareClicks",
            }),
            Self::Attend => Some(StatFields {
                created: "AttendCount",
                clicks: "AttendClicks",
            }),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for InteractionType {
    fn from(s: &str) -> Self {
        match s {
            "invite" => Self::Invite,
            "share" => Self::Share,
            "attend" => Self::Attend,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for InteractionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "invite" | "share" | "attend" => Self::from(s.as_str()),
            _ => Self::Unknown(s),
        }
    }
}

impl From<InteractionType> for String {
    fn from(t: InteractionType) -> Self {
        match t {
            InteractionType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for InteractionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// 短链接记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkRecord {
    /// 短码，同时是主键
    pub key: String,
    pub short_url: String,
    pub long_url: String,
    pub event_id: String,
    pub user_id: String,
    #[serde(rename = "Type")]
    pub interaction: InteractionType,
    /// 创建时间（Unix 纳秒）
    pub creation_date: i64,
    pub clicks: i64,
}

/// 用户统计：每种交互类型下 longUrl -> 点击数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub invites: BTreeMap<String, i64>,
    pub shares: BTreeMap<String, i64>,
    pub attends: BTreeMap<String, i64>,
}

impl UserStats {
    pub fn for_type_mut(&mut self, interaction: &InteractionType) -> Option<&mut BTreeMap<String, i64>> {
        match interaction {
            InteractionType::Invite => Some(&mut self.invites),
            InteractionType::Share => Some(&mut self.shares),
            InteractionType::Attend => Some(&mut self.attends),
            InteractionType::Unknown(_) => None,
        }
    }
}

/// 事件统计：三种交互类型 × {创建数, 点击数}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub invites_count: i64,
    pub shares_count: i64,
    pub attends_count: i64,
    pub invites_clicks: i64,
    pub shares_clicks: i64,
    pub attends_clicks: i64,
}

impl EventStats {
    /// 按统计字段名回填计数（未知字段忽略）
    pub fn apply_field(&mut self, field: &str, value: i64) {
        match field {
            "InviteCount" => self.invites_count = value,
            "ShareCount" => self.shares_count = value,
            "AttendCount" => self.attends_count = value,
            "InviteClicks" => self.invites_clicks = value,
            "ShareClicks" => self.shares_clicks = value,
            "AttendClicks" => self.attends_clicks = value,
            _ => {}
        }
    }
}
