//! 异步副作用处理
//!
//! 点击计数与统计聚合不阻塞 HTTP 响应：请求处理器只负责投递 `LinkEvent`，
//! 由后台任务应用到存储。调用方不能假设响应返回前副作用已经完成。

pub mod dispatcher;

use crate::models::LinkRecord;

pub use dispatcher::{DispatcherStats, EffectDispatcher, EffectHandler};

/// 需要异步应用的副作用
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// 新短链已创建：更新用户/事件的创建统计
    Created(LinkRecord),
    /// 短链被解析：点击数 +1，并更新用户/事件的点击统计
    Clicked(LinkRecord),
}

impl LinkEvent {
    pub fn record(&self) -> &LinkRecord {
        match self {
            LinkEvent::Created(record) | LinkEvent::Clicked(record) => record,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LinkEvent::Created(_) => "created",
            LinkEvent::Clicked(_) => "clicked",
        }
    }
}
