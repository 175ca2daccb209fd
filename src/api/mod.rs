//! HTTP 接口层
//!
//! 处理器通过 `web::Data` 获取依赖：
//! - `Arc<LinkService>`：短链与统计业务
//! - `Arc<dyn KvStore>`：健康检查直接 ping 存储
//! - `RoutesConfig`：回退地址与静态文件目录
//! - `AppStartTime`：运行时长

pub mod response;
pub mod services;

pub use services::configure_routes;
