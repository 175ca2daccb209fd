use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::analytics::DispatcherStats;
use crate::services::LinkService;
use crate::store::KvStore;

/// 存储 ping 超时
const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthStoreCheck {
    pub status: String,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub store: HealthStoreCheck,
    pub dispatcher: DispatcherStats,
    pub response_time_ms: u32,
}

/// Health Service
///
/// 直接 ping 存储，不经过 LinkService 的业务逻辑。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<dyn KvStore>>,
        links: web::Data<Arc<LinkService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        let start_time = Instant::now();
        trace!("Received health check request");

        let backend = store.backend_name();
        let store_check = match tokio::time::timeout(STORE_CHECK_TIMEOUT, store.ping()).await {
            Ok(Ok(())) => HealthStoreCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Store health check failed: {}", e);
                HealthStoreCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!("Store health check timeout");
                HealthStoreCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let is_healthy = store_check.error.is_none();
        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            store: store_check,
            dispatcher: links.dispatcher().stats(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            body.status,
            uptime
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        HttpResponse::build(status).json(body)
    }
}
