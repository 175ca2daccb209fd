use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::api::response::error_response;
use crate::config::RoutesConfig;
use crate::services::LinkService;

/// 用户 / 事件统计查询
pub struct StatsService;

impl StatsService {
    /// `GET /user/{id}` -> `{invites, shares, attends}`
    pub async fn user_stats(
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        let user_id = path.into_inner();
        trace!("User stats request: {}", user_id);

        match links.user_stats(&user_id).await {
            Ok(stats) => HttpResponse::Ok().json(stats),
            Err(e) => error_response(&e, &routes, StatusCode::NOT_FOUND),
        }
    }

    /// `GET /event/{id}` -> 六个计数
    pub async fn event_stats(
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        let event_id = path.into_inner();
        trace!("Event stats request: {}", event_id);

        match links.event_stats(&event_id).await {
            Ok(stats) => HttpResponse::Ok().json(stats),
            Err(e) => error_response(&e, &routes, StatusCode::NOT_FOUND),
        }
    }
}
