//! 短链创建与查询接口

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::api::response::{error_response, fallback_response};
use crate::config::RoutesConfig;
use crate::models::InteractionType;
use crate::services::{LinkService, ShortenRequest};
use crate::utils::is_valid_alias;

/// `/shorten` 的查询参数（POST 时也可放在表单里）
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ShortenParams {
    /// 目标地址；优先于路径中的 `{url}`，目标自带查询串时只能用这种方式
    pub url: Option<String>,
    pub user: Option<String>,
    pub eventid: Option<String>,
    #[serde(rename = "type")]
    pub interaction: Option<String>,
}

impl ShortenParams {
    /// 表单中的非空值覆盖查询串
    fn merge(mut self, form: Option<ShortenParams>) -> Self {
        let Some(form) = form else {
            return self;
        };
        fn pick(current: &mut Option<String>, other: Option<String>) {
            if let Some(value) = other.filter(|v| !v.is_empty()) {
                *current = Some(value);
            }
        }
        pick(&mut self.url, form.url);
        pick(&mut self.user, form.user);
        pick(&mut self.eventid, form.eventid);
        pick(&mut self.interaction, form.interaction);
        self
    }

    fn into_request(self, path_url: String) -> ShortenRequest {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(path_url);
        ShortenRequest {
            url,
            user_id: self.user.unwrap_or_default(),
            event_id: self.eventid.unwrap_or_default(),
            interaction: InteractionType::from(self.interaction.unwrap_or_default()),
        }
    }
}

pub struct LinksService;

impl LinksService {
    /// `GET|POST /shorten/{url}`
    pub async fn shorten(
        path: Option<web::Path<String>>,
        query: web::Query<ShortenParams>,
        form: Option<web::Form<ShortenParams>>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        let path_url = path.map(|p| p.into_inner()).unwrap_or_default();
        let request = query
            .into_inner()
            .merge(form.map(|f| f.into_inner()))
            .into_request(path_url);
        trace!("Shorten request: {:?}", request);

        match links.shorten(request).await {
            Ok(result) => HttpResponse::Ok().json(result.link),
            Err(e) => error_response(&e, &routes, StatusCode::NOT_FOUND),
        }
    }

    /// `GET /info/{alias}`
    pub async fn info(
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        Self::info_response(&links, &routes, &path.into_inner()).await
    }

    /// 返回短链详情，不计点击；`/info/{alias}` 与 `/{alias}+` 共用
    pub async fn info_response(links: &LinkService, routes: &RoutesConfig, alias: &str) -> HttpResponse {
        if !is_valid_alias(alias) {
            debug!("Rejected info request for invalid alias: {}", alias);
            return fallback_response(StatusCode::NOT_FOUND, &routes.fallback_url);
        }

        match links.info(alias).await {
            Ok(link) => HttpResponse::Ok().json(link),
            Err(e) => error_response(&e, routes, StatusCode::NOT_FOUND),
        }
    }

    /// `GET /latest`
    pub async fn latest(
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        Self::latest_response(&links, &routes, None).await
    }

    /// `GET /latest/{n}`
    pub async fn latest_limited(
        path: web::Path<usize>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        Self::latest_response(&links, &routes, Some(path.into_inner())).await
    }

    async fn latest_response(
        links: &LinkService,
        routes: &RoutesConfig,
        limit: Option<usize>,
    ) -> HttpResponse {
        match links.latest(limit).await {
            Ok(records) => HttpResponse::Ok().json(records),
            Err(e) => error_response(&e, routes, StatusCode::NOT_FOUND),
        }
    }
}
