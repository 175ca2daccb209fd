use std::sync::Arc;

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, trace};

use super::frontend::FrontendService;
use super::links::LinksService;
use crate::api::response::error_response;
use crate::config::RoutesConfig;
use crate::services::LinkService;
use crate::utils::is_valid_alias;

pub struct RedirectService;

impl RedirectService {
    /// 兜底路由
    ///
    /// - 空路径：默认文档
    /// - `{alias}+`：短链详情
    /// - `{alias}`：307 跳转（HEAD 不计点击）
    /// - 其它：静态文件
    pub async fn handle_path(
        req: HttpRequest,
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        routes: web::Data<RoutesConfig>,
    ) -> HttpResponse {
        let captured_path = path.into_inner();

        if let Some(alias) = captured_path.strip_suffix('+')
            && is_valid_alias(alias)
        {
            return LinksService::info_response(&links, &routes, alias).await;
        }

        if is_valid_alias(&captured_path) {
            return Self::process_redirect(&req, &captured_path, &links, &routes).await;
        }

        FrontendService::serve(&routes, &captured_path).await
    }

    async fn process_redirect(
        req: &HttpRequest,
        alias: &str,
        links: &LinkService,
        routes: &RoutesConfig,
    ) -> HttpResponse {
        let result = if req.method() == Method::HEAD {
            links.info(alias).await
        } else {
            links.resolve(alias).await
        };

        match result {
            Ok(link) => {
                trace!("Redirecting {} -> {}", alias, link.long_url);
                Self::finish_redirect(&link.long_url)
            }
            Err(e) => {
                debug!("Redirect lookup failed for {}: {}", alias, e);
                error_response(&e, routes, StatusCode::TEMPORARY_REDIRECT)
            }
        }
    }

    #[inline]
    fn finish_redirect(location: &str) -> HttpResponse {
        HttpResponse::TemporaryRedirect()
            .insert_header(("Location", location))
            .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
            .finish()
    }
}
