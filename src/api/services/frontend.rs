use std::path::{Component, Path, PathBuf};

use actix_web::HttpResponse;
use tracing::{debug, trace, warn};

use crate::config::RoutesConfig;

/// 静态文件服务
///
/// 未匹配到短码的路径都落到这里，从 `routes.static_directory` 读取文件。
pub struct FrontendService;

impl FrontendService {
    /// 返回静态文件；空路径返回默认文档
    pub async fn serve(routes: &RoutesConfig, path: &str) -> HttpResponse {
        let file_name = if path.is_empty() {
            routes.default_document.as_str()
        } else {
            path
        };

        if routes.static_directory.is_empty() {
            trace!("Static directory not configured, rejecting {}", file_name);
            return Self::not_found_response();
        }

        let Some(full_path) = Self::resolve_path(&routes.static_directory, file_name) else {
            warn!("Rejected static path outside of root: {}", file_name);
            return Self::not_found_response();
        };

        match tokio::fs::read(&full_path).await {
            Ok(content) => {
                trace!("Serving static file: {}", full_path.display());
                HttpResponse::Ok()
                    .content_type(Self::get_content_type(file_name))
                    .body(content)
            }
            Err(e) => {
                debug!("Static file not found: {} ({})", full_path.display(), e);
                Self::not_found_response()
            }
        }
    }

    /// 拼接静态文件路径；包含 `..`、根目录或盘符时返回 None
    fn resolve_path(root: &str, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(Path::new(root).join(relative))
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body("File not found")
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("htm") | Some("html") => "text/html; charset=utf-8",
            Some("txt") => "text/plain; charset=utf-8",
            Some("css") => "text/css",
            Some("js") => "application/javascript",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            Some("woff") => "font/woff",
            Some("woff2") => "font/woff2",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_rejects_traversal() {
        assert!(FrontendService::resolve_path("/srv/www", "../etc/passwd").is_none());
        assert!(FrontendService::resolve_path("/srv/www", "css/../../secret").is_none());
        assert_eq!(
            FrontendService::resolve_path("/srv/www", "css/site.css"),
            Some(PathBuf::from("/srv/www/css/site.css"))
        );
        assert_eq!(
            FrontendService::resolve_path("/srv/www", "/index.htm"),
            Some(PathBuf::from("/srv/www/index.htm"))
        );
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            FrontendService::get_content_type("index.htm"),
            "text/html; charset=utf-8"
        );
        assert_eq!(FrontendService::get_content_type("a/b.css"), "text/css");
        assert_eq!(
            FrontendService::get_content_type("README"),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_serve_without_directory() {
        let routes = RoutesConfig::default();
        let resp = FrontendService::serve(&routes, "").await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
