use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::RoutesConfig;
use crate::errors::KurzError;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'static str,
    pub error: &'static str,
    pub message: &'a str,
}

/// 带 `Location` 头的回退响应
#[inline]
pub fn fallback_response(status: StatusCode, location: &str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Location", location))
        .insert_header(("Cache-Control", "no-cache"))
        .finish()
}

/// 将业务错误映射为 HTTP 响应
///
/// 非法 URL 与未知短码不返回错误体，而是以 `miss_status` 跳转到回退地址；
/// 存储不可用返回 503，其余返回 500。
pub fn error_response(err: &KurzError, routes: &RoutesConfig, miss_status: StatusCode) -> HttpResponse {
    match err {
        KurzError::InvalidUrl(_) | KurzError::NotFound(_) => {
            debug!("Falling back to {}: {}", routes.fallback_url, err);
            fallback_response(miss_status, &routes.fallback_url)
        }
        _ => {
            let status = if err.is_unavailable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error!("Request failed with {}: {}", status, err);

            HttpResponse::build(status).json(ErrorBody {
                code: err.code(),
                error: err.error_type(),
                message: err.message(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_redirects_to_fallback() {
        let routes = RoutesConfig::default();
        let resp = error_response(
            &KurzError::not_found("unknown key: abcde"),
            &routes,
            StatusCode::TEMPORARY_REDIRECT,
        );
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            routes.fallback_url.as_str()
        );
    }

    #[test]
    fn test_store_failures_map_to_5xx() {
        let routes = RoutesConfig::default();
        let unavailable = error_response(
            &KurzError::store_unavailable("connection refused"),
            &routes,
            StatusCode::NOT_FOUND,
        );
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(unavailable.headers().get("Location").is_none());

        let other = error_response(
            &KurzError::serialization("bad json"),
            &routes,
            StatusCode::NOT_FOUND,
        );
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
