pub mod frontend;
pub mod health;
pub mod links;
pub mod redirect;
pub mod stats;

use actix_web::web;

pub use frontend::FrontendService;
pub use health::{AppStartTime, HealthService};
pub use links::{LinksService, ShortenParams};
pub use redirect::RedirectService;
pub use stats::StatsService;

/// 注册全部路由
///
/// 按注册顺序匹配，兜底路由 `/{path:.*}` 必须放在最后。
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check))
        .route("/shorten", web::get().to(LinksService::shorten))
        .route("/shorten", web::post().to(LinksService::shorten))
        .route("/shorten/{url:.*}", web::get().to(LinksService::shorten))
        .route("/shorten/{url:.*}", web::post().to(LinksService::shorten))
        .route("/info/{alias}", web::get().to(LinksService::info))
        .route("/latest", web::get().to(LinksService::latest))
        .route(r"/latest/{n:\d+}", web::get().to(LinksService::latest_limited))
        .route("/user/{id:.*}", web::get().to(StatsService::user_stats))
        .route("/event/{id:.*}", web::get().to(StatsService::event_stats))
        .route("/{path:.*}", web::get().to(RedirectService::handle_path))
        .route("/{path:.*}", web::head().to(RedirectService::handle_path));
}
