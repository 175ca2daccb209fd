use anyhow::{Context, Result};
use clap::Parser;

use kurz::config::{Args, StaticConfig};
use kurz::runtime::run_server;
use kurz::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if args.generate_config {
        print!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    let mut config = StaticConfig::load(args.config_file()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);

    // 日志守卫需要存活到进程结束
    let _log_guard = init_logging(&config.logging)?;

    tracing::info!("kurz {} starting", env!("CARGO_PKG_VERSION"));
    run_server(config).await
}
