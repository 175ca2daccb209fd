//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

use super::StaticConfig;

/// Kurz URL shortener
#[derive(Debug, Parser)]
#[command(name = "kurz", version, about)]
pub struct Args {
    /// Configuration file (TOML). Defaults to ./kurz.toml if present
    #[arg(value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Same as the positional CONFIG argument
    #[arg(short = 'c', long = "config", value_name = "FILE", conflicts_with = "config_path")]
    pub config_flag: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(long)]
    pub port: Option<u16>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

impl Args {
    pub fn config_file(&self) -> Option<&std::path::Path> {
        self.config_path
            .as_deref()
            .or(self.config_flag.as_deref())
    }

    /// 命令行参数覆盖配置文件
    pub fn apply_overrides(&self, config: &mut StaticConfig) {
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_config_path() {
        let args = Args::parse_from(["kurz", "/etc/kurz.toml"]);
        assert_eq!(
            args.config_file(),
            Some(std::path::Path::new("/etc/kurz.toml"))
        );
    }

    #[test]
    fn test_flag_config_path() {
        let args = Args::parse_from(["kurz", "-c", "custom.toml"]);
        assert_eq!(args.config_file(), Some(std::path::Path::new("custom.toml")));
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from(["kurz", "--host", "127.0.0.1", "--port", "8080"]);
        let mut config = StaticConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_no_args() {
        let args = Args::parse_from(["kurz"]);
        assert!(args.config_file().is_none());
        assert!(!args.generate_config);
    }
}
