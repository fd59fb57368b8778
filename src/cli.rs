//! Command-line interface definitions using clap
//!
//! Flags override values loaded from the configuration file and environment.

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, CacheMode};
use crate::pipeline::InputSource;

/// ipgeo - A tiny, fast IP geolocation lookup service
#[derive(Parser, Debug)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "A tiny, fast HTTP microservice for minimal IP geolocation lookups", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ./config.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Path of MaxMind GeoIP2/GeoLite2 City database
    #[arg(long)]
    pub db: Option<String>,

    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Cache mode: disabled, ttl or size
    #[arg(long)]
    pub cache: Option<CacheMode>,

    /// Cache TTL in seconds (ttl mode)
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Max memory used for cache in MB (size mode), 0 disables caching
    #[arg(long)]
    pub cache_size: Option<u64>,

    /// Value for 'Access-Control-Allow-Origin' header, set to "" to disable
    #[arg(long)]
    pub origin: Option<String>,

    /// Where the IP is read from: query (?ip=) or path (/<ip>)
    #[arg(long)]
    pub input: Option<InputSource>,

    /// Number of worker threads, otherwise number of detected cores
    #[arg(long)]
    pub threads: Option<usize>,

    /// Log all requests (may severely impact performance)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate example configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ref db) = self.db {
            config.database.path = db.clone();
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(mode) = self.cache {
            config.cache.mode = mode;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache.ttl_secs = ttl;
        }
        if let Some(size) = self.cache_size {
            if size == 0 {
                config.cache.mode = CacheMode::Disabled;
            } else {
                config.cache.max_size_mb = size;
                // 只给了容量时隐含 size 模式
                if self.cache.is_none() {
                    config.cache.mode = CacheMode::Size;
                }
            }
        }
        if let Some(ref origin) = self.origin {
            config.http.origin_policy = origin.clone();
        }
        if let Some(input) = self.input {
            config.http.input = input;
        }
        if let Some(threads) = self.threads {
            config.server.workers = threads.max(1);
        }
        if self.verbose {
            config.http.access_log = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "ipgeo",
            "--db",
            "testdata/ipgeo-City-Test.mmdb",
            "--port",
            "9100",
            "--origin",
            "",
            "--input",
            "path",
            "--cache",
            "disabled",
            "-v",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.database.path, "testdata/ipgeo-City-Test.mmdb");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.http.origin_policy, "");
        assert_eq!(config.http.input, InputSource::Path);
        assert_eq!(config.cache.mode, CacheMode::Disabled);
        assert!(config.http.access_log);
    }

    #[test]
    fn test_cache_size_implies_size_mode() {
        let cli = Cli::try_parse_from(["ipgeo", "--cache-size", "64"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.cache.mode, CacheMode::Size);
        assert_eq!(config.cache.max_size_mb, 64);

        let cli = Cli::try_parse_from(["ipgeo", "--cache-size", "0"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.cache.mode, CacheMode::Disabled);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["ipgeo"]).unwrap();
        let mut config = AppConfig::default();
        let before = format!("{:?}", config);
        cli.apply(&mut config);
        assert_eq!(format!("{:?}", config), before);
    }

    #[test]
    fn test_generate_config_subcommand() {
        let cli = Cli::try_parse_from(["ipgeo", "generate-config", "out.toml"]).unwrap();
        match cli.command {
            Some(Commands::GenerateConfig { output_path }) => {
                assert_eq!(output_path.as_deref(), Some("out.toml"))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_cache_mode_rejected() {
        assert!(Cli::try_parse_from(["ipgeo", "--cache", "lru"]).is_err());
    }
}
