//! Gateway configuration.

use std::path::PathBuf;

use clap::Parser;
use mintnet_core::StorageConfig;

use crate::locale::Language;

/// MINTnet HTTP/JSON Gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "mintnet-gateway")]
#[command(about = "HTTP/JSON Gateway serving MINTnet profiles, organizations, events and projects")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Directory of the database.
    #[arg(short, long, default_value = "./mintnet_data")]
    pub data: PathBuf,

    /// Page cache capacity in megabytes.
    #[arg(long, default_value_t = 256)]
    pub cache_mb: u64,

    /// Flush interval (ms). 0 flushes only on shutdown.
    #[arg(long, default_value_t = 1000)]
    pub flush_every_ms: u64,

    /// Use a throwaway in-memory database.
    #[arg(long)]
    pub temporary: bool,

    /// Language of error messages when the client sends no usable Accept-Language.
    #[arg(long, value_enum, default_value_t = Language::De)]
    pub language: Language,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Directory of the database.
    pub data_path: PathBuf,
    /// Page cache capacity in bytes.
    pub cache_capacity: u64,
    /// Flush interval in milliseconds.
    pub flush_every_ms: Option<u64>,
    /// Throwaway database.
    pub temporary: bool,
    /// Fallback language of error messages.
    pub default_language: Language,
}

impl GatewayConfig {
    /// Storage configuration derived from the gateway settings.
    pub fn storage_config(&self) -> StorageConfig {
        let config = if self.temporary {
            StorageConfig::temporary()
        } else {
            StorageConfig::new(&self.data_path)
        };
        config
            .with_cache_capacity(self.cache_capacity)
            .with_flush_every_ms(self.flush_every_ms)
    }
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            data_path: args.data.clone(),
            cache_capacity: args.cache_mb * 1024 * 1024,
            flush_every_ms: (args.flush_every_ms > 0).then_some(args.flush_every_ms),
            temporary: args.temporary,
            default_language: args.language,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            data_path: PathBuf::from("./mintnet_data"),
            cache_capacity: 256 * 1024 * 1024,
            flush_every_ms: Some(1000),
            temporary: false,
            default_language: Language::De,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_config() {
        let args = Args::parse_from([
            "mintnet-gateway",
            "--listen",
            "127.0.0.1:3000",
            "--cache-mb",
            "16",
            "--flush-every-ms",
            "0",
            "--language",
            "en",
            "--temporary",
        ]);
        let config = GatewayConfig::from(&args);
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.cache_capacity, 16 * 1024 * 1024);
        assert_eq!(config.flush_every_ms, None);
        assert_eq!(config.default_language, Language::En);

        let storage = config.storage_config();
        assert!(storage.temporary);
        assert_eq!(storage.cache_capacity, 16 * 1024 * 1024);
    }

    #[test]
    fn test_defaults_match_args() {
        let from_args = GatewayConfig::from(&Args::parse_from(["mintnet-gateway"]));
        let default = GatewayConfig::default();
        assert_eq!(from_args.listen_addr, default.listen_addr);
        assert_eq!(from_args.cache_capacity, default.cache_capacity);
        assert_eq!(from_args.flush_every_ms, default.flush_every_ms);
        assert_eq!(from_args.default_language, default.default_language);
    }
}
