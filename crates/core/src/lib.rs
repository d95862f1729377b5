pub mod domain;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod theme;
pub mod time;

pub mod config {
    use std::path::PathBuf;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SourceKind {
        Mock,
        Feed,
        Api,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum HttpMethod {
        Get,
        Post,
    }

    pub const DEFAULT_BRANDS: &[&str] = &["肯德基", "麦当劳", "德克士"];
    pub const DEFAULT_SCHEDULE_TIME: &str = "08:00";
    const DEFAULT_OUT_DIR: &str = "data/dealpost";
    const DEFAULT_ASSET_DIR: &str = "data/dealpost/backgrounds";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub brands: Vec<String>,
        pub source: SourceKind,
        pub feed_urls: Vec<String>,
        pub api_url: Option<String>,
        pub api_method: HttpMethod,
        pub schedule_time: String,
        pub out_dir: PathBuf,
        pub asset_dir: PathBuf,
        pub font_path: Option<PathBuf>,
        pub timeout_secs: u64,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let brands = csv_env("DEALPOST_BRANDS")
                .unwrap_or_else(|| DEFAULT_BRANDS.iter().map(|s| s.to_string()).collect());

            let source = match std::env::var("DEALPOST_SOURCE").ok().as_deref() {
                None | Some("") | Some("mock") => SourceKind::Mock,
                Some("feed") => SourceKind::Feed,
                Some("api") => SourceKind::Api,
                Some(other) => {
                    tracing::warn!(source = other, "unknown DEALPOST_SOURCE, using mock");
                    SourceKind::Mock
                }
            };

            let api_method = match std::env::var("DEALPOST_API_METHOD").ok().as_deref() {
                None | Some("") | Some("get") => HttpMethod::Get,
                Some("post") => HttpMethod::Post,
                Some(other) => {
                    tracing::warn!(method = other, "unknown DEALPOST_API_METHOD, using get");
                    HttpMethod::Get
                }
            };

            let timeout_secs = std::env::var("DEALPOST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS);

            Ok(Self {
                brands,
                source,
                feed_urls: csv_env("DEALPOST_FEED_URLS").unwrap_or_default(),
                api_url: std::env::var("DEALPOST_API_URL")
                    .ok()
                    .filter(|s| !s.is_empty()),
                api_method,
                schedule_time: std::env::var("DEALPOST_SCHEDULE_TIME")
                    .unwrap_or_else(|_| DEFAULT_SCHEDULE_TIME.to_string()),
                out_dir: std::env::var("DEALPOST_OUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUT_DIR)),
                asset_dir: std::env::var("DEALPOST_ASSET_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSET_DIR)),
                font_path: std::env::var("DEALPOST_FONT").ok().map(PathBuf::from),
                timeout_secs,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_api_url(&self) -> anyhow::Result<&str> {
            use anyhow::Context;
            self.api_url
                .as_deref()
                .context("DEALPOST_API_URL is required for the api source")
        }
    }

    fn csv_env(key: &str) -> Option<Vec<String>> {
        let raw = std::env::var(key).ok()?;
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }
}
