//! Typed runtime settings resolved from files, environment, and CLI flags.

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_TRANSIENT_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_TRANSIENT_CAPACITY: usize = 64;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;
const DEFAULT_SITE_BASE_URL: &str = "http://localhost:8080/";

/// Instance id used when no command or instance is supplied.
pub const DEFAULT_INSTANCE: &str = "demo-1";

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina recent-posts widget runtime")]
pub struct CliArgs {
    /// Path to an additional configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render the widget front end for an instance.
    Render(RenderArgs),
    /// Render the admin settings form for an instance.
    Form(FormArgs),
    /// Sanitize and save widget settings for an instance.
    Save(SaveArgs),
    /// Publish a post to the demo host, flushing cached lists.
    Publish(PublishArgs),
    /// Fire a theme-change flush against a warmed cache.
    Flush(FlushArgs),
}

impl Command {
    pub fn overrides(&self) -> &RuntimeOverrides {
        match self {
            Command::Render(args) => &args.overrides,
            Command::Form(args) => &args.overrides,
            Command::Save(args) => &args.overrides,
            Command::Publish(args) => &args.overrides,
            Command::Flush(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct RuntimeOverrides {
    /// Base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Toggle the transient cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the transient entry TTL.
    #[arg(long = "cache-transient-ttl-seconds", value_name = "SECONDS")]
    pub cache_transient_ttl_seconds: Option<u64>,

    /// Override the transient store capacity.
    #[arg(long = "cache-transient-capacity", value_name = "COUNT")]
    pub cache_transient_capacity: Option<usize>,

    /// Override the flush batch limit.
    #[arg(long = "cache-consume-batch-limit", value_name = "COUNT")]
    pub cache_consume_batch_limit: Option<usize>,

    /// Override the base URL used to build permalinks.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,

    /// Override the content seed archive path.
    #[arg(
        long = "site-seed-file",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub site_seed_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Widget instance id.
    #[arg(long, default_value = DEFAULT_INSTANCE, value_name = "ID")]
    pub instance: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FormArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Widget instance id.
    #[arg(long, default_value = DEFAULT_INSTANCE, value_name = "ID")]
    pub instance: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SaveArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Widget instance id.
    #[arg(long, default_value = DEFAULT_INSTANCE, value_name = "ID")]
    pub instance: String,

    /// Widget title; empty hides the title block.
    #[arg(long, default_value = "", value_name = "TEXT")]
    pub title: String,

    /// Raw post count, coerced the same way the admin form coerces it.
    #[arg(long, default_value = "3", value_name = "COUNT")]
    pub count: String,

    /// Category slug filter; empty matches all categories.
    #[arg(long, default_value = "", value_name = "SLUG")]
    pub category: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PublishArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Post title.
    #[arg(long, value_name = "TEXT")]
    pub title: String,

    /// Post excerpt.
    #[arg(long, default_value = "", value_name = "TEXT")]
    pub excerpt: String,

    /// Category slug.
    #[arg(long, default_value = "", value_name = "SLUG")]
    pub category: String,

    /// Instance rendered before and after publication.
    #[arg(long, default_value = DEFAULT_INSTANCE, value_name = "ID")]
    pub instance: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct FlushArgs {
    #[command(flatten)]
    pub overrides: RuntimeOverrides,

    /// Instance rendered before and after the flush.
    #[arg(long, default_value = DEFAULT_INSTANCE, value_name = "ID")]
    pub instance: String,
}

/// Fully-resolved runtime settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub transient_ttl_seconds: u64,
    pub transient_capacity: usize,
    pub consume_batch_limit: usize,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: Url,
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Resolve settings. CLI flags override environment, which overrides files.
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if let Some(command) = cli.command.as_ref() {
        raw.apply_overrides(command.overrides());
    }

    Settings::from_raw(raw)
}

/// Parse CLI arguments and resolve settings in one step, returning both.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &RuntimeOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(ttl) = overrides.cache_transient_ttl_seconds {
            self.cache.transient_ttl_seconds = Some(ttl);
        }
        if let Some(capacity) = overrides.cache_transient_capacity {
            self.cache.transient_capacity = Some(capacity);
        }
        if let Some(limit) = overrides.cache_consume_batch_limit {
            self.cache.consume_batch_limit = Some(limit);
        }
        if let Some(url) = overrides.site_base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
        if let Some(path) = overrides.site_seed_file.as_ref() {
            self.site.seed_file = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            cache,
            site,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let cache = build_cache_settings(cache)?;
        let site = build_site_settings(site)?;

        Ok(Self {
            logging,
            cache,
            site,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let enabled = cache.enabled.unwrap_or(true);

    let transient_ttl_seconds = cache
        .transient_ttl_seconds
        .unwrap_or(DEFAULT_TRANSIENT_TTL_SECONDS);
    if transient_ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.transient_ttl_seconds",
            "must be greater than zero",
        ));
    }

    let transient_capacity = cache
        .transient_capacity
        .unwrap_or(DEFAULT_TRANSIENT_CAPACITY);
    if transient_capacity == 0 {
        return Err(LoadError::invalid(
            "cache.transient_capacity",
            "must be greater than zero",
        ));
    }

    let consume_batch_limit = cache
        .consume_batch_limit
        .unwrap_or(DEFAULT_CONSUME_BATCH_LIMIT);
    if consume_batch_limit == 0 {
        return Err(LoadError::invalid(
            "cache.consume_batch_limit",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        enabled,
        transient_ttl_seconds,
        transient_capacity,
        consume_batch_limit,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let base_url = site
        .base_url
        .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string());
    let base_url = Url::parse(base_url.trim())
        .map_err(|err| LoadError::invalid("site.base_url", format!("failed to parse: {err}")))?;

    Ok(SiteSettings {
        base_url,
        seed_file: site.seed_file,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    transient_ttl_seconds: Option<u64>,
    transient_capacity: Option<usize>,
    consume_batch_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    base_url: Option<String>,
    seed_file: Option<PathBuf>,
}
