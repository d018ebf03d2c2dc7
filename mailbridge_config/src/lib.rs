use std::{fmt, net::SocketAddr, path::Path};

use anyhow::{ensure, Context};
use config::{Environment, File, FileFormat};
use mailbridge_models::email_address::EmailAddress;
use serde::Deserialize;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Additional config files, separated by `:`. Later files override earlier
/// ones.
pub const CONFIG_PATHS_VAR: &str = "MAILBRIDGE_CONFIG";

/// Prefix of environment variables that override single config values, e.g.
/// `MAILBRIDGE__NOTIFIER__SMTP__PASSWORD`.
pub const ENV_PREFIX: &str = "MAILBRIDGE";
const ENV_SEPARATOR: &str = "__";

/// Load the default config file, the files listed in `MAILBRIDGE_CONFIG` and
/// overrides from the environment.
pub fn load() -> anyhow::Result<Config> {
    let extra_paths = std::env::var(CONFIG_PATHS_VAR).unwrap_or_default();
    let paths = std::iter::once(DEFAULT_CONFIG_PATH)
        .chain(extra_paths.split(':').filter(|path| !path.is_empty()))
        .collect::<Vec<_>>();

    load_from(&paths, None)
}

/// Load the given config files followed by environment overrides.
///
/// If `env` is `None` the overrides are read from the process environment.
pub fn load_from(
    paths: &[impl AsRef<Path>],
    env: Option<config::Map<String, String>>,
) -> anyhow::Result<Config> {
    let config: Config = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("http.cors_origins")
                .source(env),
        )
        .build()?
        .try_deserialize()
        .context("Failed to load config")?;

    config.validate()?;

    Ok(config)
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub api: ApiConfig,
    pub notifier: Option<NotifierConfig>,
    pub store: Option<StoreConfig>,
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(notifier) = &self.notifier {
            let len = notifier.recipient_name.chars().count();
            ensure!(
                (1..=NotifierConfig::RECIPIENT_NAME_MAX_LENGTH).contains(&len),
                "notifier.recipient_name must be between 1 and {} characters long",
                NotifierConfig::RECIPIENT_NAME_MAX_LENGTH
            );
            ensure!(notifier.smtp.port != 0, "notifier.smtp.port must not be 0");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub address: SocketAddr,
    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct NotifierConfig {
    pub recipient_email: EmailAddress,
    pub recipient_name: String,
    pub smtp: SmtpConfig,
}

impl NotifierConfig {
    pub const RECIPIENT_NAME_MAX_LENGTH: usize = 100;
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: Secret,
    #[serde(default = "default_true")]
    pub use_tls: bool,
    /// Sender address. Falls back to `username`.
    pub from: Option<EmailAddress>,
    #[serde(default = "default_smtp_timeout")]
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_host")]
    pub host: String,
    #[serde(default = "default_database_port")]
    pub port: u16,
    pub user: String,
    pub password: Secret,
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

/// A config value that is never included in debug output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(pub String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Secret(\"\")")
        } else {
            f.write_str("Secret(***)")
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout() -> Duration {
    Duration(std::time::Duration::from_secs(10))
}

fn default_true() -> bool {
    true
}

fn default_database_host() -> String {
    "localhost".into()
}

fn default_database_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> Duration {
    Duration(std::time::Duration::from_secs(10))
}
