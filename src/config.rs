#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ApiError, Result};

pub const DEFAULT_CONFIG_PATH: &str = ".boodai/config.toml";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@boodaypizza.com";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub storage: StorageConfig,
    pub telegram: TelegramConfig,
    pub admin: AdminSeed,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Disk { uploads_dir: PathBuf },
    S3(S3Config),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: Option<String>,
    pub default_chat_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

/// Raw `key -> value` settings after file parsing and environment overrides.
#[derive(Debug, Default, Clone)]
pub struct RawSettings(HashMap<String, String>);

impl RawSettings {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

/// Environment variables that override file settings, in `(env, key)` form.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "port"),
    ("DATABASE_URL", "database_url"),
    ("BOODAI_JWT_SECRET", "jwt_secret"),
    ("BOODAI_TOKEN_TTL_SECS", "token_ttl_secs"),
    ("BOODAI_STORAGE", "storage"),
    ("BOODAI_UPLOADS_DIR", "uploads_dir"),
    ("BOODAI_S3_ENDPOINT", "s3_endpoint"),
    ("BOODAI_S3_BUCKET", "s3_bucket"),
    ("BOODAI_S3_REGION", "s3_region"),
    ("BOODAI_S3_ACCESS_KEY", "s3_access_key"),
    ("BOODAI_S3_SECRET_KEY", "s3_secret_key"),
    ("BOODAI_TELEGRAM_API", "telegram_api"),
    ("BOODAI_TELEGRAM_BOT_TOKEN", "telegram_bot_token"),
    ("BOODAI_TELEGRAM_CHAT_ID", "telegram_chat_id"),
    ("BOODAI_ADMIN_NAME", "admin_name"),
    ("BOODAI_ADMIN_EMAIL", "admin_email"),
    ("BOODAI_ADMIN_PASSWORD", "admin_password"),
    ("BOODAI_CORS_ORIGINS", "cors_origins"),
];

impl Config {
    /// Loads the optional config file, then applies environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, or if a
    /// required setting is missing or malformed.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut raw = read_config_file(&config_path).await?;
        apply_env_overrides(&mut raw, |key| std::env::var(key).ok());
        Self::from_raw(&raw)
    }

    /// # Errors
    /// Returns an error if a required setting is missing or malformed.
    pub fn from_raw(raw: &RawSettings) -> Result<Self> {
        let port = parse_or_default(raw, "port", DEFAULT_PORT)?;
        let token_ttl_secs = parse_or_default(raw, "token_ttl_secs", DEFAULT_TOKEN_TTL_SECS)?;

        let database_url = raw
            .get("database_url")
            .map_or_else(computed_default_database_url, ToString::to_string);

        let jwt_secret = raw
            .get("jwt_secret")
            .map(ToString::to_string)
            .ok_or_else(|| ApiError::ConfigError("jwt_secret is not set".to_string()))?;

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            token_ttl_secs,
            storage: storage_from_raw(raw)?,
            telegram: TelegramConfig {
                api_base: raw
                    .get("telegram_api")
                    .unwrap_or(DEFAULT_TELEGRAM_API)
                    .trim_end_matches('/')
                    .to_string(),
                bot_token: raw.get("telegram_bot_token").map(ToString::to_string),
                default_chat_id: raw.get("telegram_chat_id").map(ToString::to_string),
            },
            admin: AdminSeed {
                name: raw.get("admin_name").unwrap_or("Admin").to_string(),
                email: raw
                    .get("admin_email")
                    .unwrap_or(DEFAULT_ADMIN_EMAIL)
                    .to_string(),
                password: raw.get("admin_password").map(ToString::to_string),
            },
            cors_origins: raw
                .get("cors_origins")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn storage_from_raw(raw: &RawSettings) -> Result<StorageConfig> {
    match raw.get("storage").unwrap_or("disk") {
        "disk" => Ok(StorageConfig::Disk {
            uploads_dir: PathBuf::from(raw.get("uploads_dir").unwrap_or("uploads")),
        }),
        "s3" => {
            let required = |key: &str| {
                raw.get(key)
                    .map(ToString::to_string)
                    .ok_or_else(|| ApiError::ConfigError(format!("{key} is required for s3 storage")))
            };
            Ok(StorageConfig::S3(S3Config {
                endpoint: required("s3_endpoint")?.trim_end_matches('/').to_string(),
                bucket: required("s3_bucket")?,
                region: raw.get("s3_region").unwrap_or("ru-1").to_string(),
                access_key: required("s3_access_key")?,
                secret_key: required("s3_secret_key")?,
            }))
        }
        other => Err(ApiError::ConfigError(format!(
            "Unknown storage backend '{other}', expected 'disk' or 's3'"
        ))),
    }
}

fn parse_or_default<T>(raw: &RawSettings, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    raw.get(key).map_or_else(
        || {
            info!("{key} not set, using default: {default}");
            Ok(default)
        },
        |value| {
            value
                .parse()
                .map_err(|e| ApiError::ConfigError(format!("Invalid {key} value '{value}': {e}")))
        },
    )
}

async fn read_config_file(path: &Path) -> Result<RawSettings> {
    if !path.exists() {
        info!("No config file at {}, using environment only", path.display());
        return Ok(RawSettings::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::ConfigError(format!("Failed to read config: {e}")))?;

    Ok(parse_config_content(&content))
}

pub fn parse_config_content(content: &str) -> RawSettings {
    let mut raw = RawSettings::default();

    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('['))
    {
        match line.split_once('=') {
            Some((key, _)) => {
                let key = key.trim();
                if let Some(value) = parse_key_value(line, key) {
                    raw.insert(key, expand_env_vars(value));
                }
            }
            None => warn!("Ignoring malformed config line: {line}"),
        }
    }

    raw
}

fn apply_env_overrides<F>(raw: &mut RawSettings, env_lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for (env_key, key) in ENV_OVERRIDES {
        if let Some(value) = env_lookup(env_key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            raw.insert(*key, value);
        }
    }
}

fn expand_env_vars(input: &str) -> String {
    expand_env_vars_with(input, |name| std::env::var(name).ok())
}

/// Substituted values are copied verbatim and never rescanned.
fn expand_env_vars_with<F>(input: &str, env_lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_part = &rest[start + 2..start + end];
        let (var_name, default) = var_part.split_once(":-").unwrap_or((var_part, ""));
        result.push_str(&rest[..start]);
        result.push_str(&env_lookup(var_name).unwrap_or_else(|| default.to_string()));
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

pub fn parse_key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.split_once('=')
        .and_then(|(lhs, rhs)| (lhs.trim() == key).then_some(rhs.trim().trim_matches('"')))
}

/// Pool size: `BOODAI_DB_MAX_CONNECTIONS` when positive, otherwise 10.
pub fn resolve_pool_max_connections() -> u32 {
    resolve_pool_max_connections_from(|key| std::env::var(key).ok())
}

fn resolve_pool_max_connections_from<F>(env_lookup: F) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    env_lookup("BOODAI_DB_MAX_CONNECTIONS")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(10)
}

fn computed_default_database_url() -> String {
    let user = std::env::var("BOODAI_DB_USER").unwrap_or_else(|_| "boodai".to_string());
    let pass = std::env::var("BOODAI_DB_PASSWORD").unwrap_or_else(|_| "boodai".to_string());
    let host = std::env::var("BOODAI_DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("BOODAI_DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let db = std::env::var("BOODAI_DB_NAME").unwrap_or_else(|_| "boodai".to_string());
    format!("postgres://{user}:{pass}@{host}:{port}/{db}")
}

#[cfg(test)]
mod tests {
    use super::{
        apply_env_overrides, expand_env_vars_with, parse_config_content, parse_key_value,
        resolve_pool_max_connections_from, Config, StorageConfig,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| map.get(key).map(ToString::to_string)
    }

    #[test]
    fn parse_reads_settings_and_skips_comments() {
        let content = r#"# boodai
[server]
port = "8080"
database_url = "postgresql://x"
jwt_secret = "s3cret"
storage = "disk"
uploads_dir = "/var/boodai""#;
        let config = Config::from_raw(&parse_config_content(content));
        let Ok(config) = config else {
            unreachable!("config should parse");
        };
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "postgresql://x");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(
            config.storage,
            StorageConfig::Disk {
                uploads_dir: PathBuf::from("/var/boodai")
            }
        );
        assert_eq!(config.token_ttl_secs, 3600);
    }

    #[test]
    fn parse_key_value_handles_spaces_and_mismatch() {
        assert_eq!(
            parse_key_value("database_url = \"postgres://u:p@h/db?x=y\"", "database_url"),
            Some("postgres://u:p@h/db?x=y")
        );
        assert_eq!(parse_key_value("other = \"x\"", "database_url"), None);
    }

    #[test]
    fn missing_jwt_secret_is_a_config_error() {
        let raw = parse_config_content("port = \"5000\"");
        assert!(Config::from_raw(&raw).is_err());
    }

    #[test]
    fn s3_storage_requires_credentials() {
        let raw = parse_config_content(
            "jwt_secret = \"k\"\nstorage = \"s3\"\ns3_endpoint = \"https://s3.example.com/\"",
        );
        assert!(Config::from_raw(&raw).is_err());

        let raw = parse_config_content(
            "jwt_secret = \"k\"
storage = \"s3\"
s3_endpoint = \"https://s3.example.com/\"
s3_bucket = \"pizza\"
s3_access_key = \"ak\"
s3_secret_key = \"sk\"",
        );
        match Config::from_raw(&raw).map(|config| config.storage) {
            Ok(StorageConfig::S3(s3)) => {
                assert_eq!(s3.endpoint, "https://s3.example.com");
                assert_eq!(s3.bucket, "pizza");
                assert_eq!(s3.region, "ru-1");
            }
            other => unreachable!("expected s3 storage, got {other:?}"),
        }
    }

    #[test]
    fn unknown_storage_backend_is_rejected() {
        let raw = parse_config_content("jwt_secret = \"k\"\nstorage = \"ftp\"");
        assert!(Config::from_raw(&raw).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut raw = parse_config_content("jwt_secret = \"file\"\nport = \"5000\"");
        apply_env_overrides(
            &mut raw,
            lookup(HashMap::from([
                ("BOODAI_JWT_SECRET", "env"),
                ("PORT", "  "),
                ("BOODAI_CORS_ORIGINS", "https://a.kg, https://b.kg"),
            ])),
        );
        let Ok(config) = Config::from_raw(&raw) else {
            unreachable!("config should parse");
        };
        assert_eq!(config.jwt_secret, "env");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, vec!["https://a.kg", "https://b.kg"]);
    }

    #[test]
    fn env_expansion_uses_defaults_and_does_not_rescan_values() {
        let env = lookup(HashMap::from([
            ("DB_HOST", "db.internal"),
            ("LOOPY", "${LOOPY}"),
        ]));
        assert_eq!(
            expand_env_vars_with("postgres://${DB_HOST}:${DB_PORT:-5432}/boodai", &env),
            "postgres://db.internal:5432/boodai"
        );
        assert_eq!(expand_env_vars_with("x-${LOOPY}-y", &env), "x-${LOOPY}-y");
        assert_eq!(expand_env_vars_with("open ${BRACE", &env), "open ${BRACE");
    }

    #[test]
    fn invalid_port_is_reported() {
        let raw = parse_config_content("jwt_secret = \"k\"\nport = \"pizza\"");
        assert!(Config::from_raw(&raw).is_err());
    }

    #[test]
    fn pool_size_defaults_and_override() {
        assert_eq!(resolve_pool_max_connections_from(lookup(HashMap::new())), 10);
        assert_eq!(
            resolve_pool_max_connections_from(lookup(HashMap::from([(
                "BOODAI_DB_MAX_CONNECTIONS",
                "0"
            )]))),
            10
        );
        assert_eq!(
            resolve_pool_max_connections_from(lookup(HashMap::from([(
                "BOODAI_DB_MAX_CONNECTIONS",
                "24"
            )]))),
            24
        );
    }
}
