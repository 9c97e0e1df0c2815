//! [`Config`] of the application.

use std::str::FromStr;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::Into;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::infra::postgres;
use smart_default::SmartDefault;

/// Application configuration.
///
/// Every missing value falls back to its default one.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: Server,

    /// [`service::Service`] configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Loads the [`Config`] from the TOML file at the provided `path`, if it
    /// exists, overridden by the `CONF.`-prefixed environment variables,
    /// like `CONF.SERVER.PORT`.
    ///
    /// # Errors
    ///
    /// If any of the sources is malformed or provides an invalid value.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins the GraphQL API may be requested from. `*` allows any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// [`service::Service`] configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret shared with the authentication provider signing the [JWT]s of
    /// the delegated purchase planners.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[default(SecretString::from("secret"))]
    pub jwt_secret: SecretString,
}

impl From<Service> for service::Config {
    fn from(conf: Service) -> Self {
        Self {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                conf.jwt_secret.expose_secret().as_bytes(),
            ),
        }
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host of the database server.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the database server.
    #[default(5432)]
    pub port: u16,

    /// Name of the database storing the circles, items and users.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// User to authenticate as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to authenticate with.
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Maximum number of simultaneously open connections.
    #[default(16)]
    pub max_connections: usize,
}

impl From<Postgres> for postgres::Config {
    fn from(conf: Postgres) -> Self {
        Self {
            host: Some(conf.host),
            port: Some(conf.port),
            dbname: Some(conf.dbname),
            user: Some(conf.user),
            password: Some(conf.password.expose_secret().to_owned()),
            pool: Some(postgres::PoolConfig::new(conf.max_connections)),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Most verbose level of the written log records.
    pub level: LogLevel,
}

/// Level of log records, like `INFO` or `debug`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Into, PartialEq)]
#[serde(try_from = "String")]
pub struct LogLevel(tracing::Level);

impl Default for LogLevel {
    fn default() -> Self {
        Self(tracing::Level::INFO)
    }
}

impl TryFrom<String> for LogLevel {
    type Error = <tracing::Level as FromStr>::Err;

    fn try_from(level: String) -> Result<Self, Self::Error> {
        level.parse().map(Self)
    }
}
