//! Configuration management for the API server
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `config/<stage>.yaml` (optional), stage taken from `APP_STAGE`
//!    (`prod` by default; `dev` and `test` are the other usual ones). The
//!    directory can be moved with `CONFIG_DIR`.
//! 3. `SUBTRACK__*` environment variables, `__` separating nesting levels
//!    (e.g. `SUBTRACK__SERVER__PORT=9000`, `SUBTRACK__DATABASE__DSN__HOST=db`)
//! 4. The conventional `DATABASE_URL`, `API_HOST` and `API_PORT` variables
//!
//! A `.env` file in the working directory is loaded first, if present.
//!
//! # Example file
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! database:
//!   dsn:
//!     host: localhost
//!     user: subtrack
//!     password: secret
//!     dbname: subtrack
//!     port: 5432
//!     sslmode: disable
//!   max_connections: 10
//! ```
//!
//! # Example
//!
//! ```no_run
//! use subtrack_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use subtrack_shared::db::pool::DatabaseConfig;

/// Stage used when `APP_STAGE` is not set
pub const DEFAULT_STAGE: &str = "prod";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Database settings
    pub database: DatabaseSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database settings
///
/// Either a full `url` or the individual `dsn` parts; the URL wins when both
/// are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Full connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Connection parts, used when `url` is not set
    #[serde(default)]
    pub dsn: Option<Dsn>,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Idle connections kept open
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    pub connect_timeout_seconds: u64,
}

/// PostgreSQL connection parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dsn {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_sslmode() -> String {
    "disable".to_string()
}

impl Dsn {
    /// Renders the parts as a `postgres://` URL
    pub fn to_url(&self) -> String {
        let credentials = if self.password.is_empty() {
            self.user.clone()
        } else {
            format!("{}:{}", self.user, self.password)
        };

        format!(
            "postgres://{}@{}:{}/{}?sslmode={}",
            credentials, self.host, self.port, self.dbname, self.sslmode
        )
    }
}

impl DatabaseSettings {
    /// The connection URL, from `url` or else from `dsn`
    pub fn connection_url(&self) -> Option<String> {
        match (&self.url, &self.dsn) {
            (Some(url), _) if !url.is_empty() => Some(url.clone()),
            (_, Some(dsn)) => Some(dsn.to_url()),
            _ => None,
        }
    }

    /// Pool settings for `subtrack_shared::db::pool::create_pool`
    pub fn pool_config(&self) -> anyhow::Result<DatabaseConfig> {
        let url = self.connection_url().ok_or_else(|| {
            anyhow::anyhow!("database URL is required (DATABASE_URL, database.url or database.dsn)")
        })?;

        Ok(DatabaseConfig {
            url,
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_seconds: self.connect_timeout_seconds,
            ..Default::default()
        })
    }
}

impl Config {
    /// Loads configuration for the stage named by `APP_STAGE`
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed, a value has the wrong
    /// type, or the result fails [`Config::validate`].
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let stage = env::var("APP_STAGE").unwrap_or_else(|_| DEFAULT_STAGE.to_string());
        let dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_stage(&stage, PathBuf::from(dir))
    }

    /// Loads configuration for an explicit stage and config directory
    pub fn load_stage(stage: &str, dir: PathBuf) -> anyhow::Result<Self> {
        let stage_file = dir.join(stage);

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout_seconds", 30)?
            .add_source(config::File::from(stage_file).required(false))
            .add_source(
                config::Environment::with_prefix("SUBTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", env::var("API_HOST").ok())?
            .set_override_option("server.port", env::var("API_PORT").ok())?
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!(stage, "Configuration loaded");
        Ok(config)
    }

    /// Checks values the type system can't
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }

        if self.database.connection_url().is_none() {
            anyhow::bail!("database URL is required (DATABASE_URL, database.url or database.dsn)");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseSettings {
                url: Some("postgres://localhost/test".to_string()),
                dsn: None,
                max_connections: 10,
                min_connections: 1,
                connect_timeout_seconds: 30,
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_dsn_to_url() {
        let dsn = Dsn {
            host: "db".to_string(),
            user: "subtrack".to_string(),
            password: "secret".to_string(),
            dbname: "subs".to_string(),
            port: 5433,
            sslmode: "require".to_string(),
        };
        assert_eq!(dsn.to_url(), "postgres://subtrack:secret@db:5433/subs?sslmode=require");
    }

    #[test]
    fn test_url_wins_over_dsn() {
        let mut config = test_config();
        config.database.dsn = Some(Dsn {
            host: "db".to_string(),
            user: "u".to_string(),
            password: String::new(),
            dbname: "d".to_string(),
            port: 5432,
            sslmode: "disable".to_string(),
        });
        assert_eq!(
            config.database.connection_url().as_deref(),
            Some("postgres://localhost/test")
        );

        config.database.url = Some(String::new());
        assert_eq!(
            config.database.connection_url().as_deref(),
            Some("postgres://u@db:5432/d?sslmode=disable")
        );
    }

    #[test]
    fn test_validate_rejects_missing_database() {
        let mut config = test_config();
        config.database.url = None;
        assert!(config.validate().is_err());
        assert!(config.database.pool_config().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = test_config();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_config() {
        let pool = test_config().database.pool_config().unwrap();
        assert_eq!(pool.url, "postgres://localhost/test");
        assert_eq!(pool.max_connections, 10);
        assert_eq!(pool.min_connections, 1);
    }

    #[test]
    fn test_load_stage_from_yaml() {
        let dir = env::temp_dir().join(format!("subtrack-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("test.yaml"),
            "server:\n  host: 127.0.0.1\n  port: 9090\ndatabase:\n  url: postgres://yaml/db\n  max_connections: 3\n",
        )
        .unwrap();

        let config = Config::load_stage("test", dir.clone()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.database.min_connections, 1);

        fs::remove_dir_all(dir).ok();
    }
}
