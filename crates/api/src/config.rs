use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::{JwtConfig, DEFAULT_EXPIRY_MINS};

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` and `JWT_SECRET` has a default suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres connection string.
    pub database_url: String,
    /// Upper bound on pooled connections (default: `10`).
    pub database_max_connections: u32,
    /// Directory holding a built web client, served for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                                        |
    /// |----------------------------|------------------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                                      |
    /// | `PORT`                     | `3000`                                         |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`                        |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                                           |
    /// | `DATABASE_URL`             | required                                       |
    /// | `DATABASE_MAX_CONNECTIONS` | `10`                                           |
    /// | `JWT_SECRET`               | required                                       |
    /// | `JWT_EXPIRY_MINS`          | `60`                                           |
    /// | `STATIC_DIR`               | unset                                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&var, "PORT", 3000u16)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        let request_timeout_secs = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30u64)?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let static_dir = var("STATIC_DIR").map(PathBuf::from);

        let secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let expiry_mins = parse_or(&var, "JWT_EXPIRY_MINS", DEFAULT_EXPIRY_MINS)?;
        if expiry_mins <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRY_MINS",
                value: expiry_mins.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            database_max_connections,
            static_dir,
            jwt: JwtConfig {
                secret,
                expiry_mins,
            },
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    const DB: (&str, &str) = ("DATABASE_URL", "postgres://localhost/linkshelf");

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = load(&[DB, ("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.static_dir, None);
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.expiry_mins, 60);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert_matches!(load(&[DB]), Err(ConfigError::Missing("JWT_SECRET")));
        assert_matches!(
            load(&[DB, ("JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            DB,
            ("JWT_SECRET", "s"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("STATIC_DIR", "/srv/web"),
            ("JWT_EXPIRY_MINS", "5"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/web")));
        assert_eq!(config.jwt.expiry_mins, 5);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert_matches!(
            load(&[("JWT_SECRET", "s")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn unparseable_numbers_are_rejected() {
        assert_matches!(
            load(&[DB, ("JWT_SECRET", "s"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );
        assert_matches!(
            load(&[DB, ("JWT_SECRET", "s"), ("JWT_EXPIRY_MINS", "0")]),
            Err(ConfigError::Invalid {
                name: "JWT_EXPIRY_MINS",
                ..
            })
        );
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        assert_matches!(
            load(&[DB, ("JWT_SECRET", "s"), ("CORS_ORIGINS", "http://ok.test,bad\norigin")]),
            Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                ..
            })
        );
    }
}
