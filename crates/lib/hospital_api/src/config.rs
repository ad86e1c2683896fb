//! API server configuration.

use std::fmt;
use std::str::FromStr;

use hospital_core::models::auth::Role;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "hospital-dev-secret-change-in-production";

/// Configuration errors. Any of these stops the server from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingSecret,

    #[error("invalid APP_ENV '{0}' (expected development or production)")]
    InvalidEnvironment(String),

    #[error("invalid RECORDS_ACCESS '{0}' (expected public, authenticated or roles:<role>,...)")]
    InvalidAccessPolicy(String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

/// Who may call the doctor, specialty, medication and patient routes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordAccessPolicy {
    #[default]
    Public,
    Authenticated,
    /// Authenticated and holding one of these roles.
    Roles(Vec<Role>),
}

impl FromStr for RecordAccessPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidAccessPolicy(s.to_string());
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "" | "public" => return Ok(RecordAccessPolicy::Public),
            "authenticated" => return Ok(RecordAccessPolicy::Authenticated),
            _ => {}
        }

        let list = value.strip_prefix("roles:").ok_or_else(invalid)?;
        let roles = list
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Role>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        if roles.is_empty() {
            return Err(invalid());
        }
        Ok(RecordAccessPolicy::Roles(roles))
    }
}

/// Configuration for the API server. Read once at startup.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    pub environment: Environment,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub records_access: RecordAccessPolicy,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable         | Default                               |
    /// |------------------|---------------------------------------|
    /// | `BIND_ADDR`      | `127.0.0.1:3000`                      |
    /// | `DATABASE_URL`   | `postgres://localhost:5432/hospital`  |
    /// | `APP_ENV`        | `development`                         |
    /// | `JWT_SECRET`     | dev fallback, required in production  |
    /// | `RECORDS_ACCESS` | `public`                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV")
            .map(|v| v.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.trim().is_empty()) {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::MissingSecret);
            }
            None => {
                warn!("JWT_SECRET not set, using the development fallback secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let records_access = lookup("RECORDS_ACCESS")
            .map(|v| v.parse::<RecordAccessPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".into()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/hospital".into()),
            environment,
            jwt_secret,
            records_access,
        })
    }

    /// Development configuration with the given secret. Used by tests.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            database_url: String::new(),
            environment: Environment::Development,
            jwt_secret: secret.to_string(),
            records_access: RecordAccessPolicy::Public,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("environment", &self.environment)
            .field("jwt_secret", &"<redacted>")
            .field("records_access", &self.records_access)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.database_url, "postgres://localhost:5432/hospital");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.records_access, RecordAccessPolicy::Public);
    }

    #[test]
    fn production_requires_a_secret() {
        let err = ApiConfig::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);

        let err = ApiConfig::from_lookup(lookup(&[("APP_ENV", "production"), ("JWT_SECRET", "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);

        let config =
            ApiConfig::from_lookup(lookup(&[("APP_ENV", "production"), ("JWT_SECRET", "s3cret")]))
                .unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(matches!(
            ApiConfig::from_lookup(lookup(&[("APP_ENV", "staging")])),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn access_policy_parses() {
        assert_eq!(
            "authenticated".parse::<RecordAccessPolicy>(),
            Ok(RecordAccessPolicy::Authenticated)
        );
        assert_eq!(
            "roles:admin, receptionist".parse::<RecordAccessPolicy>(),
            Ok(RecordAccessPolicy::Roles(vec![Role::Admin, Role::Receptionist]))
        );
        assert!("roles:".parse::<RecordAccessPolicy>().is_err());
        assert!("roles:janitor".parse::<RecordAccessPolicy>().is_err());
        assert!("everyone".parse::<RecordAccessPolicy>().is_err());
    }

    #[test]
    fn debug_hides_the_secret() {
        let config = ApiConfig::with_secret("top-secret");
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
