use anyhow::Context;
use std::str::FromStr;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DATABASE_DIR: &str = ".";

/// Which database the process talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Test,
}

impl Environment {
    /// `APP_ENV=test` selects the test database; any other value, or none,
    /// selects production.
    fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(flag) if flag.trim().eq_ignore_ascii_case("test") => Self::Test,
            _ => Self::Production,
        }
    }

    #[must_use]
    pub const fn database_name(self) -> &'static str {
        match self {
            Self::Production => "books",
            Self::Test => "books-test",
        }
    }
}

#[derive(Debug)]
pub struct Config {
    environment: Environment,
    database_url: String,
    server_port: u16,
}

impl Config {
    /// Reads configuration from the process environment, after loading a
    /// `.env` file when one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("Failed to load .env file");
            }
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_flag(lookup("APP_ENV").as_deref());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let dir = lookup("DATABASE_DIR").unwrap_or_else(|| DEFAULT_DATABASE_DIR.into());
                let dir = dir.trim_end_matches('/');
                format!("sqlite://{dir}/{}.db", environment.database_name())
            }
        };

        let server_port = parse_var(&lookup, "SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT);

        Ok(Self {
            environment,
            database_url,
            server_port,
        })
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|val| {
            val.parse::<T>()
                .with_context(|| format!("Failed to parse environment variable {key}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_production_database() {
        let config = config(&[]).unwrap();
        assert_eq!(config.environment(), Environment::Production);
        assert_eq!(config.database_url(), "sqlite://./books.db");
        assert_eq!(config.server_port(), 3000);
    }

    #[test]
    fn test_flag_switches_database() {
        let config = config(&[("APP_ENV", "test"), ("DATABASE_DIR", "/var/lib/books/")]).unwrap();
        assert_eq!(config.environment(), Environment::Test);
        assert_eq!(config.database_url(), "sqlite:///var/lib/books/books-test.db");
    }

    #[test]
    fn database_url_overrides_derived_path() {
        let config = config(&[("APP_ENV", "test"), ("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }

    #[test]
    fn reads_server_port() {
        let config = config(&[("SERVER_PORT", "8080")]).unwrap();
        assert_eq!(config.server_port(), 8080);
    }

    #[test]
    fn rejects_invalid_server_port() {
        let err = config(&[("SERVER_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
