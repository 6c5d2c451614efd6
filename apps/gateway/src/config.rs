use anyhow::{bail, Context, Result};
use jsonwebtoken::Algorithm;

const DEFAULT_PUBLIC_API_URL: &str = "http://127.0.0.1:8000";

/// Deployment environment. Selects the remote origin and the cookie `Secure` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "" => Ok(Environment::Development),
            other => bail!("APP_ENV must be 'production' or 'development', got '{other}'"),
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Gateway configuration loaded from environment variables.
/// Fails at startup on malformed values.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Remote origin every proxy operation forwards to.
    pub upstream_url: String,
    pub jwt_secret: Option<String>,
    pub jwt_algorithm: Algorithm,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let environment = Environment::parse(&optional_env("APP_ENV").unwrap_or_default())?;
        let upstream_url = resolve_upstream_url(
            environment,
            optional_env("PROD_SERVER_URL"),
            optional_env("DEV_SERVER_URL"),
            optional_env("PUBLIC_API_URL"),
        )?;

        let jwt_algorithm = optional_env("JWT_ALGORITHM")
            .unwrap_or_else(|| "HS256".to_string())
            .parse::<Algorithm>()
            .context("JWT_ALGORITHM must be a supported JWT algorithm (e.g. HS256)")?;

        Ok(Config {
            environment,
            upstream_url,
            jwt_secret: optional_env("JWT_SECRET"),
            jwt_algorithm,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Picks the remote origin: the environment-specific URL when set, else the
/// public API URL, else the local default. The result has no trailing slash.
pub fn resolve_upstream_url(
    environment: Environment,
    prod_url: Option<String>,
    dev_url: Option<String>,
    public_url: Option<String>,
) -> Result<String> {
    let specific = match environment {
        Environment::Production => prod_url,
        Environment::Development => dev_url,
    };
    let url = specific
        .or(public_url)
        .unwrap_or_else(|| DEFAULT_PUBLIC_API_URL.to_string());

    reqwest::Url::parse(&url).with_context(|| format!("Upstream URL '{url}' is not a valid URL"))?;

    Ok(url.trim_end_matches('/').to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
