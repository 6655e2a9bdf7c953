//! Application configuration
//!
//! All settings come from environment variables, read once at startup.
//! Anything required that is missing or empty fails startup immediately
//! rather than surfacing as a broken redirect later.

use std::env;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set or empty")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Identity provider credentials and flow parameters.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Provider domain, e.g. `my-tenant.auth0.com` (no scheme)
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// API identifier requested via the `audience` parameter
    pub audience: String,
    /// Space-separated OAuth scopes, e.g. `openid profile`
    pub scope: String,
}

/// Immutable process-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthSettings,
    /// Downstream API invoked with the bearer token after login
    pub forecast_api_url: String,
    /// External base URL of this app, used to derive the callback redirect_uri
    pub public_base_url: String,
    pub host: String,
    pub port: u16,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

impl Settings {
    /// Load and validate settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth = AuthSettings {
            domain: required("AUTH0_DOMAIN")?,
            client_id: required("AUTH0_CLIENT_ID")?,
            client_secret: required("AUTH0_CLIENT_SECRET")?,
            audience: required("AUTH0_AUDIENCE")?,
            scope: required("AUTH0_SCOPE")?,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar("PORT", raw))?,
            Err(_) => 3000,
        };

        Ok(Self {
            auth,
            forecast_api_url: required("WEATHER_FORECAST_API_URL")?,
            // Trailing slash would produce `//Home/...` in the redirect_uri
            public_base_url: required("PUBLIC_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
        })
    }

    /// The callback URL registered with the identity provider.
    pub fn callback_url(&self) -> String {
        format!("{}/Home/InvokeApiCallback", self.public_base_url)
    }
}
