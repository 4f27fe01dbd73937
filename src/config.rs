use axum::http::HeaderValue;

/// Placeholder credential used when `WEATHER_API_KEY` is unset.
///
/// OpenWeatherMap rejects it, so every upstream call fails until a real key
/// is supplied at deployment time.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Frontend origins allowed to call the API from a browser.
const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "https://main.d3erp14kpzu5wp.amplifyapp.com/",
    "https://weatherappication.maheshsivangi.tech",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),

    #[error("ALLOWED_ORIGINS contains an empty entry")]
    EmptyOrigin,

    #[error("ALLOWED_ORIGINS entry '{0}' is not a valid exact origin")]
    InvalidOrigin(String),
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// OpenWeatherMap credential, appended to every outbound request.
    pub api_key: String,
    /// Root of the weather endpoints (`/weather`, `/forecast`).
    pub base_url: String,
    /// Root of the geocoding endpoints (`/direct`).
    pub geo_url: String,
    /// Exact-match list of browser origins allowed to call the API.
    pub allowed_origins: Vec<HeaderValue>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|origin| parse_origin(origin.trim()))
                .collect::<Result<Vec<_>, _>>()?,
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .copied()
                .map(parse_origin)
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self {
            port,
            api_key: lookup("WEATHER_API_KEY")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string()),
            base_url: lookup("OPENWEATHER_BASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            geo_url: lookup("OPENWEATHER_GEO_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_GEO_URL.to_string()),
            allowed_origins,
        })
    }

    /// True when the credential was never overridden.
    pub fn uses_placeholder_key(&self) -> bool {
        self.api_key == PLACEHOLDER_API_KEY
    }
}

fn parse_origin(origin: &str) -> Result<HeaderValue, ConfigError> {
    if origin.is_empty() {
        return Err(ConfigError::EmptyOrigin);
    }
    // Only exact matches are supported, a wildcard would disable the allow-list
    if origin == "*" {
        return Err(ConfigError::InvalidOrigin(origin.to_string()));
    }
    HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
}
