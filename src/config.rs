use std::time::Duration;

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const USER_AGENT: &str = "skycast";

/// Endpoints and request settings for [`crate::fetcher::WeatherFetcher`].
///
/// Tests point both URLs at a local mock server.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Sent as the `apikey` query parameter when set.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: GEOCODING_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// How much of the provider payload gets surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub forecast_days: usize,
    pub hourly_hours: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            forecast_days: 3,
            hourly_hours: 24,
        }
    }
}

/// Which optional dashboard sections to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub forecast: bool,
    pub charts: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            forecast: true,
            charts: true,
        }
    }
}
