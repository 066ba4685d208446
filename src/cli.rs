use std::path::PathBuf;
use std::time::Duration;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

use crate::config::{DisplayOptions, FetcherConfig, FORECAST_URL, GEOCODING_URL, USER_AGENT};

const ABOUT: &str = "Open-Meteo weather dashboard";

const LONG_ABOUT: &str = "
Terminal dashboard for current weather and a short-range forecast, sourced from Open-Meteo.

Type a city name and press Enter. The city is geocoded to coordinates, then current conditions,
a 3-day forecast and charts of the next 24 hours are fetched for it. Nothing is cached: every
Enter re-fetches from scratch.

With --plain the report for CITY is printed once as text and the program exits.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to look up on startup (e.g. Berlin, Madison, El Paso)")]
    pub city: Option<String>,

    #[arg(long, help = "Print the report as text and exit")]
    pub plain: bool,

    #[arg(long, requires = "plain", help = "With --plain, print the report as JSON")]
    pub json: bool,

    #[arg(long, help = "Do not show the 3-day forecast")]
    pub hide_forecast: bool,

    #[arg(long, help = "Do not show the hourly charts")]
    pub hide_charts: bool,

    #[arg(long, value_name = "SECONDS", default_value_t = 10, help = "Request timeout")]
    pub timeout: u64,

    #[arg(long, value_name = "URL", default_value = GEOCODING_URL, help = "Geocoding endpoint")]
    pub geocoding_url: String,

    #[arg(long, value_name = "URL", default_value = FORECAST_URL, help = "Forecast endpoint")]
    pub forecast_url: String,

    #[arg(long, help = "Open-Meteo API key (commercial endpoints only)")]
    pub api_key: Option<String>,

    #[arg(long, value_name = "PATH", help = "Write logs to this file (filter with RUST_LOG)")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            geocoding_url: self.geocoding_url.clone(),
            forecast_url: self.forecast_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout),
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            forecast: !self.hide_forecast,
            charts: !self.hide_charts,
        }
    }
}
