pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod openmeteo;
pub mod units;
pub mod weather;

pub use config::{DisplayOptions, FetchOptions, FetcherConfig};
pub use error::FetchError;
pub use fetcher::WeatherFetcher;
pub use weather::{CurrentConditions, DailyForecastEntry, FetchResult, HourlyEntry, Location, Report};
