use reqwest::blocking::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::{FetchOptions, FetcherConfig};
use crate::error::FetchError;
use crate::openmeteo::forecast::Forecast;
use crate::openmeteo::geocoding::Search;
use crate::weather::{FetchResult, Location, Report};

/// Turns a city name into a [`Report`]: one geocoding call, then one forecast
/// call for the coordinates it returned. Holds no state between fetches.
#[derive(Debug)]
pub struct WeatherFetcher {
    client: Client,
    config: FetcherConfig,
    options: FetchOptions,
}

impl WeatherFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            options: FetchOptions::default(),
        })
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    #[instrument(skip(self))]
    pub fn resolve_location(&self, city: &str) -> Result<Location, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::EmptyQuery);
        }

        let search = Search::from_name(&self.client, &self.config, city)?;
        let place = search.results.into_iter().next().ok_or_else(|| {
            debug!("geocoding returned no results");
            FetchError::NotFound
        })?;

        debug!(lat = place.latitude, lon = place.longitude, "resolved location");
        Ok(Location {
            name: place.name,
            country: place.country,
            latitude: place.latitude,
            longitude: place.longitude,
        })
    }

    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    pub fn fetch_weather(&self, location: &Location) -> FetchResult {
        self.try_fetch_weather(location).into()
    }

    /// Geocodes `city` and fetches its weather. Every error is folded into
    /// [`FetchResult::Failure`].
    #[instrument(skip(self))]
    pub fn fetch(&self, city: &str) -> FetchResult {
        let result = self
            .resolve_location(city)
            .and_then(|location| self.try_fetch_weather(&location));
        match result {
            Ok(ref report) => info!(
                location = %report.location.display_name(),
                days = report.forecast.len(),
                hours = report.hourly.len(),
                "weather fetched"
            ),
            Err(ref err) => warn!(error = %err, "weather fetch failed"),
        }
        result.into()
    }

    fn try_fetch_weather(&self, location: &Location) -> Result<Report, FetchError> {
        let raw = Forecast::from_coord(
            &self.client,
            &self.config,
            location.latitude,
            location.longitude,
        )?;
        Report::from_forecast(location.clone(), raw, &self.options)
    }
}
