use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::config::FetchOptions;
use crate::error::FetchError;
use crate::openmeteo::{forecast, parse_datetime};
use crate::units::condition;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// `Berlin, Germany`, or just `Berlin` when the provider gave no country.
    pub fn display_name(&self) -> String {
        match self.country {
            Some(ref country) if !country.is_empty() => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub observed_at: NaiveDateTime,
    /// °C
    pub temperature: f64,
    /// km/h
    pub wind_speed: f64,
    /// degrees
    pub wind_direction: f64,
    /// %
    pub humidity: f64,
    /// %
    pub cloud_cover: f64,
    /// mm over the first forecast hour
    pub precipitation: f64,
    /// hPa
    pub pressure: f64,
    pub weather_code: u16,
}

impl CurrentConditions {
    pub fn description(&self) -> &'static str {
        condition::describe(self.weather_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub precipitation_sum: f64,
    pub uv_index_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub cloud_cover: f64,
    pub wind_speed: f64,
    pub pressure: f64,
}

/// Everything the dashboard draws for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub location: Location,
    pub timezone: Option<String>,
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecastEntry>,
    pub hourly: Vec<HourlyEntry>,
}

impl Report {
    /// Reshapes a raw forecast payload. The hourly and daily blocks become
    /// records here and are never carried around as parallel arrays; only the
    /// hours and days `options` asks for are read.
    pub fn from_forecast(
        location: Location,
        raw: forecast::Forecast,
        options: &FetchOptions,
    ) -> Result<Self, FetchError> {
        let hourly = raw.hourly.into_records(options.hourly_hours)?;
        let forecast = raw.daily.into_records(options.forecast_days)?;

        let first_hour = hourly
            .first()
            .ok_or_else(|| FetchError::malformed("hourly series is empty"))?;

        if forecast.len() < options.forecast_days {
            return Err(FetchError::malformed(format!(
                "expected {} forecast days, got {}",
                options.forecast_days,
                forecast.len()
            )));
        }

        let current = CurrentConditions {
            observed_at: parse_datetime(&raw.current_weather.time)?,
            temperature: raw.current_weather.temperature,
            wind_speed: raw.current_weather.windspeed,
            wind_direction: raw.current_weather.winddirection,
            humidity: first_hour.humidity,
            cloud_cover: first_hour.cloud_cover,
            precipitation: first_hour.precipitation,
            pressure: first_hour.pressure,
            weather_code: raw.current_weather.weathercode,
        };

        Ok(Self {
            location,
            timezone: raw.timezone,
            current,
            forecast,
            hourly,
        })
    }
}

/// Outcome of one fetch. Errors never escape past this point.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success(Report),
    Failure { message: String },
}

impl FetchResult {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Success(report) => Some(report),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { message } => Some(message),
        }
    }
}

impl From<Result<Report, FetchError>> for FetchResult {
    fn from(result: Result<Report, FetchError>) -> Self {
        match result {
            Ok(report) => Self::Success(report),
            Err(err) => Self::Failure {
                message: err.to_string(),
            },
        }
    }
}
