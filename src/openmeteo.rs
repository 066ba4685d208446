use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::weather::{DailyForecastEntry, HourlyEntry};

pub mod geocoding {
    use super::*;

    #[derive(Deserialize, Debug, Default)]
    pub struct Search {
        /// Open-Meteo leaves the key out entirely when nothing matches.
        #[serde(default)]
        pub results: Vec<Place>,
    }

    impl Search {
        pub fn from_name(
            client: &Client,
            config: &FetcherConfig,
            name: &str,
        ) -> Result<Self, FetchError> {
            let query = [("name", name.to_string()), ("count", "1".to_string())];
            get_web_json(client, config, &config.geocoding_url, &query)
        }
    }

    #[derive(Deserialize, Debug, Clone)]
    pub struct Place {
        pub name: String,

        #[serde(default)]
        pub country: Option<String>,

        pub latitude: f64,

        pub longitude: f64,
    }
}

pub mod forecast {
    use super::*;

    pub const HOURLY_FIELDS: [&str; 6] = [
        "temperature_2m",
        "relative_humidity_2m",
        "precipitation",
        "cloud_cover",
        "wind_speed_10m",
        "surface_pressure",
    ];

    pub const DAILY_FIELDS: [&str; 6] = [
        "temperature_2m_max",
        "temperature_2m_min",
        "sunrise",
        "sunset",
        "precipitation_sum",
        "uv_index_max",
    ];

    #[derive(Deserialize, Debug)]
    pub struct Forecast {
        #[serde(default)]
        pub timezone: Option<String>,

        pub current_weather: CurrentWeather,

        pub hourly: Hourly,

        pub daily: Daily,
    }

    impl Forecast {
        pub fn from_coord(
            client: &Client,
            config: &FetcherConfig,
            lat: f64,
            lon: f64,
        ) -> Result<Self, FetchError> {
            let query = [
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", HOURLY_FIELDS.join(",")),
                ("daily", DAILY_FIELDS.join(",")),
                ("timezone", "auto".to_string()),
            ];
            get_web_json(client, config, &config.forecast_url, &query)
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct CurrentWeather {
        pub time: String,

        pub temperature: f64,

        pub windspeed: f64,

        pub winddirection: f64,

        pub weathercode: u16,
    }

    /// Parallel arrays, one value per hour offset. Values may be `null` near
    /// the end of the forecast range.
    #[derive(Deserialize, Debug)]
    pub struct Hourly {
        pub time: Vec<String>,

        pub temperature_2m: Vec<Option<f64>>,

        pub relative_humidity_2m: Vec<Option<f64>>,

        pub precipitation: Vec<Option<f64>>,

        pub cloud_cover: Vec<Option<f64>>,

        pub wind_speed_10m: Vec<Option<f64>>,

        pub surface_pressure: Vec<Option<f64>>,
    }

    impl Hourly {
        /// Zips the first `limit` hours of the parallel arrays into records.
        /// Hours past `limit` are never looked at.
        pub fn into_records(self, limit: usize) -> Result<Vec<HourlyEntry>, FetchError> {
            let len = self.time.len();
            check_columns(
                "hourly",
                len,
                &[
                    ("temperature_2m", self.temperature_2m.len()),
                    ("relative_humidity_2m", self.relative_humidity_2m.len()),
                    ("precipitation", self.precipitation.len()),
                    ("cloud_cover", self.cloud_cover.len()),
                    ("wind_speed_10m", self.wind_speed_10m.len()),
                    ("surface_pressure", self.surface_pressure.len()),
                ],
            )?;

            let mut records = Vec::with_capacity(len.min(limit));
            for (i, time) in self.time.iter().take(limit).enumerate() {
                records.push(HourlyEntry {
                    time: parse_datetime(time)?,
                    temperature: *present("hourly.temperature_2m", &self.temperature_2m, i)?,
                    humidity: *present(
                        "hourly.relative_humidity_2m",
                        &self.relative_humidity_2m,
                        i,
                    )?,
                    precipitation: *present("hourly.precipitation", &self.precipitation, i)?,
                    cloud_cover: *present("hourly.cloud_cover", &self.cloud_cover, i)?,
                    wind_speed: *present("hourly.wind_speed_10m", &self.wind_speed_10m, i)?,
                    pressure: *present("hourly.surface_pressure", &self.surface_pressure, i)?,
                });
            }
            Ok(records)
        }
    }

    /// Parallel arrays, one value per day offset.
    #[derive(Deserialize, Debug)]
    pub struct Daily {
        pub time: Vec<String>,

        pub temperature_2m_max: Vec<Option<f64>>,

        pub temperature_2m_min: Vec<Option<f64>>,

        pub sunrise: Vec<Option<String>>,

        pub sunset: Vec<Option<String>>,

        pub precipitation_sum: Vec<Option<f64>>,

        pub uv_index_max: Vec<Option<f64>>,
    }

    impl Daily {
        /// Zips the first `limit` days of the parallel arrays into records.
        pub fn into_records(self, limit: usize) -> Result<Vec<DailyForecastEntry>, FetchError> {
            let len = self.time.len();
            check_columns(
                "daily",
                len,
                &[
                    ("temperature_2m_max", self.temperature_2m_max.len()),
                    ("temperature_2m_min", self.temperature_2m_min.len()),
                    ("sunrise", self.sunrise.len()),
                    ("sunset", self.sunset.len()),
                    ("precipitation_sum", self.precipitation_sum.len()),
                    ("uv_index_max", self.uv_index_max.len()),
                ],
            )?;

            let mut records = Vec::with_capacity(len.min(limit));
            for (i, date) in self.time.iter().take(limit).enumerate() {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|e| FetchError::malformed(format!("invalid date {date:?}: {e}")))?;
                records.push(DailyForecastEntry {
                    date,
                    temperature_max: *present(
                        "daily.temperature_2m_max",
                        &self.temperature_2m_max,
                        i,
                    )?,
                    temperature_min: *present(
                        "daily.temperature_2m_min",
                        &self.temperature_2m_min,
                        i,
                    )?,
                    sunrise: parse_time_of_day(present("daily.sunrise", &self.sunrise, i)?)?,
                    sunset: parse_time_of_day(present("daily.sunset", &self.sunset, i)?)?,
                    precipitation_sum: *present(
                        "daily.precipitation_sum",
                        &self.precipitation_sum,
                        i,
                    )?,
                    uv_index_max: *present("daily.uv_index_max", &self.uv_index_max, i)?,
                });
            }
            Ok(records)
        }
    }
}

/// The value at `i` of a column whose length was already checked.
fn present<'a, T>(column: &str, values: &'a [Option<T>], i: usize) -> Result<&'a T, FetchError> {
    values
        .get(i)
        .and_then(Option::as_ref)
        .ok_or_else(|| FetchError::malformed(format!("{column}[{i}] is null")))
}

fn check_columns(block: &str, len: usize, columns: &[(&str, usize)]) -> Result<(), FetchError> {
    for (name, count) in columns {
        if *count != len {
            return Err(FetchError::malformed(format!(
                "{block}.{name} has {count} entries but {block}.time has {len}"
            )));
        }
    }
    Ok(())
}

/// Open-Meteo sends local times without an offset, e.g. `2024-01-15T07:15`.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| FetchError::malformed(format!("invalid timestamp {s:?}: {e}")))
}

fn parse_time_of_day(s: &str) -> Result<NaiveTime, FetchError> {
    parse_datetime(s).map(|dt| dt.time())
}

fn get_web_json<T: DeserializeOwned>(
    client: &Client,
    config: &FetcherConfig,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    let mut request = client.get(url).query(query);
    if let Some(ref key) = config.api_key {
        request = request.query(&[("apikey", key)]);
    }
    let body = request.send()?.error_for_status()?.text()?;
    Ok(serde_json::from_str(&body)?)
}
