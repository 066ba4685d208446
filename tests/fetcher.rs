//! Fetcher behaviour against a mock Open-Meteo provider.
//!
//! The fetcher is blocking, so the mock server gets its own tokio runtime and
//! the tests drive the fetcher from the plain test thread.

use std::time::Duration;

use serde_json::{json, Value};
use skycast::{FetchError, FetchOptions, FetchResult, FetcherConfig, Location, WeatherFetcher};
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

struct Provider {
    server: MockServer,
    rt: Runtime,
}

impl Provider {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn geocoding(&self, response: ResponseTemplate) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/v1/search"))
                .respond_with(response),
        );
    }

    fn forecast(&self, response: ResponseTemplate) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/v1/forecast"))
                .respond_with(response),
        );
    }

    fn config(&self) -> FetcherConfig {
        FetcherConfig {
            geocoding_url: format!("{}/v1/search", self.server.uri()),
            forecast_url: format!("{}/v1/forecast", self.server.uri()),
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    fn fetcher(&self) -> WeatherFetcher {
        WeatherFetcher::new(self.config()).unwrap()
    }

    fn requests(&self) -> Vec<wiremock::Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

fn berlin() -> Location {
    Location {
        name: "Berlin".to_string(),
        country: Some("Germany".to_string()),
        latitude: 52.52437,
        longitude: 13.41053,
    }
}

fn geocoding_body() -> Value {
    json!({
        "results": [{
            "id": 2950159,
            "name": "Berlin",
            "latitude": 52.52437,
            "longitude": 13.41053,
            "elevation": 74.0,
            "country_code": "DE",
            "timezone": "Europe/Berlin",
            "country": "Germany",
            "admin1": "Land Berlin"
        }],
        "generationtime_ms": 0.92
    })
}

fn forecast_body(days: usize) -> Value {
    let hour_times: Vec<String> = (0..48)
        .map(|h| format!("2024-01-{:02}T{:02}:00", 15 + h / 24, h % 24))
        .collect();
    let day_times: Vec<String> = (0..days).map(|d| format!("2024-01-{:02}", 15 + d)).collect();
    let sunrise: Vec<String> = day_times.iter().map(|d| format!("{d}T08:14")).collect();
    let sunset: Vec<String> = day_times.iter().map(|d| format!("{d}T16:21")).collect();
    json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "generationtime_ms": 0.21,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Berlin",
        "timezone_abbreviation": "CET",
        "elevation": 38.0,
        "current_weather": {
            "time": "2024-01-15T12:00",
            "interval": 900,
            "temperature": -1.3,
            "windspeed": 14.8,
            "winddirection": 261,
            "is_day": 1,
            "weathercode": 71
        },
        "hourly": {
            "time": hour_times,
            "temperature_2m": (0..48).map(|h| -3.0 + h as f64 * 0.25).collect::<Vec<_>>(),
            "relative_humidity_2m": vec![88; 48],
            "precipitation": (0..48).map(|h| if h % 6 == 0 { 0.4 } else { 0.0 }).collect::<Vec<_>>(),
            "cloud_cover": vec![100; 48],
            "wind_speed_10m": vec![14.8; 48],
            "surface_pressure": vec![1004.6; 48]
        },
        "daily": {
            "time": day_times,
            "temperature_2m_max": (0..days).map(|d| d as f64).collect::<Vec<_>>(),
            "temperature_2m_min": vec![-4.5; days],
            "sunrise": sunrise,
            "sunset": sunset,
            "precipitation_sum": vec![1.2; days],
            "uv_index_max": vec![0.9; days]
        }
    })
}

#[test]
fn resolves_known_city_to_provider_coordinates() {
    let provider = Provider::start();
    provider.mount(
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Berlin"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body())),
    );

    let location = provider.fetcher().resolve_location("Berlin").unwrap();
    assert_eq!(location, berlin());
}

#[test]
fn empty_results_is_not_found() {
    let provider = Provider::start();
    provider.geocoding(
        ResponseTemplate::new(200).set_body_json(json!({"results": [], "generationtime_ms": 0.3})),
    );

    let err = provider.fetcher().resolve_location("Atlantis").unwrap_err();
    assert_eq!(err, FetchError::NotFound);
    assert_eq!(err.to_string(), "City not found. Please try another.");
}

#[test]
fn missing_results_is_not_found() {
    let provider = Provider::start();
    provider.geocoding(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.3})));

    let result = provider.fetcher().fetch("Atlantis");
    assert_eq!(
        result,
        FetchResult::Failure {
            message: "City not found. Please try another.".to_string()
        }
    );
    // No forecast call after a failed lookup.
    assert_eq!(provider.requests().len(), 1);
}

#[test]
fn empty_city_makes_no_request() {
    let provider = Provider::start();

    let err = provider.fetcher().resolve_location("   ").unwrap_err();
    assert_eq!(err, FetchError::EmptyQuery);
    assert!(provider.requests().is_empty());
}

#[test]
fn server_error_is_transport_error() {
    let provider = Provider::start();
    provider.geocoding(ResponseTemplate::new(503));

    let err = provider.fetcher().resolve_location("Berlin").unwrap_err();
    match err {
        FetchError::Transport(message) => assert!(message.contains("503"), "{message}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn non_json_geocoding_body_is_malformed() {
    let provider = Provider::start();
    provider.geocoding(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"));

    let err = provider.fetcher().resolve_location("Berlin").unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[test]
fn forecast_surfaces_first_three_days_in_order() {
    let provider = Provider::start();
    provider.forecast(ResponseTemplate::new(200).set_body_json(forecast_body(5)));

    let result = provider.fetcher().fetch_weather(&berlin());
    let report = result.report().unwrap();
    let dates: Vec<String> = report.forecast.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(dates, ["2024-01-15", "2024-01-16", "2024-01-17"]);
    let maxima: Vec<f64> = report.forecast.iter().map(|d| d.temperature_max).collect();
    assert_eq!(maxima, [0.0, 1.0, 2.0]);
    assert_eq!(report.hourly.len(), 24);
    assert_eq!(report.hourly[0].time.to_string(), "2024-01-15 00:00:00");
    assert_eq!(report.hourly[23].time.to_string(), "2024-01-15 23:00:00");
}

#[test]
fn current_conditions_mirror_payload() {
    let provider = Provider::start();
    provider.forecast(ResponseTemplate::new(200).set_body_json(forecast_body(3)));

    let result = provider.fetcher().fetch_weather(&berlin());
    let current = &result.report().unwrap().current;
    assert_eq!(current.temperature, -1.3);
    assert_eq!(current.wind_speed, 14.8);
    assert_eq!(current.wind_direction, 261.0);
    assert_eq!(current.humidity, 88.0);
    assert_eq!(current.cloud_cover, 100.0);
    assert_eq!(current.precipitation, 0.4);
    assert_eq!(current.weather_code, 71);
}

#[test]
fn forecast_request_asks_for_all_fields() {
    let provider = Provider::start();
    provider.mount(
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.52437"))
            .and(query_param("longitude", "13.41053"))
            .and(query_param("current_weather", "true"))
            .and(query_param(
                "hourly",
                "temperature_2m,relative_humidity_2m,precipitation,cloud_cover,wind_speed_10m,surface_pressure",
            ))
            .and(query_param(
                "daily",
                "temperature_2m_max,temperature_2m_min,sunrise,sunset,precipitation_sum,uv_index_max",
            ))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(3))),
    );

    let result = provider.fetcher().fetch_weather(&berlin());
    assert!(result.report().is_some(), "{result:?}");
}

#[test]
fn fetch_makes_two_calls_and_sends_api_key() {
    let provider = Provider::start();
    provider.mount(
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(geocoding_body())),
    );
    provider.mount(
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(7))),
    );

    let config = FetcherConfig {
        api_key: Some("secret".to_string()),
        ..provider.config()
    };
    let result = WeatherFetcher::new(config).unwrap().fetch("Berlin");

    let report = result.report().unwrap();
    assert_eq!(report.location, berlin());
    assert_eq!(report.timezone.as_deref(), Some("Europe/Berlin"));
    let paths: Vec<String> = provider
        .requests()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, ["/v1/search", "/v1/forecast"]);
}

#[test]
fn geocoding_timeout_is_failure() {
    let provider = Provider::start();
    provider.geocoding(
        ResponseTemplate::new(200)
            .set_body_json(geocoding_body())
            .set_delay(Duration::from_secs(3)),
    );
    let config = FetcherConfig {
        timeout: Duration::from_millis(300),
        ..provider.config()
    };

    let result = WeatherFetcher::new(config).unwrap().fetch("Berlin");
    assert!(result.report().is_none());
    let message = result.error_message().unwrap();
    assert!(message.contains("timed out"), "{message}");
}

#[test]
fn forecast_timeout_is_failure_without_partial_data() {
    let provider = Provider::start();
    provider.geocoding(ResponseTemplate::new(200).set_body_json(geocoding_body()));
    provider.forecast(
        ResponseTemplate::new(200)
            .set_body_json(forecast_body(3))
            .set_delay(Duration::from_secs(3)),
    );
    let config = FetcherConfig {
        timeout: Duration::from_millis(300),
        ..provider.config()
    };

    let result = WeatherFetcher::new(config).unwrap().fetch("Berlin");
    match result {
        FetchResult::Failure { ref message } => assert!(message.contains("timed out"), "{message}"),
        FetchResult::Success(_) => panic!("expected a failure"),
    }
}

#[test]
fn forecast_missing_daily_block_is_malformed() {
    let provider = Provider::start();
    let mut body = forecast_body(3);
    body.as_object_mut().unwrap().remove("daily");
    provider.forecast(ResponseTemplate::new(200).set_body_json(body));

    let result = provider.fetcher().fetch_weather(&berlin());
    let message = result.error_message().unwrap();
    assert!(message.starts_with("Malformed response:"), "{message}");
    assert!(message.contains("daily"), "{message}");
}

#[test]
fn forecast_with_misaligned_arrays_is_malformed() {
    let provider = Provider::start();
    let mut body = forecast_body(3);
    body["daily"]["sunrise"].as_array_mut().unwrap().pop();
    provider.forecast(ResponseTemplate::new(200).set_body_json(body));

    let result = provider.fetcher().fetch_weather(&berlin());
    assert_eq!(
        result.error_message(),
        Some("Malformed response: daily.sunrise has 2 entries but daily.time has 3")
    );
}

#[test]
fn fetch_weather_is_idempotent() {
    let provider = Provider::start();
    provider.forecast(ResponseTemplate::new(200).set_body_json(forecast_body(4)));

    let fetcher = provider.fetcher();
    let first = fetcher.fetch_weather(&berlin());
    let second = fetcher.fetch_weather(&berlin());
    assert!(first.report().is_some());
    assert_eq!(first, second);
    // Nothing is cached.
    assert_eq!(provider.requests().len(), 2);
}

#[test]
fn options_choose_days_and_hours_shown() {
    let provider = Provider::start();
    provider.forecast(ResponseTemplate::new(200).set_body_json(forecast_body(7)));

    let fetcher = provider.fetcher().with_options(FetchOptions {
        forecast_days: 5,
        hourly_hours: 6,
    });
    let result = fetcher.fetch_weather(&berlin());
    let report = result.report().unwrap();
    let dates: Vec<String> = report.forecast.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(
        dates,
        ["2024-01-15", "2024-01-16", "2024-01-17", "2024-01-18", "2024-01-19"]
    );
    assert_eq!(report.hourly.len(), 6);
    assert_eq!(report.hourly[5].time.to_string(), "2024-01-15 05:00:00");
}

#[test]
fn null_after_shown_days_still_succeeds() {
    let provider = Provider::start();
    let mut body = forecast_body(4);
    body["daily"]["uv_index_max"][3] = Value::Null;
    body["hourly"]["temperature_2m"][40] = Value::Null;
    provider.forecast(ResponseTemplate::new(200).set_body_json(body));

    let result = provider.fetcher().fetch_weather(&berlin());
    let report = result.report().unwrap();
    assert_eq!(report.forecast.len(), 3);
    assert_eq!(report.hourly.len(), 24);
}

#[test]
fn null_in_shown_day_is_malformed() {
    let provider = Provider::start();
    let mut body = forecast_body(4);
    body["daily"]["uv_index_max"][0] = Value::Null;
    provider.forecast(ResponseTemplate::new(200).set_body_json(body));

    let result = provider.fetcher().fetch_weather(&berlin());
    assert_eq!(
        result.error_message(),
        Some("Malformed response: daily.uv_index_max[0] is null")
    );
}

#[test]
fn geocoding_result_without_latitude_is_malformed() {
    let provider = Provider::start();
    let mut body = geocoding_body();
    body["results"][0].as_object_mut().unwrap().remove("latitude");
    provider.geocoding(ResponseTemplate::new(200).set_body_json(body));

    let err = provider.fetcher().resolve_location("Berlin").unwrap_err();
    match err {
        FetchError::MalformedResponse(message) => assert!(message.contains("latitude"), "{message}"),
        other => panic!("expected malformed response, got {other:?}"),
    }
}
