pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    pub fn degree_to_compass(deg: f64) -> &'static str {
        let deg = deg.rem_euclid(360.0);
        let idx = (deg / 22.5 + 0.5) as usize % 16;
        COMPASS[idx]
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(225.0), "SW");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
        assert_eq!(degree_to_compass(-90.0), "W");
    }
}

/// WMO weather interpretation codes, as reported in `current_weather.weathercode`.
pub mod condition {
    pub fn describe(code: u16) -> &'static str {
        match code {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 | 48 => "Fog",
            51 | 53 | 55 => "Drizzle",
            56 | 57 => "Freezing drizzle",
            61 => "Slight rain",
            63 => "Rain",
            65 => "Heavy rain",
            66 | 67 => "Freezing rain",
            71 | 73 | 75 => "Snowfall",
            77 => "Snow grains",
            80..=82 => "Rain showers",
            85 | 86 => "Snow showers",
            95 => "Thunderstorm",
            96 | 99 => "Thunderstorm with hail",
            _ => "Unknown",
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(0), "Clear sky");
        assert_eq!(describe(3), "Overcast");
        assert_eq!(describe(81), "Rain showers");
        assert_eq!(describe(99), "Thunderstorm with hail");
        assert_eq!(describe(42), "Unknown");
    }
}
