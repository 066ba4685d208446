use std::fmt::Write;

use crate::config::DisplayOptions;
use crate::units::direction::degree_to_compass;
use crate::weather::{CurrentConditions, DailyForecastEntry, Report};

pub fn wind(current: &CurrentConditions) -> String {
    format!(
        "{:.1} km/h {} ({:.0}°)",
        current.wind_speed,
        degree_to_compass(current.wind_direction),
        current.wind_direction
    )
}

/// Label/value pairs shared by the dashboard table and the plain report.
pub fn current_metrics(current: &CurrentConditions) -> Vec<(&'static str, String)> {
    vec![
        ("Temperature", format!("{:.1} °C", current.temperature)),
        ("Conditions", current.description().to_string()),
        ("Wind", wind(current)),
        ("Humidity", format!("{:.0} %", current.humidity)),
        ("Cloud cover", format!("{:.0} %", current.cloud_cover)),
        ("Precipitation", format!("{:.1} mm", current.precipitation)),
        ("Pressure", format!("{:.0} hPa", current.pressure)),
    ]
}

pub fn forecast_line(day: &DailyForecastEntry) -> String {
    format!(
        "{}  {:.1}/{:.1} °C  sun {}-{}  {:.1} mm  UV {:.1}",
        day.date.format("%a %d %b"),
        day.temperature_min,
        day.temperature_max,
        day.sunrise.format("%H:%M"),
        day.sunset.format("%H:%M"),
        day.precipitation_sum,
        day.uv_index_max
    )
}

/// Text rendition of a report, used by `--plain`.
pub fn render_text(report: &Report, options: &DisplayOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Weather in {} ({:.2}, {:.2})",
        report.location.display_name(),
        report.location.latitude,
        report.location.longitude
    );
    for (label, value) in current_metrics(&report.current) {
        let _ = writeln!(out, "  {label:<14}{value}");
    }
    if options.forecast && !report.forecast.is_empty() {
        let _ = writeln!(out, "Forecast");
        for day in &report.forecast {
            let _ = writeln!(out, "  {}", forecast_line(day));
        }
    }
    out
}
