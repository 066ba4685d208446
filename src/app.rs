use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Cell, Chart, Dataset,
        GraphType, List, ListItem, Paragraph, Row, Table, Wrap,
    },
    Frame, Terminal,
};

use crate::config::DisplayOptions;
use crate::display::{current_metrics, forecast_line};
use crate::fetcher::WeatherFetcher;
use crate::weather::{FetchResult, HourlyEntry, Report};

const MISSING: &str = "--";

/// What the display region shows.
#[derive(Debug)]
pub enum View {
    Idle,
    Fetching(String),
    Loaded(Report),
    Failed(String),
}

#[derive(Debug)]
pub struct App {
    pub input: String,
    pub view: View,
    pub display: DisplayOptions,
}

/// Outcome of a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Fetch(String),
    Quit,
}

impl App {
    pub fn new(display: DisplayOptions, city: Option<String>) -> Self {
        Self {
            input: city.unwrap_or_default(),
            view: View::Idle,
            display,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Enter => Action::Fetch(self.input.trim().to_string()),
            _ => Action::None,
        }
    }

    pub fn apply(&mut self, result: FetchResult) {
        self.view = match result {
            FetchResult::Success(report) => View::Loaded(report),
            FetchResult::Failure { message } => View::Failed(message),
        };
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    fetcher: &WeatherFetcher,
    mut app: App,
) -> io::Result<()> {
    if !app.input.trim().is_empty() {
        let city = app.input.trim().to_string();
        fetch(terminal, fetcher, &mut app, city)?;
    }

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            match app.on_key(key) {
                Action::Quit => return Ok(()),
                Action::Fetch(city) => fetch(terminal, fetcher, &mut app, city)?,
                Action::None => {}
            }
        }
    }
}

/// Draws the status line, then blocks on the two provider calls.
fn fetch<B: Backend>(
    terminal: &mut Terminal<B>,
    fetcher: &WeatherFetcher,
    app: &mut App,
    city: String,
) -> io::Result<()> {
    app.view = View::Fetching(city.clone());
    terminal.draw(|f| ui(f, app))?;
    let result = fetcher.fetch(&city);
    app.apply(result);
    Ok(())
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_input(app: &App) -> Paragraph<'_> {
    Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(app.input.as_str(), Style::default().fg(Color::Green)),
    ]))
    .block(panel("City (Enter to fetch, Esc to quit)"))
}

fn display_headline(report: &Report) -> Paragraph<'_> {
    let location = &report.location;
    Paragraph::new(vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                location.name.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" : "),
            Span::styled(
                location.country.as_deref().unwrap_or(MISSING),
                Style::default().fg(Color::Blue),
            ),
        ]),
        Line::from(format!(
            " {:.2}, {:.2}  {}  {}",
            location.latitude,
            location.longitude,
            report.timezone.as_deref().unwrap_or(MISSING),
            report.current.observed_at.format("%d-%m-%Y %H:%M"),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_current_conditions(report: &Report) -> Table<'_> {
    let mut rows = vec![Row::new(vec![Cell::from("")])];
    for (label, value) in current_metrics(&report.current) {
        rows.push(Row::new(vec![
            Cell::from(format!(" {label}")),
            Cell::from(value).style(Style::default().fg(Color::Green)),
        ]));
    }

    Table::new(rows, [Constraint::Length(15), Constraint::Min(10)])
        .block(panel("Current Conditions"))
}

fn display_forecast(report: &Report) -> List<'_> {
    let items: Vec<ListItem> = report
        .forecast
        .iter()
        .map(|day| {
            ListItem::new(vec![
                Line::from(""),
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(
                        day.date.format("%A").to_string(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(forecast_line(day), Style::default().fg(Color::Green)),
                ]),
            ])
        })
        .collect();
    List::new(items).block(panel("Forecast"))
}

fn hour_labels(hourly: &[HourlyEntry]) -> Vec<Span<'static>> {
    match (hourly.first(), hourly.last()) {
        (Some(first), Some(last)) => vec![
            Span::raw(first.time.format("%H:%M").to_string()),
            Span::raw(last.time.format("%H:%M").to_string()),
        ],
        _ => vec![Span::raw(MISSING)],
    }
}

fn render_temperature_chart(f: &mut Frame, area: Rect, hourly: &[HourlyEntry]) {
    let points: Vec<(f64, f64)> = hourly
        .iter()
        .enumerate()
        .map(|(i, h)| (i as f64, h.temperature))
        .collect();
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, t)| {
            (lo.min(t), hi.max(t))
        });
    let (min, max) = if points.is_empty() {
        (0.0, 1.0)
    } else {
        ((min - 1.0).floor(), (max + 1.0).ceil())
    };

    let dataset = Dataset::default()
        .name("°C")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(panel("Temperature, next 24h"))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
                .labels(hour_labels(hourly)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([min, max])
                .labels(vec![
                    Span::raw(format!("{min:.0}")),
                    Span::raw(format!("{max:.0}")),
                ]),
        );
    f.render_widget(chart, area);
}

fn render_precipitation_chart(f: &mut Frame, area: Rect, hourly: &[HourlyEntry]) {
    // Bars carry integer heights; scale to tenths of a millimetre.
    let bars: Vec<Bar> = hourly
        .iter()
        .map(|h| {
            Bar::default()
                .value((h.precipitation * 10.0).round().max(0.0) as u64)
                .text_value(String::new())
                .label(Line::from(h.time.format("%H").to_string()))
        })
        .collect();

    let chart = BarChart::default()
        .block(panel("Precipitation (0.1 mm), next 24h"))
        .bar_width(2)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_report(f: &mut Frame, area: Rect, app: &App, report: &Report) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    f.render_widget(display_headline(report), vert_layout[0]);

    let body = if app.display.charts {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(vert_layout[1]);
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        render_temperature_chart(f, charts[0], &report.hourly);
        render_precipitation_chart(f, charts[1], &report.hourly);
        rows[0]
    } else {
        vert_layout[1]
    };

    if app.display.forecast {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);
        f.render_widget(display_current_conditions(report), chunks[0]);
        f.render_widget(display_forecast(report), chunks[1]);
    } else {
        f.render_widget(display_current_conditions(report), body);
    }
}

/// Column after the last typed character, kept inside the input box border.
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(2)
        .saturating_add(typed)
        .min(area.right().saturating_sub(2))
}

fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    f.render_widget(display_input(app), vert_layout[0]);
    f.set_cursor_position((cursor_x(vert_layout[0], &app.input), vert_layout[0].y + 1));

    match app.view {
        View::Idle => {
            let hint = Paragraph::new(format!("\n  {MISSING}")).block(panel("Weather"));
            f.render_widget(hint, vert_layout[1]);
        }
        View::Fetching(ref city) => {
            let status = Paragraph::new(format!("\n  Fetching weather for {city}..."))
                .block(panel("Weather"));
            f.render_widget(status, vert_layout[1]);
        }
        View::Failed(ref message) => {
            let error = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {message}"),
                    Style::default().fg(Color::Red),
                )),
            ])
            .wrap(Wrap { trim: false })
            .block(panel("Error"));
            f.render_widget(error, vert_layout[1]);
        }
        View::Loaded(ref report) => render_report(f, vert_layout[1], app, report),
    }
}
