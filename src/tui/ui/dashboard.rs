//! Dashboard view: Today's conditions and advice.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::Dashboard;
use crate::tui::styles::SunTheme;

use super::{render_footer, render_header};

/// Upper end of the UV gauge.
const UV_GAUGE_MAX: f64 = 11.0;

/// Dashboard state for rendering.
#[derive(Default)]
pub struct DashboardState {
    pub dashboard: Option<Dashboard>,
    pub loading: bool,
    pub error: Option<String>,
}

const HINTS: &[(&str, &str)] = &[
    ("P", "Profile"),
    ("C", "Clothing"),
    ("A", "Advice chat"),
    ("R", "Refresh"),
    ("Q", "Quit"),
];

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let note = match &state.dashboard {
        Some(d) => format!("{} · {}", d.user.name, d.location),
        None => "Loading…".to_string(),
    };
    render_header(f, chunks[0], "Dashboard", &note);

    match &state.dashboard {
        Some(dashboard) => render_main_content(f, chunks[1], dashboard),
        None => {
            let msg = Paragraph::new(Line::from(Span::styled(
                "Fetching today's conditions…",
                SunTheme::text_muted(),
            )));
            f.render_widget(msg, chunks[1]);
        }
    }

    let busy = state.loading.then_some("Refreshing conditions");
    render_footer(f, chunks[2], state.error.as_deref(), busy, HINTS);
}

fn render_main_content(f: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_conditions(f, chunks[0], dashboard);
    render_advice(f, chunks[1], dashboard);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {title} "), SunTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(SunTheme::border())
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label}: "), SunTheme::text_secondary()),
        Span::styled(value, SunTheme::text()),
    ])
}

fn render_conditions(f: &mut Frame, area: Rect, d: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Weather
            Constraint::Length(5), // UV
            Constraint::Min(0),    // Air quality
        ])
        .split(area);

    let w = &d.weather;
    let freshness = if d.data_fetched {
        "live"
    } else {
        "estimated"
    };
    let weather = vec![
        row("Temperature", format!("{:.0}°C (feels {:.0}°C)", w.temperature, w.feels_like)),
        row("Sky", w.description.clone()),
        row("Humidity", format!("{:.0}%", w.humidity)),
        row("Wind", format!("{:.0} km/h {}", w.wind_speed, w.wind_compass())),
        Line::from(vec![
            Span::styled("  Data: ", SunTheme::text_secondary()),
            Span::styled(freshness, SunTheme::freshness(d.data_fetched)),
        ]),
    ];
    f.render_widget(Paragraph::new(weather).block(panel("Weather")), chunks[0]);

    let ratio = (d.uv.index / UV_GAUGE_MAX).clamp(0.0, 1.0);
    let uv_gauge = Gauge::default()
        .block(panel("UV Index"))
        .gauge_style(SunTheme::uv(&d.uv))
        .ratio(ratio)
        .label(format!("{:.1} · {} · {}", d.uv.index, d.uv.label, d.uv.risk));
    f.render_widget(uv_gauge, chunks[1]);

    let p = &d.pollutants;
    let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"));
    let air = vec![
        Line::from(vec![
            Span::styled(format!("  AQI {:.0} ", d.air_quality.value), SunTheme::text()),
            Span::styled(d.air_quality.level, SunTheme::aqi(&d.air_quality)),
        ]),
        Line::from(Span::styled(
            format!("  {}", d.air_quality.description),
            SunTheme::text_secondary(),
        )),
        row("PM2.5", fmt(p.pm2_5)),
        row("PM10", fmt(p.pm10)),
        row("O3", fmt(p.o3)),
        row("NO2", fmt(p.no2)),
    ];
    f.render_widget(
        Paragraph::new(air)
            .block(panel("Air Quality"))
            .wrap(Wrap { trim: false }),
        chunks[2],
    );
}

fn render_advice(f: &mut Frame, area: Rect, d: &Dashboard) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let tips: Vec<Line> = d
        .daily_tips
        .iter()
        .map(|tip| {
            Line::from(vec![
                Span::styled("  • ", SunTheme::key_hint()),
                Span::styled(tip.clone(), SunTheme::text()),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(tips)
            .block(panel("Today's Tips"))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    let mut activity: Vec<Line> = d
        .recent_activities
        .iter()
        .map(|a| {
            Line::from(vec![
                Span::styled(format!("  {:<16}", a.time), SunTheme::text_muted()),
                Span::styled(a.message.clone(), SunTheme::text()),
            ])
        })
        .collect();
    activity.push(Line::from(""));
    activity.push(row("Days protected", d.days_protected.to_string()));
    f.render_widget(
        Paragraph::new(activity).block(panel("Recent Activity")),
        chunks[1],
    );
}
