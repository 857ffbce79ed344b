//! Clothing view: what to wear today, with image references.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{ClothingAdvice, ClothingSource};
use crate::domain::{ClothingCategory, Conditions};
use crate::tui::styles::SunTheme;

use super::{render_footer, render_header};

/// Clothing screen state
#[derive(Default)]
pub enum ClothingState {
    #[default]
    Idle,
    Loading,
    Ready {
        advice: Box<ClothingAdvice>,
        conditions: Box<Conditions>,
    },
    Error {
        message: String,
    },
}

const HINTS: &[(&str, &str)] = &[("R", "Regenerate"), ("Esc", "Back")];

/// Render the clothing recommendation screen
pub fn render_clothing(f: &mut Frame, area: Rect, state: &ClothingState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(2), // Footer
        ])
        .split(area);

    match state {
        ClothingState::Ready { advice, conditions } => {
            let source = match advice.source {
                ClothingSource::Generated => "AI stylist",
                ClothingSource::RuleBased => "Standard guidance",
            };
            let note = format!(
                "UV {:.1} {} · AQI {:.0} {} · {}",
                conditions.uv.index,
                conditions.uv.label,
                conditions.aqi.value,
                conditions.aqi.level,
                source
            );
            render_header(f, chunks[0], "What to Wear", &note);
            render_recommendation(f, chunks[1], advice);
        }
        ClothingState::Loading | ClothingState::Idle => {
            render_header(f, chunks[0], "What to Wear", "Preparing recommendation");
            let p = Paragraph::new(Line::from(Span::styled(
                "Checking today's conditions and picking your outfit…",
                SunTheme::text_muted(),
            )));
            f.render_widget(p, chunks[1]);
        }
        ClothingState::Error { .. } => {
            render_header(f, chunks[0], "What to Wear", "Unavailable");
        }
    }

    let error = match state {
        ClothingState::Error { message } => Some(message.as_str()),
        _ => None,
    };
    let busy = matches!(state, ClothingState::Loading).then_some("Working");
    render_footer(f, chunks[2], error, busy, HINTS);
}

fn render_recommendation(f: &mut Frame, area: Rect, advice: &ClothingAdvice) {
    let rec = &advice.recommendation;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    let mut lines = Vec::new();
    for category in ClothingCategory::ALL {
        let items = rec.items(category);
        if items.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(category.label(), SunTheme::subtitle())));
        for item in items {
            lines.push(Line::from(vec![
                Span::styled("  • ", SunTheme::key_hint()),
                Span::styled(item.as_str(), SunTheme::text()),
            ]));
        }
        if let Some(image) = rec
            .images
            .as_ref()
            .and_then(|images| images.get(&category))
            .and_then(|list| list.first())
        {
            lines.push(Line::from(Span::styled(
                format!("    {} ({})", image.url, image.attribution),
                SunTheme::text_muted(),
            )));
        }
        lines.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(" Outfit ", SunTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(SunTheme::border()),
            )
            .wrap(Wrap { trim: false }),
        columns[0],
    );

    let considerations: Vec<Line> = rec
        .special_considerations
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled("• ", SunTheme::warning()),
                Span::styled(c.as_str(), SunTheme::text()),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(considerations)
            .block(
                Block::default()
                    .title(Span::styled(" Special Considerations ", SunTheme::subtitle()))
                    .borders(Borders::ALL)
                    .border_style(SunTheme::border()),
            )
            .wrap(Wrap { trim: false }),
        columns[1],
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            rec.overall_advice.as_str(),
            SunTheme::text(),
        )))
        .block(
            Block::default()
                .title(Span::styled(" Overall ", SunTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(SunTheme::border()),
        )
        .wrap(Wrap { trim: true }),
        chunks[1],
    );
}
