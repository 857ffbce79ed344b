//! UI module: View components for the TUI.

pub mod chat;
pub mod clothing;
pub mod dashboard;
pub mod profile;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::{SunTheme, LOGO_SMALL};

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "AtmosGuard gives general sun-protection guidance and does not replace advice from a dermatologist.",
        SunTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(SunTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// One-line screen header: wordmark, screen title and a context note.
pub fn render_header(f: &mut Frame, area: Rect, title: &str, note: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", SunTheme::text()),
        Span::styled(LOGO_SMALL, SunTheme::subtitle()),
        Span::styled(" │ ", SunTheme::text_muted()),
        Span::styled(title.to_string(), SunTheme::title()),
        Span::styled(" │ ", SunTheme::text_muted()),
        Span::styled(note.to_string(), SunTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(SunTheme::border()),
    );

    f.render_widget(header, area);
}

/// Key hints as `[key] description` pairs.
pub fn key_hints(hints: &[(&str, &str)]) -> Line<'static> {
    let spans = hints
        .iter()
        .flat_map(|(key, desc)| {
            [
                Span::styled(format!("[{key}] "), SunTheme::key_hint()),
                Span::styled(format!("{desc} "), SunTheme::key_desc()),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Footer showing an error, a busy note, or key hints.
pub fn render_footer(
    f: &mut Frame,
    area: Rect,
    error: Option<&str>,
    busy: Option<&str>,
    hints: &[(&str, &str)],
) {
    let content = if let Some(err) = error {
        Line::from(vec![
            Span::styled("! ", SunTheme::danger()),
            Span::styled(err.to_string(), SunTheme::danger()),
        ])
    } else if let Some(note) = busy {
        Line::from(vec![Span::styled(format!("… {note}"), SunTheme::info())])
    } else {
        key_hints(hints)
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(SunTheme::border()),
    );

    f.render_widget(footer, area);
}
