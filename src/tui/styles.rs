//! Sun-and-sky color palette and styles.
//!
//! Colors chosen for:
//! - High contrast on dark terminals
//! - Risk colors that match the classifier's hex colors

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{AqiClassification, UvClassification};

/// Application color palette.
pub struct SunTheme;

impl SunTheme {
    // === Primary Colors ===

    /// Warm amber - Primary color
    pub const PRIMARY: Color = Color::Rgb(245, 158, 11); // #F59E0B

    /// Lighter amber for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(252, 211, 77); // #FCD34D

    /// Deep orange for accents
    pub const PRIMARY_DARK: Color = Color::Rgb(180, 83, 9); // #B45309

    /// Sky blue - Secondary
    pub const SECONDARY: Color = Color::Rgb(56, 189, 248); // #38BDF8

    /// Light slate for borders
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    // === Background / Text ===

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A
    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style in the UV band's own color.
    #[must_use]
    pub fn uv(uv: &UvClassification) -> Style {
        Style::default()
            .fg(hex_color(uv.color).unwrap_or(Self::WARNING))
            .add_modifier(Modifier::BOLD)
    }

    /// Style in the AQI band's own color.
    #[must_use]
    pub fn aqi(aqi: &AqiClassification) -> Style {
        Style::default()
            .fg(hex_color(aqi.color).unwrap_or(Self::WARNING))
            .add_modifier(Modifier::BOLD)
    }

    /// Green for live data, amber for estimates.
    #[must_use]
    pub fn freshness(live: bool) -> Style {
        if live {
            Self::success()
        } else {
            Self::warning()
        }
    }
}

/// Parse `#rrggbb` into a terminal color.
#[must_use]
pub fn hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Wordmark shown in the header.
pub const LOGO_SMALL: &str = "AtmosGuard";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify_uv;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#10b981"), Some(Color::Rgb(16, 185, 129)));
        assert_eq!(hex_color("#7F1D1D"), Some(Color::Rgb(127, 29, 29)));
        assert_eq!(hex_color("10b981"), None);
        assert_eq!(hex_color("#10b98"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_uv_style_uses_band_color() {
        let style = SunTheme::uv(&classify_uv(1.0));
        assert_eq!(style.fg, Some(Color::Rgb(16, 185, 129)));
    }
}
