use quill_core::{Phase, parse_hex_color};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

/// Phosphor theme for the Quill tablet
///
/// Dark bezel around a black screen, green phosphor accents.
#[derive(Debug, Clone, Copy)]
pub struct Theme;

impl Theme {
    /// Terminal background
    pub const BG: Color = Color::Rgb(10, 10, 12);

    /// Primary text
    pub const FG: Color = Color::Rgb(198, 200, 209);

    /// Tablet bezel
    pub const BEZEL: Color = Color::Rgb(38, 38, 44);

    /// Bezel highlight
    pub const BEZEL_EDGE: Color = Color::Rgb(74, 74, 84);

    /// Writable screen
    pub const SCREEN_BG: Color = Color::Rgb(0, 0, 0);

    /// Phosphor accent
    pub const GREEN: Color = Color::Rgb(0, 255, 65);

    /// Warning accent
    pub const YELLOW: Color = Color::Rgb(226, 164, 120);

    /// Disconnected / errors
    pub const RED: Color = Color::Rgb(226, 120, 120);

    /// Secondary accent
    pub const CYAN: Color = Color::Rgb(137, 184, 194);

    /// Muted text
    pub const MUTED: Color = Color::Rgb(107, 112, 137);

    /// Base style for all text
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    /// Muted style (for secondary text)
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED).bg(Self::BG)
    }

    pub fn bezel() -> Style {
        Style::default().fg(Self::BEZEL_EDGE).bg(Self::BEZEL)
    }

    pub fn screen() -> Style {
        Style::default().fg(Self::GREEN).bg(Self::SCREEN_BG)
    }

    /// Resolve a configured `#rrggbb` ink, falling back to phosphor green
    pub fn ink(hex: &str) -> Color {
        parse_hex_color(hex).map(|(r, g, b)| Color::Rgb(r, g, b)).unwrap_or(Self::GREEN)
    }

    /// Style of a line still being written
    pub fn wet_ink(hex: &str) -> Style {
        Style::default().fg(Self::ink(hex)).bg(Self::SCREEN_BG).add_modifier(Modifier::BOLD)
    }

    /// Style of a settled line
    pub fn dry_ink(hex: &str) -> Style {
        Style::default().fg(Self::ink(hex)).bg(Self::SCREEN_BG)
    }

    /// Get engine phase color
    pub fn phase_color(phase: Phase) -> Color {
        match phase {
            Phase::Idle => Self::MUTED,
            Phase::Traveling => Self::CYAN,
            Phase::Typing => Self::GREEN,
            Phase::Overflow => Self::YELLOW,
            Phase::Clearing => Self::RED,
        }
    }

    /// Get span with phase styling
    pub fn phase_span(phase: Phase) -> Span<'static> {
        Span::styled(phase.as_str().to_uppercase(), Style::default().fg(Self::phase_color(phase)))
    }

    /// Get span with connection status styling
    pub fn connection_span(connected: bool) -> Span<'static> {
        if connected {
            Span::styled("● LIVE", Style::default().fg(Self::GREEN))
        } else {
            Span::styled("○ OFFLINE", Style::default().fg(Self::RED))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_values() {
        assert!(matches!(Theme::BG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::SCREEN_BG, Color::Rgb(_, _, _)));
        assert!(matches!(Theme::GREEN, Color::Rgb(_, _, _)));
    }

    #[test]
    fn test_ink_parsing() {
        assert_eq!(Theme::ink("#00ff41"), Color::Rgb(0, 255, 65));
        assert_eq!(Theme::ink("#4ADE80"), Color::Rgb(74, 222, 128));
        assert_eq!(Theme::ink("green"), Theme::GREEN);
    }

    #[test]
    fn test_ink_styles() {
        let wet = Theme::wet_ink("#ff0000");
        assert_eq!(wet.fg, Some(Color::Rgb(255, 0, 0)));
        assert!(wet.add_modifier.contains(Modifier::BOLD));

        let dry = Theme::dry_ink("#00ff00");
        assert_eq!(dry.fg, Some(Color::Rgb(0, 255, 0)));
        assert!(!dry.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_phase_colors() {
        assert_eq!(Theme::phase_color(Phase::Idle), Theme::MUTED);
        assert_eq!(Theme::phase_color(Phase::Typing), Theme::GREEN);
        assert_eq!(Theme::phase_color(Phase::Clearing), Theme::RED);
        assert_eq!(Theme::phase_span(Phase::Traveling).content, "TRAVELING");
    }

    #[test]
    fn test_connection_span() {
        assert!(Theme::connection_span(true).content.contains("LIVE"));
        assert!(Theme::connection_span(false).content.contains("OFFLINE"));
    }
}
