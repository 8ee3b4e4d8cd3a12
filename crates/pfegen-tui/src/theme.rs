//! Color scheme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use pfegen_core::controller::NotificationKind;

/// The color palette for pfegen's TUI.
pub struct Theme;

impl Theme {
    // ── Base colors ─────────────────────────────────────────
    pub fn bg() -> Color {
        Color::Reset
    }

    pub fn fg() -> Color {
        Color::Rgb(200, 200, 200)
    }

    pub fn fg_dim() -> Color {
        Color::Rgb(100, 100, 100)
    }

    pub fn fg_muted() -> Color {
        Color::Rgb(140, 140, 140)
    }

    // ── Accent colors ───────────────────────────────────────
    pub fn accent() -> Color {
        Color::Rgb(110, 170, 255)
    }

    pub fn success() -> Color {
        Color::Rgb(80, 200, 120)
    }

    pub fn warning() -> Color {
        Color::Rgb(230, 180, 80)
    }

    pub fn error() -> Color {
        Color::Rgb(240, 80, 80)
    }

    pub fn border_color() -> Color {
        Color::Rgb(60, 60, 60)
    }

    // ── Composite styles ────────────────────────────────────

    pub fn title() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::fg()).add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::fg())
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::fg_dim())
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::fg_muted())
    }

    pub fn border() -> Style {
        Style::default().fg(Self::border_color())
    }

    pub fn focused_border() -> Style {
        Style::default().fg(Self::accent())
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Self::accent())
    }

    pub fn cursor() -> Style {
        Style::default().fg(Self::bg()).bg(Self::accent())
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::fg_muted())
    }

    pub fn button(busy: bool) -> Style {
        if busy {
            Style::default()
                .fg(Self::warning())
                .add_modifier(Modifier::DIM)
        } else {
            Style::default()
                .fg(Self::accent())
                .add_modifier(Modifier::BOLD)
        }
    }

    pub fn notification(kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Info => Self::accent(),
            NotificationKind::Warning => Self::warning(),
            NotificationKind::Error => Self::error(),
        }
    }
}
