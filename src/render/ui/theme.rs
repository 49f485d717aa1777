//! Color theme and styling definitions using ratatui colors
//!
//! This module provides color themes for the canvas using ratatui's color system directly.

use crate::config::ThemeName;
use ratatui::style::{Color, Modifier, Style};

/// Color theme for canvas elements
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Waveform segments while the clock is high
    pub wave_high: Style,

    /// Waveform segments while the clock is low
    pub wave_low: Style,

    /// Panel borders and titles
    pub border: Style,

    /// Statistics labels
    pub label: Style,

    /// Statistics values
    pub value: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Paused indicator
    pub paused: Style,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            wave_high: Style::default().fg(Color::LightGreen),
            wave_low: Style::default().fg(Color::Green),
            border: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            status_bg: Color::Blue,
            status_fg: Color::White,
            paused: Style::default().fg(Color::Black).bg(Color::Yellow),
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            wave_high: Style::default(),
            wave_low: Style::default(),
            border: Style::default(),
            label: Style::default(),
            value: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Black,
            status_fg: Color::White,
            paused: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            wave_high: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            wave_low: Style::default().fg(Color::LightYellow),
            border: Style::default().fg(Color::White),
            label: Style::default().fg(Color::LightCyan),
            value: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            status_bg: Color::White,
            status_fg: Color::Black,
            paused: Style::default().fg(Color::Black).bg(Color::LightRed),
        }
    }

    /// Look up a theme by its configured name
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default(),
            ThemeName::Monochrome => Self::monochrome(),
            ThemeName::HighContrast => Self::high_contrast(),
        }
    }
}
