//! Terminal canvas implementation using ratatui
//!
//! Draws the clock waveform, the coordinator statistics and a status line. All data comes from
//! the `CanvasView` prepared by the application loop; this type only draws.

use crate::error::{PacerError, Result};
use crate::render::ui::renderer::CanvasRenderer;
use crate::render::ui::state::CanvasView;
use crate::render::ui::theme::ColorTheme;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Terminal canvas with ratatui backend
pub struct TerminalCanvas {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalCanvas {
    /// Create a new terminal canvas with the default theme
    pub fn new() -> Result<Self> {
        Self::with_theme(ColorTheme::default())
    }

    /// Create terminal canvas with custom theme
    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }

    fn render_waveform(frame: &mut Frame, area: Rect, view: &CanvasView, theme: &ColorTheme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(" clk ");
        let inner = block.inner(area);
        let wave = view.waveform_line(inner.width as usize);

        let spans: Vec<Span> = wave
            .chars()
            .map(|glyph| {
                let style = if glyph == crate::render::ui::state::HIGH_GLYPH {
                    theme.wave_high
                } else {
                    theme.wave_low
                };
                Span::styled(glyph.to_string(), style)
            })
            .collect();

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_stats(frame: &mut Frame, area: Rect, view: &CanvasView, theme: &ColorTheme) {
        let stats = &view.stats;
        let row = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<22}"), theme.label),
                Span::styled(value, theme.value),
            ])
        };

        let mut lines = vec![
            row("ticks", view.snapshot.ticks.to_string()),
            row("dirty notifications", stats.dirty_notifications.to_string()),
            row(
                "coalesced",
                format!(
                    "{} ({:.1}%)",
                    stats.coalesced_notifications,
                    view.coalescing_ratio() * 100.0
                ),
            ),
            row(
                "redraws (now/deferred)",
                format!("{}/{}", stats.immediate_redraws, stats.deferred_redraws),
            ),
            row("frames drawn", view.frames_drawn.to_string()),
        ];
        if view.paused {
            lines.push(Line::from(Span::styled(" PAUSED ", theme.paused)));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border)
            .title(" repaint ");
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_status(frame: &mut Frame, area: Rect, view: &CanvasView, theme: &ColorTheme) {
        let style = Style::default().bg(theme.status_bg).fg(theme.status_fg);
        frame.render_widget(Paragraph::new(view.format_status_line()).style(style), area);
    }
}

impl CanvasRenderer for TerminalCanvas {
    fn render(&mut self, view: &CanvasView) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;

            terminal
                .draw(move |frame| {
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([
                            Constraint::Length(3),
                            Constraint::Min(0),
                            Constraint::Length(1),
                        ])
                        .split(frame.size());

                    Self::render_waveform(frame, chunks[0], view, theme);
                    Self::render_stats(frame, chunks[1], view, theme);
                    Self::render_status(frame, chunks[2], view, theme);
                })
                .map_err(|e| PacerError::io("Failed to draw frame", e))?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if let Some(mut terminal) = self.terminal.take() {
            terminal.show_cursor()?;
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalCanvas {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSnapshot;
    use ratatui::backend::TestBackend;
    use ratatui::style::Color;
    use std::time::Duration;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_terminal_canvas_creation() {
        let canvas = TerminalCanvas::new().unwrap();
        assert!(canvas.terminal.is_none());
        assert_eq!(canvas.theme.status_bg, Color::Blue);

        let mono = TerminalCanvas::with_theme(ColorTheme::monochrome()).unwrap();
        assert_eq!(mono.theme.status_bg, Color::Black);
    }

    #[test]
    fn test_render_without_terminal_is_noop() {
        let mut canvas = TerminalCanvas::new().unwrap();
        let view = CanvasView::new(80, 24, Duration::from_millis(50));
        assert!(canvas.render(&view).is_ok());
    }

    #[test]
    fn test_layout_draws_waveform_and_stats() {
        let theme = ColorTheme::default();
        let mut view = CanvasView::new(40, 12, Duration::from_millis(50));
        let mut snapshot = SimSnapshot::default();
        snapshot.ticks = 7;
        snapshot.waveform = [true, false, true].into_iter().collect();
        view.update(snapshot, Default::default(), 60, true);

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(0),
                        Constraint::Length(1),
                    ])
                    .split(frame.size());
                TerminalCanvas::render_waveform(frame, chunks[0], &view, &theme);
                TerminalCanvas::render_stats(frame, chunks[1], &view, &theme);
                TerminalCanvas::render_status(frame, chunks[2], &view, &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("▀▄▀"));
        assert!(text.contains("ticks"));
        assert!(text.contains("PAUSED"));
        assert!(text.contains("paused @ 60 Hz"));
    }
}
