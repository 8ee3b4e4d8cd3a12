//! Generation progress gauge. Cosmetic: driven by a timer, not by the service.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Gauge};
use ratatui::Frame;

use pfegen_core::progress::ProgressTicker;

use crate::action::Action;
use crate::components::{centered_rect, Component};
use crate::theme::Theme;

pub struct BusyOverlayComponent {
    pub ticker: ProgressTicker,
    pub visible: bool,
}

impl BusyOverlayComponent {
    pub fn new(step: u8) -> Self {
        Self {
            ticker: ProgressTicker::new(step),
            visible: false,
        }
    }
}

impl Component for BusyOverlayComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ProgressStarted => {
                self.ticker.start();
                self.visible = true;
            }
            Action::ProgressTick => {
                self.ticker.tick();
            }
            Action::ProgressStopped => {
                self.ticker.stop();
                self.visible = false;
            }
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let dialog = centered_rect(area, 50, 3);
        frame.render_widget(Clear, dialog);

        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(" Génération du rapport... ")
                    .title_style(Theme::title())
                    .borders(Borders::ALL)
                    .border_style(Theme::focused_border()),
            )
            .gauge_style(Style::default().fg(Theme::accent()))
            .ratio(self.ticker.ratio())
            .label(format!("{}%", self.ticker.value()));
        frame.render_widget(gauge, dialog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfegen_core::progress::PROGRESS_MAX;

    #[test]
    fn start_tick_stop() {
        let mut overlay = BusyOverlayComponent::new(10);
        overlay.handle_action(&Action::ProgressStarted);
        assert!(overlay.visible);
        overlay.handle_action(&Action::ProgressTick);
        assert_eq!(overlay.ticker.value(), 10);

        overlay.handle_action(&Action::ProgressStopped);
        assert!(!overlay.visible);
        assert!(!overlay.ticker.is_running());
    }

    #[test]
    fn ticker_stops_itself_at_max() {
        let mut overlay = BusyOverlayComponent::new(60);
        overlay.handle_action(&Action::ProgressStarted);
        overlay.handle_action(&Action::ProgressTick);
        overlay.handle_action(&Action::ProgressTick);
        assert_eq!(overlay.ticker.value(), PROGRESS_MAX);
        assert!(!overlay.ticker.is_running());
        // Still shown until the request ends.
        assert!(overlay.visible);
    }
}
