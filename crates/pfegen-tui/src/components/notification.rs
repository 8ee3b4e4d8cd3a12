//! Modal notification. Blocks other input until dismissed with Enter or Esc.

use std::collections::VecDeque;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use pfegen_core::controller::{Notification, NotificationKind};

use crate::action::Action;
use crate::components::{centered_rect, Component};
use crate::theme::Theme;

#[derive(Default)]
pub struct NotificationComponent {
    queue: VecDeque<Notification>,
}

impl NotificationComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.queue.front()
    }
}

impl Component for NotificationComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::Notify(notification) => self.queue.push_back(notification.clone()),
            Action::Confirm | Action::Escape => {
                self.queue.pop_front();
            }
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(notification) = self.current() else {
            return;
        };
        let color = Theme::notification(notification.kind);
        let title = match notification.kind {
            NotificationKind::Info => " Information ",
            NotificationKind::Warning => " Attention ",
            NotificationKind::Error => " Erreur ",
        };

        let width = dialog_width(notification.message.chars().count());
        let dialog = centered_rect(area, width, 7);
        frame.render_widget(Clear, dialog);

        let mut footer = vec![Span::styled("enter", Theme::key_hint())];
        footer.push(Span::styled(" fermer", Theme::dim()));
        if self.queue.len() > 1 {
            footer.push(Span::styled(
                format!("  (+{} en attente)", self.queue.len() - 1),
                Theme::dim(),
            ));
        }

        let body = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                notification.message.as_str(),
                Style::default().fg(color),
            )),
            Line::from(""),
            Line::from(footer),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .title_style(Style::default().fg(color))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(body, dialog);
    }
}

/// Message length plus borders and padding, kept between 30 and 70 columns.
fn dialog_width(message_len: usize) -> u16 {
    let width = message_len.saturating_add(6).clamp(30, 70);
    u16::try_from(width).unwrap_or(70)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn notifications_queue_and_dismiss_in_order() {
        let mut n = NotificationComponent::new();
        assert!(!n.visible());
        n.handle_action(&Action::Notify(Notification::error("a")));
        n.handle_action(&Action::Notify(Notification::warning("b")));
        assert_eq!(n.current().map(|x| x.message.as_str()), Some("a"));

        n.handle_action(&Action::Confirm);
        assert_eq!(n.current().map(|x| x.message.as_str()), Some("b"));
        n.handle_action(&Action::Escape);
        assert!(!n.visible());
    }

    #[test]
    fn dialog_width_is_clamped_for_any_message_length() {
        assert_eq!(dialog_width(0), 30);
        assert_eq!(dialog_width(40), 46);
        assert_eq!(dialog_width(65_531), 70);
        assert_eq!(dialog_width(usize::MAX), 70);
    }

    #[test]
    fn huge_service_message_renders_without_panicking() {
        let mut n = NotificationComponent::new();
        n.handle_action(&Action::Notify(Notification::error("x".repeat(65_531))));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| n.render(frame, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Erreur"));
    }
}
