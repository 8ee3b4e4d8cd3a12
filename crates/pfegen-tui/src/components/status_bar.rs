//! Status bar at the bottom of the TUI.

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    /// When the last report was stored locally.
    pub saved_at: Option<DateTime<Utc>>,
    /// Server the client talks to.
    pub server: String,
}

impl StatusBarComponent {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            message: "Formulaire pré-rempli avec un exemple. ctrl+s pour générer.".to_string(),
            saved_at: None,
            server: server.into(),
        }
    }

    fn saved_badge(&self) -> String {
        match self.saved_at {
            Some(at) => format!(
                "dernier rapport {}",
                at.with_timezone(&Local).format("%d/%m %H:%M")
            ),
            None => "aucun rapport".to_string(),
        }
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => self.message = msg.clone(),
            Action::Notify(notification) => self.message = notification.message.clone(),
            Action::RenderPreview(view) => self.message = view.success_message.clone(),
            Action::DownloadSaved(path) => {
                self.message = format!("PDF enregistré : {}", path.display());
            }
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;

        let hints = "q·?·tab·^s·^r·^p·^d";
        let hints_len = hints.chars().count() + 1;

        let badge = format!("{} · {}", self.server, self.saved_badge());
        let badge_len = badge.chars().count() + 2;

        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(hints_len)
            .saturating_sub(4);

        let msg_len = self.message.chars().count();
        let msg = if msg_len > msg_budget {
            if msg_budget > 3 {
                let kept: String = self.message.chars().take(msg_budget - 3).collect();
                format!("{kept}...")
            } else {
                String::new()
            }
        } else {
            self.message.clone()
        };

        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + hints_len);

        let line = Line::from(vec![
            Span::styled(format!(" {badge} "), Theme::muted()),
            Span::styled("  ", Theme::dim()),
            Span::styled(msg, Theme::status_bar()),
            Span::raw(" ".repeat(pad)),
            Span::styled(hints, Theme::key_hint()),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
