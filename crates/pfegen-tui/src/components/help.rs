//! Help overlay: keybinding reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::action::Action;
use crate::components::{centered_rect, Component};
use crate::theme::Theme;

#[derive(Default)]
pub struct HelpComponent {
    pub visible: bool,
}

impl HelpComponent {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for HelpComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ToggleHelp => self.visible = !self.visible,
            Action::Escape | Action::Confirm | Action::Quit => self.visible = false,
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = centered_rect(area, 60, 22);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(" Aide: raccourcis ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(Theme::focused_border());

        let help_text = vec![
            Line::from(""),
            key_line("ctrl+s / ctrl+enter", "Générer le rapport"),
            key_line("ctrl+r", "Régénérer le dernier rapport"),
            key_line("ctrl+p", "Ouvrir l'aperçu dans le navigateur"),
            key_line("ctrl+d", "Télécharger le PDF"),
            key_line("ctrl+e", "Recharger l'exemple"),
            Line::from(""),
            Line::from(Span::styled("  ── Formulaire ──", Theme::header())),
            key_line("tab / shift+tab", "Champ suivant / précédent"),
            key_line("enter", "Nouvelle ligne (description)"),
            key_line("ctrl+w", "Effacer le mot précédent"),
            key_line("ctrl+t", "Méthodologie suivante"),
            key_line("esc", "Quitter la saisie"),
            Line::from(""),
            Line::from(Span::styled("  ── Navigation ──", Theme::header())),
            key_line("enter / i", "Reprendre la saisie"),
            key_line("tab", "Formulaire / aperçu"),
            key_line("↑ ↓ / j k", "Défiler"),
            key_line("?", "Afficher / masquer l'aide"),
            key_line("q / ctrl+c", "Quitter"),
        ];

        frame.render_widget(Paragraph::new(help_text).block(block), dialog);
    }
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<22}", key), Theme::selected()),
        Span::styled(desc, Theme::normal()),
    ])
}
