//! Preview pane: the rendered report summary.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use pfegen_core::preview::PreviewView;

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct PreviewPaneComponent {
    pub view: Option<PreviewView>,
    pub focused: bool,
    scroll: u16,
}

impl Default for PreviewPaneComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPaneComponent {
    pub fn new() -> Self {
        Self {
            view: None,
            focused: false,
            scroll: 0,
        }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn lines(view: &PreviewView) -> Vec<Line<'_>> {
        let mut lines = vec![
            Line::from(Span::styled(view.subject.as_str(), Theme::title())),
            Line::from(vec![
                Span::styled("Étudiant : ", Theme::header()),
                Span::styled(view.student.as_str(), Theme::normal()),
            ]),
        ];
        for (label, value) in &view.details {
            lines.push(Line::from(vec![
                Span::styled(format!("{label} : "), Theme::header()),
                Span::styled(value.as_str(), Theme::muted()),
            ]));
        }

        for section in [&view.introduction, &view.methodology] {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                section.title.as_str(),
                Theme::selected(),
            )));
            lines.extend(
                section
                    .body
                    .lines()
                    .map(|l| Line::from(Span::styled(l, Theme::normal()))),
            );
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            view.success_message.as_str(),
            Style::default().fg(Theme::success()),
        )));

        match &view.download {
            Some(link) => lines.push(Line::from(vec![
                Span::styled("ctrl+d ", Theme::key_hint()),
                Span::styled(format!("Télécharger {}", link.filename), Theme::normal()),
                Span::styled("   ctrl+p ", Theme::key_hint()),
                Span::styled("Aperçu complet", Theme::normal()),
            ])),
            None => lines.push(Line::from(vec![
                Span::styled("ctrl+p ", Theme::key_hint()),
                Span::styled("Aperçu complet", Theme::normal()),
            ])),
        }
        lines
    }
}

impl Component for PreviewPaneComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::RenderPreview(view) => {
                self.view = Some(*view.clone());
                self.scroll = 0;
                None
            }
            Action::RevealPreview => {
                self.focused = true;
                self.scroll = 0;
                None
            }
            Action::ScrollDown if self.focused => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            Action::ScrollUp if self.focused => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Theme::focused_border()
        } else {
            Theme::border()
        };
        let block = Block::default()
            .title(" Aperçu du rapport ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_style(border);

        let Some(view) = &self.view else {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Aucun aperçu pour l'instant.",
                    Theme::dim(),
                )),
                Line::from(Span::styled(
                    "Remplissez le formulaire puis ctrl+s pour générer le rapport.",
                    Theme::dim(),
                )),
            ])
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(empty, area);
            return;
        };

        let paragraph = Paragraph::new(Self::lines(view))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(block);
        frame.render_widget(paragraph, area);
    }
}
