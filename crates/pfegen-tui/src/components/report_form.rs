//! Report form editor: the seven request fields.
//!
//! - Single-line fields scroll horizontally to keep the cursor visible
//! - Description is a multi-line text area with word wrap
//! - Tab / Shift+Tab move between fields, Enter inserts newlines in the
//!   description and moves on elsewhere
//! - Ctrl+T cycles the methodology through the known frameworks

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use pfegen_core::controller::Control;
use pfegen_core::form::{FormField, ReportForm};

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

pub struct ReportFormComponent {
    pub form: ReportForm,
    focused: FormField,
    /// Cursor position (byte offset) within the focused field.
    cursor: usize,
    /// Whether keystrokes go to the focused field.
    pub editing: bool,
    submit_busy: bool,
    regenerate_busy: bool,
}

impl Default for ReportFormComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormComponent {
    pub fn new() -> Self {
        Self {
            form: ReportForm::new(),
            focused: FormField::Subject,
            cursor: 0,
            editing: true,
            submit_busy: false,
            regenerate_busy: false,
        }
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn focused_input(&self) -> &str {
        self.form.value(self.focused)
    }

    fn focus(&mut self, field: FormField) {
        self.focused = field;
        self.cursor = self.focused_input().len();
    }

    fn clamp_cursor(&mut self) {
        let len = self.focused_input().len();
        if self.cursor > len {
            self.cursor = len;
        }
    }

    fn insert_char(&mut self, c: char) {
        self.clamp_cursor();
        let cursor = self.cursor;
        self.form.value_mut(self.focused).insert(cursor, c);
        self.cursor += c.len_utf8();
    }

    fn insert_str(&mut self, s: &str) {
        self.clamp_cursor();
        let cursor = self.cursor;
        self.form.value_mut(self.focused).insert_str(cursor, s);
        self.cursor += s.len();
    }

    /// Delete the character before the cursor.
    fn delete_char(&mut self) {
        self.clamp_cursor();
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        let input = self.form.value_mut(self.focused);
        let prev = input[..cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        input.remove(prev);
        self.cursor = prev;
    }

    /// Delete the word before the cursor (Ctrl+W).
    fn delete_word(&mut self) {
        self.clamp_cursor();
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        let input = self.form.value_mut(self.focused);
        let bytes = input.as_bytes();
        let mut end = cursor;
        while end > 0 && matches!(bytes[end - 1], b' ' | b'\n') {
            end -= 1;
        }
        let mut start = end;
        while start > 0 && !matches!(bytes[start - 1], b' ' | b'\n') {
            start -= 1;
        }
        input.drain(start..cursor);
        self.cursor = start;
    }

    /// Move the cursor one logical line up or down in the description.
    /// Returns false when there is no line in that direction.
    fn move_line(&mut self, down: bool) -> bool {
        let text = self.form.value(self.focused);
        let (line, col) = cursor_line_col(text, self.cursor);
        let lines: Vec<&str> = text.split('\n').collect();
        let target = if down {
            if line + 1 >= lines.len() {
                return false;
            }
            line + 1
        } else {
            if line == 0 {
                return false;
            }
            line - 1
        };
        let start: usize = lines[..target].iter().map(|l| l.len() + 1).sum();
        let target_line = lines[target];
        let mut col = col.min(target_line.len());
        while !target_line.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor = start + col;
        true
    }

    /// Check required fields, then hand the request over.
    fn try_submit(&mut self) -> Option<Action> {
        let missing = self.form.missing_required();
        if let Some(first) = missing.first() {
            self.focus(*first);
            self.editing = true;
            let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            return Some(Action::SetStatus(format!(
                "Champ requis : {}",
                names.join(", ")
            )));
        }
        Some(Action::SubmitRequest(self.form.to_request()))
    }

    fn field_title(field: FormField) -> String {
        let marker = if field.required() { " *" } else { "" };
        format!(" {}{} ", field.label(), marker)
    }

    fn field_block(&self, field: FormField, title: String) -> Block<'static> {
        let is_focused = self.focused == field;
        let (border, title_style) = if is_focused && self.editing {
            (Theme::focused_border(), Theme::key_hint())
        } else if is_focused {
            (Theme::focused_border(), Theme::muted())
        } else {
            (Theme::border(), Theme::muted())
        };
        let block = Block::default()
            .title(title)
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(border);
        if field == FormField::Framework && is_focused && self.editing {
            let hint = Line::from(Span::styled(" ctrl+t suivante ", Theme::dim()));
            block.title_bottom(hint.right_aligned())
        } else {
            block
        }
    }

    fn render_text_field(&self, field: FormField, frame: &mut Frame, area: Rect) {
        let block = self.field_block(field, Self::field_title(field));
        let inner_width = block.inner(area).width as usize;
        let text = self.form.value(field);
        let show_cursor = self.editing && self.focused == field;

        if text.is_empty() && !show_cursor {
            let display = Paragraph::new(Span::styled(field.placeholder(), Theme::dim()));
            frame.render_widget(display.block(block), area);
            return;
        }
        if !show_cursor {
            let display = Paragraph::new(Span::styled(text, Theme::normal()));
            frame.render_widget(display.block(block), area);
            return;
        }

        let pos = self.cursor.min(text.len());
        let cursor_col = text[..pos].chars().count();
        let offset = cursor_col.saturating_sub(inner_width.saturating_sub(1));
        let line = cursor_line(text, pos);
        let display = Paragraph::new(line)
            .scroll((0, offset as u16))
            .block(block);
        frame.render_widget(display, area);
    }

    fn render_description(&self, frame: &mut Frame, area: Rect) {
        let field = FormField::Description;
        let text = self.form.value(field);
        let line_count = text.split('\n').count();
        let title = if text.is_empty() {
            Self::field_title(field)
        } else {
            format!(
                "{}({} ligne{}, {} car.) ",
                Self::field_title(field),
                line_count,
                if line_count == 1 { "" } else { "s" },
                text.chars().count()
            )
        };
        let block = self.field_block(field, title);
        let inner = block.inner(area);
        let show_cursor = self.editing && self.focused == field;

        if text.is_empty() && !show_cursor {
            let placeholder = Paragraph::new(Span::styled(field.placeholder(), Theme::dim()));
            frame.render_widget(placeholder.block(block), area);
            return;
        }

        let width = if inner.width > 0 { inner.width as usize } else { 80 };
        let cursor = show_cursor.then_some(self.cursor.min(text.len()));
        let (visual, cursor_line_idx) = layout_visual_lines(text, width, cursor);

        let viewport = inner.height as usize;
        let scroll = match cursor_line_idx {
            Some(line) if viewport > 0 && line >= viewport => line + 1 - viewport,
            _ => 0,
        };

        let lines: Vec<Line> = visual
            .iter()
            .skip(scroll)
            .take(viewport)
            .map(|vl| match vl.cursor_col {
                Some(col) => cursor_line(&vl.text, col),
                None => Line::from(Span::styled(vl.text.clone(), Theme::normal())),
            })
            .collect();

        let hidden_below = visual.len().saturating_sub(scroll + viewport);
        let block = if hidden_below > 0 {
            block.title_bottom(Line::from(Span::styled(
                format!(" [{hidden_below} de plus] "),
                Theme::dim(),
            )))
        } else {
            block
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("  ctrl+s ", Theme::key_hint()),
            Span::styled(
                Control::Submit.label(self.submit_busy),
                Theme::button(self.submit_busy),
            ),
            Span::styled("   ctrl+r ", Theme::key_hint()),
            Span::styled(
                Control::Regenerate.label(self.regenerate_busy),
                Theme::button(self.regenerate_busy),
            ),
            Span::styled("   ctrl+e ", Theme::key_hint()),
            Span::styled("Exemple", Theme::dim()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for ReportFormComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            // ── Text input ──────────────────────────────────────
            Action::CharInput(c) if self.editing => {
                self.insert_char(*c);
                None
            }
            Action::BackspaceInput if self.editing => {
                self.delete_char();
                None
            }
            Action::DeleteWord if self.editing => {
                self.delete_word();
                None
            }
            Action::PasteBulk(text) if self.editing && !text.is_empty() => {
                if self.focused.multiline() {
                    self.insert_str(&text.replace("\r\n", "\n"));
                } else {
                    self.insert_str(text.lines().next().unwrap_or(""));
                }
                None
            }
            Action::NewlineInput if self.editing => {
                if self.focused.multiline() {
                    self.insert_char('\n');
                } else {
                    self.focus(self.focused.next());
                }
                None
            }
            Action::CycleFramework if self.editing && self.focused == FormField::Framework => {
                self.form.cycle_framework();
                self.cursor = self.focused_input().len();
                None
            }

            // ── Field navigation ────────────────────────────────
            Action::NextInputField => {
                self.focus(self.focused.next());
                None
            }
            Action::PrevInputField => {
                self.focus(self.focused.prev());
                None
            }
            Action::ScrollDown => {
                if !(self.focused.multiline() && self.move_line(true)) {
                    self.focus(self.focused.next());
                }
                None
            }
            Action::ScrollUp => {
                if !(self.focused.multiline() && self.move_line(false)) {
                    self.focus(self.focused.prev());
                }
                None
            }
            Action::Confirm => {
                self.editing = true;
                self.clamp_cursor();
                None
            }
            Action::Escape | Action::RevealPreview => {
                self.editing = false;
                None
            }

            // ── Commands and controller effects ─────────────────
            Action::SubmitForm => self.try_submit(),
            Action::FillForm(request) => {
                self.form.fill(request.clone());
                self.cursor = self.focused_input().len();
                None
            }
            Action::SetBusy { control, busy } => {
                match control {
                    Control::Submit => self.submit_busy = *busy,
                    Control::Regenerate => self.regenerate_busy = *busy,
                }
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Subject
            Constraint::Min(5),    // Description
            Constraint::Length(3), // Student / year
            Constraint::Length(3), // Supervisor / jury
            Constraint::Length(3), // Framework
            Constraint::Length(1), // Controls
        ])
        .split(area);

        self.render_text_field(FormField::Subject, frame, chunks[0]);
        self.render_description(frame, chunks[1]);

        let pairs = [
            (FormField::StudentName, FormField::AcademicYear, chunks[2]),
            (FormField::Supervisor, FormField::Jury, chunks[3]),
        ];
        for (left, right, row) in pairs {
            let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(row);
            self.render_text_field(left, frame, cols[0]);
            self.render_text_field(right, frame, cols[1]);
        }

        self.render_text_field(FormField::Framework, frame, chunks[4]);
        self.render_controls(frame, chunks[5]);
    }
}

/// A single line with the character at byte offset `cursor` highlighted.
fn cursor_line(text: &str, cursor: usize) -> Line<'static> {
    let (before, after) = text.split_at(cursor.min(text.len()));
    let mut chars = after.chars();
    let cursor_char = chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
    Line::from(vec![
        Span::styled(before.to_string(), Theme::normal()),
        Span::styled(cursor_char, Theme::cursor()),
        Span::styled(chars.as_str().to_string(), Theme::normal()),
    ])
}

/// Line index and byte column of `cursor` within `text`.
fn cursor_line_col(text: &str, cursor: usize) -> (usize, usize) {
    let before = &text[..cursor.min(text.len())];
    let line = before.matches('\n').count();
    let col = before.rfind('\n').map(|p| before.len() - p - 1).unwrap_or(before.len());
    (line, col)
}

struct VisualLine {
    text: String,
    /// Byte column of the cursor, when it sits on this line.
    cursor_col: Option<usize>,
}

/// Word-wrap `text` and locate the cursor among the visual lines.
fn layout_visual_lines(
    text: &str,
    width: usize,
    cursor: Option<usize>,
) -> (Vec<VisualLine>, Option<usize>) {
    let cursor_pos = cursor.map(|c| cursor_line_col(text, c));
    let mut visual = Vec::new();
    let mut cursor_line_idx = None;

    for (li, logical) in text.split('\n').enumerate() {
        let segments = wrap_line(logical, width);
        let last = segments.len() - 1;
        let mut offset = 0usize;
        for (si, segment) in segments.into_iter().enumerate() {
            let len = segment.len();
            let mut cursor_col = None;
            if let Some((line, col)) = cursor_pos {
                // A cursor on a segment boundary belongs to the next segment.
                let on_segment = col >= offset && (col < offset + len || si == last);
                if line == li && on_segment {
                    cursor_col = Some(col - offset);
                    cursor_line_idx = Some(visual.len());
                }
            }
            visual.push(VisualLine {
                text: segment,
                cursor_col,
            });
            offset += len;
        }
    }
    (visual, cursor_line_idx)
}

/// Word-wrap a single logical line to fit within `max_width` columns.
/// Breaks at the last space when it is not too early in the line,
/// otherwise hard-breaks. Never splits a character. Always returns at
/// least one segment; segments concatenate back to `text`.
fn wrap_line(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || text.chars().count() <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((limit, _)) = remaining.char_indices().nth(max_width) else {
            lines.push(remaining.to_string());
            break;
        };
        let chunk = &remaining[..limit];
        let break_pos = match chunk.rfind(' ') {
            Some(pos) if chunk[..pos].chars().count() > max_width / 3 => pos + 1,
            _ => limit,
        };
        let (line, rest) = remaining.split_at(break_pos);
        lines.push(line.to_string());
        remaining = rest;
    }

    lines
}
