//! Terminal event handling: captures keyboard, paste and resize events
//! from crossterm and dispatches them as Actions.
//!
//! The handler operates in two modes:
//! - Normal: keys are mapped to global shortcuts (quit, help, scroll).
//! - Editing: keys are forwarded as raw CharInput/BackspaceInput so the
//!   form fields receive typed characters.
//!
//! Ctrl shortcuts for the report commands work in both modes. The current
//! InputMode is shared between the App and EventHandler via an Arc<AtomicU8>.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::action::{Action, InputMode};

const MODE_NORMAL: u8 = 0;
const MODE_EDITING: u8 = 1;

/// Shared flag the App sets so the EventHandler knows which keymap to use.
pub type InputModeFlag = Arc<AtomicU8>;

pub fn new_input_mode_flag() -> InputModeFlag {
    Arc::new(AtomicU8::new(MODE_NORMAL))
}

pub fn set_input_mode(flag: &InputModeFlag, mode: InputMode) {
    let val = match mode {
        InputMode::Normal => MODE_NORMAL,
        InputMode::Editing => MODE_EDITING,
    };
    flag.store(val, Ordering::Relaxed);
}

fn get_input_mode(flag: &InputModeFlag) -> InputMode {
    match flag.load(Ordering::Relaxed) {
        MODE_EDITING => InputMode::Editing,
        _ => InputMode::Normal,
    }
}

/// Event loop that reads terminal events and sends Actions.
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Action>,
    tick_rate: Duration,
    mode_flag: InputModeFlag,
}

impl EventHandler {
    pub fn new(
        tx: mpsc::UnboundedSender<Action>,
        tick_rate: Duration,
        mode_flag: InputModeFlag,
    ) -> Self {
        Self {
            tx,
            tick_rate,
            mode_flag,
        }
    }

    /// Run the event loop until the receiving side is dropped.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.tick_rate);

        loop {
            let action = tokio::select! {
                _ = interval.tick() => Some(Action::Tick),
                result = tokio::task::spawn_blocking(|| {
                    if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                        event::read().ok()
                    } else {
                        None
                    }
                }) => {
                    match result {
                        Ok(Some(event)) => self.map_event(event),
                        _ => None,
                    }
                }
            };

            if let Some(action) = action {
                if self.tx.send(action).is_err() {
                    break;
                }
            }
        }
    }

    fn map_event(&self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                map_key(get_input_mode(&self.mode_flag), key)
            }
            Event::Paste(text) => Some(Action::PasteBulk(text)),
            Event::Resize(_, _) => Some(Action::Tick),
            _ => None,
        }
    }
}

/// Translate a key press under the given mode.
pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('s') | KeyCode::Enter => Some(Action::SubmitForm),
            KeyCode::Char('r') => Some(Action::Regenerate),
            KeyCode::Char('p') => Some(Action::OpenPreview),
            KeyCode::Char('d') => Some(Action::Download),
            KeyCode::Char('e') => Some(Action::LoadExample),
            KeyCode::Char('w') if mode == InputMode::Editing => Some(Action::DeleteWord),
            KeyCode::Char('t') if mode == InputMode::Editing => Some(Action::CycleFramework),
            _ => None,
        };
    }

    match mode {
        InputMode::Editing => map_key_editing(key),
        InputMode::Normal => map_key_normal(key),
    }
}

/// Key mapping when a text field is focused. Most keys become character
/// input; only a few are reserved for navigation.
fn map_key_editing(key: KeyEvent) -> Option<Action> {
    // Alt+Enter also submits (some terminals swallow Ctrl+Enter).
    if key.modifiers.contains(KeyModifiers::ALT) && key.code == KeyCode::Enter {
        return Some(Action::SubmitForm);
    }

    match key.code {
        KeyCode::Esc => Some(Action::Escape),
        KeyCode::Tab => Some(Action::NextInputField),
        KeyCode::BackTab => Some(Action::PrevInputField),
        KeyCode::Enter => Some(Action::NewlineInput),
        KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::Backspace => Some(Action::BackspaceInput),
        KeyCode::Char(c) => Some(Action::CharInput(c)),
        _ => None,
    }
}

/// Key mapping in normal mode: global shortcuts.
fn map_key_normal(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchPane),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::Enter | KeyCode::Char('i') => Some(Action::Confirm),
        KeyCode::Esc => Some(Action::Escape),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn report_shortcuts_work_in_both_modes() {
        for mode in [InputMode::Normal, InputMode::Editing] {
            assert!(matches!(map_key(mode, ctrl('s')), Some(Action::SubmitForm)));
            assert!(matches!(map_key(mode, ctrl('r')), Some(Action::Regenerate)));
            assert!(matches!(map_key(mode, ctrl('p')), Some(Action::OpenPreview)));
            assert!(matches!(map_key(mode, ctrl('d')), Some(Action::Download)));
            assert!(matches!(map_key(mode, ctrl('e')), Some(Action::LoadExample)));
            assert!(matches!(map_key(mode, ctrl('c')), Some(Action::Quit)));
        }
    }

    #[test]
    fn editing_mode_forwards_plain_characters() {
        assert!(matches!(
            map_key(InputMode::Editing, key(KeyCode::Char('q'))),
            Some(Action::CharInput('q'))
        ));
        assert!(matches!(
            map_key(InputMode::Editing, key(KeyCode::Tab)),
            Some(Action::NextInputField)
        ));
        assert!(matches!(
            map_key(InputMode::Editing, key(KeyCode::Esc)),
            Some(Action::Escape)
        ));
        assert!(matches!(
            map_key(InputMode::Editing, ctrl('w')),
            Some(Action::DeleteWord)
        ));
    }

    #[test]
    fn normal_mode_maps_global_keys() {
        assert!(matches!(
            map_key(InputMode::Normal, key(KeyCode::Char('q'))),
            Some(Action::Quit)
        ));
        assert!(matches!(
            map_key(InputMode::Normal, key(KeyCode::Char('?'))),
            Some(Action::ToggleHelp)
        ));
        assert!(matches!(
            map_key(InputMode::Normal, key(KeyCode::Enter)),
            Some(Action::Confirm)
        ));
        assert!(map_key(InputMode::Normal, ctrl('w')).is_none());
    }
}
