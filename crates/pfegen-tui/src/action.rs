//! Action enum: the central message bus for the TUI.
//! Key presses, controller effects and async results all flow through here.

use std::path::PathBuf;

use pfegen_core::controller::{Control, Notification, Operation, Outcome};
use pfegen_core::preview::PreviewView;
use pfegen_core::ReportRequest;

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// A tick event for redraws.
    Tick,
    /// Esc: leave editing, close an overlay.
    Escape,
    /// Enter in normal mode: start editing, dismiss a notification.
    Confirm,
    /// Move focus between the form and the preview pane.
    SwitchPane,

    // ── Commands ────────────────────────────────────────────
    /// Validate the form and submit it.
    SubmitForm,
    /// Form passed validation; hand the request to the controller.
    SubmitRequest(ReportRequest),
    Regenerate,
    OpenPreview,
    Download,
    LoadExample,

    // ── Controller effects ──────────────────────────────────
    FillForm(ReportRequest),
    SetBusy {
        control: Control,
        busy: bool,
    },
    ProgressStarted,
    ProgressTick,
    ProgressStopped,
    RenderPreview(Box<PreviewView>),
    RevealPreview,
    Notify(Notification),

    // ── Async results ───────────────────────────────────────
    /// A generate/regenerate call came back.
    ServiceFinished {
        operation: Operation,
        request: ReportRequest,
        outcome: Outcome,
    },
    DownloadSaved(PathBuf),
    DownloadFailed(String),

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed (only sent when in input mode).
    CharInput(char),
    /// Backspace pressed (only sent when in input mode).
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    /// Enter in editing mode: newline in the description, next field elsewhere.
    NewlineInput,
    NextInputField,
    PrevInputField,
    /// Ctrl+T on the methodology field.
    CycleFramework,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),

    // ── Scrolling ───────────────────────────────────────────
    ScrollUp,
    ScrollDown,
}

impl Action {
    /// Actions that come straight from the keyboard. These are swallowed
    /// while a notification is open.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Action::ToggleHelp
                | Action::SwitchPane
                | Action::SubmitForm
                | Action::Regenerate
                | Action::OpenPreview
                | Action::Download
                | Action::LoadExample
                | Action::CharInput(_)
                | Action::BackspaceInput
                | Action::DeleteWord
                | Action::NewlineInput
                | Action::NextInputField
                | Action::PrevInputField
                | Action::CycleFramework
                | Action::PasteBulk(_)
                | Action::ScrollUp
                | Action::ScrollDown
        )
    }
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the focused field instead of interpreted as
/// global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode: keys are global shortcuts.
    Normal,
    /// Text input mode: keys go to the focused text field.
    Editing,
}
