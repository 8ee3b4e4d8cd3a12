//! Form controller: maps user and network events to state changes and
//! side-effect instructions.
//!
//! The controller performs no I/O except through the injected
//! [`LastReportStore`]. Everything else (sending requests, drawing,
//! notifying, opening the browser) is returned as [`Effect`]s for the
//! front-end to carry out, so every flow can be tested by inspecting the
//! returned effects.
//!
//! Each control follows `Idle -> Busy -> Idle`. While busy, a control
//! ignores its own trigger; nothing else is locked.

use tracing::{debug, error, info, warn};

use crate::form::example_request;
use crate::preview::{render_preview, DownloadLink, PreviewView};
use crate::report::{LastReport, ReportRequest, ReportResult};
use crate::storage::LastReportStore;

pub const GENERATION_FAILED: &str = "Erreur lors de la génération du rapport";
pub const CONNECTION_ERROR: &str = "Erreur de connexion au serveur";
pub const NO_PREVIOUS_REPORT: &str = "Aucun rapport précédent à régénérer";
pub const REGENERATION_FAILED: &str = "Erreur lors de la régénération du rapport";
pub const GENERATE_FIRST: &str = "Veuillez d'abord générer un rapport";
pub const NO_PDF: &str = "Aucun PDF disponible pour ce rapport";
pub const NOT_SAVED: &str = "Rapport généré, mais impossible de l'enregistrer localement";

/// Which service call a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Regenerate,
}

impl Operation {
    pub fn route(&self) -> &'static str {
        match self {
            Operation::Generate => "/generate",
            Operation::Regenerate => "/regenerate",
        }
    }

    pub fn control(&self) -> Control {
        match self {
            Operation::Generate => Control::Submit,
            Operation::Regenerate => Control::Regenerate,
        }
    }
}

/// A button-like control with its own busy window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Submit,
    Regenerate,
}

impl Control {
    pub fn label(&self, busy: bool) -> &'static str {
        match (self, busy) {
            (Control::Submit, false) => "Générer le rapport",
            (Control::Submit, true) => "Génération en cours...",
            (Control::Regenerate, false) => "Régénérer",
            (Control::Regenerate, true) => "Régénération...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Busy,
}

/// What came back from a service call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The service answered with a parseable body.
    Response(ReportResult),
    /// The call failed or the body could not be read.
    TransportFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

/// A blocking, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    LoadExample,
    Submit(ReportRequest),
    Regenerate,
    OpenPreview,
    Download,
    Finished {
        operation: Operation,
        request: ReportRequest,
        outcome: Outcome,
    },
}

/// A side effect the front-end must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FillForm(ReportRequest),
    SetBusy { control: Control, busy: bool },
    StartProgress,
    StopProgress,
    Send {
        operation: Operation,
        request: ReportRequest,
    },
    RenderPreview(PreviewView),
    RevealPreview,
    Notify(Notification),
    OpenView(String),
    Download(DownloadLink),
}

pub struct Controller<S> {
    store: S,
    preview_url: String,
    submit: FlowState,
    regenerate: FlowState,
    download: Option<DownloadLink>,
}

impl<S: LastReportStore> Controller<S> {
    pub fn new(store: S, preview_url: impl Into<String>) -> Self {
        Self {
            store,
            preview_url: preview_url.into(),
            submit: FlowState::Idle,
            regenerate: FlowState::Idle,
            download: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self, control: Control) -> FlowState {
        match control {
            Control::Submit => self.submit,
            Control::Regenerate => self.regenerate,
        }
    }

    pub fn is_busy(&self, control: Control) -> bool {
        self.state(control) == FlowState::Busy
    }

    fn set_state(&mut self, control: Control, state: FlowState) {
        match control {
            Control::Submit => self.submit = state,
            Control::Regenerate => self.regenerate = state,
        }
    }

    /// Effects to run once at start-up.
    pub fn initialize(&mut self) -> Vec<Effect> {
        self.handle(ControllerEvent::LoadExample)
    }

    pub fn handle(&mut self, event: ControllerEvent) -> Vec<Effect> {
        match event {
            ControllerEvent::LoadExample => vec![Effect::FillForm(example_request())],
            ControllerEvent::Submit(request) => self.on_submit(request),
            ControllerEvent::Regenerate => self.on_regenerate(),
            ControllerEvent::OpenPreview => self.on_open_preview(),
            ControllerEvent::Download => self.on_download(),
            ControllerEvent::Finished {
                operation,
                request,
                outcome,
            } => self.on_finished(operation, request, outcome),
        }
    }

    fn on_submit(&mut self, request: ReportRequest) -> Vec<Effect> {
        if self.is_busy(Control::Submit) {
            debug!("Submit ignored: generation already in progress");
            return Vec::new();
        }
        info!(subject = %request.subject, framework = %request.framework, "Submitting report request");
        self.set_state(Control::Submit, FlowState::Busy);
        vec![
            Effect::SetBusy {
                control: Control::Submit,
                busy: true,
            },
            Effect::StartProgress,
            Effect::Send {
                operation: Operation::Generate,
                request,
            },
        ]
    }

    fn on_regenerate(&mut self) -> Vec<Effect> {
        if self.is_busy(Control::Regenerate) {
            debug!("Regenerate ignored: already in progress");
            return Vec::new();
        }
        let Some(last) = self.load_last() else {
            return vec![Effect::Notify(Notification::warning(NO_PREVIOUS_REPORT))];
        };
        info!(subject = %last.data.subject, "Regenerating last report");
        self.set_state(Control::Regenerate, FlowState::Busy);
        vec![
            Effect::SetBusy {
                control: Control::Regenerate,
                busy: true,
            },
            Effect::Send {
                operation: Operation::Regenerate,
                request: last.data,
            },
        ]
    }

    fn on_open_preview(&mut self) -> Vec<Effect> {
        if self.load_last().is_some() {
            vec![Effect::OpenView(self.preview_url.clone())]
        } else {
            vec![Effect::Notify(Notification::info(GENERATE_FIRST))]
        }
    }

    /// The link of the preview shown this session, else the stored report's.
    fn on_download(&mut self) -> Vec<Effect> {
        if self.download.is_none() {
            self.download = self
                .load_last()
                .and_then(|last| render_preview(&last.result, &last.data).download);
        }
        match &self.download {
            Some(link) => vec![Effect::Download(link.clone())],
            None => vec![Effect::Notify(Notification::warning(NO_PDF))],
        }
    }

    fn on_finished(
        &mut self,
        operation: Operation,
        request: ReportRequest,
        outcome: Outcome,
    ) -> Vec<Effect> {
        let mut effects = match outcome {
            Outcome::Response(result) if result.success => self.on_success(request, result),
            Outcome::Response(result) => {
                let message = match operation {
                    Operation::Generate => result.error_message().unwrap_or(GENERATION_FAILED),
                    Operation::Regenerate => REGENERATION_FAILED,
                };
                warn!(route = operation.route(), error = ?result.error, "Service reported failure");
                vec![Effect::Notify(Notification::error(message))]
            }
            Outcome::TransportFailed(reason) => {
                error!(route = operation.route(), %reason, "Request failed");
                let message = match operation {
                    Operation::Generate => CONNECTION_ERROR,
                    Operation::Regenerate => REGENERATION_FAILED,
                };
                vec![Effect::Notify(Notification::error(message))]
            }
        };

        // The busy window always closes, whatever the outcome.
        let control = operation.control();
        self.set_state(control, FlowState::Idle);
        if operation == Operation::Generate {
            effects.push(Effect::StopProgress);
        }
        effects.push(Effect::SetBusy {
            control,
            busy: false,
        });
        effects
    }

    fn on_success(&mut self, request: ReportRequest, result: ReportResult) -> Vec<Effect> {
        let view = render_preview(&result, &request);
        self.download = view.download.clone();
        let mut effects = vec![Effect::RenderPreview(view), Effect::RevealPreview];

        let snapshot = LastReport {
            data: request,
            result,
        };
        if let Err(e) = self.store.save(&snapshot) {
            error!(error = %e, "Failed to persist last report");
            effects.push(Effect::Notify(Notification::warning(NOT_SAVED)));
        }
        effects
    }

    fn load_last(&self) -> Option<LastReport> {
        match self.store.load() {
            Ok(last) => last,
            Err(e) => {
                warn!(error = %e, "Could not read last report");
                None
            }
        }
    }
}
