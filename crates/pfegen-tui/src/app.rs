//! Main application state and render loop.
//!
//! The [`Controller`] decides what happens; the App carries out the
//! resulting effects: it forwards them to components as actions and spawns
//! the async work (HTTP calls, downloads, the progress timer, the browser).

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use pfegen_client::ReportClient;
use pfegen_core::controller::{Notification, Operation, Outcome};
use pfegen_core::preview::DownloadLink;
use pfegen_core::storage::{FileStore, LastReportStore};
use pfegen_core::{Controller, ControllerEvent, Effect, PfeConfig, ReportRequest};

use crate::action::{Action, InputMode};
use crate::components::busy_overlay::BusyOverlayComponent;
use crate::components::help::HelpComponent;
use crate::components::notification::NotificationComponent;
use crate::components::preview_pane::PreviewPaneComponent;
use crate::components::report_form::ReportFormComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};
use crate::theme::Theme;

const DOWNLOAD_FAILED: &str = "Échec du téléchargement du PDF";
const BROWSER_FAILED: &str = "Impossible d'ouvrir le navigateur";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Form,
    Preview,
}

/// Main application state.
pub struct App {
    should_quit: bool,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,
    focus: Pane,
    config: PfeConfig,

    controller: Controller<FileStore>,
    /// HTTP client shared across async tasks.
    client: Arc<ReportClient>,
    /// Timer feeding ProgressTick while a generation runs.
    progress_task: Option<JoinHandle<()>>,

    // Components
    report_form: ReportFormComponent,
    preview_pane: PreviewPaneComponent,
    busy_overlay: BusyOverlayComponent,
    notification: NotificationComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(config: PfeConfig, store: FileStore) -> Self {
        let client = Arc::new(ReportClient::new(
            config.server.base_url.clone(),
            Duration::from_secs(config.server.timeout_seconds),
        ));
        let controller = Controller::new(store, config.server.preview_url());
        Self {
            should_quit: false,
            input_mode_flag: event::new_input_mode_flag(),
            focus: Pane::Form,
            client,
            controller,
            progress_task: None,
            report_form: ReportFormComponent::new(),
            preview_pane: PreviewPaneComponent::new(),
            busy_overlay: BusyOverlayComponent::new(config.progress.step),
            notification: NotificationComponent::new(),
            status_bar: StatusBarComponent::new(config.server.base_url.clone()),
            help: HelpComponent::new(),
            config,
        }
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();

        let event_handler = EventHandler::new(
            tx.clone(),
            Duration::from_millis(250),
            self.input_mode_flag.clone(),
        );
        tokio::spawn(async move {
            event_handler.run().await;
        });

        self.initialize(&tx);

        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            if let Some(action) = rx.recv().await {
                self.handle_action(&action, &tx);

                if self.should_quit {
                    break;
                }
            }
        }

        self.abort_progress_task();

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Pre-fill the form and pick up the stored report's timestamp.
    fn initialize(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        let effects = self.controller.initialize();
        self.run_effects(effects, tx);
        self.refresh_saved_at();
        self.sync_input_mode();
    }

    fn sync_input_mode(&mut self) {
        self.preview_pane.focused = self.focus == Pane::Preview;
        event::set_input_mode(&self.input_mode_flag, self.current_input_mode());
    }

    fn current_input_mode(&self) -> InputMode {
        // Overlays need Enter/Esc, so they force normal mode.
        if self.help.visible || self.notification.visible() {
            return InputMode::Normal;
        }
        if self.focus == Pane::Form && self.report_form.editing {
            InputMode::Editing
        } else {
            InputMode::Normal
        }
    }

    fn handle_action(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Action>) {
        if matches!(action, Action::Quit) {
            self.should_quit = true;
            return;
        }

        let from_keyboard =
            action.is_user_input() || matches!(action, Action::Confirm | Action::Escape);

        // Overlays are modal: keys only close them.
        if from_keyboard && self.notification.visible() {
            self.notification.handle_action(action);
            self.sync_input_mode();
            return;
        }
        if from_keyboard && self.help.visible {
            self.help.visible = false;
            self.sync_input_mode();
            return;
        }

        match action {
            Action::SubmitRequest(request) => {
                self.dispatch(ControllerEvent::Submit(request.clone()), tx);
            }
            Action::Regenerate => self.dispatch(ControllerEvent::Regenerate, tx),
            Action::OpenPreview => self.dispatch(ControllerEvent::OpenPreview, tx),
            Action::Download => self.dispatch(ControllerEvent::Download, tx),
            Action::LoadExample => self.dispatch(ControllerEvent::LoadExample, tx),
            Action::ServiceFinished {
                operation,
                request,
                outcome,
            } => {
                self.dispatch(
                    ControllerEvent::Finished {
                        operation: *operation,
                        request: request.clone(),
                        outcome: outcome.clone(),
                    },
                    tx,
                );
                self.refresh_saved_at();
            }
            Action::DownloadFailed(reason) => {
                warn!(%reason, "Download failed");
                self.handle_action(&Action::Notify(Notification::error(DOWNLOAD_FAILED)), tx);
            }
            Action::SwitchPane => {
                self.focus = match self.focus {
                    Pane::Form => Pane::Preview,
                    Pane::Preview => Pane::Form,
                };
            }
            Action::Confirm => self.focus = Pane::Form,
            Action::RevealPreview => self.focus = Pane::Preview,
            _ => {}
        }

        // Scrolling belongs to whichever pane has focus.
        let scroll = matches!(action, Action::ScrollUp | Action::ScrollDown);
        let mut chained = Vec::new();
        if !(scroll && self.focus == Pane::Preview) {
            chained.extend(self.report_form.handle_action(action));
        }
        chained.extend(self.preview_pane.handle_action(action));
        self.busy_overlay.handle_action(action);
        self.notification.handle_action(action);
        self.help.handle_action(action);
        self.status_bar.handle_action(action);

        if matches!(action, Action::ProgressTick) && !self.busy_overlay.ticker.is_running() {
            self.abort_progress_task();
        }

        self.sync_input_mode();

        for next in chained {
            self.handle_action(&next, tx);
        }
    }

    fn dispatch(&mut self, event: ControllerEvent, tx: &mpsc::UnboundedSender<Action>) {
        let effects = self.controller.handle(event);
        self.run_effects(effects, tx);
    }

    fn run_effects(&mut self, effects: Vec<Effect>, tx: &mpsc::UnboundedSender<Action>) {
        for effect in effects {
            match effect {
                Effect::FillForm(request) => self.handle_action(&Action::FillForm(request), tx),
                Effect::SetBusy { control, busy } => {
                    self.handle_action(&Action::SetBusy { control, busy }, tx)
                }
                Effect::StartProgress => self.start_progress(tx),
                Effect::StopProgress => {
                    self.abort_progress_task();
                    self.handle_action(&Action::ProgressStopped, tx);
                }
                Effect::Send { operation, request } => self.spawn_send(operation, request, tx),
                Effect::RenderPreview(view) => {
                    self.handle_action(&Action::RenderPreview(Box::new(view)), tx)
                }
                Effect::RevealPreview => self.handle_action(&Action::RevealPreview, tx),
                Effect::Notify(notification) => {
                    self.handle_action(&Action::Notify(notification), tx)
                }
                Effect::OpenView(url) => self.open_in_browser(&url, tx),
                Effect::Download(link) => self.spawn_download(link, tx),
            }
        }
    }

    fn refresh_saved_at(&mut self) {
        match self.controller.store().saved_at() {
            Ok(at) => self.status_bar.saved_at = at,
            Err(e) => warn!(error = %e, "Could not read storage timestamp"),
        }
    }

    // ── Async task spawners ─────────────────────────────────────

    /// Restart the cosmetic progress timer.
    fn start_progress(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        self.abort_progress_task();
        self.handle_action(&Action::ProgressStarted, tx);

        let period = Duration::from_millis(self.config.progress.interval_ms.max(1));
        let tx = tx.clone();
        self.progress_task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Action::ProgressTick).is_err() {
                    break;
                }
            }
        }));
    }

    fn abort_progress_task(&mut self) {
        if let Some(task) = self.progress_task.take() {
            task.abort();
        }
    }

    fn spawn_send(
        &self,
        operation: Operation,
        request: ReportRequest,
        tx: &mpsc::UnboundedSender<Action>,
    ) {
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        let _ = tx.send(Action::SetStatus(
            operation.control().label(true).to_string(),
        ));

        tokio::spawn(async move {
            let outcome = match client.submit(operation, &request).await {
                Ok(result) => Outcome::Response(result),
                Err(e) => Outcome::TransportFailed(e.to_string()),
            };
            let _ = tx.send(Action::ServiceFinished {
                operation,
                request,
                outcome,
            });
        });
    }

    fn spawn_download(&self, link: DownloadLink, tx: &mpsc::UnboundedSender<Action>) {
        let client = Arc::clone(&self.client);
        let dir = self.config.download.resolve_directory();
        let tx = tx.clone();
        let _ = tx.send(Action::SetStatus(format!(
            "Téléchargement de {}...",
            link.filename
        )));

        tokio::spawn(async move {
            match client.download(&link, &dir).await {
                Ok(path) => {
                    let _ = tx.send(Action::DownloadSaved(path));
                }
                Err(e) => {
                    error!(url = %link.url, error = %e, "PDF download failed");
                    let _ = tx.send(Action::DownloadFailed(e.to_string()));
                }
            }
        });
    }

    fn open_in_browser(&self, url: &str, tx: &mpsc::UnboundedSender<Action>) {
        match open_url(url) {
            Ok(()) => {
                info!(%url, "Opened preview in browser");
                let _ = tx.send(Action::SetStatus(format!("Aperçu ouvert : {url}")));
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to launch browser");
                let _ = tx.send(Action::Notify(Notification::warning(format!(
                    "{BROWSER_FAILED} : {url}"
                ))));
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(1), // Title
            Constraint::Min(10),   // Form | preview
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        let title = Line::from(vec![
            Span::styled(" pfegen ", Theme::title()),
            Span::styled("Générateur de rapports PFE", Theme::muted()),
        ]);
        frame.render_widget(Paragraph::new(title), chunks[0]);

        let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.report_form.render(frame, panes[0]);
        self.preview_pane.render(frame, panes[1]);

        self.status_bar.render(frame, chunks[2]);

        // Overlays (rendered on top)
        self.busy_overlay.render(frame, area);
        self.notification.render(frame, area);
        self.help.render(frame, area);
    }
}

/// Launch the platform's default handler for `url`, detached from the TUI.
fn open_url(url: &str) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = tokio::process::Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };

    #[cfg(target_os = "macos")]
    let mut command = tokio::process::Command::new("open");

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = tokio::process::Command::new("xdg-open");

    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
