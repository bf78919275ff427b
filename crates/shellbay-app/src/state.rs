//! Application state: the shell registry, the host side of the panel, and
//! the outer shortcuts that work whether or not the panel is shown.

use std::collections::HashMap;

use anyhow::{Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use shellbay_panel::{
    pty_size, KeyBindings, KeyChord, KeyEvent, PanelHost, PanelProps, PtyControl, SessionOutput,
    SessionStatus, SessionView, ShellPanel, Viewport,
};
use shellbay_pty::{
    lock_shell, BackgroundShell, OutputMode, ShellId, ShellOutput, ShellRegistry, ShellStatus,
};
use tokio::sync::mpsc;

use crate::io_thread::start_io_thread;

const QUIT: KeyChord = KeyChord::ctrl('q');

/// A panel request, applied once the session snapshot is released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Resize(ShellId, u16, u16),
    Write(ShellId, Vec<u8>),
    SetActive(ShellId),
    Dismiss(ShellId),
    SetPickerOpen(bool),
}

/// Collects panel callbacks while the shells are locked for a snapshot.
#[derive(Debug, Default)]
pub struct Effects(Vec<Effect>);

impl PtyControl for Effects {
    fn resize(&mut self, id: ShellId, cols: u16, rows: u16) {
        self.0.push(Effect::Resize(id, cols, rows));
    }

    fn write(&mut self, id: ShellId, bytes: &[u8]) {
        self.0.push(Effect::Write(id, bytes.to_vec()));
    }
}

impl PanelHost for Effects {
    fn set_active_session(&mut self, id: ShellId) {
        self.0.push(Effect::SetActive(id));
    }

    fn dismiss_session(&mut self, id: ShellId) {
        self.0.push(Effect::Dismiss(id));
    }

    fn set_picker_open(&mut self, open: bool) {
        self.0.push(Effect::SetPickerOpen(open));
    }
}

/// How new shells are started.
#[derive(Clone, Debug)]
pub struct Launch {
    pub program: String,
    pub mode: OutputMode,
}

fn session_status(status: ShellStatus) -> SessionStatus {
    match status {
        ShellStatus::Running => SessionStatus::Running,
        ShellStatus::Exited { code } => SessionStatus::Exited { code },
    }
}

fn session_view(shell: &BackgroundShell) -> SessionView<'_> {
    SessionView {
        id: shell.id(),
        command: shell.command(),
        status: session_status(shell.status()),
        output: match shell.output() {
            ShellOutput::Grid(grid) => SessionOutput::Grid(grid.screen()),
            ShellOutput::Text(text) => SessionOutput::Text(text),
        },
    }
}

/// Lock every shell in registry order and hand `f` a snapshot.
fn with_sessions<R>(registry: &ShellRegistry, f: impl FnOnce(&[SessionView<'_>]) -> R) -> R {
    let guards: Vec<_> = registry.shells().map(lock_shell).collect();
    let views: Vec<SessionView<'_>> = guards.iter().map(|shell| session_view(shell)).collect();
    f(&views)
}

pub struct App {
    launch: Launch,
    registry: ShellRegistry,
    stops: HashMap<ShellId, mpsc::Sender<()>>,
    panel: ShellPanel,
    active: Option<ShellId>,
    picker_open: bool,
    visible: bool,
    viewport: Viewport,
    quit: bool,
}

impl App {
    pub fn new(launch: Launch, bindings: KeyBindings, viewport: Viewport) -> Self {
        Self {
            launch,
            registry: ShellRegistry::new(),
            stops: HashMap::new(),
            panel: ShellPanel::new(bindings),
            active: None,
            picker_open: false,
            visible: true,
            viewport,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn active(&self) -> Option<ShellId> {
        self.active
    }

    pub fn picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn shell_ids(&self) -> Vec<ShellId> {
        self.registry.ids()
    }

    /// Start `command` in the background and make it the active shell.
    pub fn spawn(&mut self, command: &str) -> Result<ShellId> {
        let (cols, rows) = pty_size(self.viewport);
        let mut shell =
            BackgroundShell::spawn(&self.launch.program, command, self.launch.mode, cols, rows)
                .with_context(|| format!("failed to start `{command}`"))?;
        let id = shell.id();
        let reader = shell.take_pty_reader();
        let shared = self.registry.insert(shell);

        if let Some(reader) = reader {
            let (stop_tx, stop_rx) = mpsc::channel(1);
            start_io_thread(id, shared, reader, stop_rx)
                .with_context(|| format!("failed to start I/O thread for shell {id}"))?;
            self.stops.insert(id, stop_tx);
        }
        self.active = Some(id);
        Ok(id)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Run `f` against the panel and a fresh snapshot; the panel's
    /// callbacks are applied afterwards.
    fn with_panel<R>(
        &mut self,
        f: impl FnOnce(&mut ShellPanel, &PanelProps<'_>, &mut Effects) -> R,
    ) -> R {
        let mut effects = Effects::default();
        let (active, picker_open, focused, viewport) =
            (self.active, self.picker_open, self.visible, self.viewport);
        let panel = &mut self.panel;
        let result = with_sessions(&self.registry, |sessions| {
            let props = PanelProps {
                sessions,
                active,
                picker_open,
                focused,
                viewport,
            };
            f(panel, &props, &mut effects)
        });
        self.apply(effects);
        result
    }

    pub fn apply(&mut self, effects: Effects) {
        for effect in effects.0 {
            match effect {
                Effect::Resize(id, cols, rows) => {
                    if let Some(shell) = self.registry.get(id) {
                        if let Err(e) = lock_shell(shell).resize(cols, rows) {
                            log::warn!("shell {id}: resize to {cols}x{rows} failed: {e}");
                        }
                    }
                }
                Effect::Write(id, bytes) => {
                    if let Some(shell) = self.registry.get(id) {
                        if let Err(e) = lock_shell(shell).write_input(&bytes) {
                            log::warn!("shell {id}: write failed: {e}");
                        }
                    }
                }
                Effect::SetActive(id) => self.active = Some(id),
                Effect::Dismiss(id) => self.dismiss(id),
                Effect::SetPickerOpen(open) => self.picker_open = open,
            }
        }
    }

    /// Stop and remove a shell. The first remaining shell becomes active
    /// if the dismissed one was.
    pub fn dismiss(&mut self, id: ShellId) {
        let Some(shell) = self.registry.remove(id) else {
            return;
        };
        if let Some(stop) = self.stops.remove(&id) {
            let _ = stop.try_send(());
        }
        if let Err(e) = lock_shell(&shell).kill() {
            log::warn!("shell {id}: kill failed: {e}");
        }
        if self.active == Some(id) {
            self.active = self.registry.ids().first().copied();
        }
    }

    /// Poll exits and let the panel react to the current state.
    pub fn tick(&mut self) {
        for shell in self.registry.shells() {
            lock_shell(shell).refresh_status();
        }
        self.with_panel(|panel, props, effects| panel.observe(props, effects));
    }

    /// Handle a key press: outer shortcuts first, then the panel.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        let bindings = self.panel.bindings().clone();
        if QUIT.matches(key) {
            self.quit = true;
            return;
        }
        if bindings.toggle_panel.matches(key) {
            self.visible = !self.visible;
            return;
        }
        if !self.visible {
            if bindings.picker.matches(key) && !self.registry.is_empty() {
                self.visible = true;
                self.picker_open = true;
            }
            return;
        }
        self.with_panel(|panel, props, effects| panel.handle_key(props, key, effects));
    }

    /// Pasted text goes to the active shell as one raw sequence.
    pub fn paste(&mut self, text: &str) {
        if self.visible {
            self.handle_key(&KeyEvent::raw(text.as_bytes()));
        }
    }

    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        if self.visible {
            self.with_panel(|panel, props, _| panel.render(props, area, frame.buffer_mut()));
        } else {
            let summary = self.summary();
            frame.render_widget(
                Paragraph::new(Line::styled(summary, Style::default().fg(Color::DarkGray))),
                area,
            );
        }
    }

    /// One-line status shown while the panel is hidden.
    pub fn summary(&self) -> String {
        let total = self.registry.len();
        let running = self
            .registry
            .shells()
            .filter(|shell| lock_shell(shell).status() == ShellStatus::Running)
            .count();
        let bindings = self.panel.bindings();
        let mut summary = format!(
            "shellbay: {total} background shells ({running} running) · {} show · {} list · {QUIT} quit",
            bindings.toggle_panel, bindings.picker
        );
        let last = self
            .active
            .and_then(|id| self.registry.get(id).map(|shell| (id, shell)))
            .and_then(|(id, shell)| Some((id, lock_shell(shell).last_line()?)));
        if let Some((id, line)) = last {
            summary.push_str(&format!(" │ {id}: {}", line.trim()));
        }
        summary
    }

    /// Kill every remaining shell.
    pub fn shutdown(&mut self) {
        for id in self.registry.ids() {
            self.dismiss(id);
        }
    }
}
