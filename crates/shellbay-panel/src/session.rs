//! What the panel reads from, and calls back into, its host.

use shellbay_vt::{PlainText, ScreenView};

/// Process id of a background shell.
pub type SessionId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Exited { code: u32 },
}

impl SessionStatus {
    pub fn is_exited(self) -> bool {
        matches!(self, Self::Exited { .. })
    }

    pub fn exit_code(self) -> Option<u32> {
        match self {
            Self::Running => None,
            Self::Exited { code } => Some(code),
        }
    }
}

#[derive(Clone, Copy)]
pub enum SessionOutput<'a> {
    Text(&'a PlainText),
    Grid(ScreenView<'a>),
}

/// Borrowed view of one registry entry, valid for a single render pass.
#[derive(Clone, Copy)]
pub struct SessionView<'a> {
    pub id: SessionId,
    pub command: &'a str,
    pub status: SessionStatus,
    pub output: SessionOutput<'a>,
}

/// Panel size in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Host state the panel observes on every call.
#[derive(Clone, Copy)]
pub struct PanelProps<'a> {
    /// Sessions in registry order.
    pub sessions: &'a [SessionView<'a>],
    pub active: Option<SessionId>,
    pub picker_open: bool,
    /// Whether the panel currently owns keyboard input.
    pub focused: bool,
    pub viewport: Viewport,
}

impl<'a> PanelProps<'a> {
    /// The active session, if the active id is present in the registry.
    pub fn active_session(&self) -> Option<&'a SessionView<'a>> {
        let id = self.active?;
        self.sessions.iter().find(|s| s.id == id)
    }
}

/// Pseudo-terminal capabilities. Calls are fire-and-forget.
pub trait PtyControl {
    fn resize(&mut self, id: SessionId, cols: u16, rows: u16);
    /// Bytes for one session must reach its pty in call order.
    fn write(&mut self, id: SessionId, bytes: &[u8]);
}

/// Callbacks into the application that owns the registry, the active id and
/// the picker flag.
pub trait PanelHost: PtyControl {
    fn set_active_session(&mut self, id: SessionId);
    fn dismiss_session(&mut self, id: SessionId);
    fn set_picker_open(&mut self, open: bool);
}
