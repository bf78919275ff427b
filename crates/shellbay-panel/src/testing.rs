//! Fixtures shared by the unit tests.

use shellbay_vt::PlainText;

use crate::session::{
    PanelHost, PanelProps, PtyControl, SessionId, SessionOutput, SessionStatus, SessionView,
    Viewport,
};

pub fn view(id: SessionId, command: &'static str, status: SessionStatus) -> SessionView<'static> {
    let text: &'static PlainText = Box::leak(Box::new(PlainText::new(16)));
    SessionView {
        id,
        command,
        status,
        output: SessionOutput::Text(text),
    }
}

pub fn running(ids: &[SessionId]) -> Vec<SessionView<'static>> {
    ids.iter()
        .map(|&id| view(id, "sleep 100", SessionStatus::Running))
        .collect()
}

pub fn props<'a>(
    sessions: &'a [SessionView<'a>],
    active: Option<SessionId>,
    picker_open: bool,
) -> PanelProps<'a> {
    PanelProps {
        sessions,
        active,
        picker_open,
        focused: true,
        viewport: Viewport::new(80, 24),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Resize(SessionId, u16, u16),
    Write(SessionId, Vec<u8>),
    SetActive(SessionId),
    Dismiss(SessionId),
    SetPickerOpen(bool),
}

/// Host that records every callback.
#[derive(Default)]
pub struct RecordingHost {
    pub calls: Vec<Call>,
}

impl RecordingHost {
    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl PtyControl for RecordingHost {
    fn resize(&mut self, id: SessionId, cols: u16, rows: u16) {
        self.calls.push(Call::Resize(id, cols, rows));
    }

    fn write(&mut self, id: SessionId, bytes: &[u8]) {
        self.calls.push(Call::Write(id, bytes.to_vec()));
    }
}

impl PanelHost for RecordingHost {
    fn set_active_session(&mut self, id: SessionId) {
        self.calls.push(Call::SetActive(id));
    }

    fn dismiss_session(&mut self, id: SessionId) {
        self.calls.push(Call::Dismiss(id));
    }

    fn set_picker_open(&mut self, open: bool) {
        self.calls.push(Call::SetPickerOpen(open));
    }
}
