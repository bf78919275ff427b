use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::geometry::GeometryWatch;
use crate::keys::{KeyBindings, KeyEvent};
use crate::layout::{layout_tabs, TabChrome, TabStrip};
use crate::render;
use crate::router::{route, Action};
use crate::selection::{AutoPicker, Selection};
use crate::session::{PanelHost, PanelProps, SessionId};

/// The background shell panel.
///
/// Holds only derived state (the picker index and the edges it reacts to);
/// session contents, the active id and the picker flag are read from
/// [`PanelProps`] on every call and changed through [`PanelHost`].
pub struct ShellPanel {
    bindings: KeyBindings,
    chrome: TabChrome,
    hint: String,
    selection: Selection,
    geometry: GeometryWatch,
}

impl ShellPanel {
    pub fn new(bindings: KeyBindings) -> Self {
        let hint = format!("{} list · {} dismiss", bindings.picker, bindings.dismiss);
        let chrome = TabChrome::new(&hint, &bindings.picker.to_string());
        Self {
            bindings,
            chrome,
            hint,
            selection: Selection::new(),
            geometry: GeometryWatch::new(),
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub(crate) fn hint(&self) -> &str {
        &self.hint
    }

    /// Highlighted picker row.
    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    pub fn tabs(&self, props: &PanelProps<'_>) -> TabStrip {
        layout_tabs(props.sessions, props.active, props.viewport.width, &self.chrome)
    }

    /// Reconcile with the host's current state.
    ///
    /// Call after every change to the registry, the viewport, the active id
    /// or the picker flag (once per frame is enough). Auto-opens or closes
    /// the picker on registry-size edges and keeps the active pty sized to
    /// the viewport.
    pub fn observe(&mut self, props: &PanelProps<'_>, host: &mut impl PanelHost) {
        self.reconcile(props, host);
        self.geometry.observe(props, host);
    }

    /// Route one key press. Returns `true` if the panel consumed it.
    ///
    /// Keys are only looked at while the panel has focus and at least one
    /// session exists.
    pub fn handle_key(
        &mut self,
        props: &PanelProps<'_>,
        key: &KeyEvent,
        host: &mut impl PanelHost,
    ) -> bool {
        if !props.focused || props.sessions.is_empty() {
            return false;
        }
        // The host may not have called `observe` since the registry changed.
        let picker_open = self.reconcile(props, host);

        match route(picker_open, key, &self.bindings) {
            Action::Navigate(step) => self.selection.step(step, props.sessions.len()),
            Action::Commit => {
                if let Some(id) = self.selection.selected(props.sessions) {
                    host.set_active_session(id);
                }
                self.close_picker(host);
            }
            Action::Cancel => self.close_picker(host),
            Action::OpenPicker => self.open_picker(props, host),
            Action::Dismiss => {
                if let Some(id) = present_active(props) {
                    log::info!("dismissing session {id}");
                    host.dismiss_session(id);
                }
            }
            Action::Forward(bytes) => {
                if let Some(id) = present_active(props) {
                    host.write(id, &bytes);
                }
            }
            Action::Swallow => {}
            Action::Ignore => return false,
        }
        true
    }

    pub fn render(&self, props: &PanelProps<'_>, area: Rect, buf: &mut Buffer) {
        render::draw(self, props, area, buf);
    }

    /// Apply registry-size and picker-flag edges; returns whether the
    /// picker is open afterwards.
    fn reconcile(&mut self, props: &PanelProps<'_>, host: &mut impl PanelHost) -> bool {
        match self.selection.observe_count(props.sessions.len()) {
            Some(AutoPicker::Open) => {
                self.open_picker(props, host);
                true
            }
            Some(AutoPicker::Close) => {
                self.close_picker(host);
                false
            }
            None => {
                self.selection
                    .observe_picker(props.picker_open, props.sessions, props.active);
                props.picker_open
            }
        }
    }

    fn open_picker(&mut self, props: &PanelProps<'_>, host: &mut impl PanelHost) {
        self.selection.opened(props.sessions, props.active);
        host.set_picker_open(true);
    }

    fn close_picker(&mut self, host: &mut impl PanelHost) {
        self.selection.closed();
        host.set_picker_open(false);
    }
}

impl Default for ShellPanel {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

/// The active id, if it still names a registry member.
fn present_active(props: &PanelProps<'_>) -> Option<SessionId> {
    props.active_session().map(|s| s.id)
}
