//! shellbay-panel: an interactive panel over a set of background shells.
//!
//! # Architecture
//!
//! - [`ShellPanel`] — Owns the picker index and reacts to host state; every
//!   effect goes back through [`PanelHost`].
//! - [`router`] — Ordered key rule tables, one per picker state.
//! - [`layout`] — Tab strip fitting and overflow.
//! - [`geometry`] — Pty size derived from the panel viewport.
//! - [`keys`] — Key events, raw byte encoding and configurable chords.

pub mod geometry;
pub mod keys;
pub mod layout;
pub mod panel;
mod render;
pub mod router;
pub mod selection;
pub mod session;

#[cfg(test)]
mod testing;

pub use geometry::{pty_size, sync_geometry, GeometryWatch};
pub use keys::{Key, KeyBindings, KeyChord, KeyChordError, KeyEvent};
pub use layout::{layout_tabs, Tab, TabChrome, TabStrip, TabStyle};
pub use panel::ShellPanel;
pub use router::{route, Action};
pub use selection::{AutoPicker, Selection, Step};
pub use session::{
    PanelHost, PanelProps, PtyControl, SessionId, SessionOutput, SessionStatus, SessionView,
    Viewport,
};
