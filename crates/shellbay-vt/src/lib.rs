//! shellbay-vt: output buffers for background shells.
//!
//! Two renditions of a shell's pty output are offered:
//!
//! - [`OutputGrid`] wraps `alacritty_terminal` and exposes the visible screen
//!   as a grid of styled cells. Colours stay symbolic (default / indexed /
//!   RGB) so the hosting terminal's palette is used when the grid is drawn.
//! - [`PlainText`] runs the same bytes through a bare `vte` parser and keeps
//!   only printable text, one entry per line.

pub mod cell;
pub mod grid;
pub mod screen;
pub mod text;

pub use cell::{CellColor, CellFlags, GridCell};
pub use grid::OutputGrid;
pub use screen::{CursorState, ScreenView};
pub use text::PlainText;
