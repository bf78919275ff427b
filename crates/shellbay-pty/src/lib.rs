//! shellbay-pty: background shell processes running under a pseudo-terminal.
//!
//! # Architecture
//!
//! - [`PtyHandle`] — Low-level PTY process management (spawn, read, write, resize, kill).
//! - [`BackgroundShell`] — One command running under a `PtyHandle`, together with
//!   its output buffer, status and exit code.
//! - [`ShellRegistry`] — Insertion-ordered collection of shells keyed by process id.

pub mod pty;
pub mod registry;
pub mod shell;

pub use pty::{PtyError, PtyHandle};
pub use registry::{lock_shell, SharedShell, ShellRegistry};
pub use shell::{BackgroundShell, OutputMode, ShellId, ShellOutput, ShellStatus};
