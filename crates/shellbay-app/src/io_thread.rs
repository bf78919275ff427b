//! Per-shell I/O thread that reads pty output into the shell's buffer.
//!
//! PTY reads block, so every shell gets its own OS thread. The reader is
//! owned by the thread rather than kept behind the shell mutex, so a blocked
//! read never holds up the UI.

use std::io::{self, Read};
use std::thread::JoinHandle;

use shellbay_pty::{lock_shell, SharedShell, ShellId};
use tokio::sync::mpsc;

/// Start the read loop for `shell` on a dedicated thread.
///
/// The loop ends on EOF, a read error, or a message on (or the closing
/// of) `stop_rx`.
pub fn start_io_thread(
    id: ShellId,
    shell: SharedShell,
    reader: Box<dyn Read + Send>,
    mut stop_rx: mpsc::Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(format!("shell-io-{id}"))
        .spawn(move || io_loop(id, &shell, reader, &mut stop_rx))
}

fn io_loop(
    id: ShellId,
    shell: &SharedShell,
    mut reader: Box<dyn Read + Send>,
    stop_rx: &mut mpsc::Receiver<()>,
) {
    let mut buf = [0u8; 65536];

    loop {
        match stop_rx.try_recv() {
            Ok(()) | Err(mpsc::error::TryRecvError::Disconnected) => return,
            Err(mpsc::error::TryRecvError::Empty) => {}
        }

        let n = match reader.read(&mut buf) {
            Ok(0) => {
                log::debug!("shell {id}: pty closed");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                log::debug!("shell {id}: pty read failed: {e}");
                return;
            }
        };

        if let Err(e) = lock_shell(shell).ingest(&buf[..n]) {
            log::warn!("shell {id}: failed to answer terminal query: {e}");
        }
    }
}
