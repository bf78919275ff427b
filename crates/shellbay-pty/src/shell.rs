use shellbay_vt::{OutputGrid, PlainText};

use crate::pty::{PtyError, PtyHandle};

/// Identifier of a background shell: the pid of its process.
pub type ShellId = u32;

/// Lines retained by a plain text output buffer.
const TEXT_HISTORY_LINES: usize = 5_000;

/// Lifecycle of a background shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellStatus {
    Running,
    Exited { code: u32 },
}

/// How a shell's output is buffered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Full terminal emulation into a cell grid.
    #[default]
    Grid,
    /// Printable text only.
    Text,
}

pub enum ShellOutput {
    Grid(OutputGrid),
    Text(PlainText),
}

/// A command running in the background under its own PTY.
pub struct BackgroundShell {
    id: ShellId,
    command: String,
    output: ShellOutput,
    pty: PtyHandle,
    status: ShellStatus,
}

impl BackgroundShell {
    /// Start `command` through `<shell> -c` with an initial pty size.
    pub fn spawn(
        shell: &str,
        command: &str,
        mode: OutputMode,
        cols: u16,
        rows: u16,
    ) -> Result<Self, PtyError> {
        let pty = PtyHandle::spawn(shell, command, cols, rows)?;
        let output = match mode {
            OutputMode::Grid => ShellOutput::Grid(OutputGrid::new(cols, rows)),
            OutputMode::Text => ShellOutput::Text(PlainText::new(TEXT_HISTORY_LINES)),
        };
        log::info!("spawned background shell {} `{command}`", pty.pid());

        Ok(Self {
            id: pty.pid(),
            command: command.to_string(),
            output,
            pty,
            status: ShellStatus::Running,
        })
    }

    pub fn id(&self) -> ShellId {
        self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn status(&self) -> ShellStatus {
        self.status
    }

    pub fn output(&self) -> &ShellOutput {
        &self.output
    }

    /// Last non-blank line of output, if there is any.
    pub fn last_line(&self) -> Option<String> {
        match &self.output {
            ShellOutput::Grid(grid) => {
                let screen = grid.screen();
                let used = screen.used_rows();
                (used > 0).then(|| screen.row_text(used - 1))
            }
            ShellOutput::Text(text) if text.is_empty() => None,
            ShellOutput::Text(text) => text
                .tail(usize::MAX)
                .into_iter()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(str::to_string),
        }
    }

    /// See [`PtyHandle::take_reader`].
    pub fn take_pty_reader(&mut self) -> Option<Box<dyn std::io::Read + Send>> {
        self.pty.take_reader()
    }

    /// Feed bytes read from the pty into the output buffer.
    ///
    /// Terminal replies (cursor reports and similar) are written back to
    /// the pty.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), PtyError> {
        match &mut self.output {
            ShellOutput::Grid(grid) => {
                grid.feed(bytes);
                for reply in grid.take_replies() {
                    self.pty.write(reply.as_bytes())?;
                }
            }
            ShellOutput::Text(text) => text.feed(bytes),
        }
        Ok(())
    }

    /// Write user input to the process.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), PtyError> {
        self.pty.write(data)
    }

    /// Resize the pty and, for grid output, the grid.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), PtyError> {
        self.pty.resize(cols, rows)?;
        if let ShellOutput::Grid(grid) = &mut self.output {
            grid.resize(cols, rows);
        }
        Ok(())
    }

    /// Poll the child and record its exit.
    ///
    /// Returns `true` when the status changed by this call.
    pub fn refresh_status(&mut self) -> bool {
        if self.status != ShellStatus::Running {
            return false;
        }
        match self.pty.try_wait() {
            Some(code) => {
                log::info!("background shell {} exited with {code}", self.id);
                self.status = ShellStatus::Exited { code };
                true
            }
            None => false,
        }
    }

    pub fn kill(&mut self) -> Result<(), PtyError> {
        self.pty.kill()
    }
}
