use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alacritty_terminal::event::{Event, EventListener};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::term::{Config, Term};
use alacritty_terminal::vte::ansi;

use crate::screen::ScreenView;

/// Lines of history kept above the visible screen.
const SCROLLBACK_LINES: usize = 2_000;

/// Terminal events captured while output is fed through the parser.
#[derive(Default)]
struct Captured {
    title: Option<String>,
    replies: Vec<String>,
}

/// Listener handed to `Term`; it has to be `Clone`, so state lives behind
/// an `Arc<Mutex<_>>`.
#[derive(Clone, Default)]
pub struct EventProxy {
    captured: Arc<Mutex<Captured>>,
}

impl EventProxy {
    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventListener for EventProxy {
    fn send_event(&self, event: Event) {
        let mut captured = self.lock();
        match event {
            Event::Title(title) => captured.title = Some(title),
            Event::ResetTitle => captured.title = None,
            Event::PtyWrite(data) => captured.replies.push(data),
            _ => {}
        }
    }
}

struct GridSize {
    cols: usize,
    rows: usize,
}

impl GridSize {
    fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: usize::from(cols.max(1)),
            rows: usize::from(rows.max(1)),
        }
    }
}

impl Dimensions for GridSize {
    fn total_lines(&self) -> usize {
        self.rows
    }

    fn screen_lines(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

/// Structured output buffer of one background shell.
///
/// Raw pty output goes in through [`feed`](Self::feed); the visible screen
/// comes out through [`screen`](Self::screen). Zero dimensions are clamped
/// to one cell.
pub struct OutputGrid {
    term: Term<EventProxy>,
    parser: ansi::Processor,
    events: EventProxy,
    /// Copied out of `events` after each feed so views can borrow it.
    title: Option<String>,
}

impl OutputGrid {
    pub fn new(cols: u16, rows: u16) -> Self {
        let config = Config {
            scrolling_history: SCROLLBACK_LINES,
            ..Config::default()
        };
        let events = EventProxy::default();
        let term = Term::new(config, &GridSize::new(cols, rows), events.clone());

        Self {
            term,
            parser: ansi::Processor::new(),
            events,
            title: None,
        }
    }

    /// Parse raw pty output into the grid.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.advance(&mut self.term, bytes);
        self.title = self.events.lock().title.clone();
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.term.resize(GridSize::new(cols, rows));
    }

    pub fn screen(&self) -> ScreenView<'_> {
        ScreenView::new(&self.term, self.title.as_deref())
    }

    /// Drain replies the terminal wants written back to the pty
    /// (cursor position reports and similar).
    pub fn take_replies(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events.lock().replies)
    }
}
