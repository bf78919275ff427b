use std::collections::VecDeque;

use vte::{Parser, Perform};

const TAB_WIDTH: usize = 8;

#[derive(Debug)]
struct Lines {
    lines: VecDeque<String>,
    max_lines: usize,
    /// A bare `\r` was seen; the next printed char starts the line over.
    pending_cr: bool,
}

impl Lines {
    fn current(&mut self) -> &mut String {
        if self.lines.is_empty() {
            self.lines.push_back(String::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn newline(&mut self) {
        self.pending_cr = false;
        self.lines.push_back(String::new());
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

impl Perform for Lines {
    fn print(&mut self, c: char) {
        if std::mem::take(&mut self.pending_cr) {
            self.current().clear();
        }
        self.current().push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.newline(),
            b'\r' => self.pending_cr = true,
            b'\t' => {
                let line = self.current();
                let pad = TAB_WIDTH - line.chars().count() % TAB_WIDTH;
                line.extend(std::iter::repeat(' ').take(pad));
            }
            0x08 => {
                self.current().pop();
            }
            _ => {}
        }
    }
}

/// Plain text output buffer.
///
/// Escape sequences are parsed and dropped; only printable characters,
/// line breaks and tabs survive. At most `max_lines` lines are retained.
pub struct PlainText {
    parser: Parser,
    lines: Lines,
}

impl PlainText {
    pub fn new(max_lines: usize) -> Self {
        Self {
            parser: Parser::new(),
            lines: Lines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
                pending_cr: false,
            },
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.advance(&mut self.lines, bytes);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.lines.iter().map(String::as_str)
    }

    /// The last `n` lines, oldest first, ignoring a trailing empty line.
    pub fn tail(&self, n: usize) -> Vec<&str> {
        let mut all: Vec<&str> = self.lines().collect();
        if all.last().is_some_and(|l| l.is_empty()) {
            all.pop();
        }
        let skip = all.len().saturating_sub(n);
        all.split_off(skip)
    }

    pub fn is_empty(&self) -> bool {
        self.lines().all(str::is_empty)
    }
}
