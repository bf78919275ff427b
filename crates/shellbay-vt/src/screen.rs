use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line};
use alacritty_terminal::term::cell::{Cell, Flags as AlacFlags};
use alacritty_terminal::term::Term;
use alacritty_terminal::vte::ansi::{Color, CursorShape, NamedColor};

use crate::cell::{CellColor, CellFlags, GridCell};
use crate::grid::EventProxy;

/// Cursor position and visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
}

/// A read-only view of the visible screen of an [`OutputGrid`](crate::OutputGrid).
#[derive(Clone, Copy)]
pub struct ScreenView<'a> {
    term: &'a Term<EventProxy>,
    title: Option<&'a str>,
}

impl<'a> ScreenView<'a> {
    pub(crate) fn new(term: &'a Term<EventProxy>, title: Option<&'a str>) -> Self {
        Self { term, title }
    }

    /// Title set through OSC 0/2, if any.
    pub fn title(&self) -> Option<&'a str> {
        self.title
    }

    /// Cursor position on the visible screen.
    pub fn cursor(&self) -> CursorState {
        let cursor = self.term.renderable_content().cursor;
        CursorState {
            row: cursor.point.line.0.max(0) as u16,
            col: cursor.point.column.0 as u16,
            visible: cursor.shape != CursorShape::Hidden,
        }
    }

    /// Number of visible rows.
    pub fn rows(&self) -> u16 {
        self.term.screen_lines() as u16
    }

    /// Number of columns.
    pub fn cols(&self) -> u16 {
        self.term.columns() as u16
    }

    /// Cell at `row`/`col`, row 0 being the top of the visible screen.
    ///
    /// Out-of-range coordinates yield a blank cell.
    pub fn cell(&self, row: u16, col: u16) -> GridCell {
        if row >= self.rows() || col >= self.cols() {
            return GridCell::default();
        }
        let cell = &self.term.grid()[Line(i32::from(row))][Column(usize::from(col))];
        convert_cell(cell)
    }

    pub fn row_cells(&self, row: u16) -> Vec<GridCell> {
        (0..self.cols()).map(|col| self.cell(row, col)).collect()
    }

    /// Text of a row with trailing blanks removed.
    pub fn row_text(&self, row: u16) -> String {
        let text: String = self
            .row_cells(row)
            .into_iter()
            .filter(|c| c.width != 0)
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// Number of rows up to and including the last row holding visible content.
    pub fn used_rows(&self) -> u16 {
        (0..self.rows())
            .rev()
            .find(|&row| self.row_cells(row).iter().any(|c| !c.is_blank()))
            .map_or(0, |row| row + 1)
    }
}

fn convert_color(color: Color) -> CellColor {
    match color {
        Color::Spec(rgb) => CellColor::Rgb(rgb.r, rgb.g, rgb.b),
        Color::Indexed(idx) => CellColor::Indexed(idx),
        Color::Named(named) => convert_named(named),
    }
}

fn convert_named(named: NamedColor) -> CellColor {
    match named {
        NamedColor::DimBlack => CellColor::Indexed(0),
        NamedColor::DimRed => CellColor::Indexed(1),
        NamedColor::DimGreen => CellColor::Indexed(2),
        NamedColor::DimYellow => CellColor::Indexed(3),
        NamedColor::DimBlue => CellColor::Indexed(4),
        NamedColor::DimMagenta => CellColor::Indexed(5),
        NamedColor::DimCyan => CellColor::Indexed(6),
        NamedColor::DimWhite => CellColor::Indexed(7),
        other => {
            // Black..=BrightWhite occupy 0..16; the rest are defaults.
            let idx = other as usize;
            if idx < 16 {
                CellColor::Indexed(idx as u8)
            } else {
                CellColor::Default
            }
        }
    }
}

const FLAG_MAP: [(AlacFlags, CellFlags); 7] = [
    (AlacFlags::BOLD, CellFlags::BOLD),
    (AlacFlags::ITALIC, CellFlags::ITALIC),
    (AlacFlags::UNDERLINE, CellFlags::UNDERLINE),
    (AlacFlags::STRIKEOUT, CellFlags::STRIKETHROUGH),
    (AlacFlags::INVERSE, CellFlags::INVERSE),
    (AlacFlags::DIM, CellFlags::DIM),
    (AlacFlags::HIDDEN, CellFlags::HIDDEN),
];

pub(crate) fn convert_cell(cell: &Cell) -> GridCell {
    let flags = FLAG_MAP
        .iter()
        .filter(|(alac, _)| cell.flags.contains(*alac))
        .fold(CellFlags::empty(), |acc, (_, ours)| acc | *ours);

    let width = if cell.flags.contains(AlacFlags::WIDE_CHAR) {
        2
    } else if cell.flags.contains(AlacFlags::WIDE_CHAR_SPACER) {
        0
    } else {
        1
    };

    GridCell {
        ch: cell.c,
        fg: convert_color(cell.fg),
        bg: convert_color(cell.bg),
        flags,
        width,
    }
}
