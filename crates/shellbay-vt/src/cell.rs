use bitflags::bitflags;

/// Colour of a single cell.
///
/// Named ANSI colours are reported as their palette index; the terminal's
/// default foreground/background stay `Default`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellColor {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

bitflags! {
    /// Cell attribute flags, packed into a single byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
        const INVERSE       = 0b0001_0000;
        const DIM           = 0b0010_0000;
        const HIDDEN        = 0b0100_0000;
    }
}

/// A single cell in the output grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub ch: char,
    pub fg: CellColor,
    pub bg: CellColor,
    pub flags: CellFlags,
    /// 1 for normal, 2 for the leading half of a wide char, 0 for its spacer.
    pub width: u8,
}

impl GridCell {
    /// Whether this cell shows nothing but background.
    pub fn is_blank(&self) -> bool {
        (self.ch == ' ' || self.width == 0) && self.bg == CellColor::Default
    }
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: CellColor::Default,
            bg: CellColor::Default,
            flags: CellFlags::empty(),
            width: 1,
        }
    }
}
