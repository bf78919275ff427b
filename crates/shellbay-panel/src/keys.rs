//! Decoded key events and configurable key chords.
//!
//! A [`KeyEvent`] carries a symbolic key (when one is recognised), modifier
//! flags and the raw byte sequence a terminal would send for it. The raw
//! sequence is what gets forwarded to a pty.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbolic key names the panel understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Return,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
    Char(char),
}

/// A decoded key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Option<Key>,
    pub modifiers: KeyModifiers,
    /// Bytes a terminal sends for this key, if it has a representation.
    pub sequence: Option<Vec<u8>>,
}

impl KeyEvent {
    /// A key press with its terminal byte sequence derived from key and modifiers.
    pub fn new(key: Key, modifiers: KeyModifiers) -> Self {
        Self {
            key: Some(key),
            modifiers,
            sequence: encode(key, modifiers),
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), KeyModifiers::CONTROL)
    }

    /// An unnamed key that only carries raw bytes.
    pub fn raw(bytes: &[u8]) -> Self {
        Self {
            key: None,
            modifiers: KeyModifiers::NONE,
            sequence: Some(bytes.to_vec()),
        }
    }

    /// Whether this is `key`, regardless of modifiers.
    pub fn is(&self, key: Key) -> bool {
        self.key == Some(key)
    }
}

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        let key = match event.code {
            KeyCode::Up => Some(Key::Up),
            KeyCode::Down => Some(Key::Down),
            KeyCode::Left => Some(Key::Left),
            KeyCode::Right => Some(Key::Right),
            KeyCode::Enter => Some(Key::Return),
            KeyCode::Esc => Some(Key::Escape),
            KeyCode::Backspace => Some(Key::Backspace),
            KeyCode::Tab => Some(Key::Tab),
            KeyCode::BackTab => Some(Key::BackTab),
            KeyCode::Home => Some(Key::Home),
            KeyCode::End => Some(Key::End),
            KeyCode::PageUp => Some(Key::PageUp),
            KeyCode::PageDown => Some(Key::PageDown),
            KeyCode::Insert => Some(Key::Insert),
            KeyCode::Delete => Some(Key::Delete),
            KeyCode::F(n) => Some(Key::F(n)),
            KeyCode::Char(c) => Some(Key::Char(c)),
            _ => None,
        };
        match key {
            Some(key) => Self::new(key, event.modifiers),
            None => Self {
                key: None,
                modifiers: event.modifiers,
                sequence: None,
            },
        }
    }
}

/// How a named key is spelled on the wire.
enum Wire {
    /// `ESC [ <final>`, or `ESC [ 1 ; <mods> <final>` when modified.
    Csi(u8),
    /// `ESC O <final>`, or `ESC [ 1 ; <mods> <final>` when modified.
    Ss3(u8),
    /// `ESC [ <n> ~`, or `ESC [ <n> ; <mods> ~` when modified.
    Tilde(u8),
    /// Fixed bytes; Alt prefixes ESC.
    Plain(&'static [u8]),
}

/// xterm modifier parameter: 1 + shift + 2·alt + 4·ctrl, if any is held.
fn modifier_param(modifiers: KeyModifiers) -> Option<u8> {
    let mut param = 1;
    if modifiers.contains(KeyModifiers::SHIFT) {
        param += 1;
    }
    if modifiers.contains(KeyModifiers::ALT) {
        param += 2;
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        param += 4;
    }
    (param > 1).then_some(param)
}

/// Bytes a VT-compatible terminal emits for `key`.
fn encode(key: Key, modifiers: KeyModifiers) -> Option<Vec<u8>> {
    let wire = match key {
        Key::Char(c) => return Some(encode_char(c, modifiers)),
        Key::BackTab => return Some(b"\x1b[Z".to_vec()),
        Key::Return => Wire::Plain(b"\r"),
        Key::Backspace => Wire::Plain(b"\x7f"),
        Key::Tab => Wire::Plain(b"\t"),
        Key::Escape => Wire::Plain(b"\x1b"),
        Key::Up => Wire::Csi(b'A'),
        Key::Down => Wire::Csi(b'B'),
        Key::Right => Wire::Csi(b'C'),
        Key::Left => Wire::Csi(b'D'),
        Key::Home => Wire::Csi(b'H'),
        Key::End => Wire::Csi(b'F'),
        Key::PageUp => Wire::Tilde(5),
        Key::PageDown => Wire::Tilde(6),
        Key::Insert => Wire::Tilde(2),
        Key::Delete => Wire::Tilde(3),
        Key::F(n) => match n {
            1 => Wire::Ss3(b'P'),
            2 => Wire::Ss3(b'Q'),
            3 => Wire::Ss3(b'R'),
            4 => Wire::Ss3(b'S'),
            5 => Wire::Tilde(15),
            6 => Wire::Tilde(17),
            7 => Wire::Tilde(18),
            8 => Wire::Tilde(19),
            9 => Wire::Tilde(20),
            10 => Wire::Tilde(21),
            11 => Wire::Tilde(23),
            12 => Wire::Tilde(24),
            _ => return None,
        },
    };

    let param = modifier_param(modifiers);
    let seq = match (wire, param) {
        (Wire::Plain(bytes), _) => {
            let mut seq = Vec::with_capacity(bytes.len() + 1);
            if modifiers.contains(KeyModifiers::ALT) {
                seq.push(0x1b);
            }
            seq.extend_from_slice(bytes);
            seq
        }
        (Wire::Csi(fin), None) => vec![0x1b, b'[', fin],
        (Wire::Ss3(fin), None) => vec![0x1b, b'O', fin],
        (Wire::Csi(fin) | Wire::Ss3(fin), Some(m)) => {
            let mut seq = format!("\x1b[1;{m}").into_bytes();
            seq.push(fin);
            seq
        }
        (Wire::Tilde(n), None) => format!("\x1b[{n}~").into_bytes(),
        (Wire::Tilde(n), Some(m)) => format!("\x1b[{n};{m}~").into_bytes(),
    };
    Some(seq)
}

fn encode_char(c: char, modifiers: KeyModifiers) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4);
    if modifiers.contains(KeyModifiers::ALT) {
        bytes.push(0x1b);
    }
    if modifiers.contains(KeyModifiers::CONTROL) {
        // Ctrl+A = 0x01 .. Ctrl+Z = 0x1a, plus the punctuation controls.
        let control = match c.to_ascii_lowercase() {
            l @ 'a'..='z' => Some(l as u8 - b'a' + 1),
            ' ' | '@' => Some(0x00),
            '[' => Some(0x1b),
            '\\' => Some(0x1c),
            ']' => Some(0x1d),
            '^' => Some(0x1e),
            '_' => Some(0x1f),
            _ => None,
        };
        if let Some(byte) = control {
            bytes.push(byte);
            return bytes;
        }
    }
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    bytes
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyChordError {
    #[error("empty key binding")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// A key plus the modifiers that must be held, e.g. `ctrl+o`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: KeyModifiers,
}

/// Modifiers that take part in chord matching. Shift is implied by the
/// character itself for printable keys.
const CHORD_MODIFIERS: KeyModifiers = KeyModifiers::CONTROL.union(KeyModifiers::ALT);

impl KeyChord {
    pub const fn new(key: Key, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), KeyModifiers::CONTROL)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let same_key = match (self.key, event.key) {
            (Key::Char(want), Some(Key::Char(got))) => want.eq_ignore_ascii_case(&got),
            (want, Some(got)) => want == got,
            (_, None) => false,
        };
        // Shift is part of a printable character, but a real modifier on
        // named keys.
        let relevant = match self.key {
            Key::Char(_) => CHORD_MODIFIERS,
            _ => CHORD_MODIFIERS | KeyModifiers::SHIFT,
        };
        same_key && (event.modifiers & relevant) == (self.modifiers & relevant)
    }
}

fn parse_key(name: &str) -> Result<Key, KeyChordError> {
    let key = match name {
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "enter" | "return" => Key::Return,
        "esc" | "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "tab" => Key::Tab,
        "backtab" => Key::BackTab,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "insert" => Key::Insert,
        "delete" | "del" => Key::Delete,
        "space" => Key::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    Some(n @ 1..=12) => Key::F(n),
                    _ => return Err(KeyChordError::UnknownKey(other.to_string())),
                },
            }
        }
    };
    Ok(key)
}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return Err(KeyChordError::Empty);
        }
        // A trailing "+" is the plus key itself, as in "ctrl++".
        let (mods, key) = match lowered.strip_suffix("++") {
            Some(mods) => (mods, "+"),
            None => lowered.rsplit_once('+').unwrap_or(("", lowered.as_str())),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.trim() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" | "option" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => return Err(KeyChordError::UnknownModifier(other.to_string())),
            };
        }
        Ok(Self::new(parse_key(key.trim())?, modifiers))
    }
}

impl TryFrom<String> for KeyChord {
    type Error = KeyChordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyChord> for String {
    fn from(chord: KeyChord) -> Self {
        chord.to_string()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.key {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::F(n) => write!(f, "F{n}"),
            Key::Return => f.write_str("Enter"),
            Key::Escape => f.write_str("Esc"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Panel shortcuts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Shows or hides the panel; handled by the surrounding application.
    pub toggle_panel: KeyChord,
    /// Dismisses the active shell.
    pub dismiss: KeyChord,
    /// Opens the shell picker.
    pub picker: KeyChord,
    /// Confirms the highlighted picker row, in addition to Enter.
    pub confirm: KeyChord,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_panel: KeyChord::ctrl('b'),
            dismiss: KeyChord::ctrl('k'),
            picker: KeyChord::ctrl('o'),
            confirm: KeyChord::new(Key::Tab, KeyModifiers::NONE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent as CrosstermKey, KeyEventKind, KeyEventState};

    fn crossterm_key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        CrosstermKey {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
        .into()
    }

    #[test]
    fn printable_char_encodes_utf8() {
        let key = crossterm_key(KeyCode::Char('é'), KeyModifiers::NONE);
        assert_eq!(key.key, Some(Key::Char('é')));
        assert_eq!(key.sequence, Some("é".as_bytes().to_vec()));
    }

    #[test]
    fn ctrl_letter_encodes_control_byte() {
        assert_eq!(KeyEvent::ctrl('c').sequence, Some(vec![0x03]));
        assert_eq!(KeyEvent::ctrl('A').sequence, Some(vec![0x01]));
        assert_eq!(KeyEvent::ctrl('[').sequence, Some(vec![0x1b]));
    }

    #[test]
    fn alt_char_is_escape_prefixed() {
        let key = KeyEvent::new(Key::Char('x'), KeyModifiers::ALT);
        assert_eq!(key.sequence, Some(b"\x1bx".to_vec()));
    }

    #[test]
    fn named_keys_encode_vt_sequences() {
        assert_eq!(crossterm_key(KeyCode::Enter, KeyModifiers::NONE).sequence, Some(b"\r".to_vec()));
        assert_eq!(crossterm_key(KeyCode::Up, KeyModifiers::NONE).sequence, Some(b"\x1b[A".to_vec()));
        assert_eq!(crossterm_key(KeyCode::F(5), KeyModifiers::NONE).sequence, Some(b"\x1b[15~".to_vec()));
        assert_eq!(KeyEvent::plain(Key::Backspace).sequence, Some(vec![0x7f]));
    }

    #[test]
    fn modified_cursor_keys_carry_xterm_parameter() {
        let ctrl = KeyModifiers::CONTROL;
        assert_eq!(KeyEvent::new(Key::Left, ctrl).sequence, Some(b"\x1b[1;5D".to_vec()));
        assert_eq!(
            KeyEvent::new(Key::Right, KeyModifiers::ALT).sequence,
            Some(b"\x1b[1;3C".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::Up, KeyModifiers::SHIFT).sequence,
            Some(b"\x1b[1;2A".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::Home, ctrl | KeyModifiers::SHIFT).sequence,
            Some(b"\x1b[1;6H".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::End, ctrl | KeyModifiers::ALT | KeyModifiers::SHIFT).sequence,
            Some(b"\x1b[1;8F".to_vec())
        );
    }

    #[test]
    fn modified_tilde_keys_carry_xterm_parameter() {
        assert_eq!(
            KeyEvent::new(Key::Delete, KeyModifiers::CONTROL).sequence,
            Some(b"\x1b[3;5~".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::PageUp, KeyModifiers::SHIFT).sequence,
            Some(b"\x1b[5;2~".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::F(5), KeyModifiers::ALT).sequence,
            Some(b"\x1b[15;3~".to_vec())
        );
    }

    #[test]
    fn modified_low_function_keys_switch_to_csi() {
        assert_eq!(KeyEvent::plain(Key::F(1)).sequence, Some(b"\x1bOP".to_vec()));
        assert_eq!(
            KeyEvent::new(Key::F(1), KeyModifiers::CONTROL).sequence,
            Some(b"\x1b[1;5P".to_vec())
        );
        assert_eq!(
            KeyEvent::new(Key::F(4), KeyModifiers::SHIFT).sequence,
            Some(b"\x1b[1;2S".to_vec())
        );
    }

    #[test]
    fn alt_prefixes_escape_on_fixed_keys() {
        let alt = KeyModifiers::ALT;
        assert_eq!(KeyEvent::new(Key::Return, alt).sequence, Some(b"\x1b\r".to_vec()));
        assert_eq!(KeyEvent::new(Key::Backspace, alt).sequence, Some(b"\x1b\x7f".to_vec()));
        assert_eq!(KeyEvent::new(Key::Tab, alt).sequence, Some(b"\x1b\t".to_vec()));
        assert_eq!(
            KeyEvent::new(Key::Return, KeyModifiers::SHIFT).sequence,
            Some(b"\r".to_vec())
        );
    }

    #[test]
    fn crossterm_ctrl_left_forwards_word_motion() {
        let key = crossterm_key(KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(key.sequence, Some(b"\x1b[1;5D".to_vec()));
        let key = crossterm_key(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(key.sequence, Some(b"\x1b[Z".to_vec()));
    }

    #[test]
    fn unmapped_crossterm_key_has_no_name_or_sequence() {
        let key = crossterm_key(KeyCode::CapsLock, KeyModifiers::NONE);
        assert_eq!(key.key, None);
        assert_eq!(key.sequence, None);
    }

    #[test]
    fn high_function_keys_have_no_sequence() {
        assert_eq!(KeyEvent::plain(Key::F(20)).sequence, None);
    }

    #[test]
    fn parse_chords() {
        assert_eq!("ctrl+o".parse(), Ok(KeyChord::ctrl('o')));
        assert_eq!("Ctrl+O".parse(), Ok(KeyChord::ctrl('o')));
        assert_eq!("tab".parse(), Ok(KeyChord::new(Key::Tab, KeyModifiers::NONE)));
        assert_eq!(
            "alt+shift+f3".parse(),
            Ok(KeyChord::new(Key::F(3), KeyModifiers::ALT | KeyModifiers::SHIFT))
        );
        assert_eq!(
            "ctrl++".parse(),
            Ok(KeyChord::new(Key::Char('+'), KeyModifiers::CONTROL))
        );
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<KeyChord>(), Err(KeyChordError::Empty));
        assert_eq!(
            "hyper+o".parse::<KeyChord>(),
            Err(KeyChordError::UnknownModifier("hyper".into()))
        );
        assert_eq!(
            "ctrl+nope".parse::<KeyChord>(),
            Err(KeyChordError::UnknownKey("nope".into()))
        );
        assert!("f13".parse::<KeyChord>().is_err());
    }

    #[test]
    fn display_chords() {
        assert_eq!(KeyChord::ctrl('o').to_string(), "Ctrl+O");
        assert_eq!(KeyChord::new(Key::Return, KeyModifiers::NONE).to_string(), "Enter");
        assert_eq!(KeyChord::new(Key::Tab, KeyModifiers::ALT).to_string(), "Alt+Tab");
    }

    #[test]
    fn chord_matching_ignores_case_and_shift() {
        let chord = KeyChord::ctrl('o');
        assert!(chord.matches(&KeyEvent::ctrl('o')));
        assert!(chord.matches(&KeyEvent::new(
            Key::Char('O'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
        assert!(!chord.matches(&KeyEvent::plain(Key::Char('o'))));
        assert!(!chord.matches(&KeyEvent::new(Key::Char('o'), KeyModifiers::ALT)));
        assert!(!chord.matches(&KeyEvent::raw(b"\x0f")));
    }

    #[test]
    fn shift_counts_on_named_keys() {
        let shift_up: KeyChord = "shift+up".parse().unwrap();
        assert!(shift_up.matches(&KeyEvent::new(Key::Up, KeyModifiers::SHIFT)));
        assert!(!shift_up.matches(&KeyEvent::plain(Key::Up)));

        let f3: KeyChord = "f3".parse().unwrap();
        assert!(f3.matches(&KeyEvent::plain(Key::F(3))));
        assert!(!f3.matches(&KeyEvent::new(Key::F(3), KeyModifiers::SHIFT)));

        let shift_f3: KeyChord = "shift+f3".parse().unwrap();
        assert!(!shift_f3.matches(&KeyEvent::plain(Key::F(3))));
    }

    #[test]
    fn bindings_deserialize_with_defaults() {
        let bindings: KeyBindings = toml::from_str(r#"picker = "ctrl+p""#).unwrap();
        assert_eq!(bindings.picker, KeyChord::ctrl('p'));
        assert_eq!(bindings.dismiss, KeyChord::ctrl('k'));
        assert_eq!(bindings.confirm, KeyChord::new(Key::Tab, KeyModifiers::NONE));
    }

    #[test]
    fn bad_binding_fails_to_deserialize() {
        let result: Result<KeyBindings, _> = toml::from_str(r#"dismiss = "ctrl+bogus""#);
        assert!(result.is_err());
    }
}
