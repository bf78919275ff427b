//! Key routing.
//!
//! Each picker state has an ordered rule table. The first rule whose
//! predicate matches decides the action; later rules are not consulted.

use crate::keys::{Key, KeyBindings, KeyEvent};
use crate::selection::Step;

/// What a key press asks the panel to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Navigate(Step),
    Commit,
    Cancel,
    OpenPicker,
    Dismiss,
    /// Bytes for the active session's pty.
    Forward(Vec<u8>),
    /// Consumed without effect.
    Swallow,
    /// Not handled by the panel.
    Ignore,
}

struct Rule {
    name: &'static str,
    matches: fn(&KeyEvent, &KeyBindings) -> bool,
    action: fn(&KeyEvent) -> Action,
}

fn is_up(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.is(Key::Up)
}

fn is_down(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.is(Key::Down)
}

fn is_confirm(key: &KeyEvent, bindings: &KeyBindings) -> bool {
    key.is(Key::Return) || bindings.confirm.matches(key)
}

fn is_escape(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.is(Key::Escape)
}

fn is_toggle_panel(key: &KeyEvent, bindings: &KeyBindings) -> bool {
    bindings.toggle_panel.matches(key)
}

fn is_dismiss(key: &KeyEvent, bindings: &KeyBindings) -> bool {
    bindings.dismiss.matches(key)
}

fn is_picker(key: &KeyEvent, bindings: &KeyBindings) -> bool {
    bindings.picker.matches(key)
}

fn is_return(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.is(Key::Return)
}

fn is_backspace(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.is(Key::Backspace)
}

fn has_sequence(key: &KeyEvent, _: &KeyBindings) -> bool {
    key.sequence.as_ref().is_some_and(|seq| !seq.is_empty())
}

fn any(_: &KeyEvent, _: &KeyBindings) -> bool {
    true
}

fn forward_sequence(key: &KeyEvent) -> Action {
    Action::Forward(key.sequence.clone().unwrap_or_default())
}

fn navigate_up(_: &KeyEvent) -> Action {
    Action::Navigate(Step::Up)
}

fn navigate_down(_: &KeyEvent) -> Action {
    Action::Navigate(Step::Down)
}

fn commit(_: &KeyEvent) -> Action {
    Action::Commit
}

fn cancel(_: &KeyEvent) -> Action {
    Action::Cancel
}

fn swallow(_: &KeyEvent) -> Action {
    Action::Swallow
}

fn dismiss(_: &KeyEvent) -> Action {
    Action::Dismiss
}

fn open_picker(_: &KeyEvent) -> Action {
    Action::OpenPicker
}

fn carriage_return(_: &KeyEvent) -> Action {
    Action::Forward(b"\r".to_vec())
}

fn backspace(_: &KeyEvent) -> Action {
    Action::Forward(vec![0x7f])
}

const PICKER_OPEN: &[Rule] = &[
    Rule { name: "navigate-up", matches: is_up, action: navigate_up },
    Rule { name: "navigate-down", matches: is_down, action: navigate_down },
    Rule { name: "commit", matches: is_confirm, action: commit },
    Rule { name: "cancel", matches: is_escape, action: cancel },
    Rule { name: "swallow", matches: any, action: swallow },
];

const PICKER_CLOSED: &[Rule] = &[
    // The surrounding application shows and hides the panel.
    Rule { name: "toggle-panel", matches: is_toggle_panel, action: swallow },
    Rule { name: "dismiss", matches: is_dismiss, action: dismiss },
    Rule { name: "open-picker", matches: is_picker, action: open_picker },
    Rule { name: "return", matches: is_return, action: carriage_return },
    Rule { name: "backspace", matches: is_backspace, action: backspace },
    Rule { name: "raw-sequence", matches: has_sequence, action: forward_sequence },
];

/// Decide what `key` does given the picker state.
pub fn route(picker_open: bool, key: &KeyEvent, bindings: &KeyBindings) -> Action {
    let rules = if picker_open { PICKER_OPEN } else { PICKER_CLOSED };
    match rules.iter().find(|rule| (rule.matches)(key, bindings)) {
        Some(rule) => {
            log::debug!("key {:?} matched rule {}", key.key, rule.name);
            (rule.action)(key)
        }
        None => Action::Ignore,
    }
}
