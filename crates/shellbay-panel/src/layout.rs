//! Tab strip layout.
//!
//! Fits as many session labels as the header width allows, in registry
//! order, and reports overflow when the rest have to be reached through the
//! picker.

use unicode_width::UnicodeWidthStr;

use crate::session::{SessionId, SessionView};

/// Width set aside for the "(PID: …) (Focused)" suffix.
///
/// An estimate: a pid longer than seven digits makes the real suffix wider.
pub const PID_FOCUS_ESTIMATE: usize = 24;

/// Left border plus padding and padding plus right border.
pub const BORDER_PADDING: usize = 4;

/// Appended to an exited session's label.
pub const EXITED_SUFFIX: &str = "(Exited)";

/// Fixed costs subtracted from the header width before labels are placed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabChrome {
    pub border_padding: usize,
    /// Display width of the right-aligned status hint.
    pub hint_width: usize,
    pub pid_focus_estimate: usize,
    /// Shown after the last label when sessions did not fit.
    pub overflow_marker: String,
}

impl TabChrome {
    pub fn new(hint: &str, picker_key: &str) -> Self {
        Self {
            border_padding: BORDER_PADDING,
            hint_width: hint.width(),
            pid_focus_estimate: PID_FOCUS_ESTIMATE,
            overflow_marker: format!(" ... ({picker_key}) "),
        }
    }

    /// Width left for labels out of a header `width` cells wide.
    pub fn label_budget(&self, width: u16) -> usize {
        usize::from(width)
            .saturating_sub(self.border_padding)
            .saturating_sub(self.hint_width)
            .saturating_sub(self.pid_focus_estimate)
    }
}

/// Visual state of a tab; styling is derived from these two facts only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabStyle {
    pub active: bool,
    pub exited: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: SessionId,
    pub text: String,
    pub style: TabStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabStrip {
    pub tabs: Vec<Tab>,
    /// The overflow marker, present iff some sessions have no tab.
    pub overflow: Option<String>,
}

impl TabStrip {
    pub fn overflowed(&self) -> bool {
        self.overflow.is_some()
    }
}

/// First whitespace-delimited token of a command line.
fn program_name(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or("")
}

/// Label text for the session at zero-based `index`.
pub fn tab_label(index: usize, session: &SessionView<'_>) -> String {
    let name = program_name(session.command);
    if session.status.is_exited() {
        format!(" {}: {name} {EXITED_SUFFIX} ", index + 1)
    } else {
        format!(" {}: {name} ", index + 1)
    }
}

/// Lay out tabs for `sessions` in a header `width` cells wide.
///
/// The result depends only on the arguments.
pub fn layout_tabs(
    sessions: &[SessionView<'_>],
    active: Option<SessionId>,
    width: u16,
    chrome: &TabChrome,
) -> TabStrip {
    let mut remaining = chrome.label_budget(width);
    let mut tabs = Vec::with_capacity(sessions.len());

    for (index, session) in sessions.iter().enumerate() {
        let text = tab_label(index, session);
        let cost = text.width();
        if cost > remaining {
            return TabStrip {
                tabs,
                overflow: Some(chrome.overflow_marker.clone()),
            };
        }
        remaining -= cost;
        tabs.push(Tab {
            id: session.id,
            text,
            style: TabStyle {
                active: Some(session.id) == active,
                exited: session.status.is_exited(),
            },
        });
    }

    TabStrip {
        tabs,
        overflow: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;
    use crate::testing::view;

    fn chrome() -> TabChrome {
        TabChrome::new("Ctrl+O list · Ctrl+K dismiss", "Ctrl+O")
    }

    #[test]
    fn single_running_session_fits() {
        let sessions = [view(1, "npm run build", SessionStatus::Running)];
        let strip = layout_tabs(&sessions, Some(1), 80, &chrome());

        assert_eq!(strip.tabs.len(), 1);
        assert_eq!(strip.tabs[0].text, " 1: npm ");
        assert_eq!(
            strip.tabs[0].style,
            TabStyle {
                active: true,
                exited: false
            }
        );
        assert!(!strip.overflowed());
    }

    #[test]
    fn exited_session_carries_suffix() {
        let sessions = [
            view(10, "cargo test --all", SessionStatus::Running),
            view(11, "make", SessionStatus::Exited { code: 2 }),
        ];
        let strip = layout_tabs(&sessions, Some(10), 200, &chrome());

        assert_eq!(strip.tabs[1].text, " 2: make (Exited) ");
        assert!(strip.tabs[1].style.exited);
        assert!(!strip.tabs[1].style.active);
    }

    #[test]
    fn empty_command_yields_empty_name() {
        assert_eq!(tab_label(0, &view(1, "   ", SessionStatus::Running)), " 1:  ");
    }

    #[test]
    fn exact_fit_emits_n_tabs_and_overflows_when_more_remain() {
        let c = chrome();
        let sessions: Vec<_> = (1..=5)
            .map(|id| view(id, "job", SessionStatus::Running))
            .collect();
        // Every label is " n: job " (8 cells); make room for exactly three.
        let fixed = c.border_padding + c.hint_width + c.pid_focus_estimate;
        let width = (fixed + 3 * 8) as u16;

        let strip = layout_tabs(&sessions, Some(1), width, &c);
        assert_eq!(strip.tabs.len(), 3);
        assert!(strip.overflowed());
        assert_eq!(strip.overflow.as_deref(), Some(" ... (Ctrl+O) "));

        let strip = layout_tabs(&sessions[..3], Some(1), width, &c);
        assert_eq!(strip.tabs.len(), 3);
        assert!(!strip.overflowed());

        let strip = layout_tabs(&sessions, Some(1), width - 1, &c);
        assert_eq!(strip.tabs.len(), 2);
        assert!(strip.overflowed());
    }

    #[test]
    fn wide_enough_keeps_registry_order() {
        let sessions = [
            view(30, "c", SessionStatus::Running),
            view(10, "a", SessionStatus::Running),
            view(20, "b", SessionStatus::Running),
        ];
        let strip = layout_tabs(&sessions, Some(20), 300, &chrome());

        let ids: Vec<_> = strip.tabs.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert!(!strip.overflowed());
        assert!(strip.tabs[2].style.active);
    }

    #[test]
    fn narrow_viewport_overflows_immediately() {
        let sessions = [view(1, "npm", SessionStatus::Running)];
        let strip = layout_tabs(&sessions, Some(1), 10, &chrome());
        assert!(strip.tabs.is_empty());
        assert!(strip.overflowed());
    }

    #[test]
    fn no_sessions_no_tabs() {
        let strip = layout_tabs(&[], None, 80, &chrome());
        assert!(strip.tabs.is_empty());
        assert!(!strip.overflowed());
    }

    #[test]
    fn layout_is_deterministic() {
        let sessions = [
            view(1, "npm run dev", SessionStatus::Running),
            view(2, "tail -f log", SessionStatus::Exited { code: 0 }),
        ];
        let c = chrome();
        assert_eq!(
            layout_tabs(&sessions, Some(2), 70, &c),
            layout_tabs(&sessions, Some(2), 70, &c)
        );
    }
}
