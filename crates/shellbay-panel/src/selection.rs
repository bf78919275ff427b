//! Picker selection state.

use crate::session::{SessionId, SessionView};

/// Direction of a picker move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// Transition requested by a registry-size change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoPicker {
    Open,
    Close,
}

/// Highlighted picker row plus the edges the panel reacts to.
///
/// The index always satisfies `index < count` for the last observed
/// non-zero count.
#[derive(Debug, Default)]
pub struct Selection {
    index: usize,
    last_count: usize,
    picker_was_open: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Record the current registry size.
    ///
    /// Fires only when the size differs from the previous observation:
    /// going from one session to several opens the picker, landing on
    /// exactly one closes it.
    pub fn observe_count(&mut self, count: usize) -> Option<AutoPicker> {
        let previous = std::mem::replace(&mut self.last_count, count);
        if previous == count {
            return None;
        }
        self.clamp(count);
        match (previous, count) {
            (1, n) if n > 1 => Some(AutoPicker::Open),
            (_, 1) => Some(AutoPicker::Close),
            _ => None,
        }
    }

    /// Track the externally owned open flag; on a closed-to-open edge the
    /// index jumps to the active session.
    pub fn observe_picker(
        &mut self,
        open: bool,
        sessions: &[SessionView<'_>],
        active: Option<SessionId>,
    ) {
        if open && !self.picker_was_open {
            self.sync_to_active(sessions, active);
        }
        self.picker_was_open = open;
    }

    /// Point the index at the active session, or the first row if it is
    /// not in the registry.
    pub fn sync_to_active(&mut self, sessions: &[SessionView<'_>], active: Option<SessionId>) {
        self.index = active
            .and_then(|id| sessions.iter().position(|s| s.id == id))
            .unwrap_or(0);
    }

    /// Mark the picker as opened by the panel itself.
    pub fn opened(&mut self, sessions: &[SessionView<'_>], active: Option<SessionId>) {
        self.sync_to_active(sessions, active);
        self.picker_was_open = true;
    }

    pub fn closed(&mut self) {
        self.picker_was_open = false;
    }

    /// Move the index, wrapping at both ends. No-op when `count` is zero.
    pub fn step(&mut self, step: Step, count: usize) {
        if count == 0 {
            return;
        }
        let index = self.index.min(count - 1);
        self.index = match step {
            Step::Up => (index + count - 1) % count,
            Step::Down => (index + 1) % count,
        };
    }

    /// The session under the index.
    pub fn selected(&self, sessions: &[SessionView<'_>]) -> Option<SessionId> {
        sessions.get(self.index).map(|s| s.id)
    }

    fn clamp(&mut self, count: usize) {
        self.index = self.index.min(count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::running;

    #[test]
    fn wraparound_is_modulo() {
        for count in [1usize, 2, 5] {
            let mut selection = Selection::new();
            for _ in 0..count {
                selection.step(Step::Down, count);
                assert!(selection.index() < count);
            }
            assert_eq!(selection.index(), 0, "count {count}: full cycle down");

            selection.step(Step::Up, count);
            assert_eq!(selection.index(), count - 1, "count {count}: up from 0");

            selection.step(Step::Down, count);
            assert_eq!(selection.index(), 0, "count {count}: down from last");
        }
    }

    #[test]
    fn step_with_no_sessions_is_noop() {
        let mut selection = Selection::new();
        selection.step(Step::Down, 0);
        selection.step(Step::Up, 0);
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn size_edges_open_and_close() {
        let mut selection = Selection::new();
        assert_eq!(selection.observe_count(1), Some(AutoPicker::Close));
        assert_eq!(selection.observe_count(2), Some(AutoPicker::Open));
        assert_eq!(selection.observe_count(3), None);
        assert_eq!(selection.observe_count(1), Some(AutoPicker::Close));
    }

    #[test]
    fn unchanged_size_does_not_fire() {
        let mut selection = Selection::new();
        selection.observe_count(1);
        assert_eq!(selection.observe_count(2), Some(AutoPicker::Open));
        assert_eq!(selection.observe_count(2), None);
        assert_eq!(selection.observe_count(2), None);
    }

    #[test]
    fn growing_from_zero_does_not_open() {
        let mut selection = Selection::new();
        assert_eq!(selection.observe_count(3), None);
    }

    #[test]
    fn shrinking_clamps_index() {
        let sessions = running(&[1, 2, 3, 4]);
        let mut selection = Selection::new();
        selection.observe_count(4);
        selection.sync_to_active(&sessions, Some(4));
        assert_eq!(selection.index(), 3);

        selection.observe_count(2);
        assert_eq!(selection.index(), 1);

        selection.observe_count(0);
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn opening_syncs_to_active() {
        let sessions = running(&[7, 8, 9]);
        let mut selection = Selection::new();

        selection.observe_picker(true, &sessions, Some(9));
        assert_eq!(selection.index(), 2);

        // Still open: no re-sync after navigation.
        selection.step(Step::Down, 3);
        selection.observe_picker(true, &sessions, Some(9));
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn opening_with_unknown_active_falls_back_to_first() {
        let sessions = running(&[7, 8]);
        let mut selection = Selection::new();
        selection.step(Step::Down, 2);

        selection.observe_picker(true, &sessions, Some(42));
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn selected_reads_registry_order() {
        let sessions = running(&[5, 6]);
        let mut selection = Selection::new();
        selection.step(Step::Down, 2);
        assert_eq!(selection.selected(&sessions), Some(6));
        assert_eq!(selection.selected(&[]), None);
    }
}
