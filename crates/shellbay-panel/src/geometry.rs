//! Pty geometry derived from the panel viewport.

use crate::session::{PanelProps, PtyControl, SessionId, Viewport};

/// Columns taken by the borders and the body's side padding.
pub const HORIZONTAL_CHROME: u16 = 4;

/// Rows taken by the borders and the tab header.
pub const VERTICAL_CHROME: u16 = 3;

/// Pty columns and rows for a viewport; never below one.
pub fn pty_size(viewport: Viewport) -> (u16, u16) {
    let cols = viewport.width.saturating_sub(HORIZONTAL_CHROME).max(1);
    let rows = viewport.height.saturating_sub(VERTICAL_CHROME).max(1);
    (cols, rows)
}

/// Resize the active session's pty to fit the viewport.
///
/// Does nothing when the active id is not in the registry. Repeated calls
/// with identical inputs each issue a resize.
pub fn sync_geometry(props: &PanelProps<'_>, pty: &mut impl PtyControl) -> bool {
    let Some(session) = props.active_session() else {
        return false;
    };
    let (cols, rows) = pty_size(props.viewport);
    log::debug!("resizing session {} to {cols}x{rows}", session.id);
    pty.resize(session.id, cols, rows);
    true
}

#[derive(Debug, PartialEq, Eq)]
struct Observed {
    active: Option<SessionId>,
    viewport: Viewport,
    members: Vec<SessionId>,
}

/// Re-syncs geometry whenever the active id, viewport size or registry
/// membership changes.
#[derive(Debug, Default)]
pub struct GeometryWatch {
    last: Option<Observed>,
}

impl GeometryWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a resize was issued.
    pub fn observe(&mut self, props: &PanelProps<'_>, pty: &mut impl PtyControl) -> bool {
        let observed = Observed {
            active: props.active,
            viewport: props.viewport,
            members: props.sessions.iter().map(|s| s.id).collect(),
        };
        if self.last.as_ref() == Some(&observed) {
            return false;
        }
        self.last = Some(observed);
        sync_geometry(props, pty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{props, running, Call, RecordingHost};

    #[test]
    fn size_subtracts_chrome() {
        assert_eq!(pty_size(Viewport::new(80, 24)), (76, 21));
    }

    #[test]
    fn size_never_below_one() {
        assert_eq!(pty_size(Viewport::new(0, 0)), (1, 1));
        assert_eq!(pty_size(Viewport::new(4, 3)), (1, 1));
    }

    #[test]
    fn sync_resizes_active_only() {
        let sessions = running(&[1, 2]);
        let mut host = RecordingHost::default();

        assert!(sync_geometry(&props(&sessions, Some(2), false), &mut host));
        assert_eq!(host.take(), vec![Call::Resize(2, 76, 21)]);
    }

    #[test]
    fn sync_skips_missing_active() {
        let sessions = running(&[1]);
        let mut host = RecordingHost::default();

        assert!(!sync_geometry(&props(&sessions, Some(9), false), &mut host));
        assert!(!sync_geometry(&props(&[], None, false), &mut host));
        assert!(host.calls.is_empty());
    }

    #[test]
    fn repeated_sync_is_not_deduplicated() {
        let sessions = running(&[1]);
        let p = props(&sessions, Some(1), false);
        let mut host = RecordingHost::default();

        sync_geometry(&p, &mut host);
        sync_geometry(&p, &mut host);
        assert_eq!(
            host.take(),
            vec![Call::Resize(1, 76, 21), Call::Resize(1, 76, 21)]
        );
    }

    #[test]
    fn watch_fires_on_change_only() {
        let sessions = running(&[1, 2]);
        let mut watch = GeometryWatch::new();
        let mut host = RecordingHost::default();

        let mut p = props(&sessions, Some(1), false);
        assert!(watch.observe(&p, &mut host));
        assert!(!watch.observe(&p, &mut host));

        p.viewport = Viewport::new(100, 30);
        assert!(watch.observe(&p, &mut host));

        p.active = Some(2);
        assert!(watch.observe(&p, &mut host));

        assert_eq!(
            host.take(),
            vec![
                Call::Resize(1, 76, 21),
                Call::Resize(1, 96, 27),
                Call::Resize(2, 96, 27),
            ]
        );
    }

    #[test]
    fn watch_fires_on_membership_change() {
        let two = running(&[1, 2]);
        let one = running(&[1]);
        let mut watch = GeometryWatch::new();
        let mut host = RecordingHost::default();

        watch.observe(&props(&two, Some(1), false), &mut host);
        host.take();

        assert!(watch.observe(&props(&one, Some(1), false), &mut host));
        assert_eq!(host.take(), vec![Call::Resize(1, 76, 21)]);
    }
}
