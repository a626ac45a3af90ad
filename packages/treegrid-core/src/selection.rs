use tokio::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::node::TreeSnapshot;
use crate::render::{EventOrigin, TreeEvent};

/// Where the controller sits between render request and live widget.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControllerState {
    Idle,
    AwaitingWidgetReady,
    Ready,
}

/// Outcome of feeding one collaborator event through the controller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionChange {
    /// The node is now the single selection. Re-selecting the current node also
    /// reports this so the follow-up navigation re-fires, matching user intent.
    Selected(String),
    Deselected,
    Ignored,
}

/// Single-select bookkeeping over the assembled tree. Selecting a node implicitly
/// deselects the previous one; programmatic echoes from the collaborator never
/// reach the selection state.
#[derive(Debug)]
pub struct SelectionController {
    state: ControllerState,
    selected: Option<String>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: ControllerState::Idle,
            selected: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// A render was requested but the collaborator may still be loading.
    pub fn begin_render(&mut self) {
        self.state = ControllerState::AwaitingWidgetReady;
    }

    /// Snapshot handed over; user events are accepted from here on. Selection is
    /// reset because the snapshot was rebuilt.
    pub fn widget_ready(&mut self) {
        self.state = ControllerState::Ready;
        self.selected = None;
    }

    pub fn reset(&mut self) {
        self.state = ControllerState::Idle;
        self.selected = None;
    }

    pub fn on_event(&mut self, event: &TreeEvent, snapshot: &TreeSnapshot) -> SelectionChange {
        if self.state() != ControllerState::Ready {
            trace!(state = ?self.state(), "dropping event before widget is ready");
            return SelectionChange::Ignored;
        }

        match event {
            TreeEvent::NodeSelected { origin, .. } | TreeEvent::NodeDeselected { origin, .. }
                if *origin == EventOrigin::Programmatic =>
            {
                // Echo of our own apply_selection; reacting would loop.
                trace!("ignoring programmatic selection echo");
                SelectionChange::Ignored
            }
            TreeEvent::NodeSelected { id, .. } => {
                if !snapshot.contains(id) {
                    warn!(%id, "selection event for a node outside the snapshot");
                    return SelectionChange::Ignored;
                }
                self.selected = Some(id.clone());
                debug!(%id, "node selected");
                SelectionChange::Selected(id.clone())
            }
            TreeEvent::NodeDeselected { id, .. } => {
                debug!(%id, "selection cleared");
                self.selected = None;
                SelectionChange::Deselected
            }
            TreeEvent::StateChanged { .. } => SelectionChange::Ignored,
        }
    }
}

/// Coalesces a burst of widget change events into one follow-up action. The
/// underlying widget fires several internal events per logical click; only the
/// last armed target within the settle window navigates.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<PendingAction>,
}

#[derive(Debug)]
struct PendingAction {
    /// `Some(id)` navigates to the record, `None` is a follow-up with no navigation
    /// (a deselection still coalesces the burst).
    target: Option<String>,
    deadline: Instant,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// (Re)start the settle window with a new follow-up target.
    pub fn arm(&mut self, target: Option<String>) {
        self.pending = Some(PendingAction {
            target,
            deadline: Instant::now() + self.delay,
        });
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending target if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<Option<String>> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take().map(|p| p.target)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{TreeNode, TreeSnapshot, ROOT_PARENT};

    fn snapshot() -> TreeSnapshot {
        let mut snap = TreeSnapshot::default();
        snap.push(TreeNode::new("r", "Root", ROOT_PARENT));
        snap.push(TreeNode::new("a", "A", "r"));
        snap.push(TreeNode::new("b", "B", "r"));
        snap
    }

    fn ready_controller() -> SelectionController {
        let mut controller = SelectionController::new();
        controller.begin_render();
        controller.widget_ready();
        controller
    }

    fn select(id: &str) -> TreeEvent {
        TreeEvent::NodeSelected {
            id: id.into(),
            origin: EventOrigin::User,
        }
    }

    #[test]
    fn selecting_b_after_a_leaves_only_b() {
        let snap = snapshot();
        let mut controller = ready_controller();

        assert_eq!(
            controller.on_event(&select("a"), &snap),
            SelectionChange::Selected("a".into())
        );
        assert_eq!(
            controller.on_event(&select("b"), &snap),
            SelectionChange::Selected("b".into())
        );
        assert_eq!(controller.selected(), Some("b"));
    }

    #[test]
    fn deselect_returns_selection_to_empty() {
        let snap = snapshot();
        let mut controller = ready_controller();

        controller.on_event(&select("a"), &snap);
        let change = controller.on_event(
            &TreeEvent::NodeDeselected {
                id: "a".into(),
                origin: EventOrigin::User,
            },
            &snap,
        );
        assert_eq!(change, SelectionChange::Deselected);
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn programmatic_echoes_are_ignored() {
        let snap = snapshot();
        let mut controller = ready_controller();

        let echo = TreeEvent::NodeSelected {
            id: "a".into(),
            origin: EventOrigin::Programmatic,
        };
        assert_eq!(controller.on_event(&echo, &snap), SelectionChange::Ignored);
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn events_before_ready_are_dropped() {
        let snap = snapshot();
        let mut controller = SelectionController::new();
        assert_eq!(
            controller.on_event(&select("a"), &snap),
            SelectionChange::Ignored
        );

        controller.begin_render();
        assert_eq!(controller.state(), ControllerState::AwaitingWidgetReady);
        assert_eq!(
            controller.on_event(&select("a"), &snap),
            SelectionChange::Ignored
        );
    }

    #[test]
    fn reselecting_current_node_is_accepted_without_state_change() {
        let snap = snapshot();
        let mut controller = ready_controller();

        controller.on_event(&select("a"), &snap);
        assert_eq!(
            controller.on_event(&select("a"), &snap),
            SelectionChange::Selected("a".into())
        );
        assert_eq!(controller.selected(), Some("a"));
    }

    #[test]
    fn unknown_node_selection_is_ignored() {
        let snap = snapshot();
        let mut controller = ready_controller();
        assert_eq!(
            controller.on_event(&select("ghost"), &snap),
            SelectionChange::Ignored
        );
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_keeps_only_last_target_in_window() {
        let mut debounce = Debouncer::new(Duration::from_millis(50));
        debounce.arm(Some("a".into()));
        debounce.arm(Some("b".into()));

        assert!(debounce.take_due(Instant::now()).is_none());
        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(debounce.take_due(Instant::now()), Some(Some("b".into())));
        assert!(!debounce.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_follow_up() {
        let mut debounce = Debouncer::new(Duration::from_millis(50));
        debounce.arm(Some("a".into()));
        debounce.cancel();
        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(debounce.take_due(Instant::now()).is_none());
    }
}
