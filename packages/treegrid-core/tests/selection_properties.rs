use proptest::prelude::*;
use treegrid_core::{
    EventOrigin, SelectionChange, SelectionController, TreeEvent, TreeNode, TreeSnapshot,
    ROOT_PARENT,
};

const NODES: [&str; 4] = ["r", "a", "b", "c"];

fn snapshot() -> TreeSnapshot {
    let mut nodes = vec![TreeNode::new("r", "Root", ROOT_PARENT)];
    for id in &NODES[1..] {
        nodes.push(TreeNode::new(*id, *id, "r"));
    }
    TreeSnapshot::from_nodes(nodes)
}

fn arb_event() -> impl Strategy<Value = TreeEvent> {
    let node = prop::sample::select(NODES.to_vec());
    let origin = prop_oneof![Just(EventOrigin::User), Just(EventOrigin::Programmatic)];
    (node, origin, prop::bool::ANY, prop::bool::ANY).prop_map(|(id, origin, select, ghost)| {
        let id = if ghost { "ghost".to_string() } else { id.to_string() };
        if select {
            TreeEvent::NodeSelected { id, origin }
        } else {
            TreeEvent::NodeDeselected { id, origin }
        }
    })
}

proptest! {
    /// Single-select invariant: whatever the event sequence, at most one node is
    /// selected, it is always a node of the snapshot, and the selection equals
    /// what a straightforward model of "last accepted user event" predicts.
    #[test]
    fn selection_matches_single_select_model(events in prop::collection::vec(arb_event(), 0..40)) {
        let snap = snapshot();
        let mut controller = SelectionController::new();
        controller.begin_render();
        controller.widget_ready();

        let mut model: Option<String> = None;
        for event in &events {
            let change = controller.on_event(event, &snap);
            match event {
                TreeEvent::NodeSelected { id, origin: EventOrigin::User } if snap.contains(id) => {
                    prop_assert_eq!(&change, &SelectionChange::Selected(id.clone()));
                    model = Some(id.clone());
                }
                TreeEvent::NodeDeselected { origin: EventOrigin::User, .. } => {
                    prop_assert_eq!(&change, &SelectionChange::Deselected);
                    model = None;
                }
                _ => prop_assert_eq!(&change, &SelectionChange::Ignored),
            }
            prop_assert_eq!(controller.selected(), model.as_deref());
            if let Some(id) = controller.selected() {
                prop_assert!(snap.contains(id));
            }
        }
    }

    /// Events fed to a controller that never reached `Ready` change nothing.
    #[test]
    fn idle_controller_ignores_everything(events in prop::collection::vec(arb_event(), 0..20)) {
        let snap = snapshot();
        let mut controller = SelectionController::new();
        for event in &events {
            prop_assert_eq!(controller.on_event(event, &snap), SelectionChange::Ignored);
        }
        prop_assert_eq!(controller.selected(), None);
    }
}
