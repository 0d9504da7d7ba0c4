use promptmap_core::graph::{validate, Adjacency, BlockData, BlockPatch, EditorSession};
use promptmap_core::markdown::ROOT_ID;
use promptmap_core::NodeType;
use proptest::prelude::*;

const NODE_TYPES: [NodeType; 6] = [
    NodeType::Heading1,
    NodeType::Heading2,
    NodeType::Heading3,
    NodeType::Heading4,
    NodeType::ListItem,
    NodeType::Paragraph,
];

/// Apply one editing operation to the node picked by `target`
fn apply(session: &mut EditorSession, op: u8, target: usize, text: &str) {
    let ids: Vec<String> = session.nodes().iter().map(|n| n.id.clone()).collect();
    let id = &ids[target % ids.len()];
    let node_type = NODE_TYPES[target % NODE_TYPES.len()];

    match op % 8 {
        0 => {
            session.add_child(id, BlockData::new(text, node_type));
        }
        1 => {
            session.add_sibling(id, BlockData::new(text, node_type));
        }
        2 => session.delete_node(id),
        3 => session.toggle_collapse(id),
        4 => session.set_node_type(id, node_type),
        5 => session.update_node(id, BlockPatch::content(text)),
        6 => {
            session.delete_if_empty(id);
        }
        _ => session.select(Some(id.as_str())),
    }
}

fn edits() -> impl Strategy<Value = Vec<(u8, usize, String)>> {
    proptest::collection::vec((0..8u8, 0..64usize, "[a-z]{0,6}"), 0..40)
}

proptest! {
    #[test]
    fn prop_edits_keep_single_rooted_tree(ops in edits()) {
        let mut session = EditorSession::seeded();

        for (op, target, text) in ops {
            apply(&mut session, op, target, &text);

            // Invariant: every step leaves one tree rooted at the fixed root
            prop_assert_eq!(validate(session.nodes(), session.edges()), Ok(ROOT_ID.to_string()));
            prop_assert!(session.node(ROOT_ID).is_some());
            prop_assert!(session.visible().nodes.len() <= session.nodes().len());
            if let Some(selected) = session.selected() {
                prop_assert!(session.node(selected).is_some());
            }
        }
    }

    #[test]
    fn prop_delete_removes_exactly_subtree(ops in edits(), victim in 0..64usize) {
        let mut session = EditorSession::seeded();
        for (op, target, text) in ops {
            apply(&mut session, op, target, &text);
        }

        let ids: Vec<String> = session.nodes().iter().map(|n| n.id.clone()).collect();
        let id = ids[victim % ids.len()].clone();
        let before = session.nodes().len();
        let subtree = if id == ROOT_ID {
            0
        } else {
            Adjacency::new(session.edges()).descendants(&id).len() + 1
        };

        session.delete_node(&id);

        prop_assert_eq!(session.nodes().len(), before - subtree);
        prop_assert_eq!(session.edges().len(), session.nodes().len() - 1);
    }
}
