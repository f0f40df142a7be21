use super::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn pos(column: i32) -> Position {
    Position::new(Arc::from("t.lt"), 1, column)
}

fn element(tree: &mut LayerTree, layer: NodeId, prev: Option<NodeId>, text: &str) -> NodeId {
    let id = tree.alloc(
        NodeKind::Element {
            text: text.into(),
            kind: TokenKind::Name,
        },
        pos(1),
        layer,
    );
    tree.link_after(layer, prev, id);
    id
}

#[test]
fn chain_follows_links() {
    let mut tree = LayerTree::new(pos(1));
    let root = tree.root();
    let a = element(&mut tree, root, None, "a");
    let b = element(&mut tree, root, Some(a), "b");
    let layer = tree.alloc(
        NodeKind::Layer {
            indent: Indent::Column(4),
            first: None,
        },
        pos(1),
        root,
    );
    tree.link_after(root, Some(b), layer);
    element(&mut tree, layer, None, "c");

    assert_eq!(tree.to_string(), "a b [c]");
    assert_eq!(tree.chain(root).count(), 3);
    assert_eq!(tree.prev(b), Some(a));
    assert_eq!(tree.node(layer).parent, Some(root));
    assert!(tree.is_layer(layer));
}

#[test]
fn unlink_repairs_neighbours() {
    let mut tree = LayerTree::new(pos(1));
    let root = tree.root();
    let a = element(&mut tree, root, None, "a");
    let b = element(&mut tree, root, Some(a), "b");
    let c = element(&mut tree, root, Some(b), "c");

    tree.unlink(b);
    assert_eq!(tree.to_string(), "a c");
    assert_eq!(tree.prev(c), Some(a));

    tree.unlink(a);
    assert_eq!(tree.first_child(root), Some(c));
    assert_eq!(tree.prev(c), None);
}

#[test]
fn width_counts_characters() {
    let mut tree = LayerTree::new(pos(1));
    let root = tree.root();
    let a = element(&mut tree, root, None, "héllo");
    assert_eq!(tree.width(a), 5);
    assert_eq!(tree.width(root), 0);
    assert!(tree.is_text(a, "héllo"));
}
