use super::{Arena, NodeId};

/// Sets the upward link of every parent tracking node below (and including)
/// `root`. Nodes which don't track a parent are skipped over: their children
/// link to the closest tracking ancestor instead.
///
/// Must only be called on a fully built subtree.
pub fn patch_parents(arena: &mut Arena, root: NodeId, parent: Option<NodeId>) {
    let mut stack = vec![(root, parent)];

    while let Some((node, parent)) = stack.pop() {
        let inherited = if arena.node(node).kind.has_parent() {
            arena.node_mut(node).parent = parent;
            Some(node)
        } else {
            parent
        };

        for child in arena.children(node).into_iter().rev() {
            stack.push((child, inherited));
        }
    }
}
