//! Node collection along each XPath axis.
//!
//! Forward axes are produced in document order, reverse axes nearest-first,
//! which is the order predicate positions count in.

use crate::ast::Axis;
use crate::datasource::{DataSourceNode, NodeType};

pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N, out: &mut Vec<N>) {
    match axis {
        Axis::Child => out.extend(node.children()),
        Axis::Attribute => out.extend(node.attributes()),
        Axis::SelfAxis => out.push(node),
        Axis::Descendant => collect_descendants(node, out),
        Axis::DescendantOrSelf => {
            out.push(node);
            collect_descendants(node, out);
        }
        Axis::Parent => out.extend(node.parent()),
        Axis::Ancestor => collect_ancestors(node, out),
        Axis::AncestorOrSelf => {
            out.push(node);
            collect_ancestors(node, out);
        }
        Axis::FollowingSibling => collect_following_siblings(node, out),
        Axis::PrecedingSibling => collect_preceding_siblings(node, out),
        Axis::Following => collect_following(node, out),
        Axis::Preceding => collect_preceding(node, out),
    }
}

fn collect_descendants<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    for child in node.children() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn collect_ancestors<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut current = node.parent();
    while let Some(p) = current {
        out.push(p);
        current = p.parent();
    }
}

/// Attributes have no siblings.
fn siblings<'a, N: DataSourceNode<'a>>(node: N) -> Option<Vec<N>> {
    if node.node_type() == NodeType::Attribute {
        return None;
    }
    node.parent().map(|p| p.children().collect())
}

fn collect_following_siblings<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    if let Some(siblings) = siblings(node) {
        out.extend(siblings.into_iter().skip_while(|s| *s != node).skip(1));
    }
}

fn collect_preceding_siblings<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    if let Some(siblings) = siblings(node) {
        let before: Vec<N> = siblings.into_iter().take_while(|s| *s != node).collect();
        out.extend(before.into_iter().rev());
    }
}

fn collect_following<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    // For an attribute, "following" starts after its owner element's start tag,
    // so the owner's descendants are included.
    let mut current = node;
    if node.node_type() == NodeType::Attribute
        && let Some(owner) = node.parent()
    {
        collect_descendants(owner, out);
        current = owner;
    }
    loop {
        let mut following = Vec::new();
        collect_following_siblings(current, &mut following);
        for sibling in following {
            out.push(sibling);
            collect_descendants(sibling, out);
        }
        match current.parent() {
            Some(p) => current = p,
            None => break,
        }
    }
}

fn collect_preceding<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut current = match node.node_type() {
        NodeType::Attribute => match node.parent() {
            Some(owner) => owner,
            None => return,
        },
        _ => node,
    };
    loop {
        let mut preceding = Vec::new();
        collect_preceding_siblings(current, &mut preceding);
        for sibling in preceding {
            // Nearest-first: a sibling's last descendant precedes the sibling itself.
            let mut subtree = Vec::new();
            collect_descendants(sibling, &mut subtree);
            out.extend(subtree.into_iter().rev());
            out.push(sibling);
        }
        match current.parent() {
            Some(p) => current = p,
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::*;

    fn ids<'a>(axis: Axis, node: MockNode<'a>) -> Vec<usize> {
        let mut out = Vec::new();
        collect(axis, node, &mut out);
        out.into_iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_child_and_attribute_axes() {
        let tree = create_test_tree();
        assert_eq!(ids(Axis::Child, tree.node(FEED)), vec![ENTRY_1, COMMENT, ENTRY_2, ENTRY_3]);
        assert_eq!(ids(Axis::Attribute, tree.node(ENTRY_2)), vec![ENTRY_2_ID, ENTRY_2_LANG]);
        assert!(ids(Axis::Child, tree.node(ENTRY_2_ID)).is_empty());
    }

    #[test]
    fn test_descendant_axis_is_document_order() {
        let tree = create_test_tree();
        assert_eq!(
            ids(Axis::Descendant, tree.node(ENTRY_1)),
            vec![NAME_1, NAME_1_TEXT, EMAIL_1, EMAIL_1_TEXT]
        );
        assert_eq!(
            ids(Axis::DescendantOrSelf, tree.node(NAME_2)),
            vec![NAME_2, NAME_2_TEXT]
        );
    }

    #[test]
    fn test_ancestor_axes_are_nearest_first() {
        let tree = create_test_tree();
        assert_eq!(ids(Axis::Ancestor, tree.node(NAME_1_TEXT)), vec![NAME_1, ENTRY_1, FEED, ROOT]);
        assert_eq!(ids(Axis::AncestorOrSelf, tree.node(ENTRY_3_ID)), vec![ENTRY_3_ID, ENTRY_3, FEED, ROOT]);
        assert_eq!(ids(Axis::Parent, tree.node(ENTRY_1_ID)), vec![ENTRY_1]);
    }

    #[test]
    fn test_sibling_axes() {
        let tree = create_test_tree();
        assert_eq!(ids(Axis::FollowingSibling, tree.node(COMMENT)), vec![ENTRY_2, ENTRY_3]);
        assert_eq!(ids(Axis::PrecedingSibling, tree.node(ENTRY_3)), vec![ENTRY_2, COMMENT, ENTRY_1]);
        assert!(ids(Axis::FollowingSibling, tree.node(ENTRY_2_ID)).is_empty());
    }

    #[test]
    fn test_following_and_preceding() {
        let tree = create_test_tree();
        assert_eq!(
            ids(Axis::Following, tree.node(EMAIL_1)),
            vec![COMMENT, ENTRY_2, NAME_2, NAME_2_TEXT, ENTRY_3]
        );
        assert_eq!(
            ids(Axis::Preceding, tree.node(ENTRY_2)),
            vec![COMMENT, EMAIL_1_TEXT, EMAIL_1, NAME_1_TEXT, NAME_1, ENTRY_1]
        );
        assert_eq!(
            ids(Axis::Following, tree.node(ENTRY_2_ID)),
            vec![NAME_2, NAME_2_TEXT, ENTRY_3]
        );
    }
}
