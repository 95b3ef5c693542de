use crate::config::LayoutConfig;
use crate::ir::{NodeId, Tree};

/// First layout pass, in abstract separation units: leaves are placed on a
/// cursor advanced by the text-aware separation, parents are centered over
/// their first and last child. Residual collisions between interior nodes
/// are left to the overlap pass.
pub(super) fn layout_units(tree: &Tree, config: &LayoutConfig) -> Vec<f32> {
    let mut xs = vec![0.0f32; tree.len()];
    let mut cursor = 0.0f32;
    let mut prev_leaf: Option<NodeId> = None;
    for id in postorder(tree) {
        let node = tree.node(id);
        if node.children.is_empty() {
            if let Some(prev) = prev_leaf {
                cursor += separation(tree, prev, id, config);
            }
            xs[id] = cursor;
            prev_leaf = Some(id);
        } else {
            let first = xs[node.children[0]];
            let last = xs[node.children[node.children.len() - 1]];
            xs[id] = (first + last) / 2.0;
        }
    }
    xs
}

/// Extra room for pairs of long labels: siblings sit closer than cousins,
/// and every character past the shared 30-char budget widens the gap.
fn separation(tree: &Tree, a: NodeId, b: NodeId, config: &LayoutConfig) -> f32 {
    let base = if tree.node(a).parent == tree.node(b).parent {
        config.sibling_separation
    } else {
        config.cousin_separation
    };
    let chars = tree.node(a).text.chars().count() + tree.node(b).text.chars().count();
    let surplus = chars as f32 - config.text_separation_threshold;
    base + (surplus / config.text_separation_divisor).max(0.0)
}

/// Left-to-right postorder without recursion: a preorder walk that visits
/// right subtrees first, reversed.
fn postorder(tree: &Tree) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        order.push(id);
        for &child in &tree.node(id).children {
            stack.push(child);
        }
    }
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tree;

    fn tree_with(texts: &[(&str, &str, Option<&str>)]) -> Tree {
        let entries: Vec<String> = texts
            .iter()
            .map(|(id, text, parent)| match parent {
                Some(parent) => format!(
                    r#"{{"id": "{id}", "text": "{text}", "parentId": "{parent}"}}"#
                ),
                None => format!(r#"{{"id": "{id}", "text": "{text}"}}"#),
            })
            .collect();
        parse_tree(&format!("[{}]", entries.join(","))).unwrap()
    }

    #[test]
    fn parent_is_centered_over_children() {
        let tree = tree_with(&[
            ("r", "root", None),
            ("a", "a", Some("r")),
            ("b", "b", Some("r")),
            ("c", "c", Some("r")),
        ]);
        let xs = layout_units(&tree, &LayoutConfig::default());
        let r = tree.lookup("r").unwrap();
        let a = tree.lookup("a").unwrap();
        let c = tree.lookup("c").unwrap();
        assert!((xs[r] - (xs[a] + xs[c]) / 2.0).abs() < 1e-4);
        assert!(xs[a] < xs[c]);
    }

    #[test]
    fn long_labels_widen_the_gap() {
        let short = tree_with(&[
            ("r", "root", None),
            ("a", "x", Some("r")),
            ("b", "y", Some("r")),
        ]);
        let long_text = "a".repeat(60);
        let long = tree_with(&[
            ("r", "root", None),
            ("a", long_text.as_str(), Some("r")),
            ("b", long_text.as_str(), Some("r")),
        ]);
        let config = LayoutConfig::default();
        let short_xs = layout_units(&short, &config);
        let long_xs = layout_units(&long, &config);
        let short_gap = short_xs[short.lookup("b").unwrap()] - short_xs[short.lookup("a").unwrap()];
        let long_gap = long_xs[long.lookup("b").unwrap()] - long_xs[long.lookup("a").unwrap()];
        assert!(long_gap > short_gap);
        // 60 + 60 chars: 90 over the threshold -> 0.9 extra units
        assert!((long_gap - (short_gap + 0.9)).abs() < 1e-4);
    }
}
