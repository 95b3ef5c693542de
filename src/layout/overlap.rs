use crate::ir::{NodeId, Tree};

/// Post-layout sweep enforcing a minimum horizontal distance between
/// same-depth neighbors. Levels are processed top-down; within a level a
/// single left-to-right pass shifts every too-close node right by the
/// deficit and rigidly translates its whole subtree with it, so subtree
/// shape is preserved. Running the sweep on its own output is a no-op.
pub(super) fn resolve_overlaps(tree: &Tree, xs: &mut [f32], min_distance: f32) {
    let mut levels: Vec<Vec<NodeId>> = vec![Vec::new(); tree.max_depth() + 1];
    for (id, node) in tree.iter() {
        levels[node.depth].push(id);
    }
    for level in &mut levels {
        if level.len() < 2 {
            continue;
        }
        level.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
        for i in 1..level.len() {
            let gap = xs[level[i]] - xs[level[i - 1]];
            if gap < min_distance {
                shift_subtree(tree, xs, level[i], min_distance - gap);
            }
        }
    }
}

fn shift_subtree(tree: &Tree, xs: &mut [f32], root: NodeId, shift: f32) {
    xs[root] += shift;
    let mut stack = tree.node(root).children.clone();
    while let Some(id) = stack.pop() {
        xs[id] += shift;
        stack.extend_from_slice(&tree.node(id).children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tree;

    fn crowded_tree() -> Tree {
        parse_tree(
            r#"{
                "id": "r", "text": "r",
                "children": [
                    {"id": "a", "text": "a", "children": [
                        {"id": "a1", "text": "a1", "children": []},
                        {"id": "a2", "text": "a2", "children": []}
                    ]},
                    {"id": "b", "text": "b", "children": [
                        {"id": "b1", "text": "b1", "children": []}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn assert_min_spacing(tree: &Tree, xs: &[f32], min_distance: f32) {
        let mut levels: Vec<Vec<NodeId>> = vec![Vec::new(); tree.max_depth() + 1];
        for (id, node) in tree.iter() {
            levels[node.depth].push(id);
        }
        for level in &mut levels {
            level.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));
            for pair in level.windows(2) {
                let gap = xs[pair[1]] - xs[pair[0]];
                assert!(
                    gap >= min_distance - 1e-3,
                    "gap {gap} below {min_distance}"
                );
            }
        }
    }

    #[test]
    fn enforces_min_distance_per_level() {
        let tree = crowded_tree();
        // Everything piled near the origin.
        let mut xs = vec![0.0, 10.0, 20.0, 5.0, 12.0, 30.0];
        resolve_overlaps(&tree, &mut xs, 180.0);
        assert_min_spacing(&tree, &xs, 180.0);
    }

    #[test]
    fn shift_carries_the_subtree_rigidly() {
        let tree = crowded_tree();
        let a = tree.lookup("a").unwrap();
        let b = tree.lookup("b").unwrap();
        let b1 = tree.lookup("b1").unwrap();
        let a1 = tree.lookup("a1").unwrap();
        let a2 = tree.lookup("a2").unwrap();
        let mut xs = vec![0.0f32; tree.len()];
        xs[a] = 0.0;
        xs[a1] = -200.0;
        xs[a2] = 0.0;
        xs[b] = 50.0;
        xs[b1] = 400.0;
        let before = xs[b1] - xs[b];
        resolve_overlaps(&tree, &mut xs, 180.0);
        // b moved right; b1 kept its offset relative to b because the
        // deeper level was already spaced out.
        assert!(xs[b] > 50.0);
        assert!((xs[b1] - xs[b] - before).abs() < 1e-3);
    }

    #[test]
    fn resolution_is_idempotent() {
        let tree = crowded_tree();
        let mut xs = vec![0.0, 10.0, 20.0, 5.0, 12.0, 30.0];
        resolve_overlaps(&tree, &mut xs, 180.0);
        let settled = xs.clone();
        resolve_overlaps(&tree, &mut xs, 180.0);
        assert_eq!(xs, settled);
    }

    #[test]
    fn single_node_level_is_untouched() {
        let tree = parse_tree(
            r#"{"id": "r", "text": "r", "children": [
                {"id": "a", "text": "a", "children": []}
            ]}"#,
        )
        .unwrap();
        let mut xs = vec![100.0, 100.0];
        resolve_overlaps(&tree, &mut xs, 180.0);
        assert_eq!(xs, vec![100.0, 100.0]);
    }
}
