use crate::ir::{NodeId, NodeStatus, Tree};

/// Downward-phase presentation: whole depth layers at once, or one node
/// per step in preorder. Fixed per controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    #[default]
    Layered,
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Downward,
    Upward,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Downward => "downward",
            Self::Upward => "upward",
        }
    }
}

pub fn downward_steps(tree: &Tree, mode: TraversalMode) -> Vec<Vec<String>> {
    match mode {
        TraversalMode::Layered => layered_steps(tree),
        TraversalMode::Sequential => sequential_steps(tree),
    }
}

/// Preorder visit bucketed by depth. Because every node's depth is fixed,
/// this yields the same grouping as a level-order walk while keeping
/// sibling insertion order inside each bucket.
pub fn layered_steps(tree: &Tree) -> Vec<Vec<String>> {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); tree.max_depth() + 1];
    for id in tree.preorder() {
        let node = tree.node(id);
        buckets[node.depth].push(node.id.clone());
    }
    buckets
}

/// One singleton step per node, in preorder.
pub fn sequential_steps(tree: &Tree) -> Vec<Vec<String>> {
    tree.preorder()
        .into_iter()
        .map(|id| vec![tree.node(id).id.clone()])
        .collect()
}

/// Synthesis-phase buckets: productive thoughts plus the input/output
/// framing nodes, minus anything the downward phase deleted or faded,
/// grouped by depth and emitted deepest-first. Empty buckets collapse.
pub fn upward_steps<F>(tree: &Tree, mut excluded: F) -> Vec<Vec<String>>
where
    F: FnMut(NodeId) -> bool,
{
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); tree.max_depth() + 1];
    for id in tree.preorder() {
        let node = tree.node(id);
        let surviving = node.status == NodeStatus::Productive || node.kind.is_framing();
        if surviving && !excluded(id) {
            buckets[node.depth].push(node.id.clone());
        }
    }
    buckets
        .into_iter()
        .rev()
        .filter(|bucket| !bucket.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tree;
    use std::collections::HashSet;

    fn scenario_tree() -> Tree {
        // root -> {a (rejected), b (productive)}, a -> a1
        parse_tree(
            r#"{
                "id": "root", "text": "question", "type": "input",
                "children": [
                    {"id": "a", "text": "bad idea", "status": "rejected",
                     "rejectionReason": "contradiction",
                     "children": [{"id": "a1", "text": "stranded", "children": []}]},
                    {"id": "b", "text": "good idea", "status": "productive", "children": []}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn layered_steps_partition_the_tree_by_depth() {
        let tree = scenario_tree();
        let steps = layered_steps(&tree);
        assert_eq!(steps, vec![
            vec!["root".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["a1".to_string()],
        ]);
        let total: usize = steps.iter().map(Vec::len).sum();
        assert_eq!(total, tree.len());
        let mut seen = HashSet::new();
        for (depth, bucket) in steps.iter().enumerate() {
            for id in bucket {
                assert!(seen.insert(id.clone()), "{id} appears twice");
                assert_eq!(tree.node(tree.lookup(id).unwrap()).depth, depth);
            }
        }
    }

    #[test]
    fn sequential_steps_are_singleton_preorder() {
        let tree = scenario_tree();
        let steps = sequential_steps(&tree);
        let flat: Vec<&str> = steps.iter().map(|step| step[0].as_str()).collect();
        assert_eq!(flat, vec!["root", "a", "a1", "b"]);
        assert!(steps.iter().all(|step| step.len() == 1));
    }

    #[test]
    fn upward_steps_run_deepest_first_and_skip_excluded() {
        let tree = scenario_tree();
        let a = tree.lookup("a").unwrap();
        let a1 = tree.lookup("a1").unwrap();
        let steps = upward_steps(&tree, |id| id == a || id == a1);
        assert_eq!(steps, vec![vec!["b".to_string()], vec!["root".to_string()]]);
    }

    #[test]
    fn upward_steps_never_surface_neutral_thoughts() {
        let tree = parse_tree(
            r#"{"id": "r", "text": "r", "type": "input", "children": [
                {"id": "n", "text": "neutral", "children": []},
                {"id": "p", "text": "productive", "status": "productive", "children": []}
            ]}"#,
        )
        .unwrap();
        let steps = upward_steps(&tree, |_| false);
        assert_eq!(steps, vec![vec!["p".to_string()], vec!["r".to_string()]]);
    }

    #[test]
    fn single_node_tree_has_one_bucket_each_way() {
        let tree = parse_tree(r#"{"id": "r", "text": "r", "type": "input", "children": []}"#)
            .unwrap();
        assert_eq!(layered_steps(&tree), vec![vec!["r".to_string()]]);
        assert_eq!(upward_steps(&tree, |_| false), vec![vec!["r".to_string()]]);
    }
}
