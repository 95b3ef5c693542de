use std::collections::{HashMap, VecDeque};

use serde::Deserialize;
use thiserror::Error;

use crate::ir::{Node, NodeId, NodeKind, NodeStatus, Tree};

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload contains no nodes")]
    Empty,
    #[error("duplicate node id `{0}`")]
    DuplicateId(String),
    #[error("reference to unknown node id `{0}`")]
    UnknownReference(String),
    #[error("node `{0}` has more than one parent")]
    MultipleParents(String),
    #[error("no root node found")]
    NoRoot,
    #[error("multiple root nodes: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),
    #[error("nodes unreachable from root `{root}`: {}", .ids.join(", "))]
    Unreachable { root: String, ids: Vec<String> },
    #[error("unknown node kind `{0}`")]
    UnknownKind(String),
    #[error("unknown node status `{0}`")]
    UnknownStatus(String),
}

/// Node ids may arrive as JSON strings or integers; both normalize to the
/// string form used everywhere downstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Str(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HierNode {
    id: RawId,
    text: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    #[serde(rename = "rejectionReason")]
    rejection_reason: Option<String>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    children: Vec<HierNode>,
}

#[derive(Debug, Deserialize)]
struct FlatNode {
    id: RawId,
    text: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
    #[serde(rename = "rejectionReason")]
    rejection_reason: Option<String>,
    #[serde(default)]
    deleted: bool,
    #[serde(rename = "parentId")]
    parent_id: Option<RawId>,
}

#[derive(Debug, Deserialize)]
struct EdgePayload {
    parent: RawId,
    child: RawId,
}

#[derive(Debug, Deserialize)]
struct NodeEdgePayload {
    nodes: Vec<FlatNode>,
    edges: Vec<EdgePayload>,
}

/// Parses any of the three accepted payload shapes into a validated tree:
/// a hierarchical object, `{nodes, edges}`, or a flat array with parent
/// pointers.
pub fn parse_tree(input: &str) -> Result<Tree, TreeError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    parse_value(value)
}

pub fn parse_value(value: serde_json::Value) -> Result<Tree, TreeError> {
    if value.is_array() {
        let nodes: Vec<FlatNode> = serde_json::from_value(value)?;
        build_flat(nodes)
    } else if value.get("nodes").is_some() && value.get("edges").is_some() {
        let payload: NodeEdgePayload = serde_json::from_value(value)?;
        build_node_edge(payload)
    } else {
        let root: HierNode = serde_json::from_value(value)?;
        build_hierarchical(root)
    }
}

fn make_node(
    id: String,
    text: String,
    kind: Option<String>,
    status: Option<String>,
    rejection_reason: Option<String>,
    deleted: bool,
    parent: Option<NodeId>,
) -> Result<Node, TreeError> {
    let kind = match kind {
        Some(token) => NodeKind::from_token(&token).ok_or(TreeError::UnknownKind(token))?,
        None => NodeKind::Thought,
    };
    let status = match status {
        Some(token) => NodeStatus::from_token(&token).ok_or(TreeError::UnknownStatus(token))?,
        None => NodeStatus::Neutral,
    };
    Ok(Node {
        id,
        text,
        kind,
        status,
        rejection_reason,
        deleted,
        parent,
        children: Vec::new(),
        depth: 0,
    })
}

fn build_hierarchical(root: HierNode) -> Result<Tree, TreeError> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen: HashMap<String, NodeId> = HashMap::new();
    let mut stack: Vec<(HierNode, Option<NodeId>)> = vec![(root, None)];
    while let Some((raw, parent)) = stack.pop() {
        let id = raw.id.into_string();
        let idx = nodes.len();
        if seen.insert(id.clone(), idx).is_some() {
            return Err(TreeError::DuplicateId(id));
        }
        let mut node = make_node(
            id,
            raw.text,
            raw.kind,
            raw.status,
            raw.rejection_reason,
            raw.deleted,
            parent,
        )?;
        if let Some(parent) = parent {
            node.depth = nodes[parent].depth + 1;
            nodes[parent].children.push(idx);
        }
        nodes.push(node);
        for child in raw.children.into_iter().rev() {
            stack.push((child, Some(idx)));
        }
    }
    Ok(Tree::assemble(nodes, 0))
}

fn build_node_edge(payload: NodeEdgePayload) -> Result<Tree, TreeError> {
    let (mut nodes, ids) = collect_flat_nodes(payload.nodes)?;
    for edge in payload.edges {
        let parent_id = edge.parent.into_string();
        let child_id = edge.child.into_string();
        let parent = *ids
            .get(&parent_id)
            .ok_or(TreeError::UnknownReference(parent_id))?;
        let child = *ids
            .get(&child_id)
            .ok_or(TreeError::UnknownReference(child_id))?;
        if nodes[child].parent.is_some() {
            return Err(TreeError::MultipleParents(nodes[child].id.clone()));
        }
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }
    finish_graph(nodes)
}

fn build_flat(raw: Vec<FlatNode>) -> Result<Tree, TreeError> {
    let parent_ids: Vec<Option<String>> = raw
        .iter()
        .map(|node| node.parent_id.clone().map(RawId::into_string))
        .collect();
    let (mut nodes, ids) = collect_flat_nodes(raw)?;
    for (child, parent_id) in parent_ids.into_iter().enumerate() {
        let Some(parent_id) = parent_id else {
            continue;
        };
        let parent = *ids
            .get(&parent_id)
            .ok_or(TreeError::UnknownReference(parent_id))?;
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }
    finish_graph(nodes)
}

fn collect_flat_nodes(
    raw: Vec<FlatNode>,
) -> Result<(Vec<Node>, HashMap<String, NodeId>), TreeError> {
    if raw.is_empty() {
        return Err(TreeError::Empty);
    }
    let mut nodes = Vec::with_capacity(raw.len());
    let mut ids = HashMap::new();
    for entry in raw {
        let id = entry.id.into_string();
        if ids.insert(id.clone(), nodes.len()).is_some() {
            return Err(TreeError::DuplicateId(id));
        }
        nodes.push(make_node(
            id,
            entry.text,
            entry.kind,
            entry.status,
            entry.rejection_reason,
            entry.deleted,
            None,
        )?);
    }
    Ok((nodes, ids))
}

/// Root detection, depth assignment, and reachability for the two
/// reference-based formats. A cycle always leaves its members unreachable
/// from the root (every node has at most one parent), so one BFS covers
/// both checks.
fn finish_graph(mut nodes: Vec<Node>) -> Result<Tree, TreeError> {
    let roots: Vec<NodeId> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.parent.is_none())
        .map(|(idx, _)| idx)
        .collect();
    let root = match roots.as_slice() {
        [] => return Err(TreeError::NoRoot),
        [single] => *single,
        many => {
            return Err(TreeError::MultipleRoots(
                many.iter().map(|&idx| nodes[idx].id.clone()).collect(),
            ));
        }
    };

    let mut visited = vec![false; nodes.len()];
    let mut queue = VecDeque::from([root]);
    visited[root] = true;
    while let Some(id) = queue.pop_front() {
        let depth = nodes[id].depth;
        let children = nodes[id].children.clone();
        for child in children {
            nodes[child].depth = depth + 1;
            visited[child] = true;
            queue.push_back(child);
        }
    }
    let unreachable: Vec<String> = visited
        .iter()
        .enumerate()
        .filter(|(_, seen)| !**seen)
        .map(|(idx, _)| nodes[idx].id.clone())
        .collect();
    if !unreachable.is_empty() {
        return Err(TreeError::Unreachable {
            root: nodes[root].id.clone(),
            ids: unreachable,
        });
    }
    Ok(Tree::assemble(nodes, root))
}
