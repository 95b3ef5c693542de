use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    /// Center of the node shape.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn position(&self, id: &str) -> Option<(f32, f32)> {
        self.nodes.get(id).map(|node| (node.x, node.y))
    }

    /// Mean position of the given nodes; `None` when the set is empty.
    pub fn centroid<I, S>(&self, ids: I) -> Option<(f32, f32)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sum = (0.0f32, 0.0f32);
        let mut count = 0usize;
        for id in ids {
            if let Some((x, y)) = self.position(id.as_ref()) {
                sum.0 += x;
                sum.1 += y;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        Some((sum.0 / count as f32, sum.1 / count as f32))
    }
}
