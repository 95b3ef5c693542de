use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, trace};

use crate::command::{HighlightRole, RenderCommand};
use crate::config::LayoutConfig;
use crate::ir::{HighlightState, NodeId, NodeStatus, Tree};
use crate::layout::Layout;
use crate::playback::Playback;
use crate::traversal::{self, Phase, TraversalMode};

/// Observable traversal state. `Complete` is reported by
/// [`TraversalController::state`] once the final upward bucket has been
/// shown; internally the controller keeps the last upward index so a
/// backward step can walk out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    Idle,
    Downward { step: usize },
    Upward { step: usize },
    Complete,
}

/// Drives the two-phase traversal over one tree. Owns the model plus the
/// per-node highlight overlay and emits declarative commands for a
/// renderer; every transition is synchronous and caller-driven.
pub struct TraversalController {
    tree: Tree,
    positions: Vec<(f32, f32)>,
    downward: Vec<Vec<String>>,
    /// Downward bucket index per node (its depth in layered mode, its
    /// preorder rank in sequential mode).
    bucket_of: Vec<usize>,
    /// Upward buckets, computed on first entry to the upward phase so the
    /// downward phase's deletions are respected. Invalidated by `reset()`
    /// only.
    upward: Option<Vec<Vec<String>>>,
    state: TraversalState,
    highlight: Vec<HighlightState>,
    deleted: Vec<bool>,
    faded: Vec<bool>,
    follow_zoom: f32,
    playback: Playback,
    commands: Vec<RenderCommand>,
}

impl TraversalController {
    pub fn new(tree: Tree, layout: &Layout, mode: TraversalMode, config: &LayoutConfig) -> Self {
        let downward = traversal::downward_steps(&tree, mode);
        let mut bucket_of = vec![0usize; tree.len()];
        for (step, bucket) in downward.iter().enumerate() {
            for id in bucket {
                if let Some(node) = tree.lookup(id) {
                    bucket_of[node] = step;
                }
            }
        }
        let positions = (0..tree.len())
            .map(|id| layout.position(&tree.node(id).id).unwrap_or((0.0, 0.0)))
            .collect();
        let len = tree.len();
        Self {
            tree,
            positions,
            downward,
            bucket_of,
            upward: None,
            state: TraversalState::Idle,
            highlight: vec![HighlightState::None; len],
            deleted: vec![false; len],
            faded: vec![false; len],
            follow_zoom: config.follow_zoom,
            playback: Playback::new(crate::playback::MIN_SPEED),
            commands: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn state(&self) -> TraversalState {
        match self.state {
            TraversalState::Upward { step }
                if step + 1 == self.upward.as_ref().map(Vec::len).unwrap_or(0) =>
            {
                TraversalState::Complete
            }
            other => other,
        }
    }

    pub fn highlight(&self, id: NodeId) -> HighlightState {
        self.highlight[id]
    }

    /// Snapshot of the whole overlay, keyed by node id.
    pub fn highlight_map(&self) -> BTreeMap<String, HighlightState> {
        self.tree
            .iter()
            .map(|(id, node)| (node.id.clone(), self.highlight[id]))
            .collect()
    }

    pub fn downward_step_count(&self) -> usize {
        self.downward.len()
    }

    /// `None` until the upward phase has been entered at least once.
    pub fn upward_step_count(&self) -> Option<usize> {
        self.upward.as_ref().map(Vec::len)
    }

    /// Drains the commands accumulated since the last call.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn step_forward(&mut self) -> bool {
        match self.state {
            TraversalState::Idle => {
                if self.downward.is_empty() {
                    return false;
                }
                self.state = TraversalState::Downward { step: 0 };
                self.apply_downward(0, true);
                true
            }
            TraversalState::Downward { step } if step + 1 < self.downward.len() => {
                self.state = TraversalState::Downward { step: step + 1 };
                self.apply_downward(step + 1, true);
                true
            }
            TraversalState::Downward { .. } => self.enter_upward(),
            TraversalState::Upward { step } => {
                let len = self.ensure_upward();
                if step + 1 >= len {
                    return false;
                }
                self.state = TraversalState::Upward { step: step + 1 };
                self.apply_upward(step + 1);
                if step + 2 == len {
                    self.commands.push(RenderCommand::ShowCompletion);
                    debug!("synthesis reached the root");
                }
                true
            }
            TraversalState::Complete => false,
        }
    }

    pub fn step_backward(&mut self) -> bool {
        match self.state {
            TraversalState::Idle | TraversalState::Downward { step: 0 } => false,
            TraversalState::Downward { step } => {
                self.state = TraversalState::Downward { step: step - 1 };
                self.apply_downward(step - 1, false);
                true
            }
            TraversalState::Upward { step: 0 } => self.back_to_downward(),
            TraversalState::Upward { step } => {
                self.state = TraversalState::Upward { step: step - 1 };
                self.apply_upward(step - 1);
                true
            }
            TraversalState::Complete => false,
        }
    }

    /// Returns to `Idle`: overlay cleared, runtime deletions forgotten,
    /// the upward cache dropped, pending playback cancelled.
    pub fn reset(&mut self) {
        self.state = TraversalState::Idle;
        self.highlight.fill(HighlightState::None);
        self.deleted.fill(false);
        self.faded.fill(false);
        self.upward = None;
        self.playback.pause();
        self.commands.push(RenderCommand::ClearAll);
        debug!("traversal reset");
    }

    pub fn play(&mut self, speed: u8) {
        self.playback.set_speed(speed);
        self.playback.play(Instant::now());
        debug!(speed = self.playback.speed(), "playback started");
    }

    pub fn pause(&mut self) {
        self.playback.pause();
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.playback.set_speed(speed);
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Advances one step when a playback tick is due; stops playback on
    /// the first step that reports no progress.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playback.poll(now) {
            return false;
        }
        let advanced = self.step_forward();
        if !advanced {
            self.playback.pause();
            debug!("playback finished");
        }
        advanced
    }

    fn enter_upward(&mut self) -> bool {
        let len = self.ensure_upward();
        debug!(buckets = len, "switching to upward traversal");
        if len == 0 {
            // Nothing survived; the downward phase stays where it is and
            // further forward calls keep reporting no progress.
            return false;
        }
        self.state = TraversalState::Upward { step: 0 };
        self.apply_upward(0);
        if len == 1 {
            self.commands.push(RenderCommand::ShowCompletion);
        }
        true
    }

    fn back_to_downward(&mut self) -> bool {
        let last = self.downward.len() - 1;
        debug!(step = last, "returning to downward traversal");
        self.state = TraversalState::Downward { step: last };
        self.apply_downward(last, false);
        true
    }

    fn ensure_upward(&mut self) -> usize {
        if self.upward.is_none() {
            let Self {
                tree,
                deleted,
                faded,
                ..
            } = self;
            let steps = traversal::upward_steps(tree, |id| deleted[id] || faded[id]);
            debug!(buckets = steps.len(), "computed upward synthesis steps");
            self.upward = Some(steps);
        }
        self.upward.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Recomputes the full overlay as of downward `step`. Always a fresh
    /// derivation from (step, node identity) so backward moves cannot
    /// leave stale flags behind.
    fn apply_downward(&mut self, step: usize, emit_effects: bool) {
        trace!(step, emit_effects, "applying downward step");
        let Self {
            tree,
            highlight,
            deleted,
            faded,
            bucket_of,
            ..
        } = self;
        deleted.fill(false);
        faded.fill(false);
        let mut newly_deleted: Vec<NodeId> = Vec::new();
        for (id, node) in tree.iter() {
            let deletable = node.status == NodeStatus::Rejected || node.deleted;
            if deletable && bucket_of[id] <= step {
                deleted[id] = true;
                if bucket_of[id] == step {
                    newly_deleted.push(id);
                }
            }
        }
        // Cascade at initiation time: the whole subtree below a deleted
        // node is retired immediately, not when its bucket is reached.
        for id in 0..tree.len() {
            if deleted[id] {
                for descendant in tree.descendants(id) {
                    faded[descendant] = true;
                }
            }
        }

        let mut current = Vec::new();
        let mut visited = Vec::new();
        let mut dimmed = Vec::new();
        let mut deleted_here = Vec::new();
        for (id, node) in tree.iter() {
            highlight[id] = if deleted[id] {
                if bucket_of[id] == step {
                    deleted_here.push(node.id.clone());
                }
                HighlightState::Deleted
            } else if faded[id] {
                HighlightState::FadedOut
            } else if bucket_of[id] == step {
                current.push(node.id.clone());
                HighlightState::Current
            } else if bucket_of[id] < step {
                visited.push(node.id.clone());
                HighlightState::Visited
            } else {
                dimmed.push(node.id.clone());
                HighlightState::Dimmed
            };
        }

        self.push_highlight(dimmed, HighlightRole::Dimmed);
        self.push_highlight(visited, HighlightRole::Visited);
        self.push_highlight(current, HighlightRole::Current);
        self.push_highlight(deleted_here, HighlightRole::Deleted);
        if emit_effects {
            for id in newly_deleted {
                let node = self.tree.node(id);
                self.commands.push(RenderCommand::MarkDeleted {
                    id: node.id.clone(),
                    reason: node
                        .rejection_reason
                        .clone()
                        .unwrap_or_else(|| "Path rejected".to_string()),
                });
                self.commands.push(RenderCommand::FadeSubtree {
                    root: node.id.clone(),
                });
            }
        }
        let bucket = self.downward[step].clone();
        self.follow_step(&bucket, Phase::Downward);
    }

    /// Recomputes the full overlay as of upward `step`.
    fn apply_upward(&mut self, step: usize) {
        trace!(step, "applying upward step");
        let Some(steps) = self.upward.as_ref() else {
            return;
        };
        let bucket = steps[step].clone();
        let mut in_bucket = vec![false; self.tree.len()];
        for id in &bucket {
            if let Some(node) = self.tree.lookup(id) {
                in_bucket[node] = true;
            }
        }
        let mut dimmed = Vec::new();
        let Self {
            tree,
            highlight,
            deleted,
            faded,
            ..
        } = self;
        for (id, node) in tree.iter() {
            highlight[id] = if deleted[id] {
                HighlightState::Deleted
            } else if faded[id] {
                HighlightState::FadedOut
            } else if in_bucket[id] {
                HighlightState::UpwardHighlighted
            } else {
                dimmed.push(node.id.clone());
                HighlightState::Dimmed
            };
        }
        self.push_highlight(dimmed, HighlightRole::Dimmed);
        self.push_highlight(bucket.clone(), HighlightRole::UpwardHighlighted);
        self.follow_step(&bucket, Phase::Upward);
    }

    fn push_highlight(&mut self, ids: Vec<String>, role: HighlightRole) {
        if !ids.is_empty() {
            self.commands.push(RenderCommand::HighlightLayer { ids, role });
        }
    }

    /// Viewport-follow policy: center on the centroid of the step's nodes
    /// at the fixed follow zoom. A pure function of the step's node set.
    fn follow_step(&mut self, bucket: &[String], phase: Phase) {
        let mut sum = (0.0f32, 0.0f32);
        let mut count = 0usize;
        let mut depth = 0usize;
        for id in bucket {
            if let Some(node) = self.tree.lookup(id) {
                let (x, y) = self.positions[node];
                sum.0 += x;
                sum.1 += y;
                count += 1;
                depth = self.tree.node(node).depth;
            }
        }
        if count > 0 {
            self.commands.push(RenderCommand::CenterViewport {
                x: sum.0 / count as f32,
                y: sum.1 / count as f32,
                scale: self.follow_zoom,
            });
        }
        self.commands.push(RenderCommand::ShowStepSummary {
            ids: bucket.to_vec(),
            phase,
            depth,
        });
    }
}
