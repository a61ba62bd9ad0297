//! Timed traversal animations over the tree workspace.
//!
//! Visit order is computed up front as a pure event script; the driver only
//! decides *when* each scripted effect lands. That keeps the four traversal
//! variants testable without a clock, while the engine replays them against
//! real (or virtual) time.

use std::collections::VecDeque;

use crate::{
    error::{VizError, VizResult},
    tree::{NodeId, NodeState, TreePreset, TreeWorkspace},
};

/// Hold on a node in `Visiting` state before its value is emitted.
pub const VISIT_HOLD_MS: f64 = 600.0;
/// Pause after a node settles to `Visited` before moving on.
pub const VISITED_PAUSE_MS: f64 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalKind {
    Inorder,
    Preorder,
    Postorder,
    LevelOrder,
}

impl TraversalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inorder => "inorder",
            Self::Preorder => "preorder",
            Self::Postorder => "postorder",
            Self::LevelOrder => "levelorder",
        }
    }
}

/// One scripted effect of a traversal animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraversalEvent {
    Mark { node: NodeId, state: NodeState },
    Emit { node: NodeId, value: i64 },
    Wait { ms: f64 },
}

/// Build the full event script for a traversal of the current tree.
///
/// A visit is: mark `Visiting`, hold, emit the value, mark `Visited`, pause.
/// Level-order deviates on purpose: a node turns `Visiting` when it is
/// *enqueued* (the root at script start), so several nodes can hold the
/// "about to be visited" affordance at once. The depth-first kinds never
/// overlap visits.
pub fn traversal_script(tree: &TreeWorkspace, kind: TraversalKind) -> Vec<TraversalEvent> {
    let mut events = Vec::new();
    match kind {
        TraversalKind::Inorder => dfs_script(tree, tree.root(), kind, &mut events),
        TraversalKind::Preorder => dfs_script(tree, tree.root(), kind, &mut events),
        TraversalKind::Postorder => dfs_script(tree, tree.root(), kind, &mut events),
        TraversalKind::LevelOrder => level_order_script(tree, &mut events),
    }
    events
}

/// The pure visit order, without timing. For a valid BST the in-order
/// sequence is sorted ascending.
pub fn traversal_order(tree: &TreeWorkspace, kind: TraversalKind) -> Vec<i64> {
    traversal_script(tree, kind)
        .iter()
        .filter_map(|e| match e {
            TraversalEvent::Emit { value, .. } => Some(*value),
            _ => None,
        })
        .collect()
}

fn dfs_script(
    tree: &TreeWorkspace,
    id: Option<NodeId>,
    kind: TraversalKind,
    events: &mut Vec<TraversalEvent>,
) {
    let Some(node) = id.and_then(|id| tree.node(id)) else {
        return;
    };

    match kind {
        TraversalKind::Inorder => {
            dfs_script(tree, node.left, kind, events);
            push_visit(events, node.id, node.value);
            dfs_script(tree, node.right, kind, events);
        }
        TraversalKind::Preorder => {
            push_visit(events, node.id, node.value);
            dfs_script(tree, node.left, kind, events);
            dfs_script(tree, node.right, kind, events);
        }
        TraversalKind::Postorder => {
            dfs_script(tree, node.left, kind, events);
            dfs_script(tree, node.right, kind, events);
            push_visit(events, node.id, node.value);
        }
        TraversalKind::LevelOrder => unreachable!("level order is not recursive"),
    }
}

fn level_order_script(tree: &TreeWorkspace, events: &mut Vec<TraversalEvent>) {
    let Some(root) = tree.root() else {
        return;
    };

    events.push(TraversalEvent::Mark {
        node: root,
        state: NodeState::Visiting,
    });

    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let Some(node) = tree.node(id) else {
            continue;
        };

        // Already Visiting since enqueue time.
        events.push(TraversalEvent::Wait { ms: VISIT_HOLD_MS });
        events.push(TraversalEvent::Emit {
            node: id,
            value: node.value,
        });
        events.push(TraversalEvent::Mark {
            node: id,
            state: NodeState::Visited,
        });

        for child in [node.left, node.right].into_iter().flatten() {
            events.push(TraversalEvent::Mark {
                node: child,
                state: NodeState::Visiting,
            });
            queue.push_back(child);
        }

        events.push(TraversalEvent::Wait {
            ms: VISITED_PAUSE_MS,
        });
    }
}

fn push_visit(events: &mut Vec<TraversalEvent>, node: NodeId, value: i64) {
    events.push(TraversalEvent::Mark {
        node,
        state: NodeState::Visiting,
    });
    events.push(TraversalEvent::Wait { ms: VISIT_HOLD_MS });
    events.push(TraversalEvent::Emit { node, value });
    events.push(TraversalEvent::Mark {
        node,
        state: NodeState::Visited,
    });
    events.push(TraversalEvent::Wait {
        ms: VISITED_PAUSE_MS,
    });
}

/// Replays a script against a virtual clock, applying marks to the workspace
/// and collecting emitted values.
#[derive(Clone, Debug)]
pub struct TraversalRun {
    kind: TraversalKind,
    events: Vec<TraversalEvent>,
    cursor: usize,
    /// Absolute time the next event may apply; waits extend this rather than
    /// rescheduling from the tick time, so a late tick does not drift the
    /// whole animation.
    ready_at_ms: f64,
    output: Vec<i64>,
}

impl TraversalRun {
    fn new(tree: &TreeWorkspace, kind: TraversalKind, now_ms: f64) -> Self {
        Self {
            kind,
            events: traversal_script(tree, kind),
            cursor: 0,
            ready_at_ms: now_ms,
            output: Vec::new(),
        }
    }

    pub fn kind(&self) -> TraversalKind {
        self.kind
    }

    pub fn output(&self) -> &[i64] {
        &self.output
    }

    /// Apply every event due by `now_ms`. Returns true once the script is
    /// exhausted *and* its final pause has elapsed.
    fn tick(&mut self, now_ms: f64, tree: &mut TreeWorkspace) -> bool {
        loop {
            if now_ms < self.ready_at_ms {
                return false;
            }
            if self.cursor >= self.events.len() {
                return true;
            }
            match self.events[self.cursor] {
                TraversalEvent::Mark { node, state } => tree.set_state(node, state),
                TraversalEvent::Emit { value, .. } => self.output.push(value),
                TraversalEvent::Wait { ms } => self.ready_at_ms += ms,
            }
            self.cursor += 1;
        }
    }
}

/// The interactive tree engine: one workspace, at most one animation.
///
/// There is no cancellation; a traversal runs to natural completion (bounded
/// by `node count * 1 s`). New traversal requests and structural mutations
/// during a run are silently ignored, so presentation layers can wire
/// controls straight through without their own run-state bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct TreeEngine {
    tree: TreeWorkspace,
    run: Option<TraversalRun>,
    last_output: Vec<i64>,
}

impl TreeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &TreeWorkspace {
        &self.tree
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// The live output while a traversal runs, else the last completed one.
    pub fn output(&self) -> &[i64] {
        match &self.run {
            Some(run) => run.output(),
            None => &self.last_output,
        }
    }

    /// Returns false while a traversal is in flight (reentrancy guard).
    pub fn insert(&mut self, value: i64) -> bool {
        if self.is_running() {
            return false;
        }
        self.tree.insert(value);
        true
    }

    /// Parse guard plus run guard; a rejected insert leaves the tree as-is.
    pub fn insert_parsed(&mut self, input: &str) -> VizResult<()> {
        if self.is_running() {
            return Err(VizError::tree("traversal in progress"));
        }
        self.tree.insert_parsed(input)?;
        Ok(())
    }

    pub fn clear(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.tree.clear();
        self.last_output.clear();
        true
    }

    pub fn load(&mut self, preset: TreePreset) -> bool {
        if self.is_running() {
            return false;
        }
        self.tree.load(preset);
        self.last_output.clear();
        true
    }

    /// Begin a traversal animation. A request while one is running is a
    /// silent no-op (returns false, in-flight run untouched). Starting resets
    /// all node states and the recorded output.
    #[tracing::instrument(skip(self), fields(kind = kind.as_str()))]
    pub fn start(&mut self, kind: TraversalKind, now_ms: f64) -> bool {
        if self.run.is_some() {
            tracing::debug!("traversal request ignored while one is running");
            return false;
        }

        self.tree.reset_states();
        self.last_output.clear();
        let run = TraversalRun::new(&self.tree, kind, now_ms);
        self.run = Some(run);
        // Leading marks (the level-order root front-load) land immediately.
        self.tick(now_ms);
        true
    }

    /// Drive the in-flight animation. Returns true when a run completed on
    /// this tick.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(run) = &mut self.run else {
            return false;
        };
        if run.tick(now_ms, &mut self.tree) {
            let run = self.run.take().expect("run present");
            self.last_output = run.output;
            return true;
        }
        false
    }
}
