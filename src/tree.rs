//! Arena-owned binary search tree for the interactive tree workspace.
//!
//! The workspace is independent of the document model: the learner grows it
//! one insertion at a time, and the traversal engine animates per-node visual
//! state in place. Nodes are never deleted; the whole structure is replaced
//! on `clear` or preset load.

use std::collections::BTreeMap;

use crate::error::{VizError, VizResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    #[default]
    Normal,
    Visiting,
    Visited,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub value: i64,
    /// Screen coordinates, fixed at insertion time.
    pub x: f64,
    pub y: f64,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Mutated only by the traversal engine during animation.
    pub state: NodeState,
}

const ROOT_X: f64 = 400.0;
const ROOT_Y: f64 = 60.0;
const LEVEL_DY: f64 = 100.0;
const SPREAD: f64 = 150.0;

/// Built-in value sequences for quick exploration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreePreset {
    /// A perfectly balanced seven-node tree.
    Balanced,
    /// The classic lecture example, sorted in-order to 15..75.
    Lecture,
    /// 7 to 12 values drawn uniformly from [0, 100), deterministic per seed.
    Random { seed: u64 },
}

#[derive(Clone, Debug, Default)]
pub struct TreeWorkspace {
    nodes: BTreeMap<NodeId, TreeNode>,
    root: Option<NodeId>,
    next_id: u32,
}

impl TreeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Nodes in generation order (stable for presentation layers).
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// BST insertion; equal values descend right. The new node's coordinates
    /// derive from its parent: `x = parent.x ± SPREAD / depth`,
    /// `y = parent.y + LEVEL_DY`, with the root's children at depth 1. The
    /// spread narrows with depth, which is cheap but does not guarantee
    /// non-overlap for adversarial insertion orders.
    pub fn insert(&mut self, value: i64) -> NodeId {
        let Some(root_id) = self.root else {
            let id = self.alloc(value, ROOT_X, ROOT_Y);
            self.root = Some(id);
            return id;
        };

        let mut current = root_id;
        let mut depth = 1u32;
        loop {
            let node = &self.nodes[&current];
            let (slot, dir) = if value < node.value {
                (node.left, -1.0)
            } else {
                (node.right, 1.0)
            };

            match slot {
                Some(child) => {
                    current = child;
                    depth += 1;
                }
                None => {
                    let x = node.x + dir * SPREAD / f64::from(depth);
                    let y = node.y + LEVEL_DY;
                    let id = self.alloc(value, x, y);
                    let parent = self.nodes.get_mut(&current).expect("parent exists");
                    if dir < 0.0 {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return id;
                }
            }
        }
    }

    /// Insert from free-form user input. Non-numeric input is rejected before
    /// the structure is touched.
    pub fn insert_parsed(&mut self, input: &str) -> VizResult<NodeId> {
        let value: i64 = input
            .trim()
            .parse()
            .map_err(|_| VizError::tree(format!("'{input}' is not an integer value")))?;
        Ok(self.insert(value))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.next_id = 0;
    }

    /// Replace the structure with a preset sequence.
    pub fn load(&mut self, preset: TreePreset) {
        self.clear();
        match preset {
            TreePreset::Balanced => {
                for v in [50, 30, 70, 20, 40, 60, 80] {
                    self.insert(v);
                }
            }
            TreePreset::Lecture => {
                for v in [45, 25, 65, 15, 35, 55, 75] {
                    self.insert(v);
                }
            }
            TreePreset::Random { seed } => {
                let mut rng = SplitMix64::new(seed);
                let count = 7 + (rng.next_u64() % 6) as usize;
                for _ in 0..count {
                    self.insert((rng.next_u64() % 100) as i64);
                }
            }
        }
    }

    /// Height measured in nodes: 0 for a missing node, 1 for a leaf.
    pub fn height(&self) -> usize {
        self.height_from(self.root)
    }

    pub fn height_of(&self, id: NodeId) -> usize {
        self.height_from(Some(id))
    }

    fn height_from(&self, id: Option<NodeId>) -> usize {
        let Some(node) = id.and_then(|id| self.nodes.get(&id)) else {
            return 0;
        };
        1 + self
            .height_from(node.left)
            .max(self.height_from(node.right))
    }

    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.state = state;
        }
    }

    pub fn reset_states(&mut self) {
        for node in self.nodes.values_mut() {
            node.state = NodeState::Normal;
        }
    }

    /// Structural invariant: every left descendant strictly smaller, every
    /// right descendant greater or equal. Used by property tests and debug
    /// assertions in the traversal engine.
    pub fn is_valid_bst(&self) -> bool {
        self.check_bounds(self.root, None, None)
    }

    fn check_bounds(&self, id: Option<NodeId>, min: Option<i64>, max: Option<i64>) -> bool {
        let Some(node) = id.and_then(|id| self.nodes.get(&id)) else {
            return true;
        };
        if min.is_some_and(|m| node.value < m) {
            return false;
        }
        if max.is_some_and(|m| node.value >= m) {
            return false;
        }
        self.check_bounds(node.left, min, Some(node.value))
            && self.check_bounds(node.right, Some(node.value), max)
    }

    fn alloc(&mut self, value: i64, x: f64, y: f64) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            TreeNode {
                id,
                value,
                x,
                y,
                left: None,
                right: None,
                state: NodeState::Normal,
            },
        );
        id
    }
}

/// Small deterministic generator for the random preset; avoids an RNG
/// dependency for a dozen values.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}
