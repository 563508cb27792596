//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices,
//! which keeps traversal cache-friendly and sidesteps ownership cycles
//! between parents and children.

use puzzle_core::ActionId;

use crate::node::{MctsNode, NodeId};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after construction)
    root: NodeId,
}

impl MctsTree {
    /// Create a tree holding only an unexpanded root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MctsNode::new_root()],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only before construction finishes; kept for completeness.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child under `parent_id` and return its ID.
    pub fn add_child(&mut self, parent_id: NodeId, action: ActionId, prior: f32) -> NodeId {
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MctsNode::new_child(action, prior));
        self.get_mut(parent_id).children.push((action, child_id));
        child_id
    }

    /// Pick the child of `parent_id` with the highest PUCT score, or None
    /// if the node has no children.
    ///
    /// The visit total feeding the exploration term counts one extra
    /// visit for the parent's own expansion, so the term is nonzero even
    /// when every child is unvisited. Ties keep the earliest child in
    /// insertion order, which is the puzzle's legal-action order.
    pub fn select_child(&self, parent_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let parent = self.get(parent_id);

        let total_visits: u32 = parent
            .children
            .iter()
            .map(|&(_, id)| self.get(id).visit_count)
            .sum();
        let total_visits_sqrt = ((total_visits + 1) as f32).sqrt();

        let mut best: Option<(NodeId, f32)> = None;
        for &(_, child_id) in &parent.children {
            let score = self.get(child_id).puct_score(total_visits_sqrt, c_puct);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((child_id, score));
            }
        }

        best.map(|(id, _)| id)
    }

    /// Credit one simulation outcome to every edge it traversed.
    ///
    /// `path` holds the nodes entered through an edge, in root-to-leaf
    /// order and excluding the root itself; the root carries no edge
    /// statistics. The value is applied unchanged at every level.
    pub fn backpropagate(&mut self, path: &[NodeId], value: f32) {
        for &node_id in path {
            let node = self.get_mut(node_id);
            node.visit_count += 1;
            node.value_sum += value;
        }
    }

    /// Visit-count policy over the full action table.
    ///
    /// Entries for unvisited actions are exactly 0.0. When no root child
    /// has been visited at all (a solved root never grows the tree) the
    /// policy falls back to uniform over every action.
    pub fn root_policy(&self, num_actions: usize) -> Vec<f32> {
        let root = self.get(self.root);
        let mut policy = vec![0.0; num_actions];

        let mut total = 0u32;
        for &(action, child_id) in &root.children {
            let visits = self.get(child_id).visit_count;
            policy[action as usize] = visits as f32;
            total += visits;
        }

        if total == 0 {
            let uniform = 1.0 / num_actions as f32;
            for p in &mut policy {
                *p = uniform;
            }
        } else {
            for p in &mut policy {
                *p /= total as f32;
            }
        }

        policy
    }

    /// Mean outcome of every simulation that traversed a root edge, 0.0
    /// before any has.
    pub fn root_value(&self) -> f32 {
        let root = self.get(self.root);

        let mut visits = 0u32;
        let mut value = 0.0f32;
        for &(_, child_id) in &root.children {
            let child = self.get(child_id);
            visits += child.visit_count;
            value += child.value_sum;
        }

        if visits == 0 {
            0.0
        } else {
            value / visits as f32
        }
    }
}

impl Default for MctsTree {
    fn default() -> Self {
        Self::new()
    }
}
