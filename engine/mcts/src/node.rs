//! Search tree node bookkeeping.
//!
//! Each node stands for one reachable state, identified by the move
//! sequence from the root. States are not stored in the tree: every
//! simulation replays its moves on a scratch environment while descending,
//! so a node only carries the statistics PUCT selection needs.

use puzzle_core::ActionId;

/// Index into the node arena. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Action that led to this node from its parent (unused on the root)
    pub action: ActionId,

    /// Prior probability the estimator assigned when the parent expanded.
    /// P(s,a) in the PUCT formula.
    pub prior: f32,

    /// Number of simulations that traversed the edge into this node
    pub visit_count: u32,

    /// Sum of simulation outcomes backed up through this node.
    /// Q(s,a) = value_sum / visit_count
    pub value_sum: f32,

    /// Whether expansion has run. Tracked separately from `children` so a
    /// childless expansion is not retried on every visit.
    pub expanded: bool,

    /// Children in the order expansion created them, which is the
    /// puzzle's legal-action order
    pub children: Vec<(ActionId, NodeId)>,
}

impl MctsNode {
    /// Create the root node.
    pub fn new_root() -> Self {
        Self {
            action: 0,
            prior: 1.0,
            visit_count: 0,
            value_sum: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Create a child node for `action` with the given prior.
    pub fn new_child(action: ActionId, prior: f32) -> Self {
        Self {
            action,
            prior,
            visit_count: 0,
            value_sum: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Mean value Q(s,a) = value_sum / visit_count, 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// PUCT score for child selection.
    /// PUCT(s,a) = Q(s,a) + c_puct * P(s,a) * sqrt(N_total) / (1 + N(s,a))
    ///
    /// `total_visits_sqrt` is sqrt(sibling visit sum + 1), pre-computed by
    /// the caller so one sqrt covers all children of a node. The value is
    /// from the single solving agent's perspective at every level; there
    /// is no sign flip between parent and child.
    #[inline]
    pub fn puct_score(&self, total_visits_sqrt: f32, c_puct: f32) -> f32 {
        let q = self.mean_value();
        let u = c_puct * self.prior * total_visits_sqrt / (1.0 + self.visit_count as f32);
        q + u
    }

    /// Whether expansion has run for this node.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root() {
        let node = MctsNode::new_root();

        assert_eq!(node.visit_count, 0);
        assert!((node.prior - 1.0).abs() < 1e-6);
        assert!(!node.is_expanded());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_mean_value() {
        let mut node = MctsNode::new_child(3, 0.25);

        // Unvisited
        assert!(node.mean_value().abs() < 1e-6);

        // After visits
        node.visit_count = 4;
        node.value_sum = 2.0;
        assert!((node.mean_value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_puct_score_unvisited_is_pure_exploration() {
        let node = MctsNode::new_child(0, 0.5);

        // Q = 0, so the score is c_puct * P * sqrt_total / 1
        let score = node.puct_score(2.0, 1.5);
        assert!((score - 1.5 * 0.5 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_puct_score_adds_mean_value_without_negation() {
        let mut node = MctsNode::new_child(0, 0.5);
        node.visit_count = 10;
        node.value_sum = 5.0; // Q = 0.5

        // PUCT = 0.5 + 1.0 * 0.5 * 10 / 11 = 0.9545...
        let score = node.puct_score(10.0, 1.0);
        assert!((score - 0.9545).abs() < 0.01);
    }

    #[test]
    fn test_expanded_flag_independent_of_children() {
        let mut node = MctsNode::new_root();
        node.expanded = true;
        assert!(node.is_expanded());
        assert!(node.children.is_empty());
    }
}
