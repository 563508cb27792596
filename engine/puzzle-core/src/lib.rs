//! Core contract between puzzle environments and the search/training stack.
//!
//! A puzzle environment is a deterministic state-transition system with a
//! fixed action table: the solved state is the single goal, `scramble`
//! produces positions of controlled difficulty, and `step` applies one move
//! in place. Search and training are written once against [`PuzzleEnv`];
//! each puzzle family (3x3 cube, 2x2 cube, ...) provides a concrete type.
//!
//! Environments are cloned freely during search: `Clone` must produce a
//! fully independent copy that shares no mutable state with the source.

use rand_chacha::ChaCha20Rng;

/// Index into a puzzle's fixed action table.
pub type ActionId = u8;

/// Static facts about one puzzle family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleMetadata {
    /// Stable identifier, e.g. "cube3"
    pub puzzle_id: &'static str,

    /// Human-readable name for logs and CLI output
    pub display_name: &'static str,

    /// Size of the action table; action ids are 0..action_count
    pub action_count: usize,

    /// Length of the vector returned by `state_embedding`
    pub embedding_len: usize,
}

/// A single-agent permutation puzzle.
///
/// Implementations must be deterministic: the same action applied to the
/// same state always yields the same successor. `step` is infallible for
/// every id in `legal_actions()` and panics on any other id.
pub trait PuzzleEnv: Clone + Send {
    fn metadata(&self) -> PuzzleMetadata;

    /// Return to the canonical solved state.
    fn reset_to_solved(&mut self);

    /// Apply `n_moves` uniformly random actions from the action table.
    /// Scrambling from solved gives positions of controlled difficulty.
    fn scramble(&mut self, n_moves: usize, rng: &mut ChaCha20Rng);

    fn is_solved(&self) -> bool;

    /// All currently legal action ids, in a fixed puzzle-specific order.
    /// This order is the deterministic tie-break order for search.
    fn legal_actions(&self) -> Vec<ActionId>;

    /// Apply one action in place. Panics on an invalid action id.
    fn step(&mut self, action: ActionId);

    /// Fixed-length numeric encoding of the full state (no hidden
    /// information). Length always equals `metadata().embedding_len`.
    fn state_embedding(&self) -> Vec<f32>;

    /// Human-readable move notation for an action id.
    fn action_label(&self, action: ActionId) -> &'static str;

    fn action_count(&self) -> usize {
        self.metadata().action_count
    }

    fn embedding_len(&self) -> usize {
        self.metadata().embedding_len
    }
}
