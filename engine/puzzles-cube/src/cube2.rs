//! The 2x2x2 pocket cube.

use puzzle_core::{ActionId, PuzzleEnv, PuzzleMetadata};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::{
    apply_cycles, move_face, move_repeats, one_hot_embedding, FourCycle, COLOR_COUNT, MOVE_COUNT,
    MOVE_LABELS,
};

/// Stickers on a 2x2x2 cube, four per face.
pub const STICKER_COUNT: usize = 24;

const STICKERS_PER_FACE: usize = 4;

const METADATA: PuzzleMetadata = PuzzleMetadata {
    puzzle_id: "cube2",
    display_name: "Pocket cube 2x2x2",
    action_count: MOVE_COUNT,
    embedding_len: STICKER_COUNT * COLOR_COUNT,
};

const SOLVED: [u8; STICKER_COUNT] = {
    let mut stickers = [0u8; STICKER_COUNT];
    let mut i = 0;
    while i < STICKER_COUNT {
        stickers[i] = (i / STICKERS_PER_FACE) as u8;
        i += 1;
    }
    stickers
};

/// Clockwise quarter-turn permutations, one row per face in move order
/// U, D, L, R, F, B.
///
/// Same unfolded layout as the 3x3 (faces ordered U, R, F, D, L, B at
/// offsets 0, 4, 8, 12, 16, 20, row-major from outside), restricted to
/// corner stickers: one on-face cycle plus two band cycles per turn.
const MOVE_CYCLES: [[FourCycle; 3]; 6] = [
    // U
    [[0, 1, 3, 2], [8, 16, 20, 4], [9, 17, 21, 5]],
    // D
    [[12, 13, 15, 14], [10, 6, 22, 18], [11, 7, 23, 19]],
    // L
    [[16, 17, 19, 18], [0, 8, 12, 23], [2, 10, 14, 21]],
    // R
    [[4, 5, 7, 6], [9, 1, 22, 13], [11, 3, 20, 15]],
    // F
    [[8, 9, 11, 10], [2, 4, 13, 19], [3, 6, 12, 17]],
    // B
    [[20, 21, 23, 22], [0, 18, 15, 5], [1, 16, 14, 7]],
];

/// A 2x2x2 cube tracked as 24 raw sticker colors.
///
/// The pocket cube has no fixed centers: turning U and D' together
/// rotates the whole cube without changing the puzzle. Solved therefore
/// means every face is uniform in one color, not equality with one
/// canonical coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube2x2 {
    stickers: [u8; STICKER_COUNT],
}

impl Cube2x2 {
    /// Creates a solved cube.
    pub fn new() -> Self {
        Self { stickers: SOLVED }
    }

    /// Raw sticker colors, faces in the order U, R, F, D, L, B.
    pub fn stickers(&self) -> &[u8; STICKER_COUNT] {
        &self.stickers
    }
}

impl Default for Cube2x2 {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleEnv for Cube2x2 {
    fn metadata(&self) -> PuzzleMetadata {
        METADATA
    }

    fn reset_to_solved(&mut self) {
        self.stickers = SOLVED;
    }

    fn scramble(&mut self, n_moves: usize, rng: &mut ChaCha20Rng) {
        for _ in 0..n_moves {
            let action = rng.gen_range(0..MOVE_COUNT as ActionId);
            self.step(action);
        }
    }

    fn is_solved(&self) -> bool {
        self.stickers
            .chunks_exact(STICKERS_PER_FACE)
            .all(|face| face.iter().all(|&color| color == face[0]))
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        (0..MOVE_COUNT as ActionId).collect()
    }

    fn step(&mut self, action: ActionId) {
        assert!(
            (action as usize) < MOVE_COUNT,
            "invalid action {action} for the 2x2 cube"
        );
        apply_cycles(
            &mut self.stickers,
            &MOVE_CYCLES[move_face(action)],
            move_repeats(action),
        );
    }

    fn state_embedding(&self) -> Vec<f32> {
        one_hot_embedding(&self.stickers)
    }

    fn action_label(&self, action: ActionId) -> &'static str {
        MOVE_LABELS[action as usize]
    }
}
