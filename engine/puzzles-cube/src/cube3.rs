//! The standard 3x3x3 Rubik's cube.

use puzzle_core::{ActionId, PuzzleEnv, PuzzleMetadata};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::{
    apply_cycles, move_face, move_repeats, one_hot_embedding, FourCycle, COLOR_COUNT, MOVE_COUNT,
    MOVE_LABELS,
};

/// Stickers on a 3x3x3 cube, nine per face.
pub const STICKER_COUNT: usize = 54;

const STICKERS_PER_FACE: usize = 9;

const METADATA: PuzzleMetadata = PuzzleMetadata {
    puzzle_id: "cube3",
    display_name: "Rubik's cube 3x3x3",
    action_count: MOVE_COUNT,
    embedding_len: STICKER_COUNT * COLOR_COUNT,
};

/// Canonical solved coloring: face `k` uniformly colored `k`.
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
/// Stickers are indexed by the unfolded layout: faces stored in the order
/// U, R, F, D, L, B at offsets 0, 9, 18, 27, 36, 45, each face row-major
/// as seen from outside the cube. Per row, the first two cycles rotate the
/// turning face itself (corners, then edges) and the last three carry the
/// adjacent band of nine stickers around it.
const MOVE_CYCLES: [[FourCycle; 5]; 6] = [
    // U
    [
        [0, 2, 8, 6],
        [1, 5, 7, 3],
        [18, 36, 45, 9],
        [19, 37, 46, 10],
        [20, 38, 47, 11],
    ],
    // D
    [
        [27, 29, 35, 33],
        [28, 32, 34, 30],
        [24, 15, 51, 42],
        [25, 16, 52, 43],
        [26, 17, 53, 44],
    ],
    // L
    [
        [36, 38, 44, 42],
        [37, 41, 43, 39],
        [0, 18, 27, 53],
        [3, 21, 30, 50],
        [6, 24, 33, 47],
    ],
    // R
    [
        [9, 11, 17, 15],
        [10, 14, 16, 12],
        [20, 2, 51, 29],
        [23, 5, 48, 32],
        [26, 8, 45, 35],
    ],
    // F
    [
        [18, 20, 26, 24],
        [19, 23, 25, 21],
        [6, 9, 29, 44],
        [7, 12, 28, 41],
        [8, 15, 27, 38],
    ],
    // B
    [
        [45, 47, 53, 51],
        [46, 50, 52, 48],
        [0, 42, 35, 11],
        [1, 39, 34, 14],
        [2, 36, 33, 17],
    ],
];

/// A 3x3x3 cube tracked as 54 raw sticker colors.
///
/// Face turns never move center stickers, so the solved test is plain
/// equality with the canonical coloring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cube3x3 {
    stickers: [u8; STICKER_COUNT],
}

impl Cube3x3 {
    /// Creates a solved cube.
    pub fn new() -> Self {
        Self { stickers: SOLVED }
    }

    /// Raw sticker colors, faces in the order U, R, F, D, L, B.
    pub fn stickers(&self) -> &[u8; STICKER_COUNT] {
        &self.stickers
    }
}

impl Default for Cube3x3 {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleEnv for Cube3x3 {
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
        self.stickers == SOLVED
    }

    fn legal_actions(&self) -> Vec<ActionId> {
        (0..MOVE_COUNT as ActionId).collect()
    }

    fn step(&mut self, action: ActionId) {
        assert!(
            (action as usize) < MOVE_COUNT,
            "invalid action {action} for the 3x3 cube"
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
