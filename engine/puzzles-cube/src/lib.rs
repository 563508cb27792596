//! Rubik's cube environments for the search/training stack.
//!
//! Two puzzle families live here: the standard 3x3x3 cube ([`Cube3x3`]) and
//! the 2x2x2 pocket cube ([`Cube2x2`]). Both track raw sticker colors and
//! share the same 18-move action table in face-turn notation.
//!
//! # Example
//!
//! ```
//! use puzzle_core::PuzzleEnv;
//! use puzzles_cube::Cube3x3;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut cube = Cube3x3::new();
//! assert!(cube.is_solved());
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//! cube.scramble(5, &mut rng);
//! assert_eq!(cube.state_embedding().len(), 324);
//! ```

mod cube2;
mod cube3;

pub use cube2::Cube2x2;
pub use cube3::Cube3x3;

use puzzle_core::ActionId;

/// Number of moves in the action table, shared by both cube sizes.
pub const MOVE_COUNT: usize = 18;

/// Number of face colors.
pub const COLOR_COUNT: usize = 6;

/// Move labels in action-id order. Faces appear in the order U, D, L, R,
/// F, B, each contributing a clockwise quarter turn, a counterclockwise
/// quarter turn, and a half turn.
pub const MOVE_LABELS: [&str; MOVE_COUNT] = [
    "U", "U'", "U2", "D", "D'", "D2", "L", "L'", "L2", "R", "R'", "R2", "F", "F'", "F2", "B",
    "B'", "B2",
];

/// The move that undoes `action`: quarter turns pair with their primes,
/// half turns undo themselves.
pub fn inverse_action(action: ActionId) -> ActionId {
    assert!((action as usize) < MOVE_COUNT, "invalid action {action}");
    match action % 3 {
        0 => action + 1,
        1 => action - 1,
        _ => action,
    }
}

/// One 4-cycle of sticker positions: the sticker at `[0]` moves to `[1]`,
/// `[1]` to `[2]`, `[2]` to `[3]`, and `[3]` wraps back to `[0]`.
pub(crate) type FourCycle = [usize; 4];

/// Row index into a cycle table for a move id. Moves come in groups of
/// three per face.
pub(crate) fn move_face(action: ActionId) -> usize {
    action as usize / 3
}

/// How many times a move applies its face's clockwise quarter-turn cycles:
/// once for a quarter turn, three times for a prime, twice for a half turn.
pub(crate) fn move_repeats(action: ActionId) -> usize {
    match action % 3 {
        0 => 1,
        1 => 3,
        _ => 2,
    }
}

/// Applies the cycles of one clockwise quarter turn `repeats` times.
pub(crate) fn apply_cycles<const N: usize>(
    stickers: &mut [u8; N],
    cycles: &[FourCycle],
    repeats: usize,
) {
    for _ in 0..repeats {
        for cycle in cycles {
            let wrapped = stickers[cycle[3]];
            stickers[cycle[3]] = stickers[cycle[2]];
            stickers[cycle[2]] = stickers[cycle[1]];
            stickers[cycle[1]] = stickers[cycle[0]];
            stickers[cycle[0]] = wrapped;
        }
    }
}

/// One-hot color encoding: `COLOR_COUNT` floats per sticker, a single 1.0
/// at the sticker's color index.
pub(crate) fn one_hot_embedding(stickers: &[u8]) -> Vec<f32> {
    let mut embedding = vec![0.0; stickers.len() * COLOR_COUNT];
    for (i, &color) in stickers.iter().enumerate() {
        embedding[i * COLOR_COUNT + color as usize] = 1.0;
    }
    embedding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_every_face_and_turn_direction() {
        assert_eq!(MOVE_LABELS.len(), MOVE_COUNT);
        for face in 0..6 {
            let base = MOVE_LABELS[face * 3];
            assert_eq!(MOVE_LABELS[face * 3 + 1], format!("{base}'"));
            assert_eq!(MOVE_LABELS[face * 3 + 2], format!("{base}2"));
        }
    }

    #[test]
    fn inverse_action_pairs_quarters_and_fixes_half_turns() {
        for action in 0..MOVE_COUNT as ActionId {
            let inverse = inverse_action(action);
            assert_eq!(inverse_action(inverse), action);
            match action % 3 {
                0 => assert_eq!(inverse, action + 1),
                1 => assert_eq!(inverse, action - 1),
                _ => assert_eq!(inverse, action),
            }
        }
    }

    #[test]
    #[should_panic(expected = "invalid action")]
    fn inverse_action_rejects_out_of_range_ids() {
        inverse_action(18);
    }

    #[test]
    fn one_hot_embedding_marks_exactly_one_color_per_sticker() {
        let embedding = one_hot_embedding(&[0, 3, 5]);
        assert_eq!(embedding.len(), 3 * COLOR_COUNT);
        assert_eq!(embedding[0], 1.0);
        assert_eq!(embedding[COLOR_COUNT + 3], 1.0);
        assert_eq!(embedding[2 * COLOR_COUNT + 5], 1.0);
        assert_eq!(embedding.iter().sum::<f32>(), 3.0);
    }
}
