//! Scramble-length curriculum and temperature annealing
//!
//! Difficulty ramps with training progress: the ceiling on scramble length
//! grows by one every `growth_interval` iterations until it hits the cap,
//! and each episode draws its scramble length uniformly between the floor
//! and the current ceiling. Sampling temperature switches from an
//! exploratory value to a sharper final value at a fixed iteration.

use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Deterministic schedule mapping an iteration to a scramble-length range.
#[derive(Debug, Clone, Copy)]
pub struct Curriculum {
    floor: usize,
    cap: usize,
    growth_interval: u32,
}

impl Curriculum {
    /// `floor` must be at least 1 and no larger than `cap`;
    /// `growth_interval` must be non-zero. Callers validate.
    pub fn new(floor: usize, cap: usize, growth_interval: u32) -> Self {
        Self {
            floor,
            cap,
            growth_interval,
        }
    }

    /// Hardest scramble length allowed at this iteration: grows by one
    /// every `growth_interval` iterations, capped.
    pub fn ceiling(&self, iteration: u32) -> usize {
        self.cap
            .min(self.floor + (iteration / self.growth_interval) as usize)
    }

    /// Draw a scramble length uniformly from `[floor, ceiling]`, inclusive
    /// on both ends.
    pub fn sample_scramble_len(&self, iteration: u32, rng: &mut ChaCha20Rng) -> usize {
        rng.gen_range(self.floor..=self.ceiling(iteration))
    }
}

/// Two-phase temperature schedule: explore early, sharpen late.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureSchedule {
    explore_temperature: f32,
    final_temperature: f32,
    anneal_threshold: u32,
}

impl TemperatureSchedule {
    pub fn new(explore_temperature: f32, final_temperature: f32, anneal_threshold: u32) -> Self {
        Self {
            explore_temperature,
            final_temperature,
            anneal_threshold,
        }
    }

    /// Temperature for a given iteration (iterations count from 1).
    pub fn temperature(&self, iteration: u32) -> f32 {
        if iteration < self.anneal_threshold {
            self.explore_temperature
        } else {
            self.final_temperature
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_ceiling_grows_every_interval() {
        let curriculum = Curriculum::new(1, 10, 400);

        assert_eq!(curriculum.ceiling(1), 1);
        assert_eq!(curriculum.ceiling(399), 1);
        assert_eq!(curriculum.ceiling(400), 2);
        assert_eq!(curriculum.ceiling(401), 2);
        assert_eq!(curriculum.ceiling(799), 2);
        assert_eq!(curriculum.ceiling(800), 3);
    }

    #[test]
    fn test_ceiling_is_capped() {
        let curriculum = Curriculum::new(1, 10, 400);

        assert_eq!(curriculum.ceiling(3600), 10);
        assert_eq!(curriculum.ceiling(100_000), 10);
    }

    #[test]
    fn test_ceiling_is_monotone() {
        let curriculum = Curriculum::new(2, 8, 100);
        let mut previous = 0;
        for iteration in (0..2000).step_by(50) {
            let ceiling = curriculum.ceiling(iteration);
            assert!(ceiling >= previous);
            previous = ceiling;
        }
    }

    #[test]
    fn test_sample_covers_inclusive_range() {
        let curriculum = Curriculum::new(1, 3, 1);
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let mut seen = [false; 4];
        for _ in 0..200 {
            let len = curriculum.sample_scramble_len(2, &mut rng);
            assert!((1..=3).contains(&len));
            seen[len] = true;
        }

        // Both endpoints must be reachable
        assert!(seen[1]);
        assert!(seen[3]);
    }

    #[test]
    fn test_sample_with_floor_equal_to_cap() {
        let curriculum = Curriculum::new(5, 5, 400);
        let mut rng = ChaCha20Rng::seed_from_u64(1);

        for iteration in [1, 500, 5000] {
            assert_eq!(curriculum.sample_scramble_len(iteration, &mut rng), 5);
        }
    }

    #[test]
    fn test_temperature_switches_at_threshold() {
        let schedule = TemperatureSchedule::new(1.0, 0.5, 1000);

        assert_eq!(schedule.temperature(1), 1.0);
        assert_eq!(schedule.temperature(999), 1.0);
        assert_eq!(schedule.temperature(1000), 0.5);
        assert_eq!(schedule.temperature(2000), 0.5);
    }
}
