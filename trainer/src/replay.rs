//! Bounded FIFO replay buffer
//!
//! Holds the most recent self-play samples in memory. Once the capacity is
//! reached the oldest samples are evicted first, so the buffer always
//! reflects the newest network's behaviour. Batches are drawn uniformly
//! without replacement.

use mcts::TrainingSample;
use rand::seq::index;
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;
use tracing::trace;

use crate::selfplay::Episode;

pub struct ReplayBuffer {
    samples: VecDeque<TrainingSample>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append every step of an episode, evicting the oldest samples once
    /// the buffer is full.
    pub fn push_episode(&mut self, episode: &Episode) {
        for step in &episode.steps {
            if self.samples.len() == self.capacity {
                self.samples.pop_front();
            }
            self.samples.push_back(step.clone());
        }

        trace!(
            added = episode.steps.len(),
            total = self.samples.len(),
            "Pushed episode into replay buffer"
        );
    }

    /// Draw `batch_size` distinct samples uniformly at random.
    ///
    /// Callers must hold off until `len() >= batch_size`; the buffer never
    /// produces partial batches.
    pub fn sample_batch(&self, batch_size: usize, rng: &mut ChaCha20Rng) -> Vec<TrainingSample> {
        index::sample(rng, self.samples.len(), batch_size)
            .iter()
            .map(|i| self.samples[i].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[allow(dead_code)] // Used in tests
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    /// Episode whose steps carry one-element marker embeddings, so tests
    /// can track which samples survive eviction.
    fn marked_episode(markers: &[f32]) -> Episode {
        let steps = markers
            .iter()
            .map(|&m| TrainingSample {
                embedding: vec![m],
                policy: vec![1.0],
                outcome: -1.0,
            })
            .collect();
        Episode {
            steps,
            solved: false,
            moves_taken: markers.len() as u32,
            outcome: -1.0,
        }
    }

    fn markers_of(buffer: &ReplayBuffer) -> Vec<f32> {
        buffer.samples.iter().map(|s| s.embedding[0]).collect()
    }

    #[test]
    fn test_push_episode_appends_all_steps() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.push_episode(&marked_episode(&[1.0, 2.0, 3.0]));

        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_empty());
        assert_eq!(markers_of(&buffer), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_eviction_drops_oldest_first() {
        let mut buffer = ReplayBuffer::new(4);
        buffer.push_episode(&marked_episode(&[1.0, 2.0, 3.0]));
        buffer.push_episode(&marked_episode(&[4.0, 5.0, 6.0]));

        assert_eq!(buffer.len(), 4);
        assert_eq!(markers_of(&buffer), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_episode_longer_than_capacity_keeps_tail() {
        let mut buffer = ReplayBuffer::new(2);
        buffer.push_episode(&marked_episode(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        assert_eq!(buffer.len(), 2);
        assert_eq!(markers_of(&buffer), vec![4.0, 5.0]);
    }

    #[test]
    fn test_sample_batch_is_without_replacement() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.push_episode(&marked_episode(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let batch = buffer.sample_batch(6, &mut rng);

        let mut seen: Vec<f32> = batch.iter().map(|s| s.embedding[0]).collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sample_batch_smaller_than_buffer() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.push_episode(&marked_episode(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let mut rng = ChaCha20Rng::seed_from_u64(7);

        let batch = buffer.sample_batch(2, &mut rng);

        assert_eq!(batch.len(), 2);
        assert_ne!(batch[0].embedding[0], batch[1].embedding[0]);
    }

    #[test]
    fn test_capacity_is_reported() {
        let buffer = ReplayBuffer::new(128);
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
    }
}
