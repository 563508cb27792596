//! MCTS configuration parameters.

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Exploration constant in the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Depth at which a simulation gives up and scores the path as
    /// unsolved (-1). Keeps simulations finite on puzzles whose state
    /// graph has no terminal sinks besides the goal.
    pub max_depth: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 200,
            c_puct: 1.5,
            max_depth: 100,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.5,
            max_depth: 100,
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set the c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set the simulation depth limit.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 200);
        assert!((config.c_puct - 1.5).abs() < 1e-6);
        assert_eq!(config.max_depth, 100);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_simulations(100)
            .with_c_puct(2.0)
            .with_max_depth(40);

        assert_eq!(config.num_simulations, 100);
        assert!((config.c_puct - 2.0).abs() < 1e-6);
        assert_eq!(config.max_depth, 40);
    }

    #[test]
    fn test_testing_config_is_smaller() {
        let config = MctsConfig::for_testing();
        assert!(config.num_simulations < MctsConfig::default().num_simulations);
    }
}
