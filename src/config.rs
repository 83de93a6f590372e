//! Solver configuration.
//!
//! A [`GAConfig`] is built once at startup, validated, and then shared
//! read-only by every component.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::genetic::selection::SelectionStrategy;

/// Genetic Algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GAConfig {
    /// Tour length (number of cities)
    pub num_cities: usize,
    /// Population size, even and divisible by `workers`
    pub population_size: usize,
    /// Number of generations
    pub generations: usize,
    /// Evaluation participants, the coordinator included
    pub workers: usize,
    /// Parent selection strategy
    pub selection: SelectionStrategy,
    /// Initial mutation budget (individuals mutated in the first generation)
    pub initial_mutations: f64,
    /// Multiplicative decay applied to the budget after each mutation
    pub mutation_decay: f64,
    /// Random seed
    pub seed: u64,
    /// Threads for the coordinator's local shard (None = rayon default)
    pub local_threads: Option<usize>,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            num_cities: 6,
            population_size: 1600,
            generations: 10,
            workers: 32,
            selection: SelectionStrategy::Random,
            initial_mutations: 5.0,
            mutation_decay: 0.95,
            seed: 42,
            local_threads: None,
        }
    }
}

impl GAConfig {
    /// Number of individuals evaluated by each participant
    pub fn shard_size(&self) -> usize {
        self.population_size / self.workers
    }

    /// Reject configurations the generation loop cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.num_cities < 2 {
            return Err(SolverError::InvalidConfig(format!(
                "tour length must be at least 2, got {}",
                self.num_cities
            )));
        }
        if self.population_size < 2 {
            return Err(SolverError::InvalidConfig(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.population_size % 2 != 0 {
            return Err(SolverError::OddPopulation {
                size: self.population_size,
            });
        }
        if self.selection == SelectionStrategy::Random && self.population_size < 4 {
            return Err(SolverError::InvalidConfig(format!(
                "random selection pairs within the top half and needs a population of at least 4, got {}",
                self.population_size
            )));
        }
        if self.workers == 0 {
            return Err(SolverError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.population_size % self.workers != 0 {
            return Err(SolverError::IndivisiblePopulation {
                size: self.population_size,
                workers: self.workers,
            });
        }
        if self.generations == 0 {
            return Err(SolverError::InvalidConfig(
                "generation count must be at least 1".to_string(),
            ));
        }
        if !(self.initial_mutations >= 0.0 && self.initial_mutations.is_finite()) {
            return Err(SolverError::InvalidConfig(format!(
                "initial mutation count must be a non-negative number, got {}",
                self.initial_mutations
            )));
        }
        if !(self.mutation_decay > 0.0 && self.mutation_decay <= 1.0) {
            return Err(SolverError::InvalidConfig(format!(
                "mutation decay must be in (0, 1], got {}",
                self.mutation_decay
            )));
        }
        if self.local_threads == Some(0) {
            return Err(SolverError::InvalidConfig(
                "local thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that the matrix covers every city of the tour
    pub fn validate_dimension(&self, matrix_dimension: usize) -> Result<()> {
        if matrix_dimension < self.num_cities {
            return Err(SolverError::InvalidConfig(format!(
                "tour length {} exceeds the {}x{} distance matrix",
                self.num_cities, matrix_dimension, matrix_dimension
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for GAConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cities: {}", self.num_cities)?;
        writeln!(f, "Selection strategy: {}", self.selection)?;
        writeln!(f, "Mutations (initial): {:.3}", self.initial_mutations)?;
        writeln!(f, "Population size: {}", self.population_size)?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Workers: {}", self.workers)?;
        match self.local_threads {
            Some(n) => writeln!(f, "Local threads: {}", n)?,
            None => writeln!(f, "Local threads: default")?,
        }
        writeln!(f, "Seed: {}", self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GAConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shard_size(), 50);
    }

    #[test]
    fn test_odd_population_rejected() {
        let config = GAConfig {
            population_size: 9,
            workers: 3,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SolverError::OddPopulation { size: 9 }));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_indivisible_population_rejected() {
        let config = GAConfig {
            population_size: 10,
            workers: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SolverError::IndivisiblePopulation { size: 10, workers: 4 })
        ));
    }

    #[test]
    fn test_degenerate_values_rejected() {
        let cases = vec![
            GAConfig { num_cities: 1, ..Default::default() },
            GAConfig { workers: 0, ..Default::default() },
            GAConfig { generations: 0, ..Default::default() },
            GAConfig { initial_mutations: -1.0, ..Default::default() },
            GAConfig { mutation_decay: 1.5, ..Default::default() },
            GAConfig { local_threads: Some(0), ..Default::default() },
        ];
        for config in cases {
            assert!(config.validate().unwrap_err().is_config_error());
        }
    }

    #[test]
    fn test_matrix_must_cover_tour() {
        let config = GAConfig { num_cities: 8, ..Default::default() };
        assert!(config.validate_dimension(8).is_ok());
        assert!(config.validate_dimension(5).is_err());
    }
}
