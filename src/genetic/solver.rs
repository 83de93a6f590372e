//! Generation loop.
//!
//! Every generation runs evaluate -> rank -> record, then (unless it was
//! the last one) breed -> mutate. Evaluation is delegated to the
//! [`Coordinator`], everything else happens on the calling thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::cluster::Coordinator;
use crate::config::GAConfig;
use crate::error::{Result, SolverError};
use crate::genetic::crossover::single_point_crossover;
use crate::genetic::mutation::SwapMutation;
use crate::instance::DistanceMatrix;
use crate::solution::{Population, Tour};

/// Result of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOutcome {
    /// Best individual of the final ranked population
    pub best: Tour,
    /// Minimum cost of every generation, in order
    pub history: Vec<f64>,
    /// Final ranked population
    #[serde(skip)]
    pub final_population: Population,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Distributed genetic algorithm
pub struct GeneticSolver {
    config: GAConfig,
    coordinator: Coordinator,
    population: Population,
    mutation: SwapMutation,
    rng: ChaCha8Rng,
    history: Vec<f64>,
    generation: usize,
}

impl GeneticSolver {
    /// Validate the configuration, spawn the workers and broadcast the matrix.
    pub fn new(matrix: Arc<DistanceMatrix>, config: GAConfig) -> Result<Self> {
        config.validate()?;
        config.validate_dimension(matrix.dimension)?;
        let coordinator = Coordinator::new(matrix, &config)?;
        Ok(Self::with_coordinator(config, coordinator))
    }

    /// Build a solver around an existing coordinator
    pub fn with_coordinator(config: GAConfig, coordinator: Coordinator) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mutation = SwapMutation::new(config.initial_mutations, config.mutation_decay);
        let history = Vec::with_capacity(config.generations);

        GeneticSolver {
            config,
            coordinator,
            population: Population::default(),
            mutation,
            rng,
            history,
            generation: 0,
        }
    }

    /// Replace the population with random permutations
    fn initialize_population(&mut self) {
        self.population = Population::random(
            self.config.population_size,
            self.config.num_cities,
            &mut self.rng,
        );
        self.history.clear();
        self.generation = 0;
    }

    /// Build a replacement population of the same size from ranked parents
    fn breed(&mut self) {
        let size = self.population.len();
        let mut next = Vec::with_capacity(size);

        for _ in 0..size / 2 {
            let (first, second) = self.config.selection.select(size, &mut self.rng);
            let (child1, child2) = single_point_crossover(
                &self.population.tours[first].cities,
                &self.population.tours[second].cities,
                &mut self.rng,
            );
            next.push(child1);
            next.push(child2);
        }

        self.population = Population::new(next);
    }

    /// Run every generation and return the final ranking.
    pub fn run(&mut self) -> Result<SolverOutcome> {
        let start = Instant::now();
        self.initialize_population();

        loop {
            self.coordinator
                .evaluate(&mut self.population, self.generation)?;
            self.population.sort_by_cost();

            let best_cost = self
                .population
                .best()
                .and_then(|t| t.cost)
                .ok_or_else(|| SolverError::InvalidConfig("empty population".to_string()))?;
            self.history.push(best_cost);
            self.generation += 1;

            log::info!(
                "[GA] Gen {}  Best cost {:.3}  Feasible {}/{}  Diversity {:.2}  Elapsed {:.2}s",
                self.generation,
                best_cost,
                self.population.feasible_count(),
                self.population.len(),
                self.population.diversity(),
                start.elapsed().as_secs_f64()
            );

            if self.generation >= self.config.generations {
                break;
            }

            self.breed();
            let mutated = self.mutation.apply(&mut self.population, &mut self.rng);
            log::debug!(
                "[GA] Mutated {} individuals, budget now {:.3}",
                mutated,
                self.mutation.budget()
            );
        }

        let best = self
            .population
            .best()
            .cloned()
            .ok_or_else(|| SolverError::InvalidConfig("empty population".to_string()))?;

        Ok(SolverOutcome {
            best,
            history: self.history.clone(),
            final_population: self.population.clone(),
            elapsed: start.elapsed(),
        })
    }

    /// Minimum cost per completed generation
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of completed generations
    pub fn current_generation(&self) -> usize {
        self.generation
    }

    pub fn config(&self) -> &GAConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetic::selection::SelectionStrategy;
    use crate::instance::INFEASIBLE;

    /// Cities on a line: the optimal cycle costs 2 * (n - 1)
    fn line_matrix(n: usize) -> Arc<DistanceMatrix> {
        let costs = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        Arc::new(DistanceMatrix::new(costs).unwrap())
    }

    fn small_config(selection: SelectionStrategy) -> GAConfig {
        GAConfig {
            num_cities: 6,
            population_size: 40,
            generations: 15,
            workers: 4,
            selection,
            local_threads: Some(2),
            seed: 17,
            ..Default::default()
        }
    }

    #[test]
    fn test_history_has_one_entry_per_generation() {
        for selection in [
            SelectionStrategy::Random,
            SelectionStrategy::Rank,
            SelectionStrategy::Tournament,
        ] {
            let config = small_config(selection);
            let mut solver = GeneticSolver::new(line_matrix(6), config).unwrap();
            let outcome = solver.run().unwrap();

            assert_eq!(outcome.history.len(), 15);
            assert_eq!(solver.current_generation(), 15);
            assert!(outcome.best.is_valid_permutation(6));
            assert_eq!(outcome.best.cost, Some(*outcome.history.last().unwrap()));
            assert!(outcome.history.iter().all(|&c| c >= 10.0));
        }
    }

    #[test]
    fn test_last_entry_is_minimum_of_final_population() {
        let matrix = line_matrix(6);
        let mut solver = GeneticSolver::new(Arc::clone(&matrix), small_config(SelectionStrategy::Random)).unwrap();
        let outcome = solver.run().unwrap();

        let final_min = outcome
            .final_population
            .tours
            .iter()
            .map(|t| matrix.tour_cost(&t.cities))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(*outcome.history.last().unwrap(), final_min);
        assert_eq!(outcome.final_population.len(), 40);
        assert!(outcome
            .final_population
            .tours
            .windows(2)
            .all(|w| w[0].rank_key() <= w[1].rank_key()));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let first = GeneticSolver::new(line_matrix(6), small_config(SelectionStrategy::Rank))
            .unwrap()
            .run()
            .unwrap();
        let second = GeneticSolver::new(line_matrix(6), small_config(SelectionStrategy::Rank))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(first.history, second.history);
        assert_eq!(first.best.cities, second.best.cities);
    }

    #[test]
    fn test_infeasible_tours_rank_last() {
        let mut matrix = DistanceMatrix::uniform(4, 1.0);
        matrix.costs[0][1] = INFEASIBLE;
        let config = GAConfig {
            num_cities: 4,
            population_size: 8,
            generations: 3,
            workers: 2,
            local_threads: Some(1),
            ..Default::default()
        };
        let mut solver = GeneticSolver::new(Arc::new(matrix), config).unwrap();
        let outcome = solver.run().unwrap();

        let costs: Vec<f64> = outcome
            .final_population
            .tours
            .iter()
            .map(|t| t.cost.unwrap())
            .collect();
        assert!(costs.iter().all(|&c| c == 4.0 || c == INFEASIBLE));
        let first_infeasible = costs.iter().position(|&c| c == INFEASIBLE).unwrap_or(costs.len());
        assert!(costs[first_infeasible..].iter().all(|&c| c == INFEASIBLE));
    }

    #[test]
    fn test_invalid_configuration_fails_before_running() {
        let config = GAConfig {
            population_size: 10,
            workers: 4,
            ..Default::default()
        };
        let err = GeneticSolver::new(line_matrix(6), config).err().unwrap();
        assert!(err.is_config_error());

        let config = GAConfig { num_cities: 9, ..small_config(SelectionStrategy::Random) };
        assert!(GeneticSolver::new(line_matrix(6), config).is_err());
    }
}
