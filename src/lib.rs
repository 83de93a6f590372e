//! Distributed Genetic Algorithm TSP Solver Library
//!
//! Evolves a fixed-size population of tours over a fixed number of
//! generations. Fitness evaluation is spread over a coordinator and a
//! fleet of worker threads; selection, crossover and mutation run on the
//! coordinator between rounds.
//!
//! # Features
//!
//! - Distance matrices with missing edges (infeasible tours rank last)
//! - Sharded evaluation with a per-generation barrier, local shard on rayon
//! - Random, rank-weighted and tournament parent selection
//! - Single-point crossover with duplicate repair, decaying swap mutation
//! - Matlab/Octave convergence report and CSV history export
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ga_tsp_cluster::config::GAConfig;
//! use ga_tsp_cluster::genetic::{GeneticSolver, SelectionStrategy};
//! use ga_tsp_cluster::instance::DistanceMatrix;
//!
//! let matrix = DistanceMatrix::from_file("distances.txt", None).unwrap();
//! let config = GAConfig {
//!     num_cities: matrix.dimension,
//!     population_size: 400,
//!     workers: 4,
//!     selection: SelectionStrategy::Rank,
//!     ..Default::default()
//! };
//!
//! let mut solver = GeneticSolver::new(Arc::new(matrix), config).unwrap();
//! let outcome = solver.run().unwrap();
//!
//! println!("Best tour: {}", outcome.best);
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod genetic;
pub mod instance;
pub mod report;
pub mod solution;

pub use config::GAConfig;
pub use error::{Result, SolverError};
pub use instance::{DistanceMatrix, INFEASIBLE};
pub use solution::{Population, Tour};
