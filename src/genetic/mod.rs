//! Genetic algorithm for the TSP.
//!
//! This module exports the genetic operators and the generation loop
//! that drives them.

pub mod crossover;
pub mod mutation;
pub mod selection;
pub mod solver;

pub use crossover::*;
pub use mutation::*;
pub use selection::*;
pub use solver::*;
