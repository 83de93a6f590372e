//! Module for loading and representing TSP distance matrices.
//!
//! The input is a plain stream of whitespace-separated costs in row-major
//! order. The literal `-1` marks a missing edge and is stored as
//! [`INFEASIBLE`]. The matrix is built once and shared read-only by every
//! participant of the evaluation round.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Cost of an absent edge, and of any tour that uses one.
///
/// It is the largest representable cost so infeasible tours always rank last.
pub const INFEASIBLE: f64 = f64::INFINITY;

/// Input token that denotes a missing edge.
const MISSING_EDGE: f64 = -1.0;

/// Square table of edge costs indexed by (from, to).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrix {
    /// Number of cities
    pub dimension: usize,
    /// Row-major costs; `costs[i][j]` is the cost of travelling i -> j
    pub costs: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build a matrix from explicit rows. Rows must be square and costs
    /// non-negative (or [`INFEASIBLE`]).
    pub fn new(costs: Vec<Vec<f64>>) -> Result<Self> {
        let dimension = costs.len();
        for (i, row) in costs.iter().enumerate() {
            if row.len() != dimension {
                return Err(SolverError::MalformedMatrix(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            if let Some(j) = row.iter().position(|&c| c.is_nan() || c < 0.0) {
                return Err(SolverError::MalformedMatrix(format!(
                    "negative or NaN cost {} at ({}, {})",
                    row[j], i, j
                )));
            }
        }

        Ok(DistanceMatrix { dimension, costs })
    }

    /// Matrix where every off-diagonal edge costs `cost`.
    pub fn uniform(dimension: usize, cost: f64) -> Self {
        let mut costs = vec![vec![cost; dimension]; dimension];
        for (i, row) in costs.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        DistanceMatrix { dimension, costs }
    }

    /// Load a matrix from a file. See [`DistanceMatrix::from_reader`].
    pub fn from_file<P: AsRef<Path>>(path: P, dimension: Option<usize>) -> Result<Self> {
        let file = File::open(&path)?;
        Self::from_reader(BufReader::new(file), dimension)
    }

    /// Parse a matrix from whitespace-separated costs in row-major order.
    ///
    /// With `Some(n)` exactly `n * n` values are consumed and anything after
    /// them is ignored. With `None` the whole stream is read and its token
    /// count must be a perfect square.
    pub fn from_reader<R: Read>(mut reader: R, dimension: Option<usize>) -> Result<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        let tokens: Vec<&str> = input.split_whitespace().collect();

        let dimension = match dimension {
            Some(n) => n,
            None => infer_dimension(tokens.len())?,
        };
        if dimension == 0 {
            return Err(SolverError::MalformedMatrix("empty matrix".to_string()));
        }

        let required = dimension * dimension;
        if tokens.len() < required {
            return Err(SolverError::MalformedMatrix(format!(
                "expected {} values for a {}x{} matrix, found {}",
                required,
                dimension,
                dimension,
                tokens.len()
            )));
        }
        if tokens.len() > required {
            log::warn!(
                "Ignoring {} trailing values after the {}x{} matrix",
                tokens.len() - required,
                dimension,
                dimension
            );
        }

        let mut costs = vec![vec![0.0; dimension]; dimension];
        for (k, token) in tokens.iter().take(required).enumerate() {
            let (i, j) = (k / dimension, k % dimension);
            let value: f64 = token.parse().map_err(|_| {
                SolverError::MalformedMatrix(format!("invalid cost {:?} at ({}, {})", token, i, j))
            })?;

            costs[i][j] = if value == MISSING_EDGE {
                INFEASIBLE
            } else if value < 0.0 || value.is_nan() {
                return Err(SolverError::MalformedMatrix(format!(
                    "negative cost {} at ({}, {})",
                    value, i, j
                )));
            } else {
                value
            };
        }

        Ok(DistanceMatrix { dimension, costs })
    }

    /// Get the cost of the edge from -> to
    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.costs[from][to]
    }

    /// Whether the edge from -> to exists
    #[inline]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.costs[from][to] != INFEASIBLE
    }

    /// Cyclic cost of a tour, or [`INFEASIBLE`] as soon as one edge is missing.
    ///
    /// The wrap-around edge (last -> first) is checked first, then every
    /// consecutive pair in order. No partial sum is ever returned.
    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        let n = tour.len();
        if n < 2 {
            return 0.0;
        }

        let mut cost = self.distance(tour[n - 1], tour[0]);
        if cost == INFEASIBLE {
            return INFEASIBLE;
        }

        for pair in tour.windows(2) {
            let edge = self.distance(pair[0], pair[1]);
            if edge == INFEASIBLE {
                return INFEASIBLE;
            }
            cost += edge;
        }

        cost
    }

    /// Get statistics about the matrix
    pub fn statistics(&self) -> MatrixStatistics {
        let mut feasible: Vec<f64> = Vec::new();
        let mut infeasible_edges = 0;
        for i in 0..self.dimension {
            for j in 0..self.dimension {
                if i == j {
                    continue;
                }
                if self.has_edge(i, j) {
                    feasible.push(self.distance(i, j));
                } else {
                    infeasible_edges += 1;
                }
            }
        }

        let avg_cost = if feasible.is_empty() {
            0.0
        } else {
            feasible.iter().sum::<f64>() / feasible.len() as f64
        };

        MatrixStatistics {
            dimension: self.dimension,
            feasible_edges: feasible.len(),
            infeasible_edges,
            avg_cost,
            min_cost: feasible.iter().cloned().fold(f64::INFINITY, f64::min),
            max_cost: feasible.iter().cloned().fold(0.0, f64::max),
        }
    }
}

fn infer_dimension(tokens: usize) -> Result<usize> {
    let n = (tokens as f64).sqrt().round() as usize;
    if n * n != tokens {
        return Err(SolverError::MalformedMatrix(format!(
            "{} values do not form a square matrix",
            tokens
        )));
    }
    Ok(n)
}

impl std::fmt::Display for DistanceMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.costs {
            for &cost in row {
                if cost == INFEASIBLE {
                    write!(f, "inf\t")?;
                } else {
                    write!(f, "{:.3}\t", cost)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Statistics about a distance matrix (diagonal excluded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixStatistics {
    pub dimension: usize,
    pub feasible_edges: usize,
    pub infeasible_edges: usize,
    pub avg_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
}

impl std::fmt::Display for MatrixStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix: {}x{}", self.dimension, self.dimension)?;
        writeln!(f, "  Feasible edges: {}", self.feasible_edges)?;
        writeln!(f, "  Missing edges: {}", self.infeasible_edges)?;
        writeln!(f, "  Avg cost: {:.2}", self.avg_cost)?;
        writeln!(f, "  Min cost: {:.2}", self.min_cost)?;
        writeln!(f, "  Max cost: {:.2}", self.max_cost)
    }
}
