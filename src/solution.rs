//! Tour and population representation.
//!
//! A [`Tour`] is a permutation of city indices with a cached cost. The cost
//! is only meaningful after the latest evaluation pass: crossover and
//! mutation produce tours with a stale (`None`) cost, and ranking treats
//! stale tours as the worst possible.

use crate::instance::{DistanceMatrix, INFEASIBLE};
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A candidate solution: one visiting order of all cities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    /// The visiting order, a permutation of `0..n`
    pub cities: Vec<usize>,
    /// Cached cyclic cost; `None` until evaluated
    pub cost: Option<f64>,
}

impl Tour {
    /// Create a tour with a stale cost
    pub fn new(cities: Vec<usize>) -> Self {
        Tour { cities, cost: None }
    }

    /// Uniformly random permutation of `0..num_cities`
    pub fn random<R: Rng + ?Sized>(num_cities: usize, rng: &mut R) -> Self {
        let mut cities: Vec<usize> = (0..num_cities).collect();
        cities.shuffle(rng);
        Tour::new(cities)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Compute and cache the cost of this tour
    pub fn evaluate(&mut self, matrix: &DistanceMatrix) -> f64 {
        let cost = matrix.tour_cost(&self.cities);
        self.cost = Some(cost);
        cost
    }

    /// Mark the cached cost as stale
    pub fn invalidate(&mut self) {
        self.cost = None;
    }

    pub fn is_evaluated(&self) -> bool {
        self.cost.is_some()
    }

    /// Whether the evaluated cost is the infeasibility sentinel
    pub fn is_feasible(&self) -> bool {
        matches!(self.cost, Some(c) if c != INFEASIBLE)
    }

    /// Cost used for ranking; stale tours rank with the sentinel
    pub fn rank_key(&self) -> OrderedFloat<f64> {
        OrderedFloat(self.cost.unwrap_or(INFEASIBLE))
    }

    /// Swap the cities at two positions and invalidate the cost
    pub fn apply_swap(&mut self, i: usize, j: usize) {
        self.cities.swap(i, j);
        self.invalidate();
    }

    /// Check that every city of `0..num_cities` appears exactly once
    pub fn is_valid_permutation(&self, num_cities: usize) -> bool {
        if self.cities.len() != num_cities {
            return false;
        }

        let mut seen = vec![false; num_cities];
        for &city in &self.cities {
            if city >= num_cities || seen[city] {
                return false;
            }
            seen[city] = true;
        }
        true
    }

    /// Cities as 1-based indices, tab separated
    pub fn one_based(&self) -> String {
        self.cities
            .iter()
            .map(|c| (c + 1).to_string())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t", self.one_based())?;
        match self.cost {
            Some(c) if c == INFEASIBLE => write!(f, "inf"),
            Some(c) => write!(f, "{:.3}", c),
            None => write!(f, "-"),
        }
    }
}

/// The set of tours evaluated and bred together in one generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    pub tours: Vec<Tour>,
}

impl Population {
    pub fn new(tours: Vec<Tour>) -> Self {
        Population { tours }
    }

    /// Population of uniformly random permutations with stale costs
    pub fn random<R: Rng + ?Sized>(size: usize, num_cities: usize, rng: &mut R) -> Self {
        Population {
            tours: (0..size).map(|_| Tour::random(num_cities, rng)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// Stable sort ascending by cost
    pub fn sort_by_cost(&mut self) {
        self.tours.sort_by_key(|tour| tour.rank_key());
    }

    /// First individual; the best one once sorted
    pub fn best(&self) -> Option<&Tour> {
        self.tours.first()
    }

    /// Minimum cost over the evaluated tours
    pub fn min_cost(&self) -> Option<f64> {
        self.tours
            .iter()
            .filter_map(|t| t.cost)
            .min_by_key(|&c| OrderedFloat(c))
    }

    pub fn feasible_count(&self) -> usize {
        self.tours.iter().filter(|t| t.is_feasible()).count()
    }

    /// Average number of differing positions between individuals,
    /// sampled over the first 20 tours
    pub fn diversity(&self) -> f64 {
        let sample = self.tours.len().min(20);
        let mut total_diff = 0.0;
        let mut count = 0;

        for i in 0..sample {
            for j in i + 1..sample {
                let diff = self.tours[i]
                    .cities
                    .iter()
                    .zip(self.tours[j].cities.iter())
                    .filter(|(a, b)| a != b)
                    .count();
                total_diff += diff as f64;
                count += 1;
            }
        }

        if count > 0 {
            total_diff / count as f64
        } else {
            0.0
        }
    }

    /// Printable listing of at most `limit` individuals
    pub fn summary(&self, limit: usize) -> String {
        self.tours
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, tour)| format!("{} ) {}\n", i, tour))
            .collect()
    }
}
