//! Swap mutation with a decaying budget.

use rand::Rng;

use crate::solution::{Population, Tour};

/// Swap mutation applied to a shrinking number of individuals.
///
/// The budget is shared by every generation of a run: each mutated
/// individual multiplies it by `decay`, and the loop bound is re-read after
/// every mutation. It tends to zero without ever reaching it.
#[derive(Debug, Clone)]
pub struct SwapMutation {
    budget: f64,
    decay: f64,
}

impl SwapMutation {
    pub fn new(initial_budget: f64, decay: f64) -> Self {
        SwapMutation {
            budget: initial_budget,
            decay,
        }
    }

    /// Current (fractional) budget
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Mutate randomly chosen individuals, returning how many were mutated.
    pub fn apply<R: Rng + ?Sized>(&mut self, population: &mut Population, rng: &mut R) -> usize {
        if population.is_empty() {
            return 0;
        }

        let mut mutated = 0;
        while mutated < self.budget as usize {
            let target = rng.gen_range(0..population.len());
            mutate_swap(&mut population.tours[target], rng);
            self.budget *= self.decay;
            mutated += 1;
        }
        mutated
    }
}

/// Exchange two distinct random positions of a tour.
pub fn mutate_swap<R: Rng + ?Sized>(tour: &mut Tour, rng: &mut R) {
    let n = tour.len();
    if n < 2 {
        return;
    }

    loop {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        if i != j {
            tour.apply_swap(i, j);
            return;
        }
    }
}
