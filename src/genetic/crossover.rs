//! Single-point crossover with paired duplicate repair.

use rand::Rng;

use crate::solution::Tour;

/// Recombine two parents around a random cut point in `[1, n - 1]`.
///
/// Both children come back with a stale cost.
pub fn single_point_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Tour, Tour) {
    let n = parent1.len();
    debug_assert_eq!(n, parent2.len());
    if n < 2 {
        return (Tour::new(parent1.to_vec()), Tour::new(parent2.to_vec()));
    }

    let cut = rng.gen_range(1..n);
    let (child1, child2) = crossover_at(parent1, parent2, cut);
    (Tour::new(child1), Tour::new(child2))
}

/// Crossover at a fixed cut point.
///
/// Child 1 takes parent 1's prefix and parent 2's suffix, child 2 the
/// reverse. A city of a child's prefix that reappears in its suffix is a
/// duplicate; the suffix positions of the duplicates are collected for
/// both children before any swap, and the k-th duplicate slot of child 1
/// is exchanged with the k-th duplicate slot of child 2. Both children
/// hold the same number of duplicates, and child 1's duplicates are
/// exactly the cities child 2 is missing (and vice versa), so the paired
/// swaps restore two permutations.
pub fn crossover_at(parent1: &[usize], parent2: &[usize], cut: usize) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();

    let mut child1 = Vec::with_capacity(n);
    child1.extend_from_slice(&parent1[..cut]);
    child1.extend_from_slice(&parent2[cut..]);

    let mut child2 = Vec::with_capacity(n);
    child2.extend_from_slice(&parent2[..cut]);
    child2.extend_from_slice(&parent1[cut..]);

    let duplicates1 = suffix_duplicates(&child1, cut);
    let duplicates2 = suffix_duplicates(&child2, cut);
    debug_assert_eq!(duplicates1.len(), duplicates2.len());

    for (&i, &j) in duplicates1.iter().zip(duplicates2.iter()) {
        std::mem::swap(&mut child1[i], &mut child2[j]);
    }

    (child1, child2)
}

/// Positions in `child[cut..]` holding a city already present in `child[..cut]`,
/// listed in prefix order.
fn suffix_duplicates(child: &[usize], cut: usize) -> Vec<usize> {
    let (prefix, suffix) = child.split_at(cut);
    prefix
        .iter()
        .filter_map(|city| suffix.iter().position(|c| c == city).map(|p| cut + p))
        .collect()
}
