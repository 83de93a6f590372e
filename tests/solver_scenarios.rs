//! End-to-end scenarios for the distributed solver.

use std::sync::Arc;

use ga_tsp_cluster::cluster::{Coordinator, ShardRange};
use ga_tsp_cluster::genetic::{GeneticSolver, SelectionStrategy, SolverOutcome};
use ga_tsp_cluster::report;
use ga_tsp_cluster::{DistanceMatrix, GAConfig, Population, Tour, INFEASIBLE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Every permutation of `0..n`
fn permutations(n: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return vec![Vec::new()];
    }
    let mut result = Vec::new();
    for perm in permutations(n - 1) {
        for pos in 0..=perm.len() {
            let mut next = perm.clone();
            next.insert(pos, n - 1);
            result.push(next);
        }
    }
    result
}

fn uses_edge(tour: &[usize], from: usize, to: usize) -> bool {
    let n = tour.len();
    (0..n).any(|i| tour[i] == from && tour[(i + 1) % n] == to)
}

/// Ring of `n` cities one unit apart, plus 10 for every chord
fn ring_matrix(n: usize) -> DistanceMatrix {
    let costs = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else if (i + 1) % n == j || (j + 1) % n == i {
                        1.0
                    } else {
                        10.0
                    }
                })
                .collect()
        })
        .collect();
    DistanceMatrix::new(costs).unwrap()
}

#[test]
fn missing_edge_scenario_over_all_tours() {
    let input = "0 -1 1 1\n1 0 1 1\n1 1 0 1\n1 1 1 0\n";
    let matrix = DistanceMatrix::from_reader(input.as_bytes(), Some(4)).unwrap();

    let tours = permutations(4);
    assert_eq!(tours.len(), 24);
    for tour in tours {
        let cost = matrix.tour_cost(&tour);
        if uses_edge(&tour, 0, 1) {
            assert_eq!(cost, INFEASIBLE, "{:?}", tour);
        } else {
            assert_eq!(cost, 4.0, "{:?}", tour);
        }
    }
}

#[test]
fn two_participants_evaluate_eight_individuals_in_order() {
    let matrix = Arc::new(ring_matrix(5));
    let config = GAConfig {
        num_cities: 5,
        population_size: 8,
        workers: 2,
        local_threads: Some(2),
        ..Default::default()
    };
    let mut coordinator = Coordinator::new(Arc::clone(&matrix), &config).unwrap();
    assert_eq!(
        coordinator.shards(),
        &[
            ShardRange { index: 0, start: 0, len: 4 },
            ShardRange { index: 1, start: 4, len: 4 },
        ]
    );

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut population = Population::random(8, 5, &mut rng);
    let before: Vec<Tour> = population.tours.clone();

    coordinator.evaluate(&mut population, 0).unwrap();

    assert_eq!(population.len(), 8);
    for (original, evaluated) in before.iter().zip(population.tours.iter()) {
        assert_eq!(original.cities, evaluated.cities);
        assert_eq!(evaluated.cost, Some(matrix.tour_cost(&evaluated.cities)));
    }
}

#[test]
fn full_run_produces_report_for_every_generation() {
    let matrix = Arc::new(ring_matrix(8));
    let config = GAConfig {
        num_cities: 8,
        population_size: 64,
        generations: 25,
        workers: 4,
        selection: SelectionStrategy::Tournament,
        initial_mutations: 8.0,
        local_threads: Some(2),
        seed: 2024,
        ..Default::default()
    };
    let mut solver = GeneticSolver::new(matrix, config).unwrap();
    let outcome = solver.run().unwrap();

    assert_eq!(outcome.history.len(), 25);
    assert!(outcome.best.is_valid_permutation(8));
    // the ring itself is optimal
    assert!(outcome.history.iter().all(|&c| c >= 8.0));

    let mut script = Vec::new();
    report::write_report(&outcome.history, &mut script).unwrap();
    let script = String::from_utf8(script).unwrap();
    assert!(script.contains("generation(25)="));
    assert!(script.trim_end().ends_with("figure,plot(1:25,generation);"));

    let json = serde_json::to_string(&outcome).unwrap();
    let restored: SolverOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.history, outcome.history);
    assert_eq!(restored.best, outcome.best);
}

#[test]
fn rank_selection_converges_on_ring() {
    let matrix = Arc::new(ring_matrix(5));
    let config = GAConfig {
        num_cities: 5,
        population_size: 200,
        generations: 30,
        workers: 5,
        selection: SelectionStrategy::Rank,
        local_threads: Some(2),
        seed: 3,
        ..Default::default()
    };
    let outcome = GeneticSolver::new(matrix, config).unwrap().run().unwrap();

    // 10 of the 120 orderings are optimal, 200 random tours all but guarantee one
    assert_eq!(outcome.history[0], 5.0);
    assert!(outcome.best.is_valid_permutation(5));
}

#[test]
fn configuration_mismatch_is_rejected_up_front() {
    let matrix = Arc::new(ring_matrix(6));
    let config = GAConfig {
        num_cities: 6,
        population_size: 30,
        workers: 4,
        ..Default::default()
    };
    let err = GeneticSolver::new(matrix, config).err().unwrap();
    assert!(err.is_config_error());
}
