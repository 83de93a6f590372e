//! Population sharding.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// A contiguous range of the population handled by one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRange {
    /// Participant id; 0 is the coordinator
    pub index: usize,
    /// First population index of the shard
    pub start: usize,
    /// Number of individuals
    pub len: usize,
}

impl ShardRange {
    /// One past the last population index of the shard
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Split `population_size` individuals into `workers` equal contiguous shards.
pub fn partition(population_size: usize, workers: usize) -> Result<Vec<ShardRange>> {
    if workers == 0 {
        return Err(SolverError::InvalidConfig(
            "worker count must be at least 1".to_string(),
        ));
    }
    if population_size % workers != 0 {
        return Err(SolverError::IndivisiblePopulation {
            size: population_size,
            workers,
        });
    }

    let len = population_size / workers;
    Ok((0..workers)
        .map(|index| ShardRange {
            index,
            start: index * len,
            len,
        })
        .collect())
}
