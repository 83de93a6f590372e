//! Coordinator side of a distributed evaluation round.
//!
//! The coordinator owns the population. Each round it moves shards
//! `1..W` out to the workers, evaluates shard 0 itself on a local rayon
//! pool, then blocks until every worker has replied and stitches the shards
//! back together in index order. Any malformed reply aborts the run.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use rayon::prelude::*;

use crate::cluster::partition::{partition, ShardRange};
use crate::cluster::worker::{
    spawn_worker, FitnessWorker, ShardRequest, ShardWorker, WorkerHandle, WorkerMessage,
    WorkerReply,
};
use crate::config::GAConfig;
use crate::error::{Result, SolverError};
use crate::instance::DistanceMatrix;
use crate::solution::{Population, Tour};

/// Id used for failures not attributable to a single worker
const COORDINATOR_ID: usize = 0;

/// Owner of the worker fleet and of the evaluation barrier
pub struct Coordinator {
    matrix: Arc<DistanceMatrix>,
    shards: Vec<ShardRange>,
    tour_len: usize,
    workers: Vec<WorkerHandle>,
    replies: Receiver<WorkerReply>,
    pool: rayon::ThreadPool,
}

impl Coordinator {
    /// Spawn `config.workers - 1` fitness workers and broadcast the matrix.
    pub fn new(matrix: Arc<DistanceMatrix>, config: &GAConfig) -> Result<Self> {
        Self::with_workers(matrix, config, |_| FitnessWorker)
    }

    /// Same as [`Coordinator::new`] with a custom worker per id.
    pub fn with_workers<W, F>(matrix: Arc<DistanceMatrix>, config: &GAConfig, mut factory: F) -> Result<Self>
    where
        W: ShardWorker,
        F: FnMut(usize) -> W,
    {
        let shards = partition(config.population_size, config.workers)?;

        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("eval-{}", i));
        if let Some(threads) = config.local_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        let (reply_tx, replies) = mpsc::channel();
        let mut workers = Vec::with_capacity(shards.len() - 1);
        for id in 1..shards.len() {
            workers.push(spawn_worker(id, factory(id), reply_tx.clone())?);
        }
        // only workers hold reply senders, so a dead fleet closes the channel
        drop(reply_tx);

        let coordinator = Coordinator {
            matrix,
            shards,
            tour_len: config.num_cities,
            workers,
            replies,
            pool,
        };
        coordinator.broadcast_matrix()?;

        log::info!(
            "Coordinator ready: {} participants, {} individuals per shard, {} local threads",
            coordinator.participants(),
            coordinator.shards[0].len,
            coordinator.pool.current_num_threads()
        );
        Ok(coordinator)
    }

    fn broadcast_matrix(&self) -> Result<()> {
        for worker in &self.workers {
            worker
                .sender
                .send(WorkerMessage::Matrix(Arc::clone(&self.matrix)))
                .map_err(|_| {
                    SolverError::communication(worker.id, "worker exited before receiving the matrix")
                })?;
        }
        Ok(())
    }

    /// Number of evaluation participants, the coordinator included
    pub fn participants(&self) -> usize {
        self.shards.len()
    }

    pub fn shards(&self) -> &[ShardRange] {
        &self.shards
    }

    /// Evaluate every individual of the population, keeping its order.
    ///
    /// Returns only once all shards are back.
    pub fn evaluate(&mut self, population: &mut Population, generation: usize) -> Result<()> {
        let expected: usize = self.shards.iter().map(|s| s.len).sum();
        if population.len() != expected {
            return Err(SolverError::InvalidConfig(format!(
                "population holds {} individuals, shards cover {}",
                population.len(),
                expected
            )));
        }

        // back to front, so every split_off detaches exactly one shard
        for (worker, shard) in self.workers.iter().zip(&self.shards[1..]).rev() {
            let tours = population.tours.split_off(shard.start);
            log::debug!(
                "Generation {}: sending [{}, {}) to worker {}",
                generation,
                shard.start,
                shard.end(),
                worker.id
            );
            worker
                .sender
                .send(WorkerMessage::Evaluate(ShardRequest {
                    generation,
                    shard: *shard,
                    tours,
                }))
                .map_err(|_| SolverError::communication(worker.id, "worker is no longer receiving shards"))?;
        }

        let matrix = &self.matrix;
        let local = &mut population.tours;
        self.pool.install(|| {
            local.par_iter_mut().for_each(|tour| {
                tour.evaluate(matrix);
            });
        });

        let mut gathered: Vec<Option<Vec<Tour>>> = vec![None; self.shards.len()];
        for _ in 0..self.workers.len() {
            let reply = self.replies.recv().map_err(|_| {
                SolverError::communication(COORDINATOR_ID, "workers disconnected before returning their shards")
            })?;
            let (shard, tours) = self.check_reply(reply, generation)?;
            if gathered[shard.index].is_some() {
                return Err(SolverError::communication(shard.index, "shard returned twice"));
            }
            gathered[shard.index] = Some(tours);
        }

        for (index, slot) in gathered.into_iter().enumerate().skip(1) {
            let tours = slot.ok_or_else(|| SolverError::communication(index, "shard never returned"))?;
            population.tours.extend(tours);
        }
        log::debug!("Generation {}: gathered {} shards", generation, self.shards.len());

        Ok(())
    }

    fn check_reply(&self, reply: WorkerReply, generation: usize) -> Result<(ShardRange, Vec<Tour>)> {
        match reply {
            WorkerReply::Fault { worker, reason } => Err(SolverError::communication(worker, reason)),
            WorkerReply::Evaluated {
                worker,
                generation: reply_generation,
                shard,
                tours,
            } => {
                let assigned = self.shards.get(worker).filter(|_| worker != COORDINATOR_ID);
                if assigned != Some(&shard) {
                    return Err(SolverError::communication(
                        worker,
                        format!("returned shard {:?}, expected {:?}", shard, assigned),
                    ));
                }
                if reply_generation != generation {
                    return Err(SolverError::communication(
                        worker,
                        format!("returned generation {}, expected {}", reply_generation, generation),
                    ));
                }
                if tours.len() != shard.len {
                    return Err(SolverError::communication(
                        worker,
                        format!("returned {} individuals, expected {}", tours.len(), shard.len),
                    ));
                }
                if let Some(pos) = tours
                    .iter()
                    .position(|t| !t.is_evaluated() || t.len() != self.tour_len)
                {
                    return Err(SolverError::communication(
                        worker,
                        format!("individual {} came back malformed", shard.start + pos),
                    ));
                }
                Ok((shard, tours))
            }
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        for worker in &self.workers {
            if worker.sender.send(WorkerMessage::Shutdown).is_err() {
                log::debug!("Worker {} already stopped", worker.id);
            }
        }
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    log::warn!("Worker {} panicked", worker.id);
                }
            }
        }
    }
}
