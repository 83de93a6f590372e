//! Evaluation workers.
//!
//! Each worker runs on its own thread and only talks to the coordinator
//! through channels. It first receives the distance matrix, then one shard
//! per generation, and sends every shard back with its costs filled in.
//! Tours are moved in both directions so a shard has exactly one owner at
//! any time.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::cluster::partition::ShardRange;
use crate::error::Result;
use crate::instance::DistanceMatrix;
use crate::solution::Tour;

/// Coordinator -> worker messages
#[derive(Debug)]
pub enum WorkerMessage {
    /// Read-only distance matrix, sent once before any shard
    Matrix(Arc<DistanceMatrix>),
    /// A shard to evaluate
    Evaluate(ShardRequest),
    Shutdown,
}

/// A shard sent out for evaluation
#[derive(Debug)]
pub struct ShardRequest {
    pub generation: usize,
    pub shard: ShardRange,
    pub tours: Vec<Tour>,
}

/// Worker -> coordinator messages
#[derive(Debug)]
pub enum WorkerReply {
    /// The shard, evaluated
    Evaluated {
        worker: usize,
        generation: usize,
        shard: ShardRange,
        tours: Vec<Tour>,
    },
    /// The worker could not evaluate its shard
    Fault { worker: usize, reason: String },
}

/// Evaluation performed by a worker on the shard it receives
pub trait ShardWorker: Send + 'static {
    /// Return the shard with every cost filled in, in the order received
    fn evaluate_shard(&mut self, matrix: &DistanceMatrix, tours: Vec<Tour>) -> Vec<Tour>;
}

/// Worker that runs the fitness function over every individual of its shard
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessWorker;

impl ShardWorker for FitnessWorker {
    fn evaluate_shard(&mut self, matrix: &DistanceMatrix, mut tours: Vec<Tour>) -> Vec<Tour> {
        for tour in tours.iter_mut() {
            tour.evaluate(matrix);
        }
        tours
    }
}

/// Coordinator-side handle on a running worker
pub(crate) struct WorkerHandle {
    pub id: usize,
    pub sender: Sender<WorkerMessage>,
    pub thread: Option<JoinHandle<()>>,
}

/// Start worker `id` on a dedicated thread
pub(crate) fn spawn_worker<W: ShardWorker>(
    id: usize,
    worker: W,
    replies: Sender<WorkerReply>,
) -> Result<WorkerHandle> {
    let (sender, inbox) = mpsc::channel();
    let thread = thread::Builder::new()
        .name(format!("worker-{}", id))
        .spawn(move || run_worker(id, worker, inbox, replies))?;

    log::debug!("Spawned worker {}", id);
    Ok(WorkerHandle {
        id,
        sender,
        thread: Some(thread),
    })
}

fn run_worker<W: ShardWorker>(
    id: usize,
    mut worker: W,
    inbox: Receiver<WorkerMessage>,
    replies: Sender<WorkerReply>,
) {
    let mut matrix: Option<Arc<DistanceMatrix>> = None;

    for message in inbox {
        match message {
            WorkerMessage::Matrix(m) => {
                log::debug!("Worker {} received {}x{} matrix", id, m.dimension, m.dimension);
                matrix = Some(m);
            }
            WorkerMessage::Evaluate(request) => {
                let reply = match &matrix {
                    Some(m) => WorkerReply::Evaluated {
                        worker: id,
                        generation: request.generation,
                        shard: request.shard,
                        tours: worker.evaluate_shard(m, request.tours),
                    },
                    None => WorkerReply::Fault {
                        worker: id,
                        reason: "shard received before the distance matrix".to_string(),
                    },
                };
                if replies.send(reply).is_err() {
                    log::debug!("Worker {}: coordinator hung up", id);
                    break;
                }
            }
            WorkerMessage::Shutdown => break,
        }
    }

    log::debug!("Worker {} exiting", id);
}
