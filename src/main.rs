//! Distributed GA TSP Solver - Command Line Interface
//!
//! Evolves tours for a distance matrix read from a file or stdin.

use clap::{Parser, Subcommand, ValueEnum};
use ga_tsp_cluster::config::GAConfig;
use ga_tsp_cluster::error::Result;
use ga_tsp_cluster::genetic::{GeneticSolver, SelectionStrategy};
use ga_tsp_cluster::instance::DistanceMatrix;
use ga_tsp_cluster::report;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ga-tsp-cluster")]
#[command(version = "1.0")]
#[command(about = "A distributed genetic algorithm solver for the TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve tours for a distance matrix
    Solve {
        /// Distance matrix file (row-major, -1 = missing edge); stdin if omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of cities; inferred from the matrix if omitted
        #[arg(short = 'n', long)]
        cities: Option<usize>,

        /// Population size (even, divisible by the worker count)
        #[arg(short, long, default_value = "1600")]
        population: usize,

        /// Number of generations
        #[arg(short, long, default_value = "10")]
        generations: usize,

        /// Evaluation participants, the coordinator included
        #[arg(short, long, default_value = "32")]
        workers: usize,

        /// Parent selection strategy
        #[arg(long, value_enum, default_value = "random")]
        selection: Selection,

        /// Individuals mutated in the first generation (decays by 5% per mutation)
        #[arg(short, long, default_value = "5")]
        mutations: f64,

        /// Threads used for the coordinator's own shard
        #[arg(long)]
        threads: Option<usize>,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Plot script with the best cost of every generation
        #[arg(long, default_value = report::DEFAULT_REPORT_FILE)]
        report: PathBuf,

        /// Also export the history as CSV
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Save the outcome as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the configuration and matrix before solving
        #[arg(long)]
        show_config: bool,

        /// Print the final ranked population
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a distance matrix
    Analyze {
        /// Distance matrix file; stdin if omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of cities; inferred from the matrix if omitted
        #[arg(short = 'n', long)]
        cities: Option<usize>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Selection {
    /// Uniform pairing within the top half
    Random,
    /// Rank-weighted pairing
    Rank,
    /// Three-way tournament pairing
    Tournament,
}

impl From<Selection> for SelectionStrategy {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Random => SelectionStrategy::Random,
            Selection::Rank => SelectionStrategy::Rank,
            Selection::Tournament => SelectionStrategy::Tournament,
        }
    }
}

/// Options of the solve command besides the GA parameters
struct SolveOutputs {
    report: PathBuf,
    history_csv: Option<PathBuf>,
    output: Option<PathBuf>,
    show_config: bool,
    verbose: bool,
}

fn main() {
    let start = Instant::now();
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            input,
            cities,
            population,
            generations,
            workers,
            selection,
            mutations,
            threads,
            seed,
            report,
            history_csv,
            output,
            show_config,
            verbose,
        } => {
            let config = GAConfig {
                population_size: population,
                generations,
                workers,
                selection: selection.into(),
                initial_mutations: mutations,
                seed,
                local_threads: threads,
                ..Default::default()
            };
            let outputs = SolveOutputs {
                report,
                history_csv,
                output,
                show_config,
                verbose,
            };
            solve(input.as_deref(), cities, config, outputs, start)
        }

        Commands::Analyze { input, cities } => analyze_matrix(input.as_deref(), cities),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_matrix(input: Option<&Path>, cities: Option<usize>) -> Result<DistanceMatrix> {
    match input {
        Some(path) => {
            log::info!("Loading distance matrix from {:?}", path);
            DistanceMatrix::from_file(path, cities)
        }
        None => {
            log::info!("Reading distance matrix from stdin");
            DistanceMatrix::from_reader(std::io::stdin().lock(), cities)
        }
    }
}

fn solve(
    input: Option<&Path>,
    cities: Option<usize>,
    mut config: GAConfig,
    outputs: SolveOutputs,
    start: Instant,
) -> Result<()> {
    let matrix = load_matrix(input, cities)?;
    config.num_cities = matrix.dimension;

    if outputs.show_config {
        println!("{}", config);
        println!("Report file: {:?}", outputs.report);
        println!("Distance matrix:");
        println!("{}", matrix);
    }

    let mut solver = GeneticSolver::new(Arc::new(matrix), config)?;
    let outcome = solver.run()?;

    report::save_report(&outcome.history, &outputs.report)?;
    log::info!("Report written to {:?}", outputs.report);

    if let Some(path) = &outputs.history_csv {
        report::save_history_csv(&outcome.history, path)?;
        log::info!("History exported to {:?}", path);
    }

    if outputs.verbose {
        println!("Final generation:");
        print!("{}", outcome.final_population.summary(50));
    }

    if let Some(path) = &outputs.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(path, json)?;
        println!("Solution saved to {:?}", path);
    }

    println!("Best solution:");
    println!("{}", outcome.best);
    println!("Total runtime: {:.6} s", start.elapsed().as_secs_f64());

    Ok(())
}

fn analyze_matrix(input: Option<&Path>, cities: Option<usize>) -> Result<()> {
    let matrix = load_matrix(input, cities)?;

    println!("========== Matrix Analysis ==========\n");
    print!("{}", matrix.statistics());

    let asymmetric = (0..matrix.dimension)
        .flat_map(|i| (i + 1..matrix.dimension).map(move |j| (i, j)))
        .filter(|&(i, j)| matrix.distance(i, j) != matrix.distance(j, i))
        .count();
    println!("  Asymmetric pairs: {}", asymmetric);

    let isolated: Vec<usize> = (0..matrix.dimension)
        .filter(|&i| {
            let has_out = (0..matrix.dimension).any(|j| j != i && matrix.has_edge(i, j));
            let has_in = (0..matrix.dimension).any(|j| j != i && matrix.has_edge(j, i));
            !(has_out && has_in)
        })
        .collect();
    if !isolated.is_empty() {
        let names: Vec<String> = isolated.iter().map(|c| (c + 1).to_string()).collect();
        println!(
            "  Cities without an incoming or outgoing edge: {} (every tour is infeasible)",
            names.join(", ")
        );
    }

    Ok(())
}
