use clap::{ArgGroup, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use titan::instance::{
    Element, GeneratorConfig, generate_positive_instance, generate_resonance_instance,
};
use titan::search::{Goal, SearchConfig, solve};
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "titan")]
#[command(about = "titan - meet-in-the-middle subset-sum solver")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a sequence for a subset with the requested sum
    #[command(group(
        ArgGroup::new("goal")
            .required(true)
            .args(["target", "resonance", "max_sum"])
    ))]
    Solve {
        /// Input elements (may be negative)
        #[arg(allow_negative_numbers = true)]
        numbers: Vec<Element>,
        /// Read whitespace-separated elements from a file instead
        #[arg(long, short)]
        input: Option<PathBuf>,

        // --- Goal selection ---
        /// Find a subset summing to exactly this value
        #[arg(long, short, allow_negative_numbers = true)]
        target: Option<Element>,
        /// Find a non-empty subset summing to zero
        #[arg(long)]
        resonance: bool,
        /// Find the subset with the largest sum
        #[arg(long)]
        max_sum: bool,

        // --- Execution options ---
        /// Probe in the calling thread instead of a worker pool
        #[arg(long)]
        sequential: bool,
        /// Number of worker threads (defaults to available cores)
        #[arg(long, short = 'j')]
        cores: Option<usize>,
        /// Candidates sent per worker message
        #[arg(long, default_value = "1024")]
        batch_size: usize,
        /// Messages buffered per worker before it blocks
        #[arg(long, default_value = "4")]
        channel_depth: usize,
        /// Largest tranche the vault may enumerate
        #[arg(long, default_value = "32")]
        max_tranche: usize,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
    /// Generate a reproducible instance
    Generate {
        /// Number of elements
        #[arg(long, short, default_value = "20")]
        size: usize,
        /// Values are drawn from -range..=range (1..=range with --positive)
        #[arg(long, short, default_value = "100")]
        range: Element,
        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
        /// Draw strictly positive values instead of a zero-sum instance
        #[arg(long)]
        positive: bool,
    },
}

/// Options for the solve command after argument parsing.
struct SolveOptions {
    goal: Goal,
    sequential: bool,
    cores: Option<usize>,
    batch_size: usize,
    channel_depth: usize,
    max_tranche: usize,
    verbose: bool,
}

// --- Logging ---

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// --- Input ---

fn read_numbers(path: &Path) -> Result<Vec<Element>, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    parse_numbers(&contents)
}

fn parse_numbers(contents: &str) -> Result<Vec<Element>, Box<dyn std::error::Error>> {
    contents
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<Element>()
                .map_err(|e| format!("Invalid element '{}': {}", token, e).into())
        })
        .collect()
}

// --- Commands ---

/// Run a solve and print the report. Returns whether a solution was found.
fn run_solve(
    numbers: &[Element],
    options: &SolveOptions,
) -> Result<bool, Box<dyn std::error::Error>> {
    let config = SearchConfig::default()
        .with_parallel(!options.sequential)
        .with_workers_option(options.cores)
        .with_batch_size(options.batch_size)
        .with_channel_depth(options.channel_depth)
        .with_max_tranche_len(options.max_tranche);

    if options.verbose {
        println!("Input size: {} elements", numbers.len());
        println!("Goal: {}", options.goal);
        if config.uses_worker_pool() {
            println!(
                "Parallel mode: {} workers",
                config.parallel_config.num_workers
            );
        } else {
            println!("Parallel mode: disabled");
        }
        println!();
    }

    let report = solve(numbers, options.goal, &config)?;
    print!("{}", report);

    if options.verbose {
        println!("\n--- Statistics ---");
        println!("Phase: {}", report.phase);
        print!("{}", report.statistics.format_summary());
    } else {
        println!("Time: {:.4?}", report.statistics.elapsed_time);
    }

    Ok(report.is_found())
}

fn run_generate(size: usize, range: Element, seed: Option<u64>, positive: bool) {
    let config = GeneratorConfig::default()
        .with_size(size)
        .with_range(range)
        .with_seed_option(seed);

    let instance = if positive {
        generate_positive_instance(&config)
    } else {
        generate_resonance_instance(&config)
    };

    let line: Vec<String> = instance.iter().map(|v| v.to_string()).collect();
    println!("{}", line.join(" "));
}

// --- Main Function ---
fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Commands::Solve {
            numbers,
            input,
            target,
            resonance,
            max_sum,
            sequential,
            cores,
            batch_size,
            channel_depth,
            max_tranche,
            verbose,
        } => {
            init_tracing(verbose);

            let numbers = match input {
                Some(path) => match read_numbers(&path) {
                    Ok(mut from_file) => {
                        from_file.extend(numbers);
                        from_file
                    }
                    Err(e) => {
                        eprintln!("Error reading {}: {}", path.display(), e);
                        return ExitCode::from(2);
                    }
                },
                None => numbers,
            };

            let goal = match (target, resonance, max_sum) {
                (Some(t), _, _) => Goal::Target(t),
                (None, true, _) => Goal::Resonance,
                _ => Goal::MaxSum,
            };

            let options = SolveOptions {
                goal,
                sequential,
                cores,
                batch_size,
                channel_depth,
                max_tranche,
                verbose,
            };

            match run_solve(&numbers, &options) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::from(1),
                Err(e) => {
                    eprintln!("Error during search: {}", e);
                    ExitCode::from(2)
                }
            }
        }
        Commands::Generate {
            size,
            range,
            seed,
            positive,
        } => {
            run_generate(size, range, seed, positive);
            ExitCode::SUCCESS
        }
    }
}
