//! Chain-cover search CLI.
//!
//! Builds the rotation and coverage tables for an n-symbol alphabet and runs
//! the backtracking chain search, printing each cover as a line of chain
//! start indices. Covers can be expanded into superpermutation strings and
//! checked for completeness.

use std::ops::{ControlFlow, Range};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use env_logger::TimestampPrecision;
use log::{warn, LevelFilter};

use superchain::expand::{materialize, missing_permutations, parse_solution};
use superchain::search::{ChainSearch, Checkpoint, SearchOptions, SeedScope, SolutionSink};
use superchain::universe::{render, PermutationUniverse};
use superchain::{PermIndex, Tables};

/// Searches for disjoint chain covers of all permutations of n symbols.
#[derive(Parser)]
#[command(name = "superchain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chain search and print every cover found.
    Solve {
        /// Alphabet size.
        #[arg(short = 'n', long, default_value_t = 6)]
        symbols: usize,
        /// Let every seed start the search, not just the last one.
        #[arg(long, conflicts_with = "seeds")]
        all_seeds: bool,
        /// Restrict the first chain start to seed positions `START..END`.
        #[arg(long, value_parser = parse_seed_range)]
        seeds: Option<Range<usize>>,
        /// Stop after this many covers.
        #[arg(long)]
        max_solutions: Option<usize>,
        /// Stop after this many seconds and print a checkpoint.
        #[arg(long)]
        time_limit: Option<f64>,
        /// Continue from a checkpoint printed by an earlier run.
        #[arg(long)]
        resume: Option<Checkpoint>,
        /// Also print each cover's expanded superpermutation.
        #[arg(long)]
        expand: bool,
    },
    /// Print the rotation orbits and chain coverage summary.
    Tables {
        #[arg(short = 'n', long, default_value_t = 6)]
        symbols: usize,
        /// Print every index followed by its chain walk.
        #[arg(long)]
        chains: bool,
    },
    /// Print the seed candidates of the search.
    Seed {
        #[arg(short = 'n', long, default_value_t = 6)]
        symbols: usize,
    },
    /// Expand a cover into its superpermutation and verify it.
    Expand {
        #[arg(short = 'n', long, default_value_t = 6)]
        symbols: usize,
        /// Chain start indices, separated by spaces or commas.
        solution: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let result = match cli.command {
        Command::Solve {
            symbols,
            all_seeds,
            seeds,
            max_solutions,
            time_limit,
            resume,
            expand,
        } => {
            let scope = match (all_seeds, seeds) {
                (true, _) => SeedScope::All,
                (false, Some(range)) => SeedScope::Positions(range),
                (false, None) => SeedScope::Canonical,
            };
            run_solve(
                symbols,
                SearchOptions { seeds: scope },
                max_solutions,
                time_limit.map(Duration::from_secs_f64),
                resume,
                expand,
            )
        }
        Command::Tables { symbols, chains } => run_tables(symbols, chains),
        Command::Seed { symbols } => run_seed(symbols),
        Command::Expand { symbols, solution } => run_expand(symbols, &solution),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Prints covers as they arrive and enforces the solution and time limits.
struct PrintSink<'u> {
    universe: &'u PermutationUniverse,
    expand: bool,
    max_solutions: Option<usize>,
    deadline: Option<Instant>,
    emitted: usize,
    polls: u64,
}

impl SolutionSink for PrintSink<'_> {
    fn emit(&mut self, solution: &[PermIndex]) -> ControlFlow<()> {
        let line: Vec<String> = solution.iter().map(ToString::to_string).collect();
        println!("{}", line.join(" "));

        if self.expand {
            match materialize(self.universe, solution) {
                Ok(string) => println!("  {} ({})", render(&string), string.len()),
                Err(e) => eprintln!("Failed to expand cover: {e}"),
            }
        }

        self.emitted += 1;
        if self.max_solutions.is_some_and(|max| self.emitted >= max) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn should_stop(&mut self) -> bool {
        self.polls += 1;
        // clock is read once every 4096 steps
        self.polls % 4096 == 0 && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Runs the search and prints a checkpoint if it stopped early.
fn run_solve(
    symbols: usize,
    options: SearchOptions,
    max_solutions: Option<usize>,
    time_limit: Option<Duration>,
    resume: Option<Checkpoint>,
    expand: bool,
) -> Result<(), String> {
    let tables = Tables::new(symbols).map_err(|e| e.to_string())?;
    let mut search = match resume {
        Some(checkpoint) => {
            ChainSearch::resume(&tables, options, &checkpoint).map_err(|e| e.to_string())?
        }
        None => ChainSearch::new(&tables, options),
    };

    let mut sink = PrintSink {
        universe: &tables.universe,
        expand,
        max_solutions,
        deadline: time_limit.map(|limit| Instant::now() + limit),
        emitted: 0,
        polls: 0,
    };
    let summary = search.run(&mut sink);

    println!(
        "Found {} covers in {} steps (max depth {} of {})",
        summary.solutions,
        summary.steps,
        summary.max_depth,
        search.max_insert()
    );
    if !search.is_finished() {
        warn!("Search stopped before exhausting the search space");
        println!("Checkpoint: {}", search.checkpoint());
    }

    Ok(())
}

/// Prints orbit structure and coverage statistics, optionally every chain.
fn run_tables(symbols: usize, chains: bool) -> Result<(), String> {
    let tables = Tables::new(symbols).map_err(|e| e.to_string())?;
    let orbits = tables.rotation.orbits();
    let mut lengths: Vec<usize> = orbits.iter().map(Vec::len).collect();
    lengths.sort_unstable();
    lengths.dedup();

    println!("{} permutations, {} groups", tables.total(), tables.coverage.group_count());
    println!("{} orbits, lengths {:?}", orbits.len(), lengths);
    println!(
        "{} chain starts per cover, {} chains with repeated groups",
        tables.max_insert(),
        tables.coverage.collisions().len()
    );

    if chains {
        for index in 0..tables.total() {
            let walk: Vec<String> = tables
                .rotation
                .walk(index)
                .take(symbols - 1)
                .map(|value| value.to_string())
                .collect();
            println!("{index}\t{}", walk.join("\t"));
        }
    }

    Ok(())
}

/// Prints the seed candidates and the default first-start window.
fn run_seed(symbols: usize) -> Result<(), String> {
    let tables = Tables::new(symbols).map_err(|e| e.to_string())?;
    let search = ChainSearch::new(&tables, SearchOptions::default());
    let seed: Vec<String> = search.seed().iter().map(ToString::to_string).collect();

    println!("{} seeds: {}", seed.len(), seed.join(" "));
    println!("First chain start from positions {:?}", search.seed_window());
    Ok(())
}

/// Expands one cover and reports any permutation it misses.
fn run_expand(symbols: usize, text: &str) -> Result<(), String> {
    let tables = Tables::new(symbols).map_err(|e| e.to_string())?;
    let solution = parse_solution(text).map_err(|e| e.to_string())?;
    let string = materialize(&tables.universe, &solution).map_err(|e| e.to_string())?;
    let missing = missing_permutations(&tables.universe, &string);

    println!("{}", render(&string));
    println!("Length {}", string.len());
    if missing.is_empty() {
        println!("All {} permutations present", tables.total());
        Ok(())
    } else {
        for &index in &missing {
            println!("{} not found", render(tables.universe.get(index)));
        }
        Err(format!("{} permutations missing", missing.len()))
    }
}

/// Parses `START..END` into a seed position range.
fn parse_seed_range(text: &str) -> Result<Range<usize>, String> {
    let (start, end) = text
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {text:?}"))?;
    let start: usize = start
        .parse()
        .map_err(|_| format!("invalid range start {start:?}"))?;
    let end: usize = end.parse().map_err(|_| format!("invalid range end {end:?}"))?;
    if start > end {
        return Err(format!("range start {start} is after end {end}"));
    }
    Ok(start..end)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_range() {
        assert_eq!(parse_seed_range("0..6"), Ok(0..6));
        assert_eq!(parse_seed_range("3..3"), Ok(3..3));
        assert!(parse_seed_range("6..2").is_err());
        assert!(parse_seed_range("4").is_err());
        assert!(parse_seed_range("a..2").is_err());
    }

    #[test]
    fn test_solve_arguments() {
        let cli = Cli::try_parse_from([
            "superchain", "-vv", "solve", "-n", "5", "--all-seeds", "--resume", "0,2;3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Solve {
            symbols,
            all_seeds,
            resume,
            ..
        } = cli.command
        else {
            panic!("expected solve");
        };
        assert_eq!(symbols, 5);
        assert!(all_seeds);
        assert_eq!(resume.unwrap().to_string(), "0,2;3");

        assert!(
            Cli::try_parse_from(["superchain", "solve", "--all-seeds", "--seeds", "0..2"]).is_err()
        );
    }

    #[test]
    fn test_sink_stops_at_max_solutions() {
        let tables = Tables::new(5).unwrap();
        let mut sink = PrintSink {
            universe: &tables.universe,
            expand: true,
            max_solutions: Some(2),
            deadline: None,
            emitted: 0,
            polls: 0,
        };
        let mut search = ChainSearch::new(
            &tables,
            SearchOptions {
                seeds: SeedScope::All,
            },
        );
        let summary = search.run(&mut sink);
        assert_eq!(summary.solutions, 2);
        assert!(!search.is_finished());
    }
}
