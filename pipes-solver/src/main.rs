//! Pipe board survey
//!
//! Generates boards for a range of seeds, checks each one, and writes the
//! clean ones to a puzzle pack.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use pipes_core::{BoardSpec, Variant};
use pipes_solver::pack::{Pack, PackEntry};
use pipes_solver::search::RotationSearch;
use pipes_solver::stats::SurveyStats;

struct Args {
    count: u64,
    first_seed: u64,
    rows: Option<u8>,
    cols: Option<u8>,
    variants: Vec<Variant>,
    out: PathBuf,
}

fn print_usage() {
    eprintln!("Usage: survey [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --count <n>            Seeds to survey (default: 1000)");
    eprintln!("  --seed <u64>           First seed (default: 0)");
    eprintln!("  --rows <n>, --cols <n> Board size (default: variant's standard board)");
    eprintln!("  --variant <name>       rotate, slide or both (default: both)");
    eprintln!("  --out <path>           Pack file (default: data/pack.bin)");
}

fn bad(flag: &str) -> ! {
    eprintln!("Bad or missing value for {}", flag);
    print_usage();
    process::exit(1);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        count: 1000,
        first_seed: 0,
        rows: None,
        cols: None,
        variants: vec![Variant::Rotate, Variant::Slide],
        out: PathBuf::from("data/pack.bin"),
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--count" => parsed.count = value.and_then(|s| s.parse().ok()).unwrap_or_else(|| bad("--count")),
            "--seed" => parsed.first_seed = value.and_then(|s| s.parse().ok()).unwrap_or_else(|| bad("--seed")),
            "--rows" => parsed.rows = Some(value.and_then(|s| s.parse().ok()).unwrap_or_else(|| bad("--rows"))),
            "--cols" => parsed.cols = Some(value.and_then(|s| s.parse().ok()).unwrap_or_else(|| bad("--cols"))),
            "--variant" => {
                parsed.variants = match value.map(String::as_str) {
                    Some("both") => vec![Variant::Rotate, Variant::Slide],
                    Some(name) => vec![Variant::from_name(name).unwrap_or_else(|| bad("--variant"))],
                    None => bad("--variant"),
                };
            }
            "--out" => parsed.out = value.map(PathBuf::from).unwrap_or_else(|| bad("--out")),
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 2;
    }
    parsed
}

fn spec_for(args: &Args, variant: Variant) -> BoardSpec {
    let base = BoardSpec::for_variant(variant);
    match (args.rows, args.cols) {
        (None, None) => base,
        (rows, cols) => BoardSpec::sized(rows.unwrap_or(base.rows), cols.unwrap_or(base.cols)),
    }
}

fn save_pack(path: &Path, entries: &[PackEntry]) {
    let start = Instant::now();
    match Pack::save(path, entries) {
        Ok(count) => println!(
            "Saved {} boards in {:.2}s",
            count,
            start.elapsed().as_secs_f64()
        ),
        Err(e) => println!("Error saving pack: {}", e),
    }
}

fn main() {
    let args = parse_args();

    println!("Pipe Board Survey");
    println!("=================");
    println!(
        "Seeds {}..{} variants={:?}",
        args.first_seed,
        args.first_seed + args.count,
        args.variants.iter().map(|v| v.name()).collect::<Vec<_>>()
    );
    println!();

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, saving pack...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let checkpoint_interval_secs = 60;
    let log_interval_secs = 5;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // Resume from an existing pack if present
    let mut entries: Vec<PackEntry> = Vec::new();
    if args.out.exists() {
        println!("Loading pack from {:?}...", args.out);
        match Pack::load(&args.out) {
            Ok(pack) => {
                println!("Loaded {} boards\n", pack.entries.len());
                entries = pack.entries;
            }
            Err(e) => {
                println!("Warning: Failed to load pack: {}", e);
                println!("Starting fresh.\n");
            }
        }
    }
    let mut done: HashSet<(Variant, u64)> = entries.iter().map(|e| (e.variant, e.seed)).collect();

    let mut stats = SurveyStats::new();
    let mut search = RotationSearch::new();
    let mut last_checkpoint = Instant::now();
    let start = Instant::now();

    'seeds: for seed in args.first_seed..args.first_seed + args.count {
        for &variant in &args.variants {
            if !running.load(Ordering::SeqCst) {
                break 'seeds;
            }
            if done.contains(&(variant, seed)) {
                continue;
            }

            let spec = spec_for(&args, variant);
            let report = match pipes_solver::survey_board(variant, &spec, seed, &mut search) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Invalid board configuration: {}", e);
                    process::exit(1);
                }
            };

            stats.record_board(variant, report.links, report.presolved);
            if let Some((outcome, search_stats)) = &report.search {
                stats.record_search(outcome, *search_stats);
            }

            if report.problems.is_empty() {
                done.insert((variant, seed));
                entries.push(PackEntry {
                    variant,
                    seed,
                    grid: report.grid,
                });
            } else {
                stats.failures += 1;
                for problem in &report.problems {
                    println!("  {} seed {}: {}", variant.name(), seed, problem);
                }
            }

            if stats.should_log(log_interval_secs) {
                stats.log_progress();
            }

            if last_checkpoint.elapsed().as_secs() >= checkpoint_interval_secs {
                println!("\nSaving pack...");
                save_pack(&args.out, &entries);
                last_checkpoint = Instant::now();
            }
        }
    }

    println!("\n=================");
    if running.load(Ordering::SeqCst) {
        println!("Survey complete!");
    } else {
        println!("Survey interrupted.");
    }
    println!("=================");
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    println!();
    stats.print_summary();

    println!("\nSaving final pack...");
    save_pack(&args.out, &entries);

    if stats.failures > 0 {
        process::exit(1);
    }
}
