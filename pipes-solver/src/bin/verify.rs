//! Re-check a puzzle pack written by the survey.
//!
//! Usage: cargo run --release --bin verify -- [data/pack.bin]

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use pipes_core::generate::{self, DEFAULT_SCRAMBLE_MOVES};
use pipes_core::{BoardSpec, Variant};
use pipes_solver::pack::Pack;
use pipes_solver::search::{RotationSearch, SearchOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/pack.bin"));

    println!("Loading pack from {:?}...", path);
    let start = Instant::now();
    let pack = match Pack::load(&path) {
        Ok(pack) => pack,
        Err(e) => {
            eprintln!("Cannot load pack: {}", e);
            process::exit(1);
        }
    };
    println!(
        "Loaded {} boards in {:.2}s (checksum ok)\n",
        pack.entries.len(),
        start.elapsed().as_secs_f64()
    );

    let mut search = RotationSearch::new();
    let mut mismatched = 0usize;
    let mut unsolvable = 0usize;
    let mut gave_up = 0usize;
    let mut rotate = 0usize;
    let mut slide = 0usize;

    for entry in &pack.entries {
        let grid = &entry.grid;
        let spec = BoardSpec::sized(grid.rows(), grid.cols());

        // The board must be exactly what its seed generates.
        match pipes_solver::generate_board(entry.variant, &spec, entry.seed) {
            Ok(regenerated) if &regenerated == grid => {}
            Ok(_) => {
                mismatched += 1;
                if mismatched <= 5 {
                    println!("  {} seed {}: board differs from regenerated", entry.variant.name(), entry.seed);
                }
            }
            Err(e) => {
                mismatched += 1;
                println!("  {} seed {}: {}", entry.variant.name(), entry.seed, e);
            }
        }

        match entry.variant {
            Variant::Rotate => {
                rotate += 1;
                match search.solve(grid) {
                    SearchOutcome::Solved(_) => {}
                    SearchOutcome::Unsolvable => {
                        unsolvable += 1;
                        println!("  rotate seed {}: no rotation solves it", entry.seed);
                    }
                    SearchOutcome::GaveUp => gave_up += 1,
                }
            }
            Variant::Slide => {
                slide += 1;
                let mut rng = StdRng::seed_from_u64(entry.seed);
                let problems = match generate::generate_slide(&spec, DEFAULT_SCRAMBLE_MOVES, &mut rng) {
                    Ok(board) => pipes_solver::check_slide(&board),
                    Err(e) => vec![e.to_string()],
                };
                if !problems.is_empty() {
                    unsolvable += 1;
                    for problem in &problems {
                        println!("  slide seed {}: {}", entry.seed, problem);
                    }
                }
            }
        }
    }

    println!("\nBoards: {} (rotate={} slide={})", pack.entries.len(), rotate, slide);
    println!("Mismatched: {}", mismatched);
    println!("Unsolvable: {}", unsolvable);
    println!("Search gave up: {}", gave_up);

    if mismatched > 0 || unsolvable > 0 {
        println!("\nVerification FAILED");
        process::exit(1);
    }
    println!("\nVerification passed");
}
