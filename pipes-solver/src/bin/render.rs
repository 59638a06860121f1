//! Render a board to the terminal or to SVG.
//!
//! Usage:
//!   # Rotate board for a seed, printed with box-drawing characters
//!   cargo run --release --bin render -- --seed 42
//!
//!   # Slide board, written as SVG
//!   cargo run --release --bin render -- --seed 42 --slide -o board.svg
//!
//!   # From a hex board code, with the rotation search's answer applied
//!   cargo run --release --bin render -- --code 0606... --solve

use std::env;
use std::fs;
use std::process;

use pipes_core::{BoardSpec, Grid, Variant};
use pipes_solver::render::{render_svg, render_text, RenderOptions};
use pipes_solver::search::{self, RotationSearch, SearchOutcome};

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  render --seed <u64> [--slide] [--rows R --cols C]");
    eprintln!("  render --code <hex>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --seed <u64>           Generate the board for this seed (default: 0)");
    eprintln!("  --slide                Generate a slide board instead of a rotate board");
    eprintln!("  --rows <n>, --cols <n> Board size (default: variant's standard board)");
    eprintln!("  --code <hex>           Render a board code instead of generating");
    eprintln!("  --solve                Apply the rotation search's answer first");
    eprintln!("  -o, --output <file>    Write SVG instead of printing text");
    eprintln!("  --scale <float>        SVG scale factor (default: 1.0)");
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    print_usage();
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut seed: u64 = 0;
    let mut variant = Variant::Rotate;
    let mut rows: Option<u8> = None;
    let mut cols: Option<u8> = None;
    let mut code: Option<String> = None;
    let mut solve = false;
    let mut output: Option<String> = None;
    let mut opts = RenderOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| fail("--seed needs a number"));
            }
            "--slide" => variant = Variant::Slide,
            "--rows" => {
                i += 1;
                rows = args.get(i).and_then(|s| s.parse().ok());
            }
            "--cols" => {
                i += 1;
                cols = args.get(i).and_then(|s| s.parse().ok());
            }
            "--code" => {
                i += 1;
                code = args.get(i).cloned();
            }
            "--solve" => solve = true,
            "-o" | "--output" => {
                i += 1;
                output = args.get(i).cloned();
            }
            "--scale" => {
                i += 1;
                opts.scale = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(1.0);
            }
            "-h" | "--help" => {
                print_usage();
                return;
            }
            other => fail(&format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    let mut grid = match code {
        Some(hex) => Grid::from_hex(&hex).unwrap_or_else(|| fail("invalid board code")),
        None => {
            let spec = match (rows, cols) {
                (None, None) => BoardSpec::for_variant(variant),
                (r, c) => {
                    let base = BoardSpec::for_variant(variant);
                    BoardSpec::sized(r.unwrap_or(base.rows), c.unwrap_or(base.cols))
                }
            };
            pipes_solver::generate_board(variant, &spec, seed)
                .unwrap_or_else(|e| fail(&e.to_string()))
        }
    };

    if solve {
        let mut searcher = RotationSearch::new();
        match searcher.solve(&grid) {
            SearchOutcome::Solved(rotations) => {
                println!(
                    "Search solved the board ({} path tiles, {} nodes)",
                    rotations.len(),
                    searcher.stats.nodes
                );
                grid = search::apply(&grid, &rotations);
            }
            other => println!("Search did not solve the board: {:?}", other),
        }
    }

    let reach = grid.connectivity();

    match output {
        Some(path) => {
            let svg = render_svg(&grid, &reach, &opts);
            fs::write(&path, &svg).expect("Failed to write SVG");
            println!("Wrote {}", path);
        }
        None => {
            print!("{}", render_text(&grid, &reach));
            println!(
                "links={} solved={} code={}",
                reach.len(),
                reach.is_solved(),
                grid.to_hex()
            );
        }
    }
}
