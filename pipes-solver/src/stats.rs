//! Survey statistics tracking.

use std::time::Instant;

use pipes_core::Variant;

use crate::search::{SearchOutcome, SearchStats};

/// Current process resident set size in bytes, if it can be read.
#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(target_os = "linux"))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected while generating and checking boards.
#[derive(Debug, Default)]
pub struct SurveyStats {
    pub boards: u64,
    pub rotate_boards: u64,
    pub slide_boards: u64,

    /// Boards still solved after every scramble attempt
    pub presolved: u64,

    /// Sum of reachable-set sizes, for the average
    pub total_links: u64,

    /// Rotation search outcomes
    pub searched: u64,
    pub search_unsolvable: u64,
    pub search_gave_up: u64,
    pub search_nodes: u64,
    pub max_search_depth: usize,

    /// Boards failing a consistency check (code round trip, replay)
    pub failures: u64,

    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_boards: u64,
}

impl SurveyStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record one generated board.
    pub fn record_board(&mut self, variant: Variant, links: usize, solved: bool) {
        self.boards += 1;
        match variant {
            Variant::Rotate => self.rotate_boards += 1,
            Variant::Slide => self.slide_boards += 1,
        }
        self.total_links += links as u64;
        if solved {
            self.presolved += 1;
        }
    }

    /// Record the outcome of a rotation search.
    pub fn record_search(&mut self, outcome: &SearchOutcome, stats: SearchStats) {
        self.searched += 1;
        self.search_nodes += stats.nodes;
        self.max_search_depth = self.max_search_depth.max(stats.max_depth);
        match outcome {
            SearchOutcome::Solved(_) => {}
            SearchOutcome::Unsolvable => self.search_unsolvable += 1,
            SearchOutcome::GaveUp => self.search_gave_up += 1,
        }
    }

    pub fn boards_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.boards as f64 / elapsed;
            }
        }
        0.0
    }

    pub fn average_links(&self) -> f64 {
        if self.boards == 0 {
            0.0
        } else {
            self.total_links as f64 / self.boards as f64
        }
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        match self.last_log_time {
            Some(last) => last.elapsed().as_secs() >= interval_secs,
            None => true,
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Rate since last log
        let rate = match self.last_log_time {
            Some(last) => {
                let elapsed = last.elapsed().as_secs_f64();
                let boards = self.boards - self.last_log_boards;
                if elapsed > 0.0 {
                    boards as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => self.boards_per_sec(),
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "[{:02}:{:02}:{:02}] boards={} rotate={} slide={} rate={:.0}/s avg_links={:.1}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.boards,
            self.rotate_boards,
            self.slide_boards,
            rate,
            self.average_links(),
            mem_str,
        );
        println!(
            "           search: nodes={} unsolvable={} gave_up={} presolved={} failures={}",
            self.search_nodes,
            self.search_unsolvable,
            self.search_gave_up,
            self.presolved,
            self.failures
        );

        self.last_log_time = Some(now);
        self.last_log_boards = self.boards;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Boards generated: {}", self.boards);
        println!("  - Rotate: {}", self.rotate_boards);
        println!("  - Slide: {}", self.slide_boards);
        println!("Still solved after scramble: {}", self.presolved);
        println!("Average links: {:.2}", self.average_links());
        println!("Rotation searches: {}", self.searched);
        println!("  - Unsolvable: {}", self.search_unsolvable);
        println!("  - Gave up: {}", self.search_gave_up);
        println!("  - Nodes: {}", self.search_nodes);
        println!("  - Max depth: {}", self.max_search_depth);
        println!("Consistency failures: {}", self.failures);

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                println!("Average rate: {:.0} boards/sec", self.boards as f64 / elapsed);
            }
        }
    }
}
