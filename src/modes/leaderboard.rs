use anyhow::{Context, Result};
use std::fmt::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::metrics::format_time;
use crate::service::{LeaderboardEntry, ScoreService};

/// Rows shown by default
pub const DEFAULT_LIMIT: usize = 10;

/// Print the remote leaderboard to stdout
pub struct LeaderboardMode {
    service: Arc<dyn ScoreService>,
    limit: usize,
    local_best: Option<u32>,
}

impl LeaderboardMode {
    pub fn new(service: Arc<dyn ScoreService>) -> Self {
        Self {
            service,
            limit: DEFAULT_LIMIT,
            local_best: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Show where this score would place
    pub fn with_local_best(mut self, best: u32) -> Self {
        self.local_best = Some(best);
        self
    }

    pub async fn run(&self) -> Result<()> {
        let service = Arc::clone(&self.service);
        let entries = tokio::task::spawn_blocking(move || service.leaderboard())
            .await
            .context("Leaderboard task panicked")?
            .context("Failed to fetch leaderboard")?;

        let table = render_table(&entries, self.limit, self.local_best)
            .context("Failed to format leaderboard")?;
        print!("{}", table);
        Ok(())
    }
}

/// 1-based rank `score` would take among `entries` (sorted best first).
/// Ties go below existing entries.
pub fn potential_rank(entries: &[LeaderboardEntry], score: u32) -> usize {
    entries.iter().take_while(|e| e.score >= score).count() + 1
}

/// Plain-text leaderboard
pub fn render_table(
    entries: &[LeaderboardEntry],
    limit: usize,
    local_best: Option<u32>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let divider = "-".repeat(60);

    writeln!(out, "{}", rule)?;
    writeln!(out, "COSMIC TRACER LEADERBOARD")?;
    writeln!(out, "{}", rule)?;

    if entries.is_empty() {
        writeln!(out, "No scores yet. Be the first!")?;
    } else {
        writeln!(out, "{:>4}  {:<30} {:>10} {:>8}", "Rank", "Player", "Score", "Time")?;
        writeln!(out, "{}", divider)?;
        for (i, entry) in entries.iter().take(limit).enumerate() {
            let time = entry
                .time_played
                .map(|secs| format_time(Duration::from_secs(secs)))
                .unwrap_or_else(|| "--:--".to_string());
            writeln!(
                out,
                "{:>4}  {:<30} {:>10} {:>8}",
                i + 1,
                truncate(&entry.username, 30),
                entry.score,
                time
            )?;
        }
        if entries.len() > limit {
            writeln!(out, "  ... and {} more", entries.len() - limit)?;
        }
    }

    if let Some(best) = local_best.filter(|&b| b > 0) {
        writeln!(out, "{}", divider)?;
        writeln!(
            out,
            "Your best: {} (would rank #{})",
            best,
            potential_rank(entries, best)
        )?;
    }
    writeln!(out, "{}", rule)?;

    Ok(out)
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(max - 1).collect();
        short.push('…');
        short
    }
}
