use std::time::Duration;

/// Session-level bookkeeping kept by the host, outside the engine
#[derive(Debug, Clone, Default)]
pub struct GameMetrics {
    /// Best score seen, seeded from the local store
    pub best_score: u32,
    pub games_played: u32,
    /// Whether the last finished game set a new best
    pub new_best: bool,
    /// Outcome of the last leaderboard submission, for display
    pub submission_status: Option<String>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best_score(best_score: u32) -> Self {
        Self {
            best_score,
            ..Self::default()
        }
    }

    pub fn on_game_start(&mut self) {
        self.new_best = false;
        self.submission_status = None;
    }

    /// Record a finished game. Returns true if it set a new best score.
    pub fn on_game_over(&mut self, final_score: u32) -> bool {
        self.games_played += 1;
        self.new_best = final_score > self.best_score;
        if self.new_best {
            self.best_score = final_score;
        }
        self.new_best
    }
}

/// Format a duration as mm:ss
pub fn format_time(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
