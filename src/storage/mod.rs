pub mod best_score;

pub use best_score::BestScoreStore;
