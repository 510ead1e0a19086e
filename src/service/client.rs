//! HTTP client for the score submission and leaderboard endpoints.
//!
//! Calls are blocking and bounded by a short timeout; callers on an async
//! runtime should run them on a blocking worker.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{ServiceError, ServiceResult};

const SUBMIT_PATH: &str = "/api/scores/submit/";
const LEADERBOARD_PATH: &str = "/api/scores/leaderboard/";

/// Body of a score submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    pub score: u32,
    /// Seconds of play
    pub time_played: u64,
}

/// What the service answered to a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmitReceipt {
    pub success: bool,
    pub message: Option<String>,
    pub id: Option<u64>,
    /// The player's best score as stored by the service
    pub score: Option<u32>,
}

/// One row of the remote leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    pub score: u32,
    #[serde(default)]
    pub time_played: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The external score service, as the game sees it
pub trait ScoreService: Send + Sync {
    fn submit_score(&self, submission: ScoreSubmission) -> ServiceResult<SubmitReceipt>;

    /// Top scores, best first
    fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

/// [`ScoreService`] over HTTP/JSON
pub struct HttpScoreService {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpScoreService {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            agent,
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }
}

impl ScoreService for HttpScoreService {
    fn submit_score(&self, submission: ScoreSubmission) -> ServiceResult<SubmitReceipt> {
        let url = self.url(SUBMIT_PATH);
        debug!(%url, score = submission.score, "submitting score");

        let request = self
            .authorize(self.agent.post(&url))
            .set("Accept", "application/json");

        let response = request.send_json(submission).map_err(|err| {
            let err = ServiceError::from_ureq(err);
            warn!(error = %err, "score submission failed");
            err
        })?;

        let mut receipt: SubmitReceipt = response
            .into_json()
            .map_err(|err| ServiceError::Decode(err.to_string()))?;
        // A 2xx is a success even if the body leaves the flag out
        receipt.success = true;

        info!(
            score = submission.score,
            stored = ?receipt.score,
            "score submitted"
        );
        Ok(receipt)
    }

    fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let url = self.url(LEADERBOARD_PATH);
        debug!(%url, "fetching leaderboard");

        let response = self
            .authorize(self.agent.get(&url))
            .set("Accept", "application/json")
            .call()
            .map_err(ServiceError::from_ureq)?;

        let mut entries: Vec<LeaderboardEntry> = response
            .into_json()
            .map_err(|err| ServiceError::Decode(err.to_string()))?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(count = entries.len(), "leaderboard received");
        Ok(entries)
    }
}
