use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingTopic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingOption {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub label: String,
    /// Reference into image storage, e.g. `/uploads/images/<file>`.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A topic together with every option it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWithOptions {
    #[serde(flatten)]
    pub topic: VotingTopic,
    pub options: Vec<VotingOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic_id: Uuid,
    pub option_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Cached tally for one option. Rebuilt from the vote ledger after every vote,
/// so it can lag behind the ledger until the next recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub topic_id: Uuid,
    pub option_id: Uuid,
    pub count: u64,
    pub percentage: f64,
    pub updated_at: DateTime<Utc>,
    pub label: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub user_id: Uuid,
    pub username: String,
}

/// Live view of one option, read straight from the vote ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionVoteDetail {
    pub option_id: Uuid,
    pub label: String,
    pub vote_count: u64,
    pub voters: Vec<Voter>,
}
