/// Database row types — these map directly to SQLite rows.
/// Distinct from osis-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TopicRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct TopicWithOptionsRow {
    pub topic: TopicRow,
    pub options: Vec<OptionRow>,
}

#[derive(Debug, Clone)]
pub struct OptionRow {
    pub id: String,
    pub topic_id: String,
    pub label: String,
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct VoteRow {
    pub id: String,
    pub user_id: String,
    pub topic_id: String,
    pub option_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteResultRow {
    pub topic_id: String,
    pub option_id: String,
    pub count: i64,
    pub percentage: f64,
    pub updated_at: String,
}

/// A cached result joined with the option it tallies.
#[derive(Debug, Clone)]
pub struct ResultWithOptionRow {
    pub result: VoteResultRow,
    pub label: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRow {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct OptionDetailRow {
    pub option_id: String,
    pub label: String,
    pub vote_count: i64,
    pub voters: Vec<VoterRow>,
}
