//! Row-to-wire conversions. Stored ids and timestamps are text; a corrupt
//! value is logged and replaced with a default rather than failing the
//! whole response.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use osis_db::models::{
    OptionDetailRow, OptionRow, ResultWithOptionRow, TopicRow, TopicWithOptionsRow, VoteRow,
};
use osis_types::models::{
    OptionVoteDetail, Vote, VoteResult, Voter, VotingOption, VotingTopic, TopicWithOptions,
};

fn uuid(field: &str, raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, raw, e);
        Uuid::default()
    })
}

fn timestamp(field: &str, raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}': {}", field, raw, e);
            DateTime::default()
        })
}

fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

pub fn topic(row: TopicRow) -> VotingTopic {
    VotingTopic {
        id: uuid("topic id", &row.id),
        title: row.title,
        description: row.description,
        created_at: timestamp("created_at", &row.created_at),
        updated_at: timestamp("updated_at", &row.updated_at),
    }
}

pub fn option(row: OptionRow) -> VotingOption {
    VotingOption {
        id: uuid("option id", &row.id),
        topic_id: uuid("topic_id", &row.topic_id),
        label: row.label,
        image: row.image,
        created_at: timestamp("created_at", &row.created_at),
        updated_at: timestamp("updated_at", &row.updated_at),
    }
}

pub fn topic_with_options(row: TopicWithOptionsRow) -> TopicWithOptions {
    TopicWithOptions {
        topic: topic(row.topic),
        options: row.options.into_iter().map(option).collect(),
    }
}

pub fn vote(row: VoteRow) -> Vote {
    Vote {
        id: uuid("vote id", &row.id),
        user_id: uuid("user_id", &row.user_id),
        topic_id: uuid("topic_id", &row.topic_id),
        option_id: uuid("option_id", &row.option_id),
        created_at: timestamp("created_at", &row.created_at),
    }
}

pub fn result(row: ResultWithOptionRow) -> VoteResult {
    VoteResult {
        topic_id: uuid("topic_id", &row.result.topic_id),
        option_id: uuid("option_id", &row.result.option_id),
        count: count(row.result.count),
        percentage: row.result.percentage,
        updated_at: timestamp("updated_at", &row.result.updated_at),
        label: row.label,
        image: row.image,
    }
}

pub fn detail(row: OptionDetailRow) -> OptionVoteDetail {
    OptionVoteDetail {
        option_id: uuid("option_id", &row.option_id),
        label: row.label,
        vote_count: count(row.vote_count),
        voters: row
            .voters
            .into_iter()
            .map(|v| Voter {
                user_id: uuid("voter id", &v.user_id),
                username: v.username,
            })
            .collect(),
    }
}
