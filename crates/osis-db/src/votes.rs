use rusqlite::{Connection, Row};
use tracing::{debug, info};

use crate::error::is_unique_violation;
use crate::models::VoteRow;
use crate::options::query_option;
use crate::{Database, DbError, OptionalExt, Result, new_id, now};

impl Database {
    // -- Votes --

    /// Record a user's vote. At most one vote per user per topic.
    ///
    /// The existence pre-check only saves a write; the UNIQUE(user_id, topic_id)
    /// constraint decides races between concurrent submissions.
    pub fn submit_vote(&self, user_id: &str, topic_id: &str, option_id: &str) -> Result<VoteRow> {
        let vote = self.with_tx(|tx| {
            let option = query_option(tx, option_id)?
                .ok_or_else(|| DbError::not_found("option", option_id))?;
            if option.topic_id != topic_id {
                return Err(DbError::Referential {
                    option_id: option_id.to_string(),
                    topic_id: topic_id.to_string(),
                });
            }

            if query_user_vote(tx, user_id, topic_id)?.is_some() {
                debug!("User {} already voted on topic {}", user_id, topic_id);
                return Err(DbError::DuplicateVote {
                    user_id: user_id.to_string(),
                    topic_id: topic_id.to_string(),
                });
            }

            let vote = VoteRow {
                id: new_id(),
                user_id: user_id.to_string(),
                topic_id: topic_id.to_string(),
                option_id: option_id.to_string(),
                created_at: now(),
            };
            insert_vote(tx, &vote)?;
            Ok(vote)
        })?;

        info!("User {} voted on topic {}", user_id, topic_id);
        Ok(vote)
    }

    pub fn get_user_vote(&self, user_id: &str, topic_id: &str) -> Result<Option<VoteRow>> {
        self.with_conn(|conn| query_user_vote(conn, user_id, topic_id))
    }

    pub fn count_votes(&self, topic_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM votes WHERE topic_id = ?1",
                [topic_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }
}

/// Insert a ledger row. A UNIQUE(user_id, topic_id) hit becomes DuplicateVote.
fn insert_vote(conn: &Connection, vote: &VoteRow) -> Result<()> {
    conn.execute(
        "INSERT INTO votes (id, user_id, topic_id, option_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            vote.id,
            vote.user_id,
            vote.topic_id,
            vote.option_id,
            vote.created_at
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::DuplicateVote {
                user_id: vote.user_id.clone(),
                topic_id: vote.topic_id.clone(),
            }
        } else {
            e.into()
        }
    })?;
    Ok(())
}

fn query_user_vote(conn: &Connection, user_id: &str, topic_id: &str) -> Result<Option<VoteRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, topic_id, option_id, created_at
         FROM votes WHERE user_id = ?1 AND topic_id = ?2",
    )?;
    stmt.query_row([user_id, topic_id], vote_from_row).optional()
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<VoteRow> {
    Ok(VoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        topic_id: row.get(2)?,
        option_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        db: Database,
        topic: String,
        a: String,
        b: String,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let topic = db.create_topic("Class President", None).unwrap().id;
        let a = db.create_option(&topic, "A", None).unwrap().id;
        let b = db.create_option(&topic, "B", None).unwrap().id;
        Fixture { db, topic, a, b }
    }

    #[test]
    fn second_vote_on_same_topic_is_rejected() {
        let f = fixture();
        let user = new_id();
        f.db.submit_vote(&user, &f.topic, &f.a).unwrap();

        let err = f.db.submit_vote(&user, &f.topic, &f.b).unwrap_err();
        assert!(matches!(err, DbError::DuplicateVote { .. }));

        assert_eq!(f.db.count_votes(&f.topic).unwrap(), 1);
        let vote = f.db.get_user_vote(&user, &f.topic).unwrap().unwrap();
        assert_eq!(vote.option_id, f.a);
    }

    #[test]
    fn different_users_vote_independently() {
        let f = fixture();
        f.db.submit_vote(&new_id(), &f.topic, &f.a).unwrap();
        f.db.submit_vote(&new_id(), &f.topic, &f.a).unwrap();
        assert_eq!(f.db.count_votes(&f.topic).unwrap(), 2);
    }

    #[test]
    fn option_from_another_topic_is_referential_error() {
        let f = fixture();
        let other = f.db.create_topic("Mascot", None).unwrap().id;
        let err = f.db.submit_vote(&new_id(), &other, &f.a).unwrap_err();
        assert!(matches!(err, DbError::Referential { .. }));
        assert_eq!(f.db.count_votes(&other).unwrap(), 0);
    }

    #[test]
    fn unknown_option_is_not_found() {
        let f = fixture();
        let err = f.db.submit_vote(&new_id(), &f.topic, &new_id()).unwrap_err();
        assert!(matches!(err, DbError::NotFound { entity: "option", .. }));
    }

    #[test]
    fn unique_constraint_surfaces_as_duplicate_vote() {
        let f = fixture();
        let user = new_id();
        f.db.submit_vote(&user, &f.topic, &f.a).unwrap();

        // Same insert path submit_vote uses, without the pre-check in front.
        let racing = VoteRow {
            id: new_id(),
            user_id: user.clone(),
            topic_id: f.topic.clone(),
            option_id: f.b.clone(),
            created_at: now(),
        };
        let err = f.db.with_conn(|conn| insert_vote(conn, &racing)).unwrap_err();
        match err {
            DbError::DuplicateVote { user_id, topic_id } => {
                assert_eq!(user_id, user);
                assert_eq!(topic_id, f.topic);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(f.db.count_votes(&f.topic).unwrap(), 1);
    }

    #[test]
    fn concurrent_submissions_from_separate_connections_keep_one_vote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osis.db");
        let setup = Database::open(&path).unwrap();
        let topic = setup.create_topic("Class President", None).unwrap().id;
        let a = setup.create_option(&topic, "A", None).unwrap().id;
        let b = setup.create_option(&topic, "B", None).unwrap().id;
        let user = new_id();

        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|option| {
                let (path, topic, user) = (path.clone(), topic.clone(), user.clone());
                std::thread::spawn(move || {
                    let db = Database::open(&path).unwrap();
                    db.submit_vote(&user, &topic, &option)
                })
            })
            .collect();
        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(DbError::DuplicateVote { .. })))
        );
        assert_eq!(setup.count_votes(&topic).unwrap(), 1);
    }
}
