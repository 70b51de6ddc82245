use rusqlite::{Connection, Row};
use tracing::info;

use crate::models::{TopicRow, TopicWithOptionsRow};
use crate::options::query_options_by_topic;
use crate::{Database, DbError, OptionalExt, Result, new_id, now};

impl Database {
    // -- Topics --

    pub fn create_topic(&self, title: &str, description: Option<&str>) -> Result<TopicRow> {
        let title = required_title(title)?;
        let created_at = now();
        let row = TopicRow {
            id: new_id(),
            title: title.to_string(),
            description: description.map(str::to_string),
            updated_at: created_at.clone(),
            created_at,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO voting_topics (id, title, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![row.id, row.title, row.description, row.created_at, row.updated_at],
            )?;
            Ok(())
        })?;

        info!("Created voting topic {} ({})", row.id, row.title);
        Ok(row)
    }

    pub fn get_topics(&self) -> Result<Vec<TopicRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, created_at, updated_at
                 FROM voting_topics
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map([], topic_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Topic plus its options. A topic without options is returned with an empty list.
    pub fn get_topic_by_id(&self, id: &str) -> Result<TopicWithOptionsRow> {
        self.with_conn(|conn| {
            let topic = query_topic(conn, id)?.ok_or_else(|| DbError::not_found("topic", id))?;
            let options = query_options_by_topic(conn, id)?;
            Ok(TopicWithOptionsRow { topic, options })
        })
    }

    pub fn update_topic(
        &self,
        id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<TopicRow> {
        let title = required_title(title)?;

        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE voting_topics SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![title, description, now(), id],
            )?;
            if changed == 0 {
                return Err(DbError::not_found("topic", id));
            }
            query_topic(tx, id)?.ok_or_else(|| DbError::not_found("topic", id))
        })
    }

    /// Delete a topic with everything hanging off it in one transaction:
    /// results, votes, options, then the topic itself.
    ///
    /// Returns the image references of the removed options. The files are not
    /// touched here; callers remove them after the commit.
    pub fn delete_topic(&self, id: &str) -> Result<Vec<String>> {
        let images = self.with_tx(|tx| {
            if query_topic(tx, id)?.is_none() {
                return Err(DbError::not_found("topic", id));
            }

            let images: Vec<String> = query_options_by_topic(tx, id)?
                .into_iter()
                .filter_map(|o| o.image)
                .collect();

            tx.execute("DELETE FROM vote_results WHERE topic_id = ?1", [id])?;
            tx.execute("DELETE FROM votes WHERE topic_id = ?1", [id])?;
            tx.execute("DELETE FROM voting_options WHERE topic_id = ?1", [id])?;
            tx.execute("DELETE FROM voting_topics WHERE id = ?1", [id])?;

            Ok(images)
        })?;

        info!("Deleted voting topic {}", id);
        Ok(images)
    }
}

fn required_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DbError::required("title"));
    }
    Ok(title)
}

pub(crate) fn query_topic(conn: &Connection, id: &str) -> Result<Option<TopicRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, created_at, updated_at FROM voting_topics WHERE id = ?1",
    )?;
    stmt.query_row([id], topic_from_row).optional()
}

fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<TopicRow> {
    Ok(TopicRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_topic_without_options() {
        let db = Database::open_in_memory().unwrap();
        let topic = db.create_topic("  Class President ", Some("Term 2")).unwrap();
        assert_eq!(topic.title, "Class President");

        let fetched = db.get_topic_by_id(&topic.id).unwrap();
        assert_eq!(fetched.topic.id, topic.id);
        assert_eq!(fetched.topic.description.as_deref(), Some("Term 2"));
        assert!(fetched.options.is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.create_topic("   ", None), Err(DbError::Validation(_))));
        assert!(db.get_topics().unwrap().is_empty());
    }

    #[test]
    fn missing_topic_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let id = new_id();
        assert!(matches!(db.get_topic_by_id(&id), Err(DbError::NotFound { .. })));
        assert!(matches!(db.update_topic(&id, "x", None), Err(DbError::NotFound { .. })));
        assert!(matches!(db.delete_topic(&id), Err(DbError::NotFound { .. })));
    }

    #[test]
    fn update_replaces_title_and_description() {
        let db = Database::open_in_memory().unwrap();
        let topic = db.create_topic("Old", Some("old")).unwrap();

        let updated = db.update_topic(&topic.id, "New", None).unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.description, None);
        assert_eq!(updated.created_at, topic.created_at);
        assert!(updated.updated_at >= topic.updated_at);
        assert_eq!(db.get_topics().unwrap().len(), 1);
    }

    #[test]
    fn delete_topic_leaves_no_orphans() {
        let db = Database::open_in_memory().unwrap();
        let topic = db.create_topic("Mascot", None).unwrap();
        let cat = db
            .create_option(&topic.id, "Cat", Some("/uploads/images/cat.png"))
            .unwrap();
        let dog = db.create_option(&topic.id, "Dog", None).unwrap();
        db.submit_vote(&new_id(), &topic.id, &cat.id).unwrap();
        db.submit_vote(&new_id(), &topic.id, &dog.id).unwrap();
        db.recompute_results(&topic.id).unwrap();

        let images = db.delete_topic(&topic.id).unwrap();
        assert_eq!(images, vec!["/uploads/images/cat.png".to_string()]);

        let orphans: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT (SELECT COUNT(*) FROM voting_options WHERE topic_id = ?1)
                          + (SELECT COUNT(*) FROM votes WHERE topic_id = ?1)
                          + (SELECT COUNT(*) FROM vote_results WHERE topic_id = ?1)",
                    [&topic.id],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
