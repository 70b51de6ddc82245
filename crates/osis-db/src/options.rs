use rusqlite::{Connection, Row};
use tracing::info;

use crate::models::OptionRow;
use crate::results::recompute_in;
use crate::topics::query_topic;
use crate::{Database, DbError, OptionalExt, Result, new_id, now};

/// Outcome of a partial option update.
#[derive(Debug, Clone)]
pub struct OptionUpdate {
    pub option: OptionRow,
    /// Image reference that was replaced and is no longer referenced by the row.
    pub replaced_image: Option<String>,
}

impl Database {
    // -- Options --

    pub fn create_option(
        &self,
        topic_id: &str,
        label: &str,
        image: Option<&str>,
    ) -> Result<OptionRow> {
        let label = required_label(label)?;
        let created_at = now();
        let row = OptionRow {
            id: new_id(),
            topic_id: topic_id.to_string(),
            label: label.to_string(),
            image: non_blank(image),
            updated_at: created_at.clone(),
            created_at,
        };

        self.with_tx(|tx| {
            if query_topic(tx, topic_id)?.is_none() {
                return Err(DbError::not_found("topic", topic_id));
            }
            tx.execute(
                "INSERT INTO voting_options (id, topic_id, label, image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    row.id,
                    row.topic_id,
                    row.label,
                    row.image,
                    row.created_at,
                    row.updated_at
                ],
            )?;
            Ok(())
        })?;

        Ok(row)
    }

    pub fn get_options_by_topic(&self, topic_id: &str) -> Result<Vec<OptionRow>> {
        self.with_conn(|conn| query_options_by_topic(conn, topic_id))
    }

    /// Merge the provided fields over the stored option. `None` keeps the
    /// current value.
    pub fn update_option(
        &self,
        topic_id: &str,
        option_id: &str,
        label: Option<&str>,
        image: Option<&str>,
    ) -> Result<OptionUpdate> {
        let label = label.map(required_label).transpose()?;
        let image = non_blank(image);

        self.with_tx(|tx| {
            let existing = query_option_in_topic(tx, topic_id, option_id)?
                .ok_or_else(|| DbError::not_found("option", option_id))?;

            let replaced_image = match (&existing.image, &image) {
                (Some(old), Some(new)) if old != new => Some(old.clone()),
                _ => None,
            };

            let option = OptionRow {
                label: label.map_or(existing.label, str::to_string),
                image: image.or(existing.image),
                updated_at: now(),
                ..existing
            };

            tx.execute(
                "UPDATE voting_options SET label = ?1, image = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![option.label, option.image, option.updated_at, option.id],
            )?;

            Ok(OptionUpdate {
                option,
                replaced_image,
            })
        })
    }

    /// Remove an option and the votes cast for it, then rebuild the topic's
    /// result snapshot so the remaining percentages add up again.
    /// Returns the deleted row so the caller can clean up its image.
    pub fn delete_option(&self, topic_id: &str, option_id: &str) -> Result<OptionRow> {
        let option = self.with_tx(|tx| {
            let option = query_option_in_topic(tx, topic_id, option_id)?
                .ok_or_else(|| DbError::not_found("option", option_id))?;

            tx.execute("DELETE FROM vote_results WHERE option_id = ?1", [option_id])?;
            let removed_votes = tx.execute("DELETE FROM votes WHERE option_id = ?1", [option_id])?;
            tx.execute("DELETE FROM voting_options WHERE id = ?1", [option_id])?;

            if removed_votes > 0 {
                recompute_in(tx, topic_id)?;
            }
            Ok(option)
        })?;

        info!("Deleted option {} from topic {}", option_id, topic_id);
        Ok(option)
    }
}

fn required_label(label: &str) -> Result<&str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(DbError::required("option label"));
    }
    Ok(label)
}

fn non_blank(image: Option<&str>) -> Option<String> {
    image
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

const OPTION_COLUMNS: &str = "id, topic_id, label, image, created_at, updated_at";

pub(crate) fn query_option(conn: &Connection, option_id: &str) -> Result<Option<OptionRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {OPTION_COLUMNS} FROM voting_options WHERE id = ?1"
    ))?;
    stmt.query_row([option_id], option_from_row).optional()
}

pub(crate) fn query_option_in_topic(
    conn: &Connection,
    topic_id: &str,
    option_id: &str,
) -> Result<Option<OptionRow>> {
    Ok(query_option(conn, option_id)?.filter(|o| o.topic_id == topic_id))
}

pub(crate) fn query_options_by_topic(conn: &Connection, topic_id: &str) -> Result<Vec<OptionRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {OPTION_COLUMNS} FROM voting_options WHERE topic_id = ?1 ORDER BY created_at, rowid"
    ))?;
    let rows = stmt
        .query_map([topic_id], option_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<OptionRow> {
    Ok(OptionRow {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        label: row.get(2)?,
        image: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(db: &Database) -> String {
        db.create_topic("Class President", None).unwrap().id
    }

    #[test]
    fn empty_label_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let topic_id = topic(&db);
        assert!(matches!(
            db.create_option(&topic_id, " ", None),
            Err(DbError::Validation(_))
        ));
        assert!(db.get_options_by_topic(&topic_id).unwrap().is_empty());
    }

    #[test]
    fn option_on_missing_topic_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.create_option(&new_id(), "A", None),
            Err(DbError::NotFound { entity: "topic", .. })
        ));
    }

    #[test]
    fn options_are_listed_in_creation_order() {
        let db = Database::open_in_memory().unwrap();
        let topic_id = topic(&db);
        db.create_option(&topic_id, "A", None).unwrap();
        db.create_option(&topic_id, "B", Some("")).unwrap();

        let labels: Vec<String> = db
            .get_options_by_topic(&topic_id)
            .unwrap()
            .into_iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert!(db.get_options_by_topic(&new_id()).unwrap().is_empty());
    }

    #[test]
    fn update_merges_fields_and_reports_replaced_image() {
        let db = Database::open_in_memory().unwrap();
        let topic_id = topic(&db);
        let opt = db
            .create_option(&topic_id, "A", Some("/uploads/images/a.png"))
            .unwrap();

        let relabeled = db.update_option(&topic_id, &opt.id, Some("Alpha"), None).unwrap();
        assert_eq!(relabeled.option.label, "Alpha");
        assert_eq!(relabeled.option.image.as_deref(), Some("/uploads/images/a.png"));
        assert_eq!(relabeled.replaced_image, None);

        let reimaged = db
            .update_option(&topic_id, &opt.id, None, Some("/uploads/images/b.png"))
            .unwrap();
        assert_eq!(reimaged.option.label, "Alpha");
        assert_eq!(reimaged.replaced_image.as_deref(), Some("/uploads/images/a.png"));

        let same = db
            .update_option(&topic_id, &opt.id, None, Some("/uploads/images/b.png"))
            .unwrap();
        assert_eq!(same.replaced_image, None);
    }

    #[test]
    fn update_and_delete_require_option_in_topic() {
        let db = Database::open_in_memory().unwrap();
        let topic_id = topic(&db);
        let other_topic = topic(&db);
        let opt = db.create_option(&topic_id, "A", None).unwrap();

        assert!(matches!(
            db.update_option(&other_topic, &opt.id, Some("B"), None),
            Err(DbError::NotFound { entity: "option", .. })
        ));
        assert!(matches!(
            db.delete_option(&topic_id, &new_id()),
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.update_option(&topic_id, &opt.id, Some(""), None),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn deleting_option_drops_its_votes_and_rebalances_results() {
        let db = Database::open_in_memory().unwrap();
        let topic_id = topic(&db);
        let a = db.create_option(&topic_id, "A", None).unwrap();
        let b = db.create_option(&topic_id, "B", None).unwrap();
        db.submit_vote(&new_id(), &topic_id, &a.id).unwrap();
        db.submit_vote(&new_id(), &topic_id, &b.id).unwrap();
        db.recompute_results(&topic_id).unwrap();

        let deleted = db.delete_option(&topic_id, &b.id).unwrap();
        assert_eq!(deleted.id, b.id);
        assert_eq!(db.count_votes(&topic_id).unwrap(), 1);

        let results = db.get_results_by_topic(&topic_id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].result.option_id, a.id);
        assert_eq!(results[0].result.count, 1);
        assert_eq!(results[0].result.percentage, 100.0);
    }
}
