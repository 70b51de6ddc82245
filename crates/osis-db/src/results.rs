use rusqlite::Connection;
use tracing::{debug, info};

use crate::models::{OptionDetailRow, ResultWithOptionRow, VoteResultRow, VoterRow};
use crate::options::query_option_in_topic;
use crate::{Database, DbError, Result, now};

impl Database {
    // -- Results --

    /// Rebuild the cached tally for a topic from the vote ledger.
    pub fn recompute_results(&self, topic_id: &str) -> Result<Vec<VoteResultRow>> {
        self.with_tx(|tx| recompute_in(tx, topic_id))
    }

    /// Drop every cached result row for a topic. Returns the number removed.
    pub fn delete_results_for_topic(&self, topic_id: &str) -> Result<usize> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM vote_results WHERE topic_id = ?1", [topic_id])?)
        })?;
        info!("Cleared {} cached results for topic {}", removed, topic_id);
        Ok(removed)
    }

    /// Clear and rebuild a topic's results in one transaction.
    pub fn recount_results(&self, topic_id: &str) -> Result<Vec<VoteResultRow>> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM vote_results WHERE topic_id = ?1", [topic_id])?;
            recompute_in(tx, topic_id)
        })
    }

    /// Cached results joined with option metadata, in storage order.
    pub fn get_results_by_topic(&self, topic_id: &str) -> Result<Vec<ResultWithOptionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT vr.topic_id, vr.option_id, vr.count, vr.percentage, vr.updated_at,
                        vo.label, vo.image
                 FROM vote_results vr
                 JOIN voting_options vo ON vr.option_id = vo.id
                 WHERE vr.topic_id = ?1
                 ORDER BY vr.rowid",
            )?;
            let rows = stmt
                .query_map([topic_id], |row| {
                    Ok(ResultWithOptionRow {
                        result: VoteResultRow {
                            topic_id: row.get(0)?,
                            option_id: row.get(1)?,
                            count: row.get(2)?,
                            percentage: row.get(3)?,
                            updated_at: row.get(4)?,
                        },
                        label: row.get(5)?,
                        image: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Live per-option view straight from the ledger. Never reads the cache,
    /// so it is correct even when results have not been recomputed.
    pub fn get_result_detail_for_option(
        &self,
        topic_id: &str,
        option_id: &str,
    ) -> Result<OptionDetailRow> {
        self.with_conn(|conn| {
            let option = query_option_in_topic(conn, topic_id, option_id)?
                .ok_or_else(|| DbError::not_found("option", option_id))?;

            let mut stmt = conn.prepare(
                "SELECT v.user_id, COALESCE(u.username, 'unknown')
                 FROM votes v
                 LEFT JOIN users u ON v.user_id = u.id
                 WHERE v.topic_id = ?1 AND v.option_id = ?2
                 ORDER BY v.created_at, v.rowid",
            )?;
            let voters = stmt
                .query_map([topic_id, option_id], |row| {
                    Ok(VoterRow {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(OptionDetailRow {
                option_id: option.id,
                label: option.label,
                vote_count: voters.len() as i64,
                voters,
            })
        })
    }
}

/// Recompute inside an open transaction. Upserts one row per option with at
/// least one vote; writes nothing when the topic has no votes.
pub(crate) fn recompute_in(conn: &Connection, topic_id: &str) -> Result<Vec<VoteResultRow>> {
    let mut stmt = conn.prepare(
        "SELECT option_id, COUNT(*) FROM votes
         WHERE topic_id = ?1
         GROUP BY option_id
         ORDER BY option_id",
    )?;
    let counts = stmt
        .query_map([topic_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total: i64 = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        debug!("No votes for topic {}, nothing to aggregate", topic_id);
        return Ok(vec![]);
    }

    let updated_at = now();
    let mut upsert = conn.prepare(
        "INSERT INTO vote_results (topic_id, option_id, count, percentage, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (topic_id, option_id) DO UPDATE
         SET count = excluded.count,
             percentage = excluded.percentage,
             updated_at = excluded.updated_at",
    )?;

    let mut rows = Vec::with_capacity(counts.len());
    for (option_id, count) in counts {
        let row = VoteResultRow {
            topic_id: topic_id.to_string(),
            option_id,
            count,
            percentage: percentage(count, total),
            updated_at: updated_at.clone(),
        };
        upsert.execute(rusqlite::params![
            row.topic_id,
            row.option_id,
            row.count,
            row.percentage,
            row.updated_at
        ])?;
        rows.push(row);
    }

    debug!("Recomputed {} result rows for topic {} ({} votes)", rows.len(), topic_id, total);
    Ok(rows)
}

/// Share of `total` as a percentage. Stored unrounded; presentation rounds.
fn percentage(count: i64, total: i64) -> f64 {
    count as f64 / total as f64 * 100.0
}
