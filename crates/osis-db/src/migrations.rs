use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users + voting schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                role        TEXT NOT NULL DEFAULT 'siswa',
                created_at  TEXT NOT NULL
            );

            CREATE TABLE voting_topics (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE voting_options (
                id          TEXT PRIMARY KEY,
                topic_id    TEXT NOT NULL REFERENCES voting_topics(id) ON DELETE CASCADE,
                label       TEXT NOT NULL,
                image       TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_voting_options_topic
                ON voting_options(topic_id, created_at);

            CREATE TABLE votes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                topic_id    TEXT NOT NULL REFERENCES voting_topics(id) ON DELETE CASCADE,
                option_id   TEXT NOT NULL REFERENCES voting_options(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL,
                UNIQUE(user_id, topic_id)
            );

            CREATE INDEX idx_votes_topic_option
                ON votes(topic_id, option_id);

            CREATE TABLE vote_results (
                topic_id    TEXT NOT NULL REFERENCES voting_topics(id) ON DELETE CASCADE,
                option_id   TEXT NOT NULL REFERENCES voting_options(id) ON DELETE CASCADE,
                count       INTEGER NOT NULL,
                percentage  REAL NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (topic_id, option_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
