// src/db/models/cursor.rs

//! IngestCursor model - where ingestion resumes for each build source

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Last committed position in a build source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestCursor {
    pub source: String,
    pub cursor: String,
    pub updated_at: Option<String>,
}

impl IngestCursor {
    /// Store the cursor for a source, replacing the previous position
    pub fn save(conn: &Connection, source: &str, cursor: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO ingest_cursors (source, cursor) VALUES (?1, ?2)
             ON CONFLICT (source) DO UPDATE SET cursor = excluded.cursor,
                                                updated_at = CURRENT_TIMESTAMP",
            params![source, cursor],
        )?;
        Ok(())
    }

    /// Load the cursor for a source
    pub fn find(conn: &Connection, source: &str) -> Result<Option<Self>> {
        let cursor = conn
            .query_row(
                "SELECT source, cursor, updated_at FROM ingest_cursors WHERE source = ?1",
                [source],
                |row| {
                    Ok(Self {
                        source: row.get(0)?,
                        cursor: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(cursor)
    }
}
