// src/db/models/mod.rs

//! Data models for index database entities
//!
//! Each model maps to one table and only exposes insert and read paths.

mod cursor;
mod index_entry;
mod revision;

pub use cursor::IngestCursor;
pub use index_entry::IndexEntry;
pub use revision::Revision;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::version::Version;
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn create_test_db() -> (NamedTempFile, Connection) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = Connection::open(temp_file.path()).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        schema::migrate(&conn).unwrap();
        (temp_file, conn)
    }

    fn entry(rev: &str, timestamp: i64, package: &str, version: &str) -> IndexEntry {
        IndexEntry::new(
            Revision::new(rev, timestamp),
            package,
            Version::parse(version).unwrap(),
        )
    }

    #[test]
    fn test_revision_insert_is_idempotent() {
        let (_temp, conn) = create_test_db();

        let revision = Revision::new("abc123", 1000).with_nar_hash("sha256-xxx");
        assert!(revision.insert_if_absent(&conn).unwrap());
        assert!(!revision.insert_if_absent(&conn).unwrap());

        // A later insert with other attributes never rewrites history
        let changed = Revision::new("abc123", 5000);
        assert!(!changed.insert_if_absent(&conn).unwrap());

        let found = Revision::find_by_id(&conn, "abc123").unwrap().unwrap();
        assert_eq!(found, revision);
    }

    #[test]
    fn test_revision_list_since_orders_by_recency() {
        let (_temp, conn) = create_test_db();

        Revision::new("old", 1000).insert_if_absent(&conn).unwrap();
        Revision::new("new-b", 3000).insert_if_absent(&conn).unwrap();
        Revision::new("new-a", 3000).insert_if_absent(&conn).unwrap();
        Revision::new("mid", 2000).insert_if_absent(&conn).unwrap();

        let ids: Vec<String> = Revision::list_since(&conn, 2000)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new-a", "new-b", "mid"]);
    }

    #[test]
    fn test_revision_count_per_day() {
        let (_temp, conn) = create_test_db();

        // 2024-01-01 and 2024-01-02 UTC
        Revision::new("a", 1_704_067_200).insert_if_absent(&conn).unwrap();
        Revision::new("b", 1_704_070_800).insert_if_absent(&conn).unwrap();
        Revision::new("c", 1_704_153_600).insert_if_absent(&conn).unwrap();

        let counts = Revision::count_per_day(&conn).unwrap();
        assert_eq!(
            counts,
            vec![("2024-01-02".to_string(), 1), ("2024-01-01".to_string(), 2)]
        );
    }

    #[test]
    fn test_index_entry_insert_is_idempotent() {
        let (_temp, conn) = create_test_db();

        let e = entry("r1", 1000, "uv", "0.5.0");
        assert!(e.insert(&conn).unwrap());
        assert!(!e.insert(&conn).unwrap());
        assert_eq!(IndexEntry::count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_index_entry_find_by_package() {
        let (_temp, conn) = create_test_db();

        entry("r1", 1000, "ruff", "0.9.0").insert(&conn).unwrap();
        entry("r2", 2000, "ruff", "0.11.10").insert(&conn).unwrap();
        entry("r2", 2000, "ruff", "0.11.9").insert(&conn).unwrap();
        entry("r2", 2000, "uv", "0.6.0").insert(&conn).unwrap();

        let found = IndexEntry::find_by_package(&conn, "ruff").unwrap();
        let pairs: Vec<(String, String)> = found
            .iter()
            .map(|e| (e.revision.id.clone(), e.version.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("r2".to_string(), "0.11.10".to_string()),
                ("r2".to_string(), "0.11.9".to_string()),
                ("r1".to_string(), "0.9.0".to_string()),
            ]
        );

        assert_eq!(
            IndexEntry::package_names(&conn).unwrap(),
            vec!["ruff".to_string(), "uv".to_string()]
        );
    }

    #[test]
    fn test_ingest_cursor_save_and_replace() {
        let (_temp, conn) = create_test_db();

        assert!(IngestCursor::find(&conn, "hydra").unwrap().is_none());

        IngestCursor::save(&conn, "hydra", "page=2").unwrap();
        IngestCursor::save(&conn, "hydra", "page=3").unwrap();

        let cursor = IngestCursor::find(&conn, "hydra").unwrap().unwrap();
        assert_eq!(cursor.cursor, "page=3");
        assert!(cursor.updated_at.is_some());
    }
}
