use crate::error::PortalError;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use log::{info, warn};
use rusqlite::{Connection, params};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// Directory holding the activity database and its startup backups
pub const DATABASE_DIR: &str = "database";

/// SQLite file backing the activity log
pub const ACTIVITY_DB_FILE: &str = "database/activity_log.db";

/// Startup backups land in this subdirectory next to the database file
pub const BACKUP_SUBDIR: &str = "backups";

/// Timestamp format used for activity records, `2024-01-31 14:05:09`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// The original deployment ran on Brazilian local time (UTC-3).
const PORTAL_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Current wall-clock time in the portal's fixed regional timezone
pub fn now_portal() -> DateTime<FixedOffset> {
    let offset = FixedOffset::west_opt(PORTAL_UTC_OFFSET_SECS).unwrap();
    Utc::now().with_timezone(&offset)
}

/// Render a session duration as `H:MM:SS`
///
/// Negative spans (clock adjustments between login and logout) clamp to zero
/// so the logged duration is always non-negative.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// One login/logout event as stored in the activity table
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityRecord {
    /// Email of the account the event belongs to
    pub email: String,

    /// `login`, `logout (duration: H:MM:SS)` or `logout (duration: unknown)`
    pub action: String,

    /// Wall-clock timestamp in [`TIMESTAMP_FORMAT`]
    pub timestamp: String,
}

/// Append-only activity log backed by a single SQLite table
///
/// Every event is one INSERT with an implicit commit, so concurrent request
/// handlers cannot lose each other's entries. Records are never updated or
/// deleted; the whole file is only ever backup-copied at startup.
pub struct ActivityLog {
    conn: Mutex<Connection>,
}

impl ActivityLog {
    /// Open (or create) the activity database at `path`
    ///
    /// If the file already exists it is first copied into a `backups`
    /// subdirectory under a timestamped name; a failed copy is logged and
    /// ignored, since
    /// the portal should still come up without its backup.
    pub fn open(path: &Path) -> Result<ActivityLog, PortalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            backup_existing(path);
        }

        let conn = Connection::open(path)?;
        init_schema(&conn)?;

        Ok(ActivityLog {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory activity log (used by tests)
    pub fn open_in_memory() -> Result<ActivityLog, PortalError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(ActivityLog {
            conn: Mutex::new(conn),
        })
    }

    /// Append one event stamped with the current portal time
    ///
    /// Callers on the request path treat a failure here as non-fatal: the
    /// triggering login/logout must succeed even if its audit record does
    /// not land.
    pub fn record(&self, email: &str, action: &str) -> Result<(), PortalError> {
        let timestamp = now_portal().format(TIMESTAMP_FORMAT).to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO activity_log (email, action, timestamp) VALUES (?1, ?2, ?3)",
            params![email, action, timestamp],
        )?;
        Ok(())
    }

    /// All recorded events in insertion order
    pub fn fetch_all(&self) -> Result<Vec<ActivityRecord>, PortalError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT email, action, timestamp FROM activity_log ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ActivityRecord {
                email: row.get(0)?,
                action: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            action TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// One-shot backup copy of an existing activity database
fn backup_existing(path: &Path) {
    let stamp = now_portal().format("%Y%m%d_%H%M%S");
    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("activity_log");
    let backup_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(BACKUP_SUBDIR);
    let backup_path = backup_dir.join(format!("{}_{}.db", file_name, stamp));

    let result = fs::create_dir_all(&backup_dir).and_then(|_| fs::copy(path, &backup_path));
    match result {
        Ok(_) => info!("backed up activity log to {}", backup_path.display()),
        Err(e) => warn!("activity log backup failed ({}); continuing without it", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn records_are_fetched_in_insertion_order() {
        let log = ActivityLog::open_in_memory().unwrap();
        log.record("ana@example.com", "login").unwrap();
        log.record("bob@example.com", "login").unwrap();
        log.record("ana@example.com", "logout (duration: 0:10:00)")
            .unwrap();

        let records = log.fetch_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].email, "ana@example.com");
        assert_eq!(records[0].action, "login");
        assert_eq!(records[1].email, "bob@example.com");
        assert_eq!(records[2].action, "logout (duration: 0:10:00)");
    }

    #[test]
    fn login_then_logout_timestamps_do_not_decrease() {
        let log = ActivityLog::open_in_memory().unwrap();
        log.record("eva@example.com", "login").unwrap();
        let action = format!("logout (duration: {})", format_duration(Duration::zero()));
        log.record("eva@example.com", &action).unwrap();

        let records = log.fetch_all().unwrap();
        assert_eq!(records.len(), 2);

        let first = NaiveDateTime::parse_from_str(&records[0].timestamp, TIMESTAMP_FORMAT).unwrap();
        let second =
            NaiveDateTime::parse_from_str(&records[1].timestamp, TIMESTAMP_FORMAT).unwrap();
        assert!(second >= first);
        assert_eq!(records[1].action, "logout (duration: 0:00:00)");
    }

    #[test]
    fn duration_renders_as_hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::zero()), "0:00:00");
        assert_eq!(format_duration(Duration::seconds(61)), "0:01:01");
        assert_eq!(format_duration(Duration::seconds(3661)), "1:01:01");
        // Multi-day sessions roll the hours past 24 rather than wrapping.
        assert_eq!(format_duration(Duration::seconds(90_000)), "25:00:00");
        // Clock going backwards clamps to zero.
        assert_eq!(format_duration(Duration::seconds(-5)), "0:00:00");
    }

    #[test]
    fn opening_a_file_database_creates_the_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity_log.db");
        let log = ActivityLog::open(&path).unwrap();
        log.record("eva@example.com", "login").unwrap();
        drop(log);

        // Reopen and confirm the record survived.
        let log = ActivityLog::open(&path).unwrap();
        let records = log.fetch_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "eva@example.com");
    }

    #[test]
    fn reopening_copies_a_startup_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity_log.db");

        let log = ActivityLog::open(&path).unwrap();
        log.record("eva@example.com", "login").unwrap();
        drop(log);

        let _log = ActivityLog::open(&path).unwrap();

        let backups: Vec<_> = std::fs::read_dir(dir.path().join(BACKUP_SUBDIR))
            .unwrap()
            .collect();
        assert_eq!(backups.len(), 1);
    }
}
