//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! Components never execute SQL; the engine calls store methods.

use rusqlite::{params, Connection, OptionalExtension};
use crate::{
    error::SimResult,
    event::EventLogEntry,
    types::Tick,
};

pub struct SimStore {
    conn: Connection,
}

/// A persisted snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub run_id:     String,
    pub tick:       Tick,
    pub version:    u32,
    pub saved_at:   i64,
    pub state_json: String,
}

impl SimStore {
    /// Open (or create) the colony database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        if path == ":memory:" {
            return Self::in_memory();
        }
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, tick, subsystem, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.run_id,
                entry.tick as i64,
                entry.subsystem,
                entry.event_type,
                entry.payload,
                entry.tick as i64,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, subsystem, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC"
        )?;
        let entries = stmt.query_map(params![run_id, tick as i64], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                tick:       row.get::<_, i64>(2)? as u64,
                subsystem:  row.get(3)?,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str) -> SimResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ── Save slots ─────────────────────────────────────────────

    pub fn save_slot(&self, run_id: &str, tick: Tick, version: u32, state_json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (run_id, tick, version, saved_at, state_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                tick as i64,
                version as i64,
                chrono::Utc::now().timestamp_millis(),
                state_json,
            ],
        )?;
        Ok(())
    }

    /// Most recent save for `run_id`.
    pub fn latest_save(&self, run_id: &str) -> SimResult<Option<SaveRecord>> {
        let record = self.conn.query_row(
            "SELECT run_id, tick, version, saved_at, state_json FROM save_slot
             WHERE run_id = ?1 ORDER BY id DESC LIMIT 1",
            params![run_id],
            Self::read_save,
        ).optional()?;
        Ok(record)
    }

    /// Most recent save of any run.
    pub fn latest_save_any(&self) -> SimResult<Option<SaveRecord>> {
        let record = self.conn.query_row(
            "SELECT run_id, tick, version, saved_at, state_json FROM save_slot
             ORDER BY id DESC LIMIT 1",
            [],
            Self::read_save,
        ).optional()?;
        Ok(record)
    }

    fn read_save(row: &rusqlite::Row<'_>) -> rusqlite::Result<SaveRecord> {
        Ok(SaveRecord {
            run_id:     row.get(0)?,
            tick:       row.get::<_, i64>(1)? as u64,
            version:    row.get::<_, i64>(2)? as u32,
            saved_at:   row.get(3)?,
            state_json: row.get(4)?,
        })
    }
}
