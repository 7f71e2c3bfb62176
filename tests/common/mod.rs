#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use court_vision::http_client::{Endpoint, SnapshotSource};
use court_vision::snapshot::RawRow;
use court_vision::{Error, Result, store};
use rusqlite::Connection;

/// In-memory upstream: canned rows per (endpoint, year), optional failures.
#[derive(Default)]
pub struct StubSource {
    rows: HashMap<(Endpoint, i32), Vec<RawRow>>,
    failing: HashSet<(Endpoint, i32)>,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, endpoint: Endpoint, year: i32, rows: Vec<RawRow>) -> Self {
        self.rows.insert((endpoint, year), rows);
        self
    }

    pub fn failing(mut self, endpoint: Endpoint, year: i32) -> Self {
        self.failing.insert((endpoint, year));
        self
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl SnapshotSource for StubSource {
    fn fetch(&self, endpoint: Endpoint, year: i32) -> Result<Vec<RawRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&(endpoint, year)) {
            return Err(Error::upstream(format!("stub: {} unavailable", endpoint.path())));
        }
        Ok(self.rows.get(&(endpoint, year)).cloned().unwrap_or_default())
    }
}

pub fn mem_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    store::init_schema(&conn).expect("init schema");
    conn
}

pub fn player_row(id: i64, name: &str, team: &str, bpm: f64, mpg: f64) -> RawRow {
    RawRow::new()
        .with("id", id)
        .with("player", name)
        .with("team", team)
        .with("conf", "B10")
        .with("pos", "Wing G")
        .with("bpm", bpm)
        .with("mpg", mpg)
        .with("drtg", 100.0 - bpm)
}

pub fn team_row(name: &str, adj_o: f64, adj_d: f64, barthag: f64) -> RawRow {
    RawRow::new()
        .with("team", name)
        .with("conf", "B10")
        .with("adj_o", adj_o)
        .with("adj_d", adj_d)
        .with("barthag", barthag)
}

pub fn player_game_row(id: i64, date: &str, opp: &str, pts: i64) -> RawRow {
    RawRow::new()
        .with("id", id)
        .with("date", date)
        .with("opp", opp)
        .with("pts", pts)
        .with("two_m", 4_i64)
        .with("two_a", 7_i64)
        .with("three_m", 1_i64)
        .with("three_a", 3_i64)
}

/// The two-game box score pair used across the aggregation tests.
pub fn team_box_rows(team: &str) -> Vec<RawRow> {
    vec![
        RawRow::new()
            .with("game_id", "g-a")
            .with("team", team)
            .with("date", "2024-01-05")
            .with("result", "W")
            .with("pos", 70.0)
            .with("pts", 77_i64)
            .with("opp_pts", 70_i64)
            .with("fgm", 20_i64)
            .with("fga", 50_i64)
            .with("tpm", 5_i64)
            .with("tpa", 15_i64)
            .with("fta", 20_i64)
            .with("to", 10_i64)
            .with("oreb", 8_i64)
            .with("opp_dreb", 25_i64)
            .with("opp_fga", 55_i64)
            .with("opp_fta", 18_i64)
            .with("opp_to", 12_i64),
        RawRow::new()
            .with("game_id", "g-b")
            .with("team", team)
            .with("date", "2024-01-02")
            .with("result", "L")
            .with("pos", 68.0)
            .with("pts", 65_i64)
            .with("opp_pts", 71_i64)
            .with("fgm", 25_i64)
            .with("fga", 55_i64)
            .with("tpm", 8_i64)
            .with("tpa", 20_i64)
            .with("fta", 15_i64)
            .with("to", 8_i64)
            .with("oreb", 10_i64)
            .with("opp_dreb", 20_i64)
            .with("opp_fga", 50_i64)
            .with("opp_fta", 20_i64)
            .with("opp_to", 14_i64),
    ]
}
