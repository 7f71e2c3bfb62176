use std::time::{Duration, Instant};

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::aggregate::update_team_season_aggregates;
use crate::error::Result;
use crate::http_client::{Endpoint, SnapshotSource, fetch_or_empty};
use crate::identity::{
    normalize_player_games, normalize_player_seasons, normalize_team_games, normalize_team_seasons,
};
use crate::season::year_to_season;
use crate::store::{self, RefreshRun};

#[derive(Debug, Clone, Default)]
pub struct YearSummary {
    pub year: i32,
    pub season: String,
    pub player_seasons: usize,
    pub team_seasons: usize,
    pub player_games: usize,
    pub team_games: usize,
    pub teams_aggregated: usize,
    /// Per-game fetches that failed and were loaded as zero rows.
    pub errors: Vec<String>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RefreshSummary {
    pub years: Vec<YearSummary>,
    pub elapsed: Duration,
}

impl RefreshSummary {
    pub fn player_seasons(&self) -> usize {
        self.years.iter().map(|y| y.player_seasons).sum()
    }

    pub fn team_seasons(&self) -> usize {
        self.years.iter().map(|y| y.team_seasons).sum()
    }

    pub fn player_games(&self) -> usize {
        self.years.iter().map(|y| y.player_games).sum()
    }

    pub fn team_games(&self) -> usize {
        self.years.iter().map(|y| y.team_games).sum()
    }
}

/// Refresh one year end to end.
///
/// Season snapshots are required: either failing aborts the year before
/// anything is written. Per-game snapshots are optional and a failure loads
/// zero rows for that table, leaving the stored partition untouched.
pub fn refresh_year(
    conn: &mut Connection,
    source: &dyn SnapshotSource,
    year: i32,
    include_games: bool,
) -> Result<YearSummary> {
    let started = Instant::now();
    let started_at = Utc::now().to_rfc3339();
    let mut summary = YearSummary {
        year,
        season: year_to_season(year),
        ..YearSummary::default()
    };

    let (players, teams) = rayon::join(
        || source.fetch(Endpoint::PlayerSeason, year),
        || source.fetch(Endpoint::TeamRatings, year),
    );
    let (players, teams) = (players?, teams?);

    let players = normalize_player_seasons(&players, year);
    summary.player_seasons = store::upsert_player_seasons(conn, year, &players)?;
    let teams = normalize_team_seasons(&teams, year);
    summary.team_seasons = store::upsert_team_seasons(conn, year, &teams)?;

    if include_games {
        let rows = fetch_or_empty(source, Endpoint::PlayerGames, year, &mut summary.errors);
        let games = normalize_player_games(&rows, year);
        summary.player_games = store::replace_player_games(conn, year, &games)?;

        let rows = fetch_or_empty(source, Endpoint::TeamGames, year, &mut summary.errors);
        if !rows.is_empty() {
            let name_to_id = store::team_name_lookup(conn, year)?;
            let games = normalize_team_games(&rows, year, &name_to_id);
            summary.team_games = store::replace_team_games(conn, year, &games)?;
            if !games.is_empty() {
                summary.teams_aggregated = update_team_season_aggregates(conn, year)?;
            }
        }
    }

    summary.elapsed = started.elapsed();
    store::record_refresh_run(
        conn,
        &RefreshRun {
            started_at,
            year,
            include_games,
            player_seasons: summary.player_seasons,
            team_seasons: summary.team_seasons,
            player_games: summary.player_games,
            team_games: summary.team_games,
            teams_aggregated: summary.teams_aggregated,
            errors: summary.errors.clone(),
        },
    )?;
    info!(
        year,
        players = summary.player_seasons,
        teams = summary.team_seasons,
        player_games = summary.player_games,
        team_games = summary.team_games,
        aggregated = summary.teams_aggregated,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "year refreshed"
    );
    Ok(summary)
}

/// Years run one at a time; the first year that fails stops the batch.
pub fn refresh_years(
    conn: &mut Connection,
    source: &dyn SnapshotSource,
    years: &[i32],
    include_games: bool,
) -> Result<RefreshSummary> {
    let started = Instant::now();
    let mut summary = RefreshSummary::default();
    for &year in years {
        summary
            .years
            .push(refresh_year(conn, source, year, include_games)?);
    }
    summary.elapsed = started.elapsed();
    Ok(summary)
}
