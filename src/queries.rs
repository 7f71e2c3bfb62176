//! Store-backed reads behind the listing, profile, roster and game-log
//! endpoints. Everything here is read-only.

use std::collections::BTreeMap;

use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::field_map::round1;
use crate::percentiles::{PLAYER_STATS, TEAM_STATS, compute_percentiles};
use crate::profile::{PlayerGameLog, PlayerProfile, SeasonStats};
use crate::records::{PlayerSeason, TeamGame, TeamSeason, TeamStatLine};
use crate::season::year_to_season;
use crate::store::{
    self, PLAYER_SEASON_COLUMNS, TEAM_SEASON_COLUMNS, collect_rows, player_season_from_row,
    team_season_from_row,
};

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub year: i32,
    /// Case-insensitive exact match.
    pub conference: Option<String>,
    /// Case-insensitive prefix, so "G" matches "G" and "Guard".
    pub position: Option<String>,
    pub min_mpg: Option<f64>,
}

impl PlayerFilter {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }
}

/// Player seasons matching `filter`, best bpm first.
///
/// An empty year is `NotSeeded`; an empty result for a loaded year is just an
/// empty list.
pub fn list_players(conn: &Connection, filter: &PlayerFilter) -> Result<Vec<PlayerSeason>> {
    let mut conditions = vec!["year = ?".to_string()];
    let mut values = vec![Value::Integer(i64::from(filter.year))];
    if let Some(conf) = filter.conference.as_deref() {
        conditions.push("UPPER(conference) = ?".to_string());
        values.push(Value::Text(conf.to_uppercase()));
    }
    if let Some(pos) = filter.position.as_deref() {
        conditions.push("UPPER(position) LIKE ?".to_string());
        values.push(Value::Text(format!("{}%", pos.to_uppercase())));
    }
    if let Some(min) = filter.min_mpg {
        conditions.push("mpg >= ?".to_string());
        values.push(Value::Real(min));
    }

    let sql = format!(
        "SELECT {PLAYER_SEASON_COLUMNS} FROM player_seasons WHERE {} \
         ORDER BY bpm DESC NULLS LAST, player_id",
        conditions.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = collect_rows(stmt.query_map(params_from_iter(values.iter()), player_season_from_row)?)?;

    if rows.is_empty() && store::count_player_seasons(conn, filter.year)? == 0 {
        return Err(Error::NotSeeded {
            year: filter.year,
            season: year_to_season(filter.year),
        });
    }
    Ok(rows)
}

/// Career profile from every stored season. Identity comes from the latest
/// season; percentiles rank against that season's stored population.
pub fn player_profile(conn: &Connection, player_id: &str) -> Result<PlayerProfile> {
    let history = store::load_player_history(conn, player_id)?;
    let Some(latest) = history.last() else {
        return Err(Error::not_found("player", player_id));
    };
    let identity = latest.identity();

    let mut stats = BTreeMap::new();
    for season in &history {
        let population = store::load_player_seasons(conn, season.year)?;
        stats.insert(
            year_to_season(season.year),
            SeasonStats {
                line: season.stat_line(),
                percentiles: compute_percentiles(season, &population, PLAYER_STATS),
            },
        );
    }

    Ok(PlayerProfile {
        player_id: player_id.to_string(),
        identity,
        seasons: stats.keys().cloned().collect(),
        stats,
    })
}

/// Stored games for one player-season, newest first.
pub fn player_games(conn: &Connection, player_id: &str, year: i32) -> Result<Vec<PlayerGameLog>> {
    let games = store::load_player_games(conn, player_id, year)?;
    Ok(games.into_iter().map(PlayerGameLog::from).collect())
}

pub fn list_teams(conn: &Connection, year: i32, conference: Option<&str>) -> Result<Vec<TeamSeason>> {
    let mut sql = format!("SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons WHERE year = ?1");
    let mut values = vec![Value::Integer(i64::from(year))];
    if let Some(conf) = conference {
        sql.push_str(" AND UPPER(conference) = ?2");
        values.push(Value::Text(conf.to_uppercase()));
    }
    sql.push_str(" ORDER BY barthag DESC NULLS LAST, team_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), team_season_from_row)?;
    collect_rows(rows)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub team_id: String,
    pub name: Option<String>,
    pub conference: Option<String>,
    pub seasons: Vec<String>,
    pub stats: BTreeMap<String, SeasonStats<TeamStatLine>>,
}

pub fn team_profile(conn: &Connection, team_id: &str) -> Result<TeamProfile> {
    let history = store::load_team_history(conn, team_id)?;
    let Some(latest) = history.last() else {
        return Err(Error::not_found("team", team_id));
    };
    let (name, conference) = (latest.name.clone(), latest.conference.clone());

    let mut stats = BTreeMap::new();
    for season in &history {
        let population = store::load_team_seasons(conn, season.year)?;
        stats.insert(
            year_to_season(season.year),
            SeasonStats {
                line: season.stat_line(),
                percentiles: compute_percentiles(season, &population, TEAM_STATS),
            },
        );
    }

    Ok(TeamProfile {
        team_id: team_id.to_string(),
        name,
        conference,
        seasons: stats.keys().cloned().collect(),
        stats,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub player_id: String,
    pub name: Option<String>,
    pub position: Option<String>,
    pub year_in_school: Option<String>,
    pub height: Option<String>,
    pub games: Option<i64>,
    pub mpg: Option<f64>,
    pub pts: Option<f64>,
    pub reb: Option<f64>,
    pub ast: Option<f64>,
    pub stl: Option<f64>,
    pub blk: Option<f64>,
    pub tov: Option<f64>,
    pub bpm: Option<f64>,
    pub obpm: Option<f64>,
    pub dbpm: Option<f64>,
    pub ts_pct: Option<f64>,
    pub usg_pct: Option<f64>,
}

impl From<PlayerSeason> for RosterEntry {
    fn from(p: PlayerSeason) -> Self {
        Self {
            player_id: p.player_id,
            name: p.name,
            position: p.position,
            year_in_school: p.year_in_school,
            height: p.height,
            games: p.games,
            mpg: p.mpg,
            pts: p.pts,
            reb: p.reb,
            ast: p.ast,
            stl: p.stl,
            blk: p.blk,
            tov: p.tov,
            bpm: p.bpm,
            obpm: p.obpm,
            dbpm: p.dbpm,
            ts_pct: p.ts_pct,
            usg_pct: p.usg_pct,
        }
    }
}

/// Players whose team matches the team's stored name for `year`, most
/// minutes first.
pub fn team_roster(conn: &Connection, team_id: &str, year: i32) -> Result<Vec<RosterEntry>> {
    let name = store::load_team_season(conn, team_id, year)?
        .and_then(|t| t.name)
        .ok_or_else(|| Error::not_found("team", format!("{team_id} ({})", year_to_season(year))))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_SEASON_COLUMNS} FROM player_seasons
         WHERE team = ?1 AND year = ?2
         ORDER BY mpg DESC NULLS LAST, player_id"
    ))?;
    let rows = collect_rows(stmt.query_map(params![name, year], player_season_from_row)?)?;
    Ok(rows.into_iter().map(RosterEntry::from).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGameLog {
    pub game_id: String,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub result: Option<String>,
    pub opponent: Option<String>,
    pub opp_conf: Option<String>,
    pub pts: Option<i64>,
    pub opp_pts: Option<i64>,
    pub fgm: Option<i64>,
    pub fga: Option<i64>,
    pub tpm: Option<i64>,
    pub tpa: Option<i64>,
    pub ftm: Option<i64>,
    pub fta: Option<i64>,
    pub oreb: Option<i64>,
    pub dreb: Option<i64>,
    pub reb: Option<i64>,
    pub ast: Option<i64>,
    pub stl: Option<i64>,
    pub blk: Option<i64>,
    pub tov: Option<i64>,
    pub pos: Option<f64>,
    pub min: Option<f64>,
    /// "{pts}-{opp_pts}", missing points as 0.
    pub score: String,
    pub margin: i64,
    pub game_ortg: Option<f64>,
    pub game_drtg: Option<f64>,
    pub game_net: Option<f64>,
}

impl From<TeamGame> for TeamGameLog {
    fn from(g: TeamGame) -> Self {
        let pts = g.own.pts.unwrap_or(0);
        let opp_pts = g.opp.pts.unwrap_or(0);
        let per_100 = |points: i64| {
            g.pos
                .filter(|pos| *pos > 0.0)
                .map(|pos| round1(points as f64 / pos * 100.0))
        };
        Self {
            score: format!("{pts}-{opp_pts}"),
            margin: pts - opp_pts,
            game_ortg: per_100(pts),
            game_drtg: per_100(opp_pts),
            game_net: per_100(pts - opp_pts),
            game_id: g.game_id,
            date: g.date,
            game_type: g.game_type,
            location: g.location,
            result: g.result,
            opponent: g.opponent,
            opp_conf: g.opp_conf,
            pts: g.own.pts,
            opp_pts: g.opp.pts,
            fgm: g.own.fgm,
            fga: g.own.fga,
            tpm: g.own.tpm,
            tpa: g.own.tpa,
            ftm: g.own.ftm,
            fta: g.own.fta,
            oreb: g.own.oreb,
            dreb: g.own.dreb,
            reb: g.own.reb,
            ast: g.own.ast,
            stl: g.own.stl,
            blk: g.own.blk,
            tov: g.own.tov,
            pos: g.pos,
            min: g.min,
        }
    }
}

/// A team's stored games for one season in date order.
pub fn team_games(conn: &Connection, team_id: &str, year: i32) -> Result<Vec<TeamGameLog>> {
    let games = store::load_team_games_for(conn, team_id, year)?;
    Ok(games.into_iter().map(TeamGameLog::from).collect())
}
