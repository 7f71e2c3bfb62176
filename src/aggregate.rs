//! Season record and four factors from a team's stored box scores.
//!
//! Ratios are season sums over season sums, never averages of per-game
//! ratios. A game missing any input of a sum does not contribute to that sum;
//! a sum with no contributing games is absent.

use std::collections::HashMap;

use rusqlite::{Connection, params};
use tracing::debug;

use crate::error::Result;
use crate::field_map::round1;
use crate::records::{GameResult, TeamGame};
use crate::store;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FourFactors {
    pub wins: i64,
    pub losses: i64,
    pub record: String,
    pub efg_pct: Option<f64>,
    pub opp_efg_pct: Option<f64>,
    pub tov_pct: Option<f64>,
    pub opp_tov_pct: Option<f64>,
    pub orb_pct: Option<f64>,
    pub drb_pct: Option<f64>,
    pub ftr: Option<f64>,
    pub opp_ftr: Option<f64>,
}

/// Sum of `term` over games where it is defined; `None` if no game has it.
fn season_sum<F>(games: &[TeamGame], term: F) -> Option<f64>
where
    F: Fn(&TeamGame) -> Option<f64>,
{
    games
        .iter()
        .filter_map(term)
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// numerator / denominator * 100 at one decimal; zero denominators are absent.
fn pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(round1(n / d * 100.0))
}

fn f(v: Option<i64>) -> Option<f64> {
    v.map(|n| n as f64)
}

pub fn aggregate_team_games(games: &[TeamGame]) -> FourFactors {
    let wins = games
        .iter()
        .filter(|g| g.outcome() == Some(GameResult::Win))
        .count() as i64;
    let losses = games
        .iter()
        .filter(|g| g.outcome() == Some(GameResult::Loss))
        .count() as i64;

    let efg_num = season_sum(games, |g| Some(f(g.own.fgm)? + 0.5 * f(g.own.tpm)?));
    let opp_efg_num = season_sum(games, |g| Some(f(g.opp.fgm)? + 0.5 * f(g.opp.tpm)?));
    let fga = season_sum(games, |g| f(g.own.fga));
    let opp_fga = season_sum(games, |g| f(g.opp.fga));

    let tov = season_sum(games, |g| f(g.own.tov));
    let tov_den = season_sum(games, |g| {
        Some(f(g.own.fga)? + 0.44 * f(g.own.fta)? + f(g.own.tov)?)
    });
    let opp_tov = season_sum(games, |g| f(g.opp.tov));
    let opp_tov_den = season_sum(games, |g| {
        Some(f(g.opp.fga)? + 0.44 * f(g.opp.fta)? + f(g.opp.tov)?)
    });

    let oreb = season_sum(games, |g| f(g.own.oreb));
    let orb_den = season_sum(games, |g| Some(f(g.own.oreb)? + f(g.opp.dreb)?));
    let dreb = season_sum(games, |g| f(g.own.dreb));
    let drb_den = season_sum(games, |g| Some(f(g.own.dreb)? + f(g.opp.oreb)?));

    let fta = season_sum(games, |g| f(g.own.fta));
    let opp_fta = season_sum(games, |g| f(g.opp.fta));

    FourFactors {
        wins,
        losses,
        record: format!("{wins}-{losses}"),
        efg_pct: pct(efg_num, fga),
        opp_efg_pct: pct(opp_efg_num, opp_fga),
        tov_pct: pct(tov, tov_den),
        opp_tov_pct: pct(opp_tov, opp_tov_den),
        orb_pct: pct(oreb, orb_den),
        drb_pct: pct(dreb, drb_den),
        ftr: pct(fta, fga),
        opp_ftr: pct(opp_fta, opp_fga),
    }
}

/// Recompute record and four factors for every team-season of `year` from
/// the stored team games and write them back in one transaction. Teams with
/// no stored games get a "0-0" record and absent ratios. Returns the number
/// of team-seasons updated.
pub fn update_team_season_aggregates(conn: &mut Connection, year: i32) -> Result<usize> {
    let games = store::load_team_games(conn, year)?;
    let mut by_team: HashMap<&str, Vec<TeamGame>> = HashMap::new();
    for g in &games {
        by_team.entry(g.team_id.as_str()).or_default().push(g.clone());
    }
    let team_ids: Vec<String> = store::load_team_seasons(conn, year)?
        .into_iter()
        .map(|t| t.team_id)
        .collect();

    let tx = conn.transaction()?;
    let mut updated = 0usize;
    {
        let mut stmt = tx.prepare(
            r#"
            UPDATE team_seasons SET
                wins = ?3,
                losses = ?4,
                record = ?5,
                efg_pct = ?6,
                opp_efg_pct = ?7,
                tov_pct = ?8,
                opp_tov_pct = ?9,
                orb_pct = ?10,
                drb_pct = ?11,
                ftr = ?12,
                opp_ftr = ?13
            WHERE team_id = ?1 AND year = ?2
            "#,
        )?;
        for team_id in &team_ids {
            let team_games = by_team.get(team_id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let agg = aggregate_team_games(team_games);
            updated += stmt.execute(params![
                team_id,
                year,
                agg.wins,
                agg.losses,
                agg.record,
                agg.efg_pct,
                agg.opp_efg_pct,
                agg.tov_pct,
                agg.opp_tov_pct,
                agg.orb_pct,
                agg.drb_pct,
                agg.ftr,
                agg.opp_ftr,
            ])?;
        }
    }
    tx.commit()?;

    let orphans = by_team
        .keys()
        .filter(|id| !team_ids.iter().any(|t| t.as_str() == **id))
        .count();
    if orphans > 0 {
        debug!(year, orphans, "team games without a team-season row");
    }
    Ok(updated)
}
