//! Stable ids for normalized rows, plus the mapper -> record chains that use
//! them.
//!
//! Slug fallbacks are not collision-free: two entities with the same
//! name/team in one season resolve to the same id.

use std::collections::HashMap;

use tracing::debug;

use crate::field_map::{
    MappedRow, PLAYER_GAME_FIELDS, PLAYER_SEASON_FIELDS, TEAM_GAME_FIELDS, TEAM_SEASON_FIELDS,
    derive_net_rating, remap,
};
use crate::records::{PlayerGame, PlayerSeason, TeamGame, TeamSeason};
use crate::snapshot::RawRow;

pub fn slug(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "_")
}

/// Passthrough `player_id`, else the upstream numeric id, else
/// `name_team` slug with positional placeholders for missing parts.
pub fn resolve_player_id(m: &MappedRow, index: usize) -> String {
    if let Some(id) = m.text("player_id") {
        return id;
    }
    if let Some(id) = m.i64("upstream_id") {
        return id.to_string();
    }
    let name = m.text("name").unwrap_or_else(|| format!("p{index}"));
    let team = m.text("team").unwrap_or_else(|| "unk".to_string());
    format!("{}_{}", slug(&name), slug(&team))
}

pub fn resolve_team_id(m: &MappedRow) -> String {
    if let Some(id) = m.text("team_id") {
        return id;
    }
    slug(&m.text("name").unwrap_or_else(|| "unk".to_string()))
}

pub fn normalize_player_seasons(rows: &[RawRow], year: i32) -> Vec<PlayerSeason> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let mapped = remap(row, PLAYER_SEASON_FIELDS);
            PlayerSeason::from_mapped(resolve_player_id(&mapped, i), year, &mapped)
        })
        .collect()
}

pub fn normalize_team_seasons(rows: &[RawRow], year: i32) -> Vec<TeamSeason> {
    rows.iter()
        .map(|row| {
            let mut mapped = remap(row, TEAM_SEASON_FIELDS);
            derive_net_rating(&mut mapped);
            TeamSeason::from_mapped(resolve_team_id(&mapped), year, &mapped)
        })
        .collect()
}

/// Game logs only attach to a player through the upstream numeric id; rows
/// without one are dropped.
pub fn normalize_player_games(rows: &[RawRow], year: i32) -> Vec<PlayerGame> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mapped = remap(row, PLAYER_GAME_FIELDS);
        let Some(id) = mapped.i64("upstream_id") else {
            continue;
        };
        out.push(PlayerGame::from_mapped(id.to_string(), year, &mapped));
    }
    if out.len() < rows.len() {
        debug!(
            year,
            dropped = rows.len() - out.len(),
            "player game rows without upstream id"
        );
    }
    out
}

/// `name_to_id` comes from the stored team seasons for the same year; names
/// it does not know fall back to a slug.
pub fn normalize_team_games(
    rows: &[RawRow],
    year: i32,
    name_to_id: &HashMap<String, String>,
) -> Vec<TeamGame> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mapped = remap(row, TEAM_GAME_FIELDS);
        let Some(team_name) = mapped.text("team_name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let Some(game_id) = mapped.text("game_id") else {
            continue;
        };
        let team_id = name_to_id
            .get(&team_name)
            .cloned()
            .unwrap_or_else(|| slug(&team_name));
        out.push(TeamGame::from_mapped(team_id, year, game_id, &mapped));
    }
    if out.len() < rows.len() {
        debug!(
            year,
            dropped = rows.len() - out.len(),
            "team game rows without team name or game id"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_upstream_id_wins_over_slug() {
        let rows = vec![
            RawRow::new()
                .with("id", 72413_i64)
                .with("player", "Zach Edey")
                .with("team", "Purdue"),
        ];
        let players = normalize_player_seasons(&rows, 2024);
        assert_eq!(players[0].player_id, "72413");
    }

    #[test]
    fn float_encoded_ids_drop_fraction() {
        let rows = vec![RawRow::new().with("id", 72413.0)];
        let players = normalize_player_seasons(&rows, 2024);
        assert_eq!(players[0].player_id, "72413");
    }

    #[test]
    fn slug_fallbacks_fill_missing_parts() {
        let rows = vec![
            RawRow::new().with("player", "Tyler Kolek").with("team", "Marquette"),
            RawRow::new().with("team", "Saint Mary's"),
            RawRow::new().with("player", "Solo Guy"),
        ];
        let players = normalize_player_seasons(&rows, 2024);
        assert_eq!(players[0].player_id, "tyler_kolek_marquette");
        assert_eq!(players[1].player_id, "p1_saint_mary's");
        assert_eq!(players[2].player_id, "solo_guy_unk");
    }

    #[test]
    fn passthrough_id_is_kept() {
        let rows = vec![
            RawRow::new()
                .with("player_id", "custom")
                .with("id", 5_i64),
        ];
        assert_eq!(normalize_player_seasons(&rows, 2024)[0].player_id, "custom");
    }

    #[test]
    fn team_ids_slug_from_name_and_get_net_rating() {
        let rows = vec![
            RawRow::new()
                .with("team", "North Carolina")
                .with("adj_o", 118.0)
                .with("adj_d", 93.5),
            RawRow::new(),
        ];
        let teams = normalize_team_seasons(&rows, 2024);
        assert_eq!(teams[0].team_id, "north_carolina");
        assert_eq!(teams[0].net_rtg, Some(24.5));
        assert_eq!(teams[0].record, None);
        assert_eq!(teams[1].team_id, "unk");
    }

    #[test]
    fn player_games_require_upstream_id() {
        let rows = vec![
            RawRow::new().with("id", 9_i64).with("opp", "Duke"),
            RawRow::new().with("opp", "UNC"),
        ];
        let games = normalize_player_games(&rows, 2024);
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].player_id, "9");
        assert_eq!(games[0].opponent.as_deref(), Some("Duke"));
    }

    #[test]
    fn team_games_use_stored_name_lookup() {
        let lookup = HashMap::from([("UConn".to_string(), "connecticut".to_string())]);
        let rows = vec![
            RawRow::new().with("team", "UConn").with("game_id", "a"),
            RawRow::new().with("team", "Iowa St.").with("game_id", "b"),
            RawRow::new().with("game_id", "c"),
            RawRow::new().with("team", "Houston"),
        ];
        let games = normalize_team_games(&rows, 2024, &lookup);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].team_id, "connecticut");
        assert_eq!(games[1].team_id, "iowa_st.");
    }
}
