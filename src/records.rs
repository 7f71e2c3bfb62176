//! Canonical record shapes, one per stored entity.
//!
//! Every optional field is `None` when upstream omitted it or sent a
//! non-finite number; serialized as JSON `null`.

use serde::Serialize;

use crate::field_map::MappedRow;

/// Look up a tracked numeric statistic by canonical name.
pub trait StatSource {
    fn stat(&self, name: &str) -> Option<f64>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerSeason {
    pub player_id: String,
    pub year: i32,
    pub name: Option<String>,
    pub team: Option<String>,
    pub conference: Option<String>,
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
    pub usg_pct: Option<f64>,
    pub ts_pct: Option<f64>,
    pub efg_pct: Option<f64>,
    pub ftr: Option<f64>,
    pub fg_pct: Option<f64>,
    pub three_pct: Option<f64>,
    pub ft_pct: Option<f64>,
    pub ortg: Option<f64>,
    pub drtg: Option<f64>,
    pub bpm: Option<f64>,
    pub obpm: Option<f64>,
    pub dbpm: Option<f64>,
    pub porpag: Option<f64>,
}

impl PlayerSeason {
    pub fn from_mapped(player_id: String, year: i32, m: &MappedRow) -> Self {
        Self {
            player_id,
            year,
            name: m.text("name"),
            team: m.text("team"),
            conference: m.text("conference"),
            position: m.text("position"),
            year_in_school: m.text("year_in_school"),
            height: m.text("height"),
            games: m.i64("games"),
            mpg: m.f64("mpg"),
            pts: m.f64("pts"),
            reb: m.f64("reb"),
            ast: m.f64("ast"),
            stl: m.f64("stl"),
            blk: m.f64("blk"),
            tov: m.f64("tov"),
            usg_pct: m.f64("usg_pct"),
            ts_pct: m.f64("ts_pct"),
            efg_pct: m.f64("efg_pct"),
            ftr: m.f64("ftr"),
            fg_pct: m.f64("fg_pct"),
            three_pct: m.f64("three_pct"),
            ft_pct: m.f64("ft_pct"),
            ortg: m.f64("ortg"),
            drtg: m.f64("drtg"),
            bpm: m.f64("bpm"),
            obpm: m.f64("obpm"),
            dbpm: m.f64("dbpm"),
            porpag: m.f64("porpag"),
        }
    }

    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            name: self.name.clone(),
            team: self.team.clone(),
            conference: self.conference.clone(),
            position: self.position.clone(),
            year_in_school: self.year_in_school.clone(),
            height: self.height.clone(),
        }
    }

    pub fn stat_line(&self) -> PlayerStatLine {
        PlayerStatLine {
            games: self.games,
            mpg: self.mpg,
            pts: self.pts,
            reb: self.reb,
            ast: self.ast,
            stl: self.stl,
            blk: self.blk,
            tov: self.tov,
            usg_pct: self.usg_pct,
            ts_pct: self.ts_pct,
            efg_pct: self.efg_pct,
            ftr: self.ftr,
            fg_pct: self.fg_pct,
            three_pct: self.three_pct,
            ft_pct: self.ft_pct,
            ortg: self.ortg,
            drtg: self.drtg,
            bpm: self.bpm,
            obpm: self.obpm,
            dbpm: self.dbpm,
            porpag: self.porpag,
        }
    }
}

impl StatSource for PlayerSeason {
    fn stat(&self, name: &str) -> Option<f64> {
        match name {
            "games" => self.games.map(|g| g as f64),
            "mpg" => self.mpg,
            "pts" => self.pts,
            "reb" => self.reb,
            "ast" => self.ast,
            "stl" => self.stl,
            "blk" => self.blk,
            "tov" => self.tov,
            "usg_pct" => self.usg_pct,
            "ts_pct" => self.ts_pct,
            "efg_pct" => self.efg_pct,
            "ftr" => self.ftr,
            "fg_pct" => self.fg_pct,
            "three_pct" => self.three_pct,
            "ft_pct" => self.ft_pct,
            "ortg" => self.ortg,
            "drtg" => self.drtg,
            "bpm" => self.bpm,
            "obpm" => self.obpm,
            "dbpm" => self.dbpm,
            "porpag" => self.porpag,
            _ => None,
        }
    }
}

/// Identity fields shown at the top of a player profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerIdentity {
    pub name: Option<String>,
    pub team: Option<String>,
    pub conference: Option<String>,
    pub position: Option<String>,
    pub year_in_school: Option<String>,
    pub height: Option<String>,
}

/// Per-season numbers of a player profile (identity stripped).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerStatLine {
    pub games: Option<i64>,
    pub mpg: Option<f64>,
    pub pts: Option<f64>,
    pub reb: Option<f64>,
    pub ast: Option<f64>,
    pub stl: Option<f64>,
    pub blk: Option<f64>,
    pub tov: Option<f64>,
    pub usg_pct: Option<f64>,
    pub ts_pct: Option<f64>,
    pub efg_pct: Option<f64>,
    pub ftr: Option<f64>,
    pub fg_pct: Option<f64>,
    pub three_pct: Option<f64>,
    pub ft_pct: Option<f64>,
    pub ortg: Option<f64>,
    pub drtg: Option<f64>,
    pub bpm: Option<f64>,
    pub obpm: Option<f64>,
    pub dbpm: Option<f64>,
    pub porpag: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamSeason {
    pub team_id: String,
    pub year: i32,
    pub name: Option<String>,
    pub conference: Option<String>,
    pub record: Option<String>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub ortg: Option<f64>,
    pub drtg: Option<f64>,
    pub net_rtg: Option<f64>,
    pub pace: Option<f64>,
    pub barthag: Option<f64>,
    pub wab: Option<f64>,
    pub efg_pct: Option<f64>,
    pub opp_efg_pct: Option<f64>,
    pub tov_pct: Option<f64>,
    pub opp_tov_pct: Option<f64>,
    pub orb_pct: Option<f64>,
    pub drb_pct: Option<f64>,
    pub ftr: Option<f64>,
    pub opp_ftr: Option<f64>,
    pub nc_sos: Option<f64>,
    pub ov_sos: Option<f64>,
    pub seed: Option<f64>,
}

impl TeamSeason {
    /// Ratings-only row: record and four factors stay `None` until the
    /// aggregation pass runs over the year's stored games.
    pub fn from_mapped(team_id: String, year: i32, m: &MappedRow) -> Self {
        Self {
            team_id,
            year,
            name: m.text("name"),
            conference: m.text("conference"),
            ortg: m.f64("ortg"),
            drtg: m.f64("drtg"),
            net_rtg: m.f64("net_rtg"),
            pace: m.f64("pace"),
            barthag: m.f64("barthag"),
            wab: m.f64("wab"),
            nc_sos: m.f64("nc_sos"),
            ov_sos: m.f64("ov_sos"),
            seed: m.f64("seed"),
            ..Self::default()
        }
    }

    pub fn is_aggregated(&self) -> bool {
        self.wins.is_some()
    }

    pub fn stat_line(&self) -> TeamStatLine {
        TeamStatLine {
            wins: self.wins,
            losses: self.losses,
            record: self.record.clone(),
            ortg: self.ortg,
            drtg: self.drtg,
            net_rtg: self.net_rtg,
            pace: self.pace,
            barthag: self.barthag,
            wab: self.wab,
            efg_pct: self.efg_pct,
            opp_efg_pct: self.opp_efg_pct,
            tov_pct: self.tov_pct,
            opp_tov_pct: self.opp_tov_pct,
            orb_pct: self.orb_pct,
            drb_pct: self.drb_pct,
            ftr: self.ftr,
            opp_ftr: self.opp_ftr,
            nc_sos: self.nc_sos,
            ov_sos: self.ov_sos,
            seed: self.seed,
        }
    }
}

/// Per-season numbers of a team profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamStatLine {
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    pub record: Option<String>,
    pub ortg: Option<f64>,
    pub drtg: Option<f64>,
    pub net_rtg: Option<f64>,
    pub pace: Option<f64>,
    pub barthag: Option<f64>,
    pub wab: Option<f64>,
    pub efg_pct: Option<f64>,
    pub opp_efg_pct: Option<f64>,
    pub tov_pct: Option<f64>,
    pub opp_tov_pct: Option<f64>,
    pub orb_pct: Option<f64>,
    pub drb_pct: Option<f64>,
    pub ftr: Option<f64>,
    pub opp_ftr: Option<f64>,
    pub nc_sos: Option<f64>,
    pub ov_sos: Option<f64>,
    pub seed: Option<f64>,
}

impl StatSource for TeamSeason {
    fn stat(&self, name: &str) -> Option<f64> {
        match name {
            "wins" => self.wins.map(|w| w as f64),
            "losses" => self.losses.map(|l| l as f64),
            "ortg" => self.ortg,
            "drtg" => self.drtg,
            "net_rtg" => self.net_rtg,
            "pace" => self.pace,
            "barthag" => self.barthag,
            "wab" => self.wab,
            "efg_pct" => self.efg_pct,
            "opp_efg_pct" => self.opp_efg_pct,
            "tov_pct" => self.tov_pct,
            "opp_tov_pct" => self.opp_tov_pct,
            "orb_pct" => self.orb_pct,
            "drb_pct" => self.drb_pct,
            "ftr" => self.ftr,
            "opp_ftr" => self.opp_ftr,
            "nc_sos" => self.nc_sos,
            "ov_sos" => self.ov_sos,
            "seed" => self.seed,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerGame {
    pub player_id: String,
    pub year: i32,
    /// Occurrence index among this player's games on the same date against
    /// the same opponent; assigned by the store.
    pub game_num: i64,
    pub date: Option<String>,
    pub opponent: Option<String>,
    pub result: Option<String>,
    pub location: Option<String>,
    pub min: Option<i64>,
    pub pts: Option<i64>,
    pub reb: Option<i64>,
    pub ast: Option<i64>,
    pub stl: Option<i64>,
    pub blk: Option<i64>,
    pub tov: Option<i64>,
    pub two_m: Option<i64>,
    pub two_a: Option<i64>,
    pub three_m: Option<i64>,
    pub three_a: Option<i64>,
    pub ftm: Option<i64>,
    pub fta: Option<i64>,
    pub ortg: Option<f64>,
    pub usg: Option<f64>,
    pub efg: Option<f64>,
    pub ts: Option<f64>,
    pub bpm_game: Option<f64>,
    pub obpm_game: Option<f64>,
    pub dbpm_game: Option<f64>,
    pub poss: Option<f64>,
}

impl PlayerGame {
    pub fn from_mapped(player_id: String, year: i32, m: &MappedRow) -> Self {
        Self {
            player_id,
            year,
            game_num: 0,
            date: m.text("date"),
            opponent: m.text("opponent"),
            result: m.text("result"),
            location: m.text("location"),
            min: m.i64("min"),
            pts: m.i64("pts"),
            reb: m.i64("reb"),
            ast: m.i64("ast"),
            stl: m.i64("stl"),
            blk: m.i64("blk"),
            tov: m.i64("tov"),
            two_m: m.i64("two_m"),
            two_a: m.i64("two_a"),
            three_m: m.i64("three_m"),
            three_a: m.i64("three_a"),
            ftm: m.i64("ftm"),
            fta: m.i64("fta"),
            ortg: m.f64("ortg"),
            usg: m.f64("usg"),
            efg: m.f64("efg"),
            ts: m.f64("ts"),
            bpm_game: m.f64("bpm_game"),
            obpm_game: m.f64("obpm_game"),
            dbpm_game: m.f64("dbpm_game"),
            poss: m.f64("poss"),
        }
    }

    /// Combined field goals as "made-attempted" from the two- and
    /// three-point splits; missing splits count as zero.
    pub fn fg_line(&self) -> String {
        let made = self.two_m.unwrap_or(0) + self.three_m.unwrap_or(0);
        let attempted = self.two_a.unwrap_or(0) + self.three_a.unwrap_or(0);
        format!("{made}-{attempted}")
    }
}

/// One side of a game box score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxScore {
    pub pts: Option<i64>,
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
}

impl BoxScore {
    pub const COLUMNS: [&'static str; 14] = [
        "pts", "fgm", "fga", "tpm", "tpa", "ftm", "fta", "oreb", "dreb", "reb", "ast", "stl",
        "blk", "tov",
    ];

    /// Reads the own side with `prefix = ""` and the opponent with `"opp_"`.
    pub fn from_mapped(m: &MappedRow, prefix: &str) -> Self {
        let get = |col: &str| m.i64(&format!("{prefix}{col}"));
        Self {
            pts: get("pts"),
            fgm: get("fgm"),
            fga: get("fga"),
            tpm: get("tpm"),
            tpa: get("tpa"),
            ftm: get("ftm"),
            fta: get("fta"),
            oreb: get("oreb"),
            dreb: get("dreb"),
            reb: get("reb"),
            ast: get("ast"),
            stl: get("stl"),
            blk: get("blk"),
            tov: get("tov"),
        }
    }

    pub fn values(&self) -> [Option<i64>; 14] {
        [
            self.pts, self.fgm, self.fga, self.tpm, self.tpa, self.ftm, self.fta, self.oreb,
            self.dreb, self.reb, self.ast, self.stl, self.blk, self.tov,
        ]
    }

    pub fn from_values(v: [Option<i64>; 14]) -> Self {
        Self {
            pts: v[0],
            fgm: v[1],
            fga: v[2],
            tpm: v[3],
            tpa: v[4],
            ftm: v[5],
            fta: v[6],
            oreb: v[7],
            dreb: v[8],
            reb: v[9],
            ast: v[10],
            stl: v[11],
            blk: v[12],
            tov: v[13],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
}

impl GameResult {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" | "w" => Some(Self::Win),
            "L" | "l" => Some(Self::Loss),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamGame {
    pub team_id: String,
    pub year: i32,
    pub game_id: String,
    pub date: Option<String>,
    pub game_type: Option<String>,
    pub location: Option<String>,
    pub result: Option<String>,
    pub opponent: Option<String>,
    pub opp_conf: Option<String>,
    pub min: Option<f64>,
    /// Possessions.
    pub pos: Option<f64>,
    pub own: BoxScore,
    pub opp: BoxScore,
}

impl TeamGame {
    pub fn from_mapped(team_id: String, year: i32, game_id: String, m: &MappedRow) -> Self {
        Self {
            team_id,
            year,
            game_id,
            date: m.text("date"),
            game_type: m.text("game_type"),
            location: m.text("location"),
            result: m.text("result"),
            opponent: m.text("opponent"),
            opp_conf: m.text("opp_conf"),
            min: m.f64("min"),
            pos: m.f64("pos"),
            own: BoxScore::from_mapped(m, ""),
            opp: BoxScore::from_mapped(m, "opp_"),
        }
    }

    pub fn outcome(&self) -> Option<GameResult> {
        self.result.as_deref().and_then(GameResult::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_map::{TEAM_GAME_FIELDS, remap};
    use crate::snapshot::RawRow;

    #[test]
    fn fg_line_combines_two_and_three_point_splits() {
        let game = PlayerGame {
            two_m: Some(5),
            two_a: Some(9),
            three_m: Some(2),
            three_a: Some(6),
            ..PlayerGame::default()
        };
        assert_eq!(game.fg_line(), "7-15");
        assert_eq!(PlayerGame::default().fg_line(), "0-0");
    }

    #[test]
    fn team_game_reads_both_sides() {
        let row = RawRow::new()
            .with("game_id", "g1")
            .with("result", "W")
            .with("fgm", 20_i64)
            .with("to", 10_i64)
            .with("opp_fgm", 18_i64)
            .with("opp_to", 12_i64);
        let mapped = remap(&row, TEAM_GAME_FIELDS);
        let game = TeamGame::from_mapped("purdue".to_string(), 2024, "g1".to_string(), &mapped);
        assert_eq!(game.own.fgm, Some(20));
        assert_eq!(game.own.tov, Some(10));
        assert_eq!(game.opp.fgm, Some(18));
        assert_eq!(game.opp.tov, Some(12));
        assert_eq!(game.outcome(), Some(GameResult::Win));
    }

    #[test]
    fn box_score_values_round_trip_column_order() {
        let side = BoxScore {
            pts: Some(70),
            tov: Some(9),
            ..BoxScore::default()
        };
        assert_eq!(BoxScore::from_values(side.values()), side);
        assert_eq!(BoxScore::COLUMNS[0], "pts");
        assert_eq!(BoxScore::COLUMNS[13], "tov");
    }
}
