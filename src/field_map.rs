//! Upstream column name -> canonical field name tables.
//!
//! Changing an upstream column name is a table edit here; nothing else in the
//! pipeline knows upstream names.

use std::collections::BTreeMap;

use crate::snapshot::{RawRow, RawValue, sanitize};

pub type FieldTable = &'static [(&'static str, &'static str)];

/// Copied verbatim when present so identity resolution can inspect them.
pub const PASSTHROUGH_KEYS: [&str; 2] = ["player_id", "team_id"];

pub const PLAYER_SEASON_FIELDS: FieldTable = &[
    ("id", "upstream_id"),
    ("player", "name"),
    ("team", "team"),
    ("conf", "conference"),
    ("pos", "position"),
    ("exp", "year_in_school"),
    ("hgt", "height"),
    ("g", "games"),
    ("mpg", "mpg"),
    ("ppg", "pts"),
    ("rpg", "reb"),
    ("apg", "ast"),
    ("spg", "stl"),
    ("bpg", "blk"),
    ("tov", "tov"),
    // 0-100 scale
    ("usg", "usg_pct"),
    ("ts", "ts_pct"),
    ("efg", "efg_pct"),
    ("ftr", "ftr"),
    ("ortg", "ortg"),
    ("drtg", "drtg"),
    ("bpm", "bpm"),
    ("obpm", "obpm"),
    ("dbpm", "dbpm"),
    ("porpag", "porpag"),
    // 0-1 scale
    ("fg_pct", "fg_pct"),
    ("three_pct", "three_pct"),
    ("ft_pct", "ft_pct"),
];

pub const TEAM_SEASON_FIELDS: FieldTable = &[
    ("team", "name"),
    ("conf", "conference"),
    ("adj_o", "ortg"),
    ("adj_d", "drtg"),
    ("adj_t", "pace"),
    ("barthag", "barthag"),
    ("wab", "wab"),
    ("nc_cur_sos", "nc_sos"),
    ("ov_cur_sos", "ov_sos"),
    ("seed", "seed"),
];

pub const PLAYER_GAME_FIELDS: FieldTable = &[
    ("id", "upstream_id"),
    ("date", "date"),
    ("opp", "opponent"),
    ("result", "result"),
    ("loc", "location"),
    ("min", "min"),
    ("pts", "pts"),
    ("reb", "reb"),
    ("ast", "ast"),
    ("stl", "stl"),
    ("blk", "blk"),
    ("tov", "tov"),
    ("two_m", "two_m"),
    ("two_a", "two_a"),
    ("three_m", "three_m"),
    ("three_a", "three_a"),
    ("ftm", "ftm"),
    ("fta", "fta"),
    ("ortg", "ortg"),
    ("usg", "usg"),
    ("efg", "efg"),
    ("ts", "ts"),
    ("bpm", "bpm_game"),
    ("obpm", "obpm_game"),
    ("dbpm", "dbpm_game"),
    ("poss", "poss"),
];

pub const TEAM_GAME_FIELDS: FieldTable = &[
    ("game_id", "game_id"),
    ("date", "date"),
    ("type", "game_type"),
    ("location", "location"),
    ("result", "result"),
    ("team", "team_name"),
    ("opp", "opponent"),
    ("opp_conf", "opp_conf"),
    ("min", "min"),
    ("pos", "pos"),
    ("pts", "pts"),
    ("fgm", "fgm"),
    ("fga", "fga"),
    ("tpm", "tpm"),
    ("tpa", "tpa"),
    ("ftm", "ftm"),
    ("fta", "fta"),
    ("oreb", "oreb"),
    ("dreb", "dreb"),
    ("reb", "reb"),
    ("ast", "ast"),
    ("stl", "stl"),
    ("blk", "blk"),
    ("to", "tov"),
    ("opp_pts", "opp_pts"),
    ("opp_fgm", "opp_fgm"),
    ("opp_fga", "opp_fga"),
    ("opp_tpm", "opp_tpm"),
    ("opp_tpa", "opp_tpa"),
    ("opp_ftm", "opp_ftm"),
    ("opp_fta", "opp_fta"),
    ("opp_oreb", "opp_oreb"),
    ("opp_dreb", "opp_dreb"),
    ("opp_reb", "opp_reb"),
    ("opp_ast", "opp_ast"),
    ("opp_stl", "opp_stl"),
    ("opp_blk", "opp_blk"),
    ("opp_to", "opp_tov"),
];

/// A row after mapping: canonical names only, values sanitized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRow {
    values: BTreeMap<&'static str, RawValue>,
}

impl MappedRow {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(RawValue::as_f64)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(RawValue::as_i64)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(RawValue::as_text)
    }

    pub fn set(&mut self, key: &'static str, value: RawValue) {
        self.values.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Copy the keys present in both `row` and `table`; absent upstream columns are
/// skipped and unmapped ones dropped.
pub fn remap(row: &RawRow, table: FieldTable) -> MappedRow {
    let mut out = MappedRow::default();
    for (src, dst) in table {
        if let Some(value) = row.get(src) {
            out.set(*dst, sanitize(value.clone()));
        }
    }
    for key in PASSTHROUGH_KEYS {
        if let Some(value) = row.get(key) {
            out.set(key, value.clone());
        }
    }
    out
}

/// Adds `net_rtg` (ortg - drtg, one decimal) when both ratings are numeric.
/// Non-numeric ratings leave the field out.
pub fn derive_net_rating(row: &mut MappedRow) {
    let (Some(ortg), Some(drtg)) = (row.f64("ortg"), row.f64("drtg")) else {
        return;
    };
    row.set("net_rtg", RawValue::Float(round1(ortg - drtg)));
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remap_keeps_only_mapped_present_keys() {
        let row = RawRow::new()
            .with("player", "Zach Edey")
            .with("ppg", 25.2)
            .with("unmapped_col", 3_i64);
        let mapped = remap(&row, PLAYER_SEASON_FIELDS);
        assert_eq!(mapped.text("name").as_deref(), Some("Zach Edey"));
        assert_eq!(mapped.f64("pts"), Some(25.2));
        assert!(!mapped.contains("unmapped_col"));
        assert!(!mapped.contains("reb"));
        assert_eq!(mapped.len(), 2);
    }

    #[test]
    fn remap_sanitizes_non_finite_values() {
        let row = RawRow::new().with("bpm", f64::NAN).with("obpm", f64::INFINITY);
        let mapped = remap(&row, PLAYER_SEASON_FIELDS);
        assert_eq!(mapped.get("bpm"), None);
        assert_eq!(mapped.get("obpm"), None);
    }

    #[test]
    fn passthrough_ids_survive_any_table() {
        let row = RawRow::new().with("team_id", "purdue").with("player_id", "edey");
        let mapped = remap(&row, TEAM_SEASON_FIELDS);
        assert_eq!(mapped.text("team_id").as_deref(), Some("purdue"));
        assert_eq!(mapped.text("player_id").as_deref(), Some("edey"));
    }

    #[test]
    fn net_rating_is_rounded_difference() {
        let row = RawRow::new().with("adj_o", 110.5).with("adj_d", 95.2);
        let mut mapped = remap(&row, TEAM_SEASON_FIELDS);
        derive_net_rating(&mut mapped);
        assert_eq!(mapped.f64("net_rtg"), Some(15.3));
    }

    #[test]
    fn net_rating_skipped_for_non_numeric_input() {
        let row = RawRow::new().with("adj_o", "n/a").with("adj_d", 95.2);
        let mut mapped = remap(&row, TEAM_SEASON_FIELDS);
        derive_net_rating(&mut mapped);
        assert!(!mapped.contains("net_rtg"));

        let mut missing = remap(&RawRow::new().with("adj_o", 101.0), TEAM_SEASON_FIELDS);
        derive_net_rating(&mut missing);
        assert!(!missing.contains("net_rtg"));
    }

    #[test]
    fn tables_have_unique_upstream_names() {
        for table in [
            PLAYER_SEASON_FIELDS,
            TEAM_SEASON_FIELDS,
            PLAYER_GAME_FIELDS,
            TEAM_GAME_FIELDS,
        ] {
            let mut seen = std::collections::HashSet::new();
            for (src, _) in table {
                assert!(seen.insert(*src), "duplicate upstream column {src}");
            }
        }
    }
}
