//! Directional 0-100 ranks of one row within its season population.

use std::collections::BTreeMap;

use crate::records::StatSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

pub type StatSpec = (&'static str, Direction);

/// Stat name -> percentile, `None` when the row or the whole population
/// lacks the stat.
pub type Percentiles = BTreeMap<&'static str, Option<u8>>;

pub const PLAYER_STATS: &[StatSpec] = &[
    ("bpm", Direction::HigherBetter),
    ("obpm", Direction::HigherBetter),
    ("dbpm", Direction::HigherBetter),
    ("pts", Direction::HigherBetter),
    ("reb", Direction::HigherBetter),
    ("ast", Direction::HigherBetter),
    ("stl", Direction::HigherBetter),
    ("blk", Direction::HigherBetter),
    ("ts_pct", Direction::HigherBetter),
    ("usg_pct", Direction::HigherBetter),
    ("efg_pct", Direction::HigherBetter),
    ("ortg", Direction::HigherBetter),
    ("fg_pct", Direction::HigherBetter),
    ("three_pct", Direction::HigherBetter),
    ("ft_pct", Direction::HigherBetter),
    ("porpag", Direction::HigherBetter),
    ("mpg", Direction::HigherBetter),
    ("drtg", Direction::LowerBetter),
    ("tov", Direction::LowerBetter),
];

pub const TEAM_STATS: &[StatSpec] = &[
    ("ortg", Direction::HigherBetter),
    ("net_rtg", Direction::HigherBetter),
    ("efg_pct", Direction::HigherBetter),
    ("opp_tov_pct", Direction::HigherBetter),
    ("orb_pct", Direction::HigherBetter),
    ("drb_pct", Direction::HigherBetter),
    ("barthag", Direction::HigherBetter),
    ("wab", Direction::HigherBetter),
    ("pace", Direction::HigherBetter),
    ("drtg", Direction::LowerBetter),
    ("opp_efg_pct", Direction::LowerBetter),
    ("tov_pct", Direction::LowerBetter),
    ("opp_ftr", Direction::LowerBetter),
    // fewer free throws drawn against
    ("ftr", Direction::LowerBetter),
];

/// Share of the population (members with a value) that `row` is at least as
/// good as, rounded half-to-even. Ties share a percentile.
pub fn compute_percentiles<R, P>(row: &R, population: &[P], specs: &[StatSpec]) -> Percentiles
where
    R: StatSource + ?Sized,
    P: StatSource,
{
    specs
        .iter()
        .map(|&(stat, direction)| (stat, stat_percentile(row, population, stat, direction)))
        .collect()
}

pub fn stat_percentile<R, P>(row: &R, population: &[P], stat: &str, direction: Direction) -> Option<u8>
where
    R: StatSource + ?Sized,
    P: StatSource,
{
    let value = row.stat(stat)?;
    let mut total = 0usize;
    let mut no_better = 0usize;
    for other in population.iter().filter_map(|p| p.stat(stat)) {
        total += 1;
        let counts = match direction {
            Direction::HigherBetter => other <= value,
            Direction::LowerBetter => other >= value,
        };
        if counts {
            no_better += 1;
        }
    }
    if total == 0 {
        return None;
    }
    let pct = (100.0 * no_better as f64 / total as f64).round_ties_even();
    Some(pct.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PlayerSeason, TeamSeason};

    fn player(bpm: Option<f64>, drtg: Option<f64>) -> PlayerSeason {
        PlayerSeason {
            bpm,
            drtg,
            ..PlayerSeason::default()
        }
    }

    #[test]
    fn higher_and_lower_directions() {
        let pop: Vec<_> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|v| player(Some(*v), Some(100.0 + v)))
            .collect();
        let best = &pop[3];
        assert_eq!(stat_percentile(best, &pop, "bpm", Direction::HigherBetter), Some(100));
        // highest drtg is the worst defender
        assert_eq!(stat_percentile(best, &pop, "drtg", Direction::LowerBetter), Some(25));
        let worst = &pop[0];
        assert_eq!(stat_percentile(worst, &pop, "bpm", Direction::HigherBetter), Some(25));
        assert_eq!(stat_percentile(worst, &pop, "drtg", Direction::LowerBetter), Some(100));
    }

    #[test]
    fn identical_population_ranks_everyone_at_100() {
        let pop = vec![player(Some(2.5), Some(99.0)); 5];
        let pct = compute_percentiles(&pop[0], &pop, PLAYER_STATS);
        assert_eq!(pct["bpm"], Some(100));
        assert_eq!(pct["drtg"], Some(100));
    }

    #[test]
    fn absent_value_or_population_is_absent() {
        let pop = vec![player(Some(1.0), None), player(Some(2.0), None)];
        let missing = player(None, Some(95.0));
        let pct = compute_percentiles(&missing, &pop, PLAYER_STATS);
        assert_eq!(pct["bpm"], None);
        // nobody in the population has a drtg
        assert_eq!(pct["drtg"], None);

        let pct = compute_percentiles(&pop[0], &pop, PLAYER_STATS);
        assert_eq!(pct["drtg"], None);
        assert_eq!(pct["pts"], None);
        assert_eq!(pct.len(), PLAYER_STATS.len());
    }

    #[test]
    fn population_size_counts_only_members_with_values() {
        let pop = vec![
            player(Some(1.0), None),
            player(Some(3.0), None),
            player(None, None),
            player(None, None),
        ];
        assert_eq!(stat_percentile(&pop[0], &pop, "bpm", Direction::HigherBetter), Some(50));
    }

    #[test]
    fn rounding_is_half_to_even() {
        // 1 of 8 -> 12.5 -> 12
        let pop: Vec<_> = (0..8).map(|i| player(Some(i as f64), None)).collect();
        assert_eq!(stat_percentile(&pop[0], &pop, "bpm", Direction::HigherBetter), Some(12));
        // 3 of 8 -> 37.5 -> 38
        assert_eq!(stat_percentile(&pop[2], &pop, "bpm", Direction::HigherBetter), Some(38));
    }

    #[test]
    fn team_table_covers_four_factors() {
        let a = TeamSeason {
            tov_pct: Some(15.0),
            efg_pct: Some(52.0),
            ..TeamSeason::default()
        };
        let b = TeamSeason {
            tov_pct: Some(18.0),
            efg_pct: Some(49.0),
            ..TeamSeason::default()
        };
        let pop = vec![a.clone(), b];
        let pct = compute_percentiles(&a, &pop, TEAM_STATS);
        assert_eq!(pct["tov_pct"], Some(100));
        assert_eq!(pct["efg_pct"], Some(100));
        assert_eq!(pct["barthag"], None);
    }
}
