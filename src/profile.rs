//! Live read path: season rows and multi-year player profiles fetched straight
//! from upstream, memoized per year in the owned [`SeasonCache`].

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::http_client::{CbbdataClient, Endpoint, SnapshotSource, fetch_or_empty};
use crate::identity::{normalize_player_games, normalize_player_seasons};
use crate::percentiles::{PLAYER_STATS, Percentiles, compute_percentiles};
use crate::records::{PlayerGame, PlayerIdentity, PlayerStatLine};
use crate::season::{profile_years, season_to_year, year_to_season};
use crate::season_cache::{SeasonCache, SeasonRows};
use crate::store::assign_game_numbers;

const PROFILE_PARALLELISM: usize = 6;

/// One season of a profile: the stat line plus its percentiles within that
/// season's population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStats<T> {
    #[serde(flatten)]
    pub line: T,
    pub percentiles: Percentiles,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub player_id: String,
    #[serde(flatten)]
    pub identity: PlayerIdentity,
    /// Season labels, ascending.
    pub seasons: Vec<String>,
    pub stats: BTreeMap<String, SeasonStats<PlayerStatLine>>,
}

/// A player game with the combined field-goal line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameLog {
    #[serde(flatten)]
    pub game: PlayerGame,
    pub fg: String,
}

impl From<PlayerGame> for PlayerGameLog {
    fn from(game: PlayerGame) -> Self {
        let fg = game.fg_line();
        Self { game, fg }
    }
}

pub struct Pipeline {
    source: Box<dyn SnapshotSource>,
    cache: SeasonCache,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        let client = CbbdataClient::new(config)?;
        Ok(Self::with_source(Box::new(client), SeasonCache::default()))
    }

    pub fn with_source(source: Box<dyn SnapshotSource>, cache: SeasonCache) -> Self {
        Self { source, cache }
    }

    /// Every player row for the season labelled `season` (e.g. "2023-24").
    pub fn player_season(&self, season: &str) -> Result<SeasonRows> {
        let year = season_to_year(season)?;
        self.season_for_year(year)
    }

    pub fn season_for_year(&self, year: i32) -> Result<SeasonRows> {
        self.cache.get_or_fetch(year, || {
            let rows = self.source.fetch(Endpoint::PlayerSeason, year)?;
            Ok(normalize_player_seasons(&rows, year))
        })
    }

    /// Career profile across every profile year the player appears in.
    /// Identity comes from the earliest season found. Years whose fetch fails
    /// are skipped; `Ok(None)` means the player appears in no season that
    /// could be fetched. If no year could be fetched at all the first
    /// failure is returned instead.
    pub fn player_profile(&self, player_id: &str) -> Result<Option<PlayerProfile>> {
        let years = profile_years();
        let fetched: Vec<(i32, Result<SeasonRows>)> = with_fetch_pool(|| {
            years
                .par_iter()
                .map(|&year| (year, self.season_for_year(year)))
                .collect()
        });

        let mut first_error = None;
        let mut available = 0usize;
        let mut identity: Option<PlayerIdentity> = None;
        let mut stats = BTreeMap::new();
        for (year, rows) in fetched {
            let rows = match rows {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(year, error = %err, "season unavailable for profile");
                    first_error.get_or_insert(err);
                    continue;
                }
            };
            available += 1;
            let Some(player) = rows.iter().find(|p| p.player_id == player_id) else {
                continue;
            };
            if identity.is_none() {
                identity = Some(player.identity());
            }
            stats.insert(
                year_to_season(year),
                SeasonStats {
                    line: player.stat_line(),
                    percentiles: compute_percentiles(player, rows.as_slice(), PLAYER_STATS),
                },
            );
        }

        if available == 0
            && let Some(err) = first_error
        {
            return Err(err);
        }
        Ok(identity.map(|identity| PlayerProfile {
            player_id: player_id.to_string(),
            identity,
            seasons: stats.keys().cloned().collect(),
            stats,
        }))
    }

    /// A player's games for one season, newest first. Upstream failures
    /// read as no games; a malformed label is still an error.
    pub fn player_games(&self, player_id: &str, season: &str) -> Result<Vec<PlayerGameLog>> {
        let year = season_to_year(season)?;
        let rows = fetch_or_empty(self.source.as_ref(), Endpoint::PlayerGames, year, &mut Vec::new());
        let mut games: Vec<PlayerGame> = normalize_player_games(&rows, year)
            .into_iter()
            .filter(|g| g.player_id == player_id)
            .collect();
        let numbers = assign_game_numbers(&games);
        for (game, n) in games.iter_mut().zip(numbers) {
            game.game_num = n;
        }
        // undated games sort last
        games.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(games.into_iter().map(PlayerGameLog::from).collect())
    }
}

fn with_fetch_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(PROFILE_PARALLELISM)
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
