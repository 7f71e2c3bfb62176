use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use court_vision::config::Config;
use court_vision::http_client::CbbdataClient;
use court_vision::refresh::{RefreshSummary, YearSummary};
use court_vision::{logging, refresh, season, store};

/// Pull cbbdata snapshots into the local store.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// End year(s) to fetch. One value is a single year, two an inclusive
    /// range, more an explicit list. Default: 2009 through 2025.
    #[arg(long, num_args = 1.., value_name = "YEAR")]
    seasons: Vec<i32>,

    /// Skip per-game logs and box scores (much faster first load).
    #[arg(long)]
    no_games: bool,

    /// SQLite file to write. Overrides COURT_VISION_DB.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init_tracing(args.verbose);

    let mut config = Config::from_env().context("load configuration")?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    let years = season::expand_years(&args.seasons);
    if years.is_empty() {
        anyhow::bail!("no seasons to refresh (is the range reversed?)");
    }

    let client = CbbdataClient::new(&config)?;
    let mut conn = store::open_db(&config.db_path)
        .with_context(|| format!("open sqlite db {}", config.db_path.display()))?;

    println!(
        "Refreshing {} season(s) into {}{}",
        years.len(),
        config.db_path.display(),
        if args.no_games { " (no games)" } else { "" }
    );
    // Each year commits on its own, so report it as soon as it lands.
    let started = Instant::now();
    let mut summary = RefreshSummary::default();
    for &year in &years {
        let done = refresh::refresh_year(&mut conn, &client, year, !args.no_games)
            .with_context(|| {
                format!(
                    "refresh {} failed after {} completed season(s)",
                    season::year_to_season(year),
                    summary.years.len()
                )
            })?;
        print_year(&done, args.no_games);
        summary.years.push(done);
    }
    summary.elapsed = started.elapsed();

    println!(
        "Done. {} player-seasons, {} team-seasons, {} player-game rows, {} team-game rows in {:.1}s.",
        summary.player_seasons(),
        summary.team_seasons(),
        summary.player_games(),
        summary.team_games(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

fn print_year(year: &YearSummary, no_games: bool) {
    let mut line = format!(
        "  {} ({})  players={}  teams={}",
        year.season, year.year, year.player_seasons, year.team_seasons
    );
    if !no_games {
        line.push_str(&format!(
            "  player_games={}  team_games={}  agg={}",
            year.player_games, year.team_games, year.teams_aggregated
        ));
    }
    line.push_str(&format!("  ({:.1}s)", year.elapsed.as_secs_f64()));
    println!("{line}");
    for err in &year.errors {
        println!("    skipped {err}");
    }
}
