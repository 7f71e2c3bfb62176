use anyhow::{Context, Result, anyhow};
use clap::Parser;

use court_vision::config::Config;
use court_vision::logging;
use court_vision::profile::Pipeline;

/// Build a player's career profile (or one season's game log) live from
/// cbbdata and print it as JSON.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Upstream numeric player id, e.g. 72413.
    player_id: String,

    /// Print this season's game log (e.g. 2023-24) instead of the profile.
    #[arg(long, value_name = "SEASON")]
    games: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init_tracing(args.verbose);

    let config = Config::from_env().context("load configuration")?;
    let pipeline = Pipeline::new(&config)?;

    let json = match args.games.as_deref() {
        Some(season) => {
            let games = pipeline.player_games(&args.player_id, season)?;
            serde_json::to_string_pretty(&games)?
        }
        None => {
            let profile = pipeline
                .player_profile(&args.player_id)?
                .ok_or_else(|| anyhow!("player '{}' not found in any season", args.player_id))?;
            serde_json::to_string_pretty(&profile)?
        }
    };
    println!("{json}");
    Ok(())
}
