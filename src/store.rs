//! SQLite schema and the upsert/replace layer for the four tables.
//!
//! Season tables merge on primary-key conflict. Game tables are replaced per
//! year inside one transaction, so readers see either the old partition or
//! the new one.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{Error, Result};
use crate::records::{BoxScore, PlayerGame, PlayerSeason, TeamGame, TeamSeason};

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            Error::config(format!("cannot create {}: {err}", parent.display()))
        })?;
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS player_seasons (
            player_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            name TEXT NULL,
            team TEXT NULL,
            conference TEXT NULL,
            position TEXT NULL,
            year_in_school TEXT NULL,
            height TEXT NULL,
            games INTEGER NULL,
            mpg REAL NULL,
            pts REAL NULL,
            reb REAL NULL,
            ast REAL NULL,
            stl REAL NULL,
            blk REAL NULL,
            tov REAL NULL,
            usg_pct REAL NULL,
            ts_pct REAL NULL,
            efg_pct REAL NULL,
            ftr REAL NULL,
            fg_pct REAL NULL,
            three_pct REAL NULL,
            ft_pct REAL NULL,
            ortg REAL NULL,
            drtg REAL NULL,
            bpm REAL NULL,
            obpm REAL NULL,
            dbpm REAL NULL,
            porpag REAL NULL,
            PRIMARY KEY (player_id, year)
        );
        CREATE INDEX IF NOT EXISTS idx_player_seasons_year ON player_seasons(year);

        CREATE TABLE IF NOT EXISTS player_games (
            player_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            date TEXT NULL,
            opponent TEXT NULL,
            game_num INTEGER NOT NULL,
            result TEXT NULL,
            location TEXT NULL,
            min INTEGER NULL,
            pts INTEGER NULL,
            reb INTEGER NULL,
            ast INTEGER NULL,
            stl INTEGER NULL,
            blk INTEGER NULL,
            tov INTEGER NULL,
            two_m INTEGER NULL,
            two_a INTEGER NULL,
            three_m INTEGER NULL,
            three_a INTEGER NULL,
            ftm INTEGER NULL,
            fta INTEGER NULL,
            ortg REAL NULL,
            usg REAL NULL,
            efg REAL NULL,
            ts REAL NULL,
            bpm_game REAL NULL,
            obpm_game REAL NULL,
            dbpm_game REAL NULL,
            poss REAL NULL,
            PRIMARY KEY (player_id, year, date, opponent, game_num)
        );
        CREATE INDEX IF NOT EXISTS idx_player_games_lookup ON player_games(player_id, year);

        CREATE TABLE IF NOT EXISTS team_seasons (
            team_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            name TEXT NULL,
            conference TEXT NULL,
            record TEXT NULL,
            wins INTEGER NULL,
            losses INTEGER NULL,
            ortg REAL NULL,
            drtg REAL NULL,
            net_rtg REAL NULL,
            pace REAL NULL,
            barthag REAL NULL,
            wab REAL NULL,
            efg_pct REAL NULL,
            opp_efg_pct REAL NULL,
            tov_pct REAL NULL,
            opp_tov_pct REAL NULL,
            orb_pct REAL NULL,
            drb_pct REAL NULL,
            ftr REAL NULL,
            opp_ftr REAL NULL,
            nc_sos REAL NULL,
            ov_sos REAL NULL,
            seed REAL NULL,
            PRIMARY KEY (team_id, year)
        );
        CREATE INDEX IF NOT EXISTS idx_team_seasons_year ON team_seasons(year);

        CREATE TABLE IF NOT EXISTS team_games (
            team_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            game_id TEXT NOT NULL,
            date TEXT NULL,
            type TEXT NULL,
            location TEXT NULL,
            result TEXT NULL,
            opponent TEXT NULL,
            opp_conf TEXT NULL,
            min REAL NULL,
            pos REAL NULL,
            pts INTEGER NULL,
            fgm INTEGER NULL,
            fga INTEGER NULL,
            tpm INTEGER NULL,
            tpa INTEGER NULL,
            ftm INTEGER NULL,
            fta INTEGER NULL,
            oreb INTEGER NULL,
            dreb INTEGER NULL,
            reb INTEGER NULL,
            ast INTEGER NULL,
            stl INTEGER NULL,
            blk INTEGER NULL,
            tov INTEGER NULL,
            opp_pts INTEGER NULL,
            opp_fgm INTEGER NULL,
            opp_fga INTEGER NULL,
            opp_tpm INTEGER NULL,
            opp_tpa INTEGER NULL,
            opp_ftm INTEGER NULL,
            opp_fta INTEGER NULL,
            opp_oreb INTEGER NULL,
            opp_dreb INTEGER NULL,
            opp_reb INTEGER NULL,
            opp_ast INTEGER NULL,
            opp_stl INTEGER NULL,
            opp_blk INTEGER NULL,
            opp_tov INTEGER NULL,
            PRIMARY KEY (team_id, year, game_id)
        );
        CREATE INDEX IF NOT EXISTS idx_team_games_lookup ON team_games(team_id, year);

        CREATE TABLE IF NOT EXISTS refresh_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            year INTEGER NOT NULL,
            include_games INTEGER NOT NULL,
            player_seasons INTEGER NOT NULL,
            team_seasons INTEGER NOT NULL,
            player_games INTEGER NOT NULL,
            team_games INTEGER NOT NULL,
            teams_aggregated INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

pub(crate) const PLAYER_SEASON_COLUMNS: &str = "player_id, year, name, team, conference, position, \
     year_in_school, height, games, mpg, pts, reb, ast, stl, blk, tov, usg_pct, ts_pct, efg_pct, \
     ftr, fg_pct, three_pct, ft_pct, ortg, drtg, bpm, obpm, dbpm, porpag";

pub(crate) const TEAM_SEASON_COLUMNS: &str = "team_id, year, name, conference, record, wins, losses, \
     ortg, drtg, net_rtg, pace, barthag, wab, efg_pct, opp_efg_pct, tov_pct, opp_tov_pct, \
     orb_pct, drb_pct, ftr, opp_ftr, nc_sos, ov_sos, seed";

pub(crate) const PLAYER_GAME_COLUMNS: &str = "player_id, year, game_num, date, opponent, result, \
     location, min, pts, reb, ast, stl, blk, tov, two_m, two_a, three_m, three_a, ftm, fta, \
     ortg, usg, efg, ts, bpm_game, obpm_game, dbpm_game, poss";

pub(crate) const TEAM_GAME_COLUMNS: &str = "team_id, year, game_id, date, type, location, result, \
     opponent, opp_conf, min, pos, \
     pts, fgm, fga, tpm, tpa, ftm, fta, oreb, dreb, reb, ast, stl, blk, tov, \
     opp_pts, opp_fgm, opp_fga, opp_tpm, opp_tpa, opp_ftm, opp_fta, opp_oreb, opp_dreb, \
     opp_reb, opp_ast, opp_stl, opp_blk, opp_tov";

/// Merge player-season rows for `year`. Returns the number of rows written.
pub fn upsert_player_seasons(conn: &mut Connection, year: i32, rows: &[PlayerSeason]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO player_seasons (
                player_id, year, name, team, conference, position, year_in_school, height,
                games, mpg, pts, reb, ast, stl, blk, tov,
                usg_pct, ts_pct, efg_pct, ftr, fg_pct, three_pct, ft_pct,
                ortg, drtg, bpm, obpm, dbpm, porpag
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20, ?21, ?22, ?23,
                ?24, ?25, ?26, ?27, ?28, ?29
            )
            ON CONFLICT(player_id, year) DO UPDATE SET
                name = excluded.name,
                team = excluded.team,
                conference = excluded.conference,
                position = excluded.position,
                year_in_school = excluded.year_in_school,
                height = excluded.height,
                games = excluded.games,
                mpg = excluded.mpg,
                pts = excluded.pts,
                reb = excluded.reb,
                ast = excluded.ast,
                stl = excluded.stl,
                blk = excluded.blk,
                tov = excluded.tov,
                usg_pct = excluded.usg_pct,
                ts_pct = excluded.ts_pct,
                efg_pct = excluded.efg_pct,
                ftr = excluded.ftr,
                fg_pct = excluded.fg_pct,
                three_pct = excluded.three_pct,
                ft_pct = excluded.ft_pct,
                ortg = excluded.ortg,
                drtg = excluded.drtg,
                bpm = excluded.bpm,
                obpm = excluded.obpm,
                dbpm = excluded.dbpm,
                porpag = excluded.porpag
            "#,
        )?;
        for p in rows {
            stmt.execute(params![
                p.player_id,
                year,
                p.name,
                p.team,
                p.conference,
                p.position,
                p.year_in_school,
                p.height,
                p.games,
                p.mpg,
                p.pts,
                p.reb,
                p.ast,
                p.stl,
                p.blk,
                p.tov,
                p.usg_pct,
                p.ts_pct,
                p.efg_pct,
                p.ftr,
                p.fg_pct,
                p.three_pct,
                p.ft_pct,
                p.ortg,
                p.drtg,
                p.bpm,
                p.obpm,
                p.dbpm,
                p.porpag,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

/// Merge the upstream rating fields of team-season rows. Record and four
/// factors are left alone; the aggregation pass owns them.
pub fn upsert_team_seasons(conn: &mut Connection, year: i32, rows: &[TeamSeason]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO team_seasons (
                team_id, year, name, conference,
                ortg, drtg, net_rtg, pace, barthag, wab,
                nc_sos, ov_sos, seed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(team_id, year) DO UPDATE SET
                name = excluded.name,
                conference = excluded.conference,
                ortg = excluded.ortg,
                drtg = excluded.drtg,
                net_rtg = excluded.net_rtg,
                pace = excluded.pace,
                barthag = excluded.barthag,
                wab = excluded.wab,
                nc_sos = excluded.nc_sos,
                ov_sos = excluded.ov_sos,
                seed = excluded.seed
            "#,
        )?;
        for t in rows {
            stmt.execute(params![
                t.team_id, year, t.name, t.conference, t.ortg, t.drtg, t.net_rtg, t.pace,
                t.barthag, t.wab, t.nc_sos, t.ov_sos, t.seed,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

/// Replace every player-game row for `year` with `rows`. An empty batch
/// leaves the stored partition as it was.
pub fn replace_player_games(conn: &mut Connection, year: i32, rows: &[PlayerGame]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let numbered = assign_game_numbers(rows);

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM player_games WHERE year = ?1", params![year])?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO player_games ({PLAYER_GAME_COLUMNS}) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28
            )"
        ))?;
        for (g, game_num) in rows.iter().zip(numbered) {
            stmt.execute(params![
                g.player_id,
                year,
                game_num,
                g.date,
                g.opponent,
                g.result,
                g.location,
                g.min,
                g.pts,
                g.reb,
                g.ast,
                g.stl,
                g.blk,
                g.tov,
                g.two_m,
                g.two_a,
                g.three_m,
                g.three_a,
                g.ftm,
                g.fta,
                g.ortg,
                g.usg,
                g.efg,
                g.ts,
                g.bpm_game,
                g.obpm_game,
                g.dbpm_game,
                g.poss,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

/// 0-based occurrence index per (player, date, opponent) in batch order.
pub fn assign_game_numbers(rows: &[PlayerGame]) -> Vec<i64> {
    let mut seen: HashMap<(&str, Option<&str>, Option<&str>), i64> = HashMap::new();
    rows.iter()
        .map(|g| {
            let key = (
                g.player_id.as_str(),
                g.date.as_deref(),
                g.opponent.as_deref(),
            );
            let slot = seen.entry(key).or_insert(0);
            let n = *slot;
            *slot += 1;
            n
        })
        .collect()
}

/// Replace every team-game row for `year`. Duplicate (team, game) keys in the
/// batch keep the first occurrence; the return value counts rows inserted.
pub fn replace_team_games(conn: &mut Connection, year: i32, rows: &[TeamGame]) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM team_games WHERE year = ?1", params![year])?;
    let mut inserted = 0usize;
    {
        let placeholders = (1..=39)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO team_games ({TEAM_GAME_COLUMNS}) VALUES ({placeholders})
             ON CONFLICT(team_id, year, game_id) DO NOTHING"
        ))?;
        for g in rows {
            let own = g.own.values();
            let opp = g.opp.values();
            let mut values: Vec<&dyn ToSql> = vec![
                &g.team_id,
                &year,
                &g.game_id,
                &g.date,
                &g.game_type,
                &g.location,
                &g.result,
                &g.opponent,
                &g.opp_conf,
                &g.min,
                &g.pos,
            ];
            values.extend(own.iter().map(|v| v as &dyn ToSql));
            values.extend(opp.iter().map(|v| v as &dyn ToSql));
            inserted += stmt.execute(&*values)?;
        }
    }
    tx.commit()?;
    Ok(inserted)
}

/// Stored team name -> team id for one year.
pub fn team_name_lookup(conn: &Connection, year: i32) -> Result<HashMap<String, String>> {
    let mut stmt =
        conn.prepare("SELECT name, team_id FROM team_seasons WHERE year = ?1 AND name IS NOT NULL")?;
    let rows = stmt.query_map(params![year], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut out = HashMap::new();
    for row in rows {
        let (name, id) = row?;
        out.insert(name, id);
    }
    Ok(out)
}

pub fn count_player_seasons(conn: &Connection, year: i32) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM player_seasons WHERE year = ?1",
        params![year],
        |row| row.get(0),
    )?;
    Ok(n.max(0) as usize)
}

pub fn load_player_seasons(conn: &Connection, year: i32) -> Result<Vec<PlayerSeason>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_SEASON_COLUMNS} FROM player_seasons WHERE year = ?1 ORDER BY player_id"
    ))?;
    let rows = stmt.query_map(params![year], player_season_from_row)?;
    collect_rows(rows)
}

pub fn load_player_history(conn: &Connection, player_id: &str) -> Result<Vec<PlayerSeason>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_SEASON_COLUMNS} FROM player_seasons WHERE player_id = ?1 ORDER BY year"
    ))?;
    let rows = stmt.query_map(params![player_id], player_season_from_row)?;
    collect_rows(rows)
}

pub fn load_team_seasons(conn: &Connection, year: i32) -> Result<Vec<TeamSeason>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons WHERE year = ?1 ORDER BY team_id"
    ))?;
    let rows = stmt.query_map(params![year], team_season_from_row)?;
    collect_rows(rows)
}

pub fn load_team_history(conn: &Connection, team_id: &str) -> Result<Vec<TeamSeason>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons WHERE team_id = ?1 ORDER BY year"
    ))?;
    let rows = stmt.query_map(params![team_id], team_season_from_row)?;
    collect_rows(rows)
}

pub fn load_team_season(conn: &Connection, team_id: &str, year: i32) -> Result<Option<TeamSeason>> {
    let row = conn
        .query_row(
            &format!("SELECT {TEAM_SEASON_COLUMNS} FROM team_seasons WHERE team_id = ?1 AND year = ?2"),
            params![team_id, year],
            team_season_from_row,
        )
        .optional()?;
    Ok(row)
}

pub fn load_team_games(conn: &Connection, year: i32) -> Result<Vec<TeamGame>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_GAME_COLUMNS} FROM team_games WHERE year = ?1 ORDER BY team_id, date, game_id"
    ))?;
    let rows = stmt.query_map(params![year], team_game_from_row)?;
    collect_rows(rows)
}

pub fn load_player_games(conn: &Connection, player_id: &str, year: i32) -> Result<Vec<PlayerGame>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_GAME_COLUMNS} FROM player_games
         WHERE player_id = ?1 AND year = ?2
         ORDER BY date DESC NULLS LAST, game_num DESC"
    ))?;
    let rows = stmt.query_map(params![player_id, year], player_game_from_row)?;
    collect_rows(rows)
}

pub fn load_team_games_for(conn: &Connection, team_id: &str, year: i32) -> Result<Vec<TeamGame>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEAM_GAME_COLUMNS} FROM team_games
         WHERE team_id = ?1 AND year = ?2
         ORDER BY date ASC NULLS LAST, game_id"
    ))?;
    let rows = stmt.query_map(params![team_id, year], team_game_from_row)?;
    collect_rows(rows)
}

/// One row of the `refresh_runs` ledger.
#[derive(Debug, Clone, Default)]
pub struct RefreshRun {
    pub started_at: String,
    pub year: i32,
    pub include_games: bool,
    pub player_seasons: usize,
    pub team_seasons: usize,
    pub player_games: usize,
    pub team_games: usize,
    pub teams_aggregated: usize,
    pub errors: Vec<String>,
}

pub fn record_refresh_run(conn: &Connection, run: &RefreshRun) -> Result<i64> {
    let errors_json = serde_json::to_string(&run.errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO refresh_runs(
            started_at, finished_at, year, include_games,
            player_seasons, team_seasons, player_games, team_games, teams_aggregated, errors_json
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            run.started_at,
            Utc::now().to_rfc3339(),
            run.year,
            run.include_games,
            run.player_seasons as i64,
            run.team_seasons as i64,
            run.player_games as i64,
            run.team_games as i64,
            run.teams_aggregated as i64,
            errors_json,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(crate) fn player_season_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerSeason> {
    Ok(PlayerSeason {
        player_id: row.get(0)?,
        year: row.get(1)?,
        name: row.get(2)?,
        team: row.get(3)?,
        conference: row.get(4)?,
        position: row.get(5)?,
        year_in_school: row.get(6)?,
        height: row.get(7)?,
        games: row.get(8)?,
        mpg: row.get(9)?,
        pts: row.get(10)?,
        reb: row.get(11)?,
        ast: row.get(12)?,
        stl: row.get(13)?,
        blk: row.get(14)?,
        tov: row.get(15)?,
        usg_pct: row.get(16)?,
        ts_pct: row.get(17)?,
        efg_pct: row.get(18)?,
        ftr: row.get(19)?,
        fg_pct: row.get(20)?,
        three_pct: row.get(21)?,
        ft_pct: row.get(22)?,
        ortg: row.get(23)?,
        drtg: row.get(24)?,
        bpm: row.get(25)?,
        obpm: row.get(26)?,
        dbpm: row.get(27)?,
        porpag: row.get(28)?,
    })
}

pub(crate) fn team_season_from_row(row: &Row<'_>) -> rusqlite::Result<TeamSeason> {
    Ok(TeamSeason {
        team_id: row.get(0)?,
        year: row.get(1)?,
        name: row.get(2)?,
        conference: row.get(3)?,
        record: row.get(4)?,
        wins: row.get(5)?,
        losses: row.get(6)?,
        ortg: row.get(7)?,
        drtg: row.get(8)?,
        net_rtg: row.get(9)?,
        pace: row.get(10)?,
        barthag: row.get(11)?,
        wab: row.get(12)?,
        efg_pct: row.get(13)?,
        opp_efg_pct: row.get(14)?,
        tov_pct: row.get(15)?,
        opp_tov_pct: row.get(16)?,
        orb_pct: row.get(17)?,
        drb_pct: row.get(18)?,
        ftr: row.get(19)?,
        opp_ftr: row.get(20)?,
        nc_sos: row.get(21)?,
        ov_sos: row.get(22)?,
        seed: row.get(23)?,
    })
}

fn player_game_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerGame> {
    Ok(PlayerGame {
        player_id: row.get(0)?,
        year: row.get(1)?,
        game_num: row.get(2)?,
        date: row.get(3)?,
        opponent: row.get(4)?,
        result: row.get(5)?,
        location: row.get(6)?,
        min: row.get(7)?,
        pts: row.get(8)?,
        reb: row.get(9)?,
        ast: row.get(10)?,
        stl: row.get(11)?,
        blk: row.get(12)?,
        tov: row.get(13)?,
        two_m: row.get(14)?,
        two_a: row.get(15)?,
        three_m: row.get(16)?,
        three_a: row.get(17)?,
        ftm: row.get(18)?,
        fta: row.get(19)?,
        ortg: row.get(20)?,
        usg: row.get(21)?,
        efg: row.get(22)?,
        ts: row.get(23)?,
        bpm_game: row.get(24)?,
        obpm_game: row.get(25)?,
        dbpm_game: row.get(26)?,
        poss: row.get(27)?,
    })
}

fn team_game_from_row(row: &Row<'_>) -> rusqlite::Result<TeamGame> {
    let mut own = [None; 14];
    let mut opp = [None; 14];
    for i in 0..14 {
        own[i] = row.get(11 + i)?;
        opp[i] = row.get(25 + i)?;
    }
    Ok(TeamGame {
        team_id: row.get(0)?,
        year: row.get(1)?,
        game_id: row.get(2)?,
        date: row.get(3)?,
        game_type: row.get(4)?,
        location: row.get(5)?,
        result: row.get(6)?,
        opponent: row.get(7)?,
        opp_conf: row.get(8)?,
        min: row.get(9)?,
        pos: row.get(10)?,
        own: BoxScore::from_values(own),
        opp: BoxScore::from_values(opp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_db() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        init_schema(&conn).expect("schema");
        conn
    }

    fn game(player_id: &str, date: &str, opponent: &str) -> PlayerGame {
        PlayerGame {
            player_id: player_id.to_string(),
            year: 2024,
            date: Some(date.to_string()),
            opponent: Some(opponent.to_string()),
            ..PlayerGame::default()
        }
    }

    #[test]
    fn game_numbers_break_same_day_same_opponent_ties() {
        let rows = vec![
            game("1", "2024-01-10", "Duke"),
            game("1", "2024-01-10", "Duke"),
            game("1", "2024-02-10", "Duke"),
            game("2", "2024-01-10", "Duke"),
        ];
        assert_eq!(assign_game_numbers(&rows), vec![0, 1, 0, 0]);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = mem_db();
        init_schema(&conn).expect("second init");
    }

    #[test]
    fn team_game_columns_round_trip() {
        let mut conn = mem_db();
        let g = TeamGame {
            team_id: "purdue".to_string(),
            year: 2024,
            game_id: "g1".to_string(),
            pos: Some(70.5),
            own: BoxScore {
                pts: Some(80),
                tov: Some(9),
                ..BoxScore::default()
            },
            opp: BoxScore {
                pts: Some(71),
                oreb: Some(12),
                ..BoxScore::default()
            },
            ..TeamGame::default()
        };
        assert_eq!(replace_team_games(&mut conn, 2024, &[g.clone()]).expect("insert"), 1);
        let loaded = load_team_games(&conn, 2024).expect("load");
        assert_eq!(loaded, vec![g]);
    }

    #[test]
    fn duplicate_team_game_keys_insert_once() {
        let mut conn = mem_db();
        let g = TeamGame {
            team_id: "purdue".to_string(),
            year: 2024,
            game_id: "g1".to_string(),
            ..TeamGame::default()
        };
        let n = replace_team_games(&mut conn, 2024, &[g.clone(), g]).expect("insert");
        assert_eq!(n, 1);
    }

    #[test]
    fn refresh_runs_are_recorded() {
        let conn = mem_db();
        let run = RefreshRun {
            started_at: Utc::now().to_rfc3339(),
            year: 2024,
            player_seasons: 10,
            errors: vec!["player games: http 500".to_string()],
            ..RefreshRun::default()
        };
        let id = record_refresh_run(&conn, &run).expect("record");
        let errors: String = conn
            .query_row(
                "SELECT errors_json FROM refresh_runs WHERE run_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .expect("select");
        assert_eq!(errors, r#"["player games: http 500"]"#);
    }
}
