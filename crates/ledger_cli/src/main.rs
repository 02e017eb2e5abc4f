//! Match Ledger CLI
//!
//! Replays a JSON command script against an in-memory ledger engine and
//! prints the resulting match views, tables and player totals. Useful for
//! exercising the engine end to end and for reproducing reported sequences.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::{stats, GroupLink, MatchLedger, RosterPlayer};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(about = "Replay match command scripts against the ledger engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON command script
    Replay {
        /// Script file: a JSON array of command objects
        #[arg(long)]
        script: PathBuf,

        /// Print the league table after the replay
        #[arg(long, default_value = "false")]
        table: bool,

        /// Print per-player totals after the replay
        #[arg(long, default_value = "false")]
        totals: bool,
    },

    /// Run a built-in demo match
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            script,
            table,
            totals,
        } => {
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let commands: Vec<Value> =
                serde_json::from_str(&text).context("script must be a JSON array")?;

            let ledger = MatchLedger::in_memory();
            let mut replay = Replay::new(&ledger);
            for (idx, command) in commands.iter().enumerate() {
                replay
                    .apply(command)
                    .with_context(|| format!("command #{idx}: {command}"))?;
            }

            for id in &replay.created {
                let view = ledger.match_view(id)?;
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            if table {
                println!("{}", serde_json::to_string_pretty(&ledger.league_table())?);
            }
            if totals {
                let records = ledger
                    .history()
                    .records()
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&stats::player_totals(&records))?
                );
            }
        }

        Commands::Demo => run_demo()?,
    }

    Ok(())
}

/// Script state: maps script-local aliases to engine match tokens.
struct Replay<'a> {
    ledger: &'a MatchLedger,
    aliases: HashMap<String, String>,
    created: Vec<String>,
}

impl<'a> Replay<'a> {
    fn new(ledger: &'a MatchLedger) -> Self {
        Self {
            ledger,
            aliases: HashMap::new(),
            created: Vec::new(),
        }
    }

    fn apply(&mut self, command: &Value) -> Result<()> {
        let op = str_field(command, "op")?;
        match op {
            "start_match" | "schedule_match" => {
                let team_a = str_field(command, "team_a")?;
                let team_b = str_field(command, "team_b")?;
                let external = command
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let id = if op == "start_match" {
                    self.ledger.start_match(team_a, team_b, external)?
                } else {
                    self.ledger.schedule_match(team_a, team_b, external)?
                };
                if let Some(alias) = command.get("alias").and_then(Value::as_str) {
                    self.aliases.insert(alias.to_string(), id.clone());
                }
                self.created.push(id);
            }
            "kick_off" => {
                let id = self.match_id(command)?;
                self.ledger.kick_off(&id)?;
            }
            "lineup" => {
                let id = self.match_id(command)?;
                let team = str_field(command, "team")?;
                let starters = players_field(command, "starters")?;
                let bench = players_field(command, "bench")?;
                let formation = command
                    .get("formation")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.ledger
                    .set_lineup(&id, team, starters, bench, formation)?;
            }
            "event" => {
                let id = self.match_id(command)?;
                let kind = str_field(command, "type")?;
                let minute = u32_field(command, "minute")?;
                let data = command.get("data").cloned().unwrap_or_else(|| json!({}));
                self.ledger.append_event(&id, kind, minute, &data)?;
            }
            "cancel_goal" => {
                let id = self.match_id(command)?;
                let cancelled = self.ledger.cancel_last_goal(&id)?;
                println!("cancelled: {}", serde_json::to_string(&cancelled)?);
            }
            "override_score" => {
                let id = self.match_id(command)?;
                self.ledger.override_score(
                    &id,
                    u32_field(command, "score_a")?,
                    u32_field(command, "score_b")?,
                )?;
            }
            "sync_clock" => {
                let id = self.match_id(command)?;
                let timer = str_field(command, "timer")?;
                let period = command.get("period").and_then(Value::as_str);
                let added_time = command
                    .get("added_time")
                    .and_then(Value::as_u64)
                    .map(|v| v as u8);
                let score = match (
                    command.get("score_a").and_then(Value::as_u64),
                    command.get("score_b").and_then(Value::as_u64),
                ) {
                    (Some(a), Some(b)) => Some((a as u32, b as u32)),
                    _ => None,
                };
                self.ledger
                    .sync_clock(&id, timer, period, added_time, score)?;
            }
            "link_group" => {
                let id = self.match_id(command)?;
                self.ledger.link_group(
                    &id,
                    GroupLink {
                        tournament: str_field(command, "tournament")?.to_string(),
                        group: str_field(command, "group")?.to_string(),
                    },
                )?;
            }
            "player_enters" => {
                let id = self.match_id(command)?;
                self.ledger.player_enters(
                    &id,
                    u64_field(command, "player_id")?,
                    command.get("name").and_then(Value::as_str),
                    None,
                    u32_field(command, "minute")?,
                )?;
            }
            "player_exits" => {
                let id = self.match_id(command)?;
                self.ledger.player_exits(
                    &id,
                    u64_field(command, "player_id")?,
                    u32_field(command, "minute")?,
                )?;
            }
            "end_match" => {
                let id = self.match_id(command)?;
                let score = match (
                    command.get("score_a").and_then(Value::as_u64),
                    command.get("score_b").and_then(Value::as_u64),
                ) {
                    (Some(a), Some(b)) => Some((a as u32, b as u32)),
                    _ => None,
                };
                self.ledger.end_match(&id, score)?;
            }
            "end_all" => {
                self.ledger.end_all_active();
            }
            other => bail!("unknown op: {other}"),
        }
        Ok(())
    }

    /// The command's "match" field is an alias from an earlier start_match,
    /// falling back to a literal engine token.
    fn match_id(&self, command: &Value) -> Result<String> {
        let token = str_field(command, "match")?;
        Ok(self
            .aliases
            .get(token)
            .cloned()
            .unwrap_or_else(|| token.to_string()))
    }
}

fn str_field<'v>(command: &'v Value, field: &str) -> Result<&'v str> {
    command
        .get(field)
        .and_then(Value::as_str)
        .with_context(|| format!("missing string field \"{field}\""))
}

fn u32_field(command: &Value, field: &str) -> Result<u32> {
    Ok(command
        .get(field)
        .and_then(Value::as_u64)
        .with_context(|| format!("missing numeric field \"{field}\""))? as u32)
}

fn u64_field(command: &Value, field: &str) -> Result<u64> {
    command
        .get(field)
        .and_then(Value::as_u64)
        .with_context(|| format!("missing numeric field \"{field}\""))
}

fn players_field(command: &Value, field: &str) -> Result<Vec<RosterPlayer>> {
    match command.get(field) {
        None => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .with_context(|| format!("invalid player list in \"{field}\"")),
    }
}

fn run_demo() -> Result<()> {
    let ledger = MatchLedger::in_memory();
    let id = ledger.start_match("Lechia", "Arka", None)?;
    ledger.set_lineup(
        &id,
        "A",
        vec![
            RosterPlayer::new("Kowalski").with_id(1).with_number(1),
            RosterPlayer::new("Piotrowski").with_id(2).with_number(9),
        ],
        vec![RosterPlayer::new("Nowak").with_id(3).with_number(14)],
        None,
    )?;

    ledger.append_event(&id, "goal", 12, &json!({"scorer": "Piotr", "team": "A"}))?;
    ledger.append_event(&id, "yellow", 31, &json!({"player": "Kowalski", "team": "A"}))?;
    ledger.append_event(&id, "goal", 38, &json!({"scorer": "Visiting Striker", "team": "B"}))?;
    ledger.sync_clock(&id, "40:00", Some("Full time"), None, None)?;
    ledger.end_match(&id, None)?;

    let view = ledger.match_view(&id)?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    println!("{}", serde_json::to_string_pretty(&ledger.league_table())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_script_end_to_end() {
        let ledger = MatchLedger::in_memory();
        let mut replay = Replay::new(&ledger);

        let script = vec![
            json!({"op": "start_match", "team_a": "Lechia", "team_b": "Arka", "alias": "m"}),
            json!({"op": "event", "match": "m", "type": "goal", "minute": 10,
                   "data": {"scorer": "X", "team": "A"}}),
            json!({"op": "end_match", "match": "m"}),
        ];
        for command in &script {
            replay.apply(command).unwrap();
        }

        let id = &replay.created[0];
        let m = ledger.get_match(id).unwrap();
        assert_eq!((m.score_a, m.score_b), (1, 0));
        assert_eq!(ledger.league_table().len(), 2);
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let ledger = MatchLedger::in_memory();
        let mut replay = Replay::new(&ledger);
        assert!(replay.apply(&json!({"op": "explode"})).is_err());
    }
}
