//! Headless battle runner.
//!
//! Runs one battle with both sides under AI control and prints the event
//! stream, then the result. Logs go to stderr and honor `RUST_LOG`.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use waktosa_core::{
    BattleConfig, BattleEvent, BattleSession, CombatantId, ControlMode, EventLog, Side, Stage,
    TargetPolicy,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StageArg {
    Village,
    Darkness,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Village => Self::Village,
            StageArg::Darkness => Self::Darkness,
        }
    }
}

/// Run a Waktosa battle without a renderer.
#[derive(Debug, Parser)]
#[command(name = "waktosa-sim", version, about)]
struct Args {
    /// Preset stage to fight; ignored when the config declares combatants
    #[arg(long, value_enum)]
    stage: Option<StageArg>,

    /// JSON battle configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for random targeting
    #[arg(long)]
    seed: Option<u64>,

    /// Pick AI targets at random instead of the first living opponent
    #[arg(long)]
    random_targets: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(stage = %config.stage, seed = config.seed, "running battle");

    let roster = config.build_roster().context("failed to build roster")?;
    let names: HashMap<CombatantId, String> = roster
        .iter()
        .map(|c| (c.id(), c.name().to_string()))
        .collect();

    let log = EventLog::new();
    let mut session = BattleSession::new(config);
    session.subscribe(log.clone());
    session
        .start_battle(roster)
        .context("failed to start battle")?;

    for line in report(&session, &log.take_events(), &names) {
        println!("{line}");
    }
    Ok(())
}

/// Renders the event stream followed by a survivor count per side.
///
/// The outcome line comes from the `BattleEnded` event alone.
fn report(
    session: &BattleSession,
    events: &[BattleEvent],
    names: &HashMap<CombatantId, String>,
) -> Vec<String> {
    let mut lines: Vec<String> = events.iter().map(|e| describe(e, names)).collect();
    let roster = session.roster();
    for side in [Side::Ally, Side::Enemy] {
        lines.push(format!(
            "{side}: {}/{} standing",
            roster.alive_count(side),
            roster.spawned_count(side)
        ));
    }
    lines
}

fn load_config(args: &Args) -> Result<BattleConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            BattleConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => BattleConfig::default(),
    };

    config.control = ControlMode::Auto;
    config.auto_advance = true;
    if let Some(stage) = args.stage {
        config.stage = stage.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.random_targets {
        config.target_policy = TargetPolicy::Random;
    }
    Ok(config)
}

fn describe(event: &BattleEvent, names: &HashMap<CombatantId, String>) -> String {
    let name = |id: &CombatantId| names.get(id).map_or("?", String::as_str).to_string();
    match event {
        BattleEvent::BattleStarted { combatants } => {
            format!("Battle begins with {combatants} combatants")
        }
        BattleEvent::TurnStarted { turn, name, side, .. } => {
            format!("--- Turn {turn}: {name} ({side}) ---")
        }
        BattleEvent::AttackResolved {
            attacker,
            target,
            damage,
            remaining_hp,
        } => format!(
            "{} hits {} for {damage} damage, {remaining_hp} hp left",
            name(attacker),
            name(target)
        ),
        BattleEvent::CombatantDefeated { name, .. } => format!("{name} is defeated"),
        BattleEvent::BattleEnded { outcome } => format!("Battle over: {outcome}"),
        BattleEvent::BattleAborted => "Battle aborted".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stage: Stage) -> (BattleSession, Vec<String>) {
        let config = load_config(&Args {
            stage: Some(match stage {
                Stage::Village => StageArg::Village,
                Stage::Darkness => StageArg::Darkness,
            }),
            config: None,
            seed: None,
            random_targets: false,
        })
        .unwrap();
        let roster = config.build_roster().unwrap();
        let names: HashMap<_, _> = roster.iter().map(|c| (c.id(), c.name().to_string())).collect();
        let log = EventLog::new();
        let mut session = BattleSession::new(config);
        session.subscribe(log.clone());
        session.start_battle(roster).unwrap();
        let lines = report(&session, &log.take_events(), &names);
        (session, lines)
    }

    #[test]
    fn outcome_is_reported_once() {
        for stage in [Stage::Village, Stage::Darkness] {
            let (session, lines) = run(stage);
            let waktosa_core::BattleState::Ended(outcome) = session.battle_state() else {
                panic!("runner battle did not finish");
            };
            let outcome = outcome.to_string();
            assert_eq!(lines.iter().filter(|l| l.contains(&outcome)).count(), 1);
        }
    }

    #[test]
    fn report_ends_with_survivor_counts() {
        let (_, lines) = run(Stage::Village);
        let tail = &lines[lines.len() - 2..];
        assert!(tail[0].starts_with("Ally: "));
        assert!(tail[1].starts_with("Enemy: "));
        assert!(lines[lines.len() - 3].starts_with("Battle over: "));
    }
}
