#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays unattended cat-and-mouse rounds.

mod autopilot;
mod config;

use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use cat_chase_core::{Command, Difficulty, RoundOutcome};
use cat_chase_system_pursuit::Pursuit;
use cat_chase_world::{self as world, query, RoundPhase, World};
use clap::{Parser, ValueEnum};

use crate::{autopilot::MouseAutopilot, config::SessionConfig};

/// Arguments accepted by the `cat-chase` binary.
#[derive(Debug, Parser)]
#[command(author, version, about = "Cat and mouse chase on a square grid", long_about = None)]
struct Args {
    /// Difficulty applied to every round.
    #[arg(short, long, value_enum, default_value_t = DifficultyArg::Medium)]
    difficulty: DifficultyArg,

    /// Seed of the first round; later rounds add their index.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of rounds to play.
    #[arg(short, long, default_value_t = 1)]
    rounds: u32,

    /// Ticks after which an unfinished round is abandoned.
    #[arg(long, default_value_t = 2_000)]
    max_ticks: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Simulated milliseconds between mouse steps.
    #[arg(long, default_value_t = 300)]
    mouse_interval_ms: u64,

    /// TOML file overriding pursuit tuning.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Difficulty names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Clock settings shared by every round of a session.
#[derive(Clone, Copy, Debug)]
struct Pacing {
    tick: Duration,
    mouse_interval: Duration,
    max_ticks: u64,
}

/// Result line printed after each round.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RoundSummary {
    round: u32,
    seed: u64,
    difficulty: Difficulty,
    outcome: Option<RoundOutcome>,
    ticks: u64,
    cheese: u32,
    elapsed: Duration,
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = match self.outcome {
            Some(RoundOutcome::CatCaughtMouse) => "cat caught the mouse",
            Some(RoundOutcome::MouseDefeatedCat) => "mouse defeated the cat",
            None => "no result",
        };
        write!(
            f,
            "round {} ({}, seed {}): {verdict} after {} ticks, {} cheese, {:.2}s simulated",
            self.round,
            self.difficulty.label(),
            self.seed,
            self.ticks,
            self.cheese,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Entry point for the cat-chase command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be greater than zero");
    ensure!(args.rounds > 0, "--rounds must be greater than zero");

    let session = SessionConfig::load(args.config.as_deref())?;
    let mut pursuit =
        Pursuit::new(session.pursuit, args.seed).context("failed to build the pursuit engine")?;
    let mut autopilot = MouseAutopilot::default();
    let mut world = World::new();
    let pacing = Pacing {
        tick: Duration::from_millis(args.tick_ms),
        mouse_interval: Duration::from_millis(args.mouse_interval_ms),
        max_ticks: args.max_ticks,
    };

    for round in 1..=args.rounds {
        let seed = args.seed.wrapping_add(u64::from(round - 1));
        let summary = play_round(
            &mut world,
            &mut pursuit,
            &mut autopilot,
            args.difficulty.into(),
            seed,
            pacing,
        );
        println!(
            "{}",
            RoundSummary {
                round,
                ..summary
            }
        );
    }

    Ok(())
}

fn play_round(
    world: &mut World,
    pursuit: &mut Pursuit,
    autopilot: &mut MouseAutopilot,
    difficulty: Difficulty,
    seed: u64,
    pacing: Pacing,
) -> RoundSummary {
    let mut events = Vec::new();
    world::apply(world, Command::StartRound { difficulty, seed }, &mut events);

    let mut now = query::clock(world);
    let mut next_mouse_step = now + pacing.mouse_interval;
    let mut ticks = 0;
    while ticks < pacing.max_ticks && query::phase(world) == RoundPhase::Playing {
        ticks += 1;
        now += pacing.tick;
        world::apply(world, Command::Tick { now }, &mut events);

        if now >= next_mouse_step {
            next_mouse_step = now + pacing.mouse_interval;
            if let Some(direction) = autopilot.next_step(world) {
                world::apply(world, Command::StepMouse { direction }, &mut events);
            }
        }

        let mut commands = Vec::new();
        pursuit.handle(&events, &query::chase_snapshot(world), &mut commands);
        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
    }

    let outcome = match query::phase(world) {
        RoundPhase::Over(outcome) => Some(outcome),
        RoundPhase::Idle | RoundPhase::Playing => None,
    };
    if outcome.is_none() {
        log::warn!("round with seed {seed} abandoned after {ticks} ticks");
    }

    RoundSummary {
        round: 0,
        seed,
        difficulty,
        outcome,
        ticks,
        cheese: query::cheese_collected(world),
        elapsed: query::elapsed(world),
    }
}
