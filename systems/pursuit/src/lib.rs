#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cat pursuit engine that turns chase snapshots into cat step commands.
//!
//! Each permitted decision records the mouse position, checks the cat for
//! stalls and oscillation, and then hands control to the stance matching the
//! round: breadth-first chase on easy, greedy chase on medium, predictive A*
//! on hard and evasion once the mouse is empowered.

mod config;
mod cooldown;
mod flee;
mod memory;
mod predict;
mod random;
mod search;
mod steering;

use std::time::Duration;

use cat_chase_core::{CellCoord, ChaseSnapshot, Command, Difficulty, Direction, Event};

pub use config::{
    ConfigError, CooldownTuning, FleeTuning, MemoryPenalty, PursuitConfig, MAX_HISTORY_CAPACITY,
};
pub use cooldown::MoveCooldown;
pub use memory::{MovementMemory, StuckDetector, StuckKind};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use search::{SearchStrategy, SearchWorkspace};

use crate::flee::FleePlanner;
use crate::steering::StepPenalties;

/// Behaviour the cat adopts for a single decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    /// Breadth-first chase.
    Easy,
    /// Greedy best-first chase.
    Medium,
    /// Predictive chase with memory-weighted A*.
    Hard,
    /// Evasion from an empowered mouse.
    Fleeing,
}

impl Stance {
    /// Stance for the round difficulty; role reversal overrides difficulty.
    #[must_use]
    pub const fn select(difficulty: Difficulty, role_reversed: bool) -> Self {
        if role_reversed {
            return Self::Fleeing;
        }
        match difficulty {
            Difficulty::Easy => Self::Easy,
            Difficulty::Medium => Self::Medium,
            Difficulty::Hard => Self::Hard,
        }
    }
}

/// Which part of the engine produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionSource {
    /// First step of a search path.
    Path,
    /// Penalised single-step heuristic used when no path exists.
    Heuristic,
    /// Random step forced by the stuck detector.
    Unstick,
    /// Evasion step while the mouse is empowered.
    Flee,
    /// No move this decision.
    Hold,
}

/// Outcome of a single pursuit decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Direction the cat should step, or `None` to stay put.
    pub direction: Option<Direction>,
    /// Part of the engine that chose the move.
    pub source: DecisionSource,
}

impl Decision {
    fn toward(from: CellCoord, next: Option<CellCoord>, source: DecisionSource) -> Self {
        match next.and_then(|cell| Direction::between(from, cell)) {
            Some(direction) => Self {
                direction: Some(direction),
                source,
            },
            None => Self::hold(),
        }
    }

    const fn hold() -> Self {
        Self {
            direction: None,
            source: DecisionSource::Hold,
        }
    }
}

/// Stateful system that reacts to world events and emits cat movement commands.
#[derive(Debug)]
pub struct Pursuit<R = SeededRandom> {
    config: PursuitConfig,
    cooldown: MoveCooldown,
    memory: MovementMemory,
    stuck: StuckDetector,
    flee: FleePlanner,
    workspace: SearchWorkspace,
    rng: R,
    paused: bool,
}

impl Pursuit<SeededRandom> {
    /// Creates a pursuit engine whose unstick moves derive from `seed`.
    pub fn new(config: PursuitConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_random(config, SeededRandom::from_seed(seed))
    }
}

impl Default for Pursuit<SeededRandom> {
    fn default() -> Self {
        Self::build(PursuitConfig::default(), SeededRandom::from_seed(0))
    }
}

impl<R: RandomSource> Pursuit<R> {
    /// Creates a pursuit engine drawing unstick moves from the provided source.
    pub fn with_random(config: PursuitConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: PursuitConfig, rng: R) -> Self {
        Self {
            cooldown: MoveCooldown::new(config.cooldown),
            memory: MovementMemory::new(config.memory_capacity),
            stuck: StuckDetector::new(config.cat_history_capacity),
            flee: FleePlanner::default(),
            workspace: SearchWorkspace::new(),
            rng,
            paused: false,
            config,
        }
    }

    /// Consumes world events and the current snapshot to emit at most one cat step.
    ///
    /// A decision is only taken when a `TimeAdvanced` event passes the
    /// difficulty cooldown. Round starts reset all per-round state and round
    /// ends pause the engine until the next start.
    pub fn handle(
        &mut self,
        events: &[Event],
        snapshot: &ChaseSnapshot<'_>,
        out: &mut Vec<Command>,
    ) {
        let mut now = None;
        for event in events {
            match event {
                Event::RoundStarted { at, .. } => self.reset(*at),
                Event::RoundEnded { .. } => self.paused = true,
                Event::TimeAdvanced { now: at } => now = Some(*at),
                _ => {}
            }
        }

        if self.paused {
            return;
        }
        let Some(now) = now else {
            return;
        };
        if !self.cooldown.should_move(now, snapshot.difficulty) {
            return;
        }

        if let Some(direction) = self.decide(snapshot).direction {
            out.push(Command::StepCat { direction });
        }
    }

    /// Clears per-round memory and restarts the cooldown at `at`.
    pub fn reset(&mut self, at: Duration) {
        self.cooldown.reset(at);
        self.memory.clear();
        self.stuck.clear();
        self.flee.clear();
        self.paused = false;
    }

    /// Chooses the next cat move for the snapshot, bypassing the cooldown.
    ///
    /// Updates the mouse memory and the stuck detector, so every call counts
    /// as one decision.
    pub fn decide(&mut self, snapshot: &ChaseSnapshot<'_>) -> Decision {
        let stance = Stance::select(snapshot.difficulty, snapshot.role_reversed);
        self.memory.record(snapshot.mouse);
        self.stuck.observe(snapshot.cat);
        if stance != Stance::Fleeing {
            self.flee.clear();
        }

        let decision = if snapshot.cat == snapshot.mouse {
            Decision::hold()
        } else if let Some(kind) = self
            .stuck
            .tripped(self.config.stuck_limit, self.config.oscillation_limit)
        {
            log::debug!("cat at {:?} is {kind:?}; taking a random step", snapshot.cat);
            self.unstick(snapshot, stance)
        } else {
            match stance {
                Stance::Easy => self.chase(snapshot, SearchStrategy::BreadthFirst),
                Stance::Medium => self.chase(snapshot, SearchStrategy::GreedyBestFirst),
                Stance::Hard => self.intercept(snapshot),
                Stance::Fleeing => self.evade(snapshot),
            }
        };

        log::debug!(
            "{stance:?} cat at {:?} chose {:?} via {:?}",
            snapshot.cat,
            decision.direction,
            decision.source
        );
        decision
    }

    /// Tuning currently in effect.
    #[must_use]
    pub fn config(&self) -> &PursuitConfig {
        &self.config
    }

    /// Recently observed mouse cells.
    #[must_use]
    pub fn memory(&self) -> &MovementMemory {
        &self.memory
    }

    /// Stall and oscillation counters for the cat.
    #[must_use]
    pub fn stuck_detector(&self) -> &StuckDetector {
        &self.stuck
    }

    /// Safe cell the fleeing cat is currently heading for.
    #[must_use]
    pub fn flee_target(&self) -> Option<CellCoord> {
        self.flee.target()
    }

    /// Random source used for unstick moves.
    #[must_use]
    pub fn random(&self) -> &R {
        &self.rng
    }

    fn chase(&mut self, snapshot: &ChaseSnapshot<'_>, strategy: SearchStrategy) -> Decision {
        let path = self.workspace.find_path(
            strategy,
            &snapshot.board,
            snapshot.cat,
            snapshot.mouse,
            &self.memory,
            &self.config.memory_penalty,
        );
        match path {
            Some(path) => {
                Decision::toward(snapshot.cat, path.get(1).copied(), DecisionSource::Path)
            }
            None => self.heuristic(snapshot),
        }
    }

    fn intercept(&mut self, snapshot: &ChaseSnapshot<'_>) -> Decision {
        let board = snapshot.board;
        let (cat, mouse) = (snapshot.cat, snapshot.mouse);
        let heading = self.memory.heading();

        let mut targets = Vec::with_capacity(3);
        if let Some(heading) = heading {
            targets.push(predict::predicted_cell(&board, mouse, heading));
        }
        if !targets.contains(&mouse) {
            targets.push(mouse);
        }
        if let Some(heading) = heading {
            self.workspace.flood(&board, cat);
            let workspace = &self.workspace;
            let intercept = predict::interception_cell(
                &board,
                mouse,
                heading,
                self.config.interception_lookahead,
                |cell| workspace.steps_to(&board, cell),
            );
            if let Some(cell) = intercept.filter(|cell| !targets.contains(cell)) {
                targets.push(cell);
            }
        }

        let mut fallback = None;
        for target in targets {
            let Some(path) = self.workspace.a_star_with_memory(
                &board,
                cat,
                target,
                &self.memory,
                &self.config.memory_penalty,
            ) else {
                continue;
            };
            let Some(&next) = path.get(1) else {
                continue;
            };
            // Landing on the mouse is always acceptable.
            if next == mouse || !self.memory.contains(next) {
                return Decision::toward(cat, Some(next), DecisionSource::Path);
            }
            if fallback.is_none() {
                fallback = Some(next);
            }
        }

        match fallback {
            Some(next) => Decision::toward(cat, Some(next), DecisionSource::Path),
            None => self.heuristic(snapshot),
        }
    }

    fn evade(&mut self, snapshot: &ChaseSnapshot<'_>) -> Decision {
        let next = self
            .flee
            .plan(snapshot, &self.memory, &mut self.workspace, &self.config.flee);
        Decision::toward(snapshot.cat, next, DecisionSource::Flee)
    }

    fn unstick(&mut self, snapshot: &ChaseSnapshot<'_>, stance: Stance) -> Decision {
        let board = snapshot.board;
        let (cat, mouse) = (snapshot.cat, snapshot.mouse);
        let mut next = steering::unstick_step(&board, cat, &self.stuck, &mut self.rng);
        if stance == Stance::Fleeing {
            next = flee::keep_distance(
                &board,
                cat,
                mouse,
                next,
                &self.memory,
                self.config.flee.revisit_penalty,
            );
        }
        Decision::toward(cat, next, DecisionSource::Unstick)
    }

    fn heuristic(&self, snapshot: &ChaseSnapshot<'_>) -> Decision {
        let penalties = StepPenalties {
            revisit: self.config.revisit_penalty,
            dead_end: self.config.dead_end_penalty,
        };
        let next = steering::heuristic_step(
            &snapshot.board,
            snapshot.cat,
            snapshot.mouse,
            &self.memory,
            penalties,
        );
        Decision::toward(snapshot.cat, next, DecisionSource::Heuristic)
    }
}
