#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cat Chase.
//!
//! The world owns the board, both entity positions, the cheese pickups and
//! the round lifecycle. Every mutation arrives as a [`Command`] through
//! [`apply`]; everything else reads through the [`query`] module.

use std::time::Duration;

use cat_chase_core::{
    Actor, BoardView, CellCoord, CellState, Command, Difficulty, Direction, Event, RoundOutcome,
    CHEESE_PER_ROUND, DEFAULT_BOARD_SIZE,
};
use thiserror::Error;

mod generation;
mod navigation;

/// Smallest board the level generator accepts.
pub const MIN_GENERATED_BOARD_SIZE: u32 = 8;

/// Smallest board accepted for hand-built layouts.
pub const MIN_LAYOUT_BOARD_SIZE: u32 = 2;

/// Lifecycle of the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round has been started yet.
    Idle,
    /// Both entities may move.
    Playing,
    /// The round finished with the provided outcome.
    Over(RoundOutcome),
}

/// Hand-built round layout used by tests and tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Edge length of the square board.
    pub size: u32,
    /// Cells that hold walls.
    pub walls: Vec<CellCoord>,
    /// Mouse spawn cell.
    pub mouse: CellCoord,
    /// Cat spawn cell.
    pub cat: CellCoord,
    /// Cheese pickups.
    pub cheese: Vec<CellCoord>,
    /// Difficulty reported to systems.
    pub difficulty: Difficulty,
}

impl Layout {
    /// Creates an open layout of `size` with the two spawns and no cheese.
    #[must_use]
    pub fn open(size: u32, mouse: CellCoord, cat: CellCoord, difficulty: Difficulty) -> Self {
        Self {
            size,
            walls: Vec::new(),
            mouse,
            cat,
            cheese: Vec::new(),
            difficulty,
        }
    }
}

/// Reasons a board size or hand-built layout is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The board is smaller than the supported minimum.
    #[error("board size {size} is below the minimum of {minimum}")]
    BoardTooSmall {
        /// Requested edge length.
        size: u32,
        /// Smallest accepted edge length.
        minimum: u32,
    },
    /// A referenced cell lies outside the board.
    #[error("cell {cell:?} lies outside the board")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// An entity or pickup was placed on a wall.
    #[error("cell {cell:?} is a wall")]
    OnWall {
        /// Offending cell.
        cell: CellCoord,
    },
    /// The mouse and the cat share a spawn cell.
    #[error("mouse and cat cannot share spawn cell {cell:?}")]
    SharedSpawn {
        /// Shared cell.
        cell: CellCoord,
    },
    /// Two cheese pickups share a cell, or a pickup sits on the mouse spawn.
    #[error("cheese at {cell:?} overlaps another placement")]
    OverlappingCheese {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Represents the authoritative Cat Chase world state.
#[derive(Debug)]
pub struct World {
    board_size: u32,
    cells: Vec<CellState>,
    mouse: CellCoord,
    cat: CellCoord,
    cheese: Vec<CellCoord>,
    collected: u32,
    empowered: bool,
    difficulty: Difficulty,
    phase: RoundPhase,
    clock: Duration,
    round_started_at: Duration,
}

impl World {
    /// Creates an idle world on the default board.
    #[must_use]
    pub fn new() -> Self {
        Self::idle(DEFAULT_BOARD_SIZE)
    }

    /// Creates an idle world whose generated rounds use a `size`×`size` board.
    pub fn with_board_size(size: u32) -> Result<Self, LayoutError> {
        if size < MIN_GENERATED_BOARD_SIZE {
            return Err(LayoutError::BoardTooSmall {
                size,
                minimum: MIN_GENERATED_BOARD_SIZE,
            });
        }
        Ok(Self::idle(size))
    }

    /// Creates a world already playing the provided hand-built layout.
    pub fn from_layout(layout: Layout) -> Result<Self, LayoutError> {
        if layout.size < MIN_LAYOUT_BOARD_SIZE {
            return Err(LayoutError::BoardTooSmall {
                size: layout.size,
                minimum: MIN_LAYOUT_BOARD_SIZE,
            });
        }

        let mut world = Self::idle(layout.size);
        for wall in &layout.walls {
            let index = world.index(*wall)?;
            world.cells[index] = CellState::Wall;
        }

        for cell in [layout.mouse, layout.cat].iter().chain(&layout.cheese) {
            let index = world.index(*cell)?;
            if world.cells[index] == CellState::Wall {
                return Err(LayoutError::OnWall { cell: *cell });
            }
        }
        if layout.mouse == layout.cat {
            return Err(LayoutError::SharedSpawn { cell: layout.mouse });
        }
        for (position, cell) in layout.cheese.iter().enumerate() {
            if *cell == layout.mouse || layout.cheese[..position].contains(cell) {
                return Err(LayoutError::OverlappingCheese { cell: *cell });
            }
        }

        world.mouse = layout.mouse;
        world.cat = layout.cat;
        world.cheese = layout.cheese;
        world.difficulty = layout.difficulty;
        world.phase = RoundPhase::Playing;
        Ok(world)
    }

    fn idle(size: u32) -> Self {
        let cell_count = usize::try_from(size).unwrap_or(0).pow(2);
        Self {
            board_size: size,
            cells: vec![CellState::Open; cell_count],
            mouse: CellCoord::new(1, 1),
            cat: CellCoord::new(size.saturating_sub(2), size.saturating_sub(2)),
            cheese: Vec::new(),
            collected: 0,
            empowered: false,
            difficulty: Difficulty::Easy,
            phase: RoundPhase::Idle,
            clock: Duration::ZERO,
            round_started_at: Duration::ZERO,
        }
    }

    fn index(&self, cell: CellCoord) -> Result<usize, LayoutError> {
        self.board()
            .index(cell)
            .ok_or(LayoutError::OutOfBounds { cell })
    }

    fn board(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.board_size)
    }

    fn start_round(&mut self, difficulty: Difficulty, seed: u64, out_events: &mut Vec<Event>) {
        let level = generation::generate(self.board_size, difficulty, seed);
        self.cells = level.cells;
        self.mouse = level.mouse;
        self.cat = level.cat;
        self.cheese = level.cheese;
        self.collected = 0;
        self.empowered = false;
        self.difficulty = difficulty;
        self.phase = RoundPhase::Playing;
        self.round_started_at = self.clock;

        log::info!(
            "round started on {} (seed {seed}): mouse {:?}, cat {:?}",
            difficulty.label(),
            self.mouse,
            self.cat
        );
        out_events.push(Event::RoundStarted {
            difficulty,
            mouse: self.mouse,
            cat: self.cat,
            at: self.clock,
        });
    }

    fn step(&mut self, actor: Actor, direction: Direction, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Playing {
            out_events.push(Event::MoveRejected { actor, direction });
            return;
        }

        let from = match actor {
            Actor::Mouse => self.mouse,
            Actor::Cat => self.cat,
        };
        let Some(to) = self.board().neighbor(from, direction) else {
            out_events.push(Event::MoveRejected { actor, direction });
            return;
        };

        match actor {
            Actor::Mouse => {
                self.mouse = to;
                out_events.push(Event::MouseAdvanced { from, to });
            }
            Actor::Cat => {
                self.cat = to;
                out_events.push(Event::CatAdvanced { from, to });
            }
        }

        self.resolve_collisions(out_events);
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        if let Some(position) = self.cheese.iter().position(|cell| *cell == self.mouse) {
            let cell = self.cheese.remove(position);
            self.collected = self.collected.saturating_add(1);
            log::debug!("cheese collected at {cell:?} ({} total)", self.collected);
            out_events.push(Event::CheeseCollected {
                cell,
                collected: self.collected,
            });

            if self.collected >= CHEESE_PER_ROUND && !self.empowered {
                self.empowered = true;
                log::info!("mouse empowered; the cat now flees");
                out_events.push(Event::MouseEmpowered);
            }
        }

        if self.mouse == self.cat {
            let outcome = if self.empowered {
                RoundOutcome::MouseDefeatedCat
            } else {
                RoundOutcome::CatCaughtMouse
            };
            self.phase = RoundPhase::Over(outcome);
            log::info!("round ended: {outcome:?}");
            out_events.push(Event::RoundEnded { outcome });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRound { difficulty, seed } => {
            world.start_round(difficulty, seed, out_events);
        }
        Command::Tick { now } => {
            world.clock = world.clock.max(now);
            out_events.push(Event::TimeAdvanced { now: world.clock });
        }
        Command::StepMouse { direction } => world.step(Actor::Mouse, direction, out_events),
        Command::StepCat { direction } => world.step(Actor::Cat, direction, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{RoundPhase, World};
    use cat_chase_core::{BoardView, CellCoord, ChaseSnapshot, Difficulty};

    /// Exposes a read-only view of the board.
    #[must_use]
    pub fn board_view(world: &World) -> BoardView<'_> {
        world.board()
    }

    /// Cell currently occupied by the mouse.
    #[must_use]
    pub fn mouse_cell(world: &World) -> CellCoord {
        world.mouse
    }

    /// Cell currently occupied by the cat.
    #[must_use]
    pub fn cat_cell(world: &World) -> CellCoord {
        world.cat
    }

    /// Cheese pickups still on the board, in placement order.
    #[must_use]
    pub fn cheese_cells(world: &World) -> &[CellCoord] {
        &world.cheese
    }

    /// Number of cheese pickups collected this round.
    #[must_use]
    pub fn cheese_collected(world: &World) -> u32 {
        world.collected
    }

    /// Whether the role reversal is active.
    #[must_use]
    pub fn is_mouse_empowered(world: &World) -> bool {
        world.empowered
    }

    /// Difficulty of the current round.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Lifecycle phase of the current round.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Latest clock reading observed by the world.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Time elapsed since the current round started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock.saturating_sub(world.round_started_at)
    }

    /// Captures the per-decision snapshot consumed by the pursuit engine.
    #[must_use]
    pub fn chase_snapshot(world: &World) -> ChaseSnapshot<'_> {
        ChaseSnapshot {
            board: world.board(),
            mouse: world.mouse,
            cat: world.cat,
            role_reversed: world.empowered,
            difficulty: world.difficulty,
        }
    }
}
