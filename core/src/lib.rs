#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cat Chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Drivers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems read immutable snapshots such as
//! [`ChaseSnapshot`] and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default edge length of the square board measured in cells.
pub const DEFAULT_BOARD_SIZE: u32 = 10;

/// Number of cheese pickups placed on the board each round.
///
/// Collecting all of them empowers the mouse for the rest of the round.
pub const CHEESE_PER_ROUND: u32 = 3;

/// Difficulty level selected for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slow cat that chases along breadth-first shortest paths.
    Easy,
    /// Faster cat that chases with greedy best-first search.
    Medium,
    /// Fastest cat that predicts the mouse and avoids stale information.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase label used by adapters and configuration files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Entity that may request a step on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// Player-controlled mouse.
    Mouse,
    /// AI-controlled cat.
    Cat,
}

/// Final result of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The cat reached the mouse before it was empowered.
    CatCaughtMouse,
    /// The empowered mouse reached the cat.
    MouseDefeatedCat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Generates a fresh board, spawns and cheese, and starts a round.
    StartRound {
        /// Difficulty that governs wall density and cat behaviour.
        difficulty: Difficulty,
        /// Seed feeding the level generator.
        seed: u64,
    },
    /// Advances the world clock to the provided monotonic reading.
    Tick {
        /// Time elapsed since the driver started.
        now: Duration,
    },
    /// Requests that the mouse advance a single cell.
    StepMouse {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the cat advance a single cell.
    StepCat {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Announces that a new round began.
    RoundStarted {
        /// Difficulty selected for the round.
        difficulty: Difficulty,
        /// Spawn cell of the mouse.
        mouse: CellCoord,
        /// Spawn cell of the cat.
        cat: CellCoord,
        /// Clock reading at which the round started.
        at: Duration,
    },
    /// Indicates that the world clock advanced.
    TimeAdvanced {
        /// Clock reading after the tick.
        now: Duration,
    },
    /// Confirms that the mouse moved between two cells.
    MouseAdvanced {
        /// Cell the mouse occupied before moving.
        from: CellCoord,
        /// Cell the mouse occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the cat moved between two cells.
    CatAdvanced {
        /// Cell the cat occupied before moving.
        from: CellCoord,
        /// Cell the cat occupies after moving.
        to: CellCoord,
    },
    /// Reports that a step request was refused.
    MoveRejected {
        /// Entity whose step was refused.
        actor: Actor,
        /// Direction of the refused step.
        direction: Direction,
    },
    /// Confirms that the mouse picked up a piece of cheese.
    CheeseCollected {
        /// Cell the cheese occupied.
        cell: CellCoord,
        /// Total number of pieces collected this round.
        collected: u32,
    },
    /// Announces the role reversal; it lasts until the round ends.
    MouseEmpowered,
    /// Announces that the round finished.
    RoundEnded {
        /// Result of the round.
        outcome: RoundOutcome,
    },
}

/// Cardinal movement directions; the board is 4-connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the order neighbours are expanded.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row displacement produced by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction of a single step between two adjacent cells.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by stepping once in `direction`, if it has non-negative coordinates.
    ///
    /// Bounds against a concrete board are checked by [`BoardView`].
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction.delta())
    }

    /// Cell displaced by `(columns, rows)`, if it has non-negative coordinates.
    #[must_use]
    pub fn offset(self, (columns, rows): (i32, i32)) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(columns)?;
        let row = self.row.checked_add_signed(rows)?;
        Some(CellCoord::new(column, row))
    }
}

/// Occupancy state of a single board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Traversable floor.
    #[default]
    Open,
    /// Impassable wall.
    Wall,
}

/// Read-only view into the dense square board.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    cells: &'a [CellState],
    size: u32,
}

impl<'a> BoardView<'a> {
    /// Captures a new board view backed by the provided row-major cell slice.
    ///
    /// Cells missing from a short slice read as walls.
    #[must_use]
    pub fn new(cells: &'a [CellState], size: u32) -> Self {
        Self { cells, size }
    }

    /// Edge length of the board in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells covered by the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let size = usize::try_from(self.size).unwrap_or(0);
        size.saturating_mul(size)
    }

    /// Reports whether the cell lies inside the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// State stored for the cell, or `None` outside the board.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        let index = self.index(cell)?;
        Some(self.cells.get(index).copied().unwrap_or(CellState::Wall))
    }

    /// Reports whether the cell is inside the board and not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.state(cell) == Some(CellState::Open)
    }

    /// Dense row-major index of the cell, if it lies inside the board.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size).ok()?;
        Some(row * width + column)
    }

    /// Cell stored at the dense row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.size).ok()?;
        if width == 0 || index >= self.cell_count() {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Open cell reached by stepping from `cell` in `direction`.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.is_open(*next))
    }

    /// Open 4-connected neighbours of `cell` in [`Direction::ALL`] order.
    #[must_use]
    pub fn open_neighbors(&self, cell: CellCoord) -> NeighborIter {
        let mut neighbors = NeighborIter::default();
        for direction in Direction::ALL {
            if let Some(next) = self.neighbor(cell, direction) {
                neighbors.push(direction, next);
            }
        }
        neighbors
    }

    /// Number of sides of `cell` closed by a wall or the board edge.
    #[must_use]
    pub fn blocked_sides(&self, cell: CellCoord) -> usize {
        Direction::ALL.len() - self.open_neighbors(cell).count()
    }

    /// Iterator over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.cell_count())
            .filter_map(|index| self.cell_at(index))
            .filter(|cell| self.is_open(*cell))
    }
}

/// Fixed-capacity iterator over the open neighbours of a cell.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<(Direction, CellCoord)>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, direction: Direction, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some((direction, cell));
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = (Direction, CellCoord);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Immutable per-decision picture of the board and both entities.
#[derive(Clone, Copy, Debug)]
pub struct ChaseSnapshot<'a> {
    /// Board occupancy for the current round.
    pub board: BoardView<'a>,
    /// Cell occupied by the mouse.
    pub mouse: CellCoord,
    /// Cell occupied by the cat.
    pub cat: CellCoord,
    /// Whether the mouse is empowered and the cat must flee.
    pub role_reversed: bool,
    /// Difficulty selected for the round.
    pub difficulty: Difficulty,
}
