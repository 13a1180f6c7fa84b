//! Bounded histories of recent mouse and cat positions.

use std::collections::VecDeque;

use cat_chase_core::{CellCoord, Direction};

use crate::config::MemoryPenalty;

/// Most recent mouse cells, oldest first.
#[derive(Clone, Debug)]
pub struct MovementMemory {
    cells: VecDeque<CellCoord>,
    capacity: usize,
}

impl MovementMemory {
    /// Creates an empty memory holding at most `capacity` cells.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            cells: VecDeque::new(),
            capacity,
        }
    }

    /// Appends a mouse cell, evicting the oldest entry when full.
    pub fn record(&mut self, cell: CellCoord) {
        if self.cells.len() == self.capacity {
            let _ = self.cells.pop_front();
        }
        self.cells.push_back(cell);
    }

    /// Forgets every remembered cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Whether the cell is currently remembered.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of remembered cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is remembered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remembered cells from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Extra path cost for entering `cell`; zero when the cell is not remembered.
    ///
    /// Repeated cells are charged at their newest position.
    #[must_use]
    pub fn penalty(&self, cell: CellCoord, penalty: &MemoryPenalty) -> u32 {
        self.cells
            .iter()
            .rposition(|remembered| *remembered == cell)
            .map_or(0, |position| penalty.cost(position, self.cells.len()))
    }

    /// Dominant direction of the last observed mouse displacement.
    ///
    /// Returns `None` until two entries exist or when the mouse did not move.
    #[must_use]
    pub fn heading(&self) -> Option<Direction> {
        let len = self.cells.len();
        if len < 2 {
            return None;
        }
        let previous = self.cells[len - 2];
        let latest = self.cells[len - 1];

        let dx = i64::from(latest.column()) - i64::from(previous.column());
        let dy = i64::from(latest.row()) - i64::from(previous.row());
        if dx == 0 && dy == 0 {
            return None;
        }

        let direction = if dx.abs() >= dy.abs() {
            if dx > 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy > 0 {
            Direction::South
        } else {
            Direction::North
        };
        Some(direction)
    }
}

/// Which detector forced an unstick move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StuckKind {
    /// The cat decided from the same cell too many times in a row.
    Stationary,
    /// The cat kept bouncing between two cells.
    Oscillating,
}

/// Tracks recent cat cells and counts stalls and A-B-A bounces.
#[derive(Clone, Debug)]
pub struct StuckDetector {
    history: VecDeque<CellCoord>,
    capacity: usize,
    stationary: u32,
    oscillations: u32,
}

impl StuckDetector {
    /// Creates a detector remembering at most `capacity` cat cells.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(3);
        Self {
            history: VecDeque::new(),
            capacity,
            stationary: 0,
            oscillations: 0,
        }
    }

    /// Records the cat cell seen at a decision and updates both counters.
    pub fn observe(&mut self, cell: CellCoord) {
        if self.history.back() == Some(&cell) {
            self.stationary = self.stationary.saturating_add(1);
        } else {
            self.stationary = 0;
        }

        if self.history.len() == self.capacity {
            let _ = self.history.pop_front();
        }
        self.history.push_back(cell);

        let len = self.history.len();
        if len >= 3 {
            let bounced = self.history[len - 1] == self.history[len - 3]
                && self.history[len - 1] != self.history[len - 2];
            self.oscillations = if bounced {
                self.oscillations.saturating_add(1)
            } else {
                0
            };
        }
    }

    /// Forgets history and zeroes both counters.
    pub fn clear(&mut self) {
        self.history.clear();
        self.stationary = 0;
        self.oscillations = 0;
    }

    /// Consecutive observations that repeated the previous cell.
    #[must_use]
    pub fn stationary(&self) -> u32 {
        self.stationary
    }

    /// Consecutive observations that closed an A-B-A cycle.
    #[must_use]
    pub fn oscillations(&self) -> u32 {
        self.oscillations
    }

    /// Whether the cat occupied `cell` within the tracked history.
    #[must_use]
    pub fn recently_visited(&self, cell: CellCoord) -> bool {
        self.history.contains(&cell)
    }

    /// Reports the detector that reached its limit, stalls first.
    #[must_use]
    pub fn tripped(&self, stuck_limit: u32, oscillation_limit: u32) -> Option<StuckKind> {
        if self.stationary >= stuck_limit {
            Some(StuckKind::Stationary)
        } else if self.oscillations >= oscillation_limit {
            Some(StuckKind::Oscillating)
        } else {
            None
        }
    }
}
