//! Reachability field used to verify that generated boards stay connected.

use std::collections::VecDeque;

use cat_chase_core::{BoardView, CellCoord};

/// Dense breadth-first step counts seeded from a single origin cell.
///
/// The field mirrors the board dimensions and stores `u16::MAX` for walls and
/// for open cells the origin cannot reach, so callers can tell enclosed pockets
/// apart from traversable floor.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReachabilityField {
    size: u32,
    distances: Vec<u16>,
}

impl ReachabilityField {
    /// Rebuilds the step counts from `origin` using a breadth-first flood.
    pub(crate) fn rebuild_from(&mut self, board: &BoardView<'_>, origin: CellCoord) {
        let cell_count = board.cell_count();
        self.size = board.size();

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let Some(origin_index) = board.index(origin) else {
            return;
        };
        if !board.is_open(origin) {
            return;
        }

        self.distances[origin_index] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = board.index(cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for (_, neighbor) in board.open_neighbors(cell) {
                let Some(neighbor_index) = board.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Step count captured for the provided cell, if it lies within the field.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u16> {
        if cell.column() >= self.size || cell.row() >= self.size {
            return None;
        }

        let width = usize::try_from(self.size).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        self.distances.get(row * width + column).copied()
    }

    /// Reports whether every open cell of `board` was reached.
    #[must_use]
    pub(crate) fn reaches_every_open_cell(&self, board: &BoardView<'_>) -> bool {
        board
            .open_cells()
            .all(|cell| self.distance(cell).is_some_and(|steps| steps != u16::MAX))
    }
}

/// Reports whether all open cells of `board` form a single 4-connected region.
#[must_use]
pub(crate) fn is_connected(board: &BoardView<'_>) -> bool {
    let Some(origin) = board.open_cells().next() else {
        return true;
    };
    let mut field = ReachabilityField::default();
    field.rebuild_from(board, origin);
    field.reaches_every_open_cell(board)
}
