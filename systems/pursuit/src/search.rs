//! Grid searches sharing a reusable scratch workspace.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use cat_chase_core::{BoardView, CellCoord};

use crate::config::MemoryPenalty;
use crate::memory::MovementMemory;

const UNREACHED: u32 = u32::MAX;

/// Search algorithm used to chase the mouse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Fewest-steps breadth-first search.
    BreadthFirst,
    /// Greedy best-first search ordered by Manhattan distance alone.
    GreedyBestFirst,
    /// A* whose step cost is inflated on remembered mouse cells.
    AStarWithMemory,
}

/// Scratch buffers reused by every search to avoid per-decision allocation.
#[derive(Debug, Default)]
pub struct SearchWorkspace {
    parents: Vec<Option<usize>>,
    costs: Vec<u32>,
    closed: Vec<bool>,
    queue: VecDeque<usize>,
    frontier: BinaryHeap<Reverse<(u32, u64, usize)>>,
    open: BinaryHeap<Reverse<(u32, u32, u64, usize)>>,
}

impl SearchWorkspace {
    /// Creates an empty workspace; buffers grow on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the requested strategy from `start` to `goal`.
    pub fn find_path(
        &mut self,
        strategy: SearchStrategy,
        board: &BoardView<'_>,
        start: CellCoord,
        goal: CellCoord,
        memory: &MovementMemory,
        penalty: &MemoryPenalty,
    ) -> Option<Vec<CellCoord>> {
        match strategy {
            SearchStrategy::BreadthFirst => self.breadth_first(board, start, goal),
            SearchStrategy::GreedyBestFirst => self.greedy_best_first(board, start, goal),
            SearchStrategy::AStarWithMemory => {
                self.a_star_with_memory(board, start, goal, memory, penalty)
            }
        }
    }

    /// Shortest path by step count, inclusive of both endpoints.
    ///
    /// Neighbours are expanded in north, east, south, west order, which fixes the
    /// chosen path among equally short ones.
    pub fn breadth_first(
        &mut self,
        board: &BoardView<'_>,
        start: CellCoord,
        goal: CellCoord,
    ) -> Option<Vec<CellCoord>> {
        let (start_index, goal_index) = self.prepare(board, start, goal)?;
        if start_index == goal_index {
            return Some(vec![start]);
        }

        self.parents[start_index] = Some(start_index);
        self.queue.push_back(start_index);
        while let Some(index) = self.queue.pop_front() {
            if index == goal_index {
                return self.reconstruct(board, start_index, goal_index);
            }
            let cell = board.cell_at(index)?;
            for (_, next) in board.open_neighbors(cell) {
                let Some(next_index) = board.index(next) else {
                    continue;
                };
                if self.parents[next_index].is_none() {
                    self.parents[next_index] = Some(index);
                    self.queue.push_back(next_index);
                }
            }
        }

        None
    }

    /// Path found by always expanding the frontier cell nearest the goal.
    ///
    /// Not guaranteed shortest. Ties are broken by insertion order.
    pub fn greedy_best_first(
        &mut self,
        board: &BoardView<'_>,
        start: CellCoord,
        goal: CellCoord,
    ) -> Option<Vec<CellCoord>> {
        let (start_index, goal_index) = self.prepare(board, start, goal)?;
        if start_index == goal_index {
            return Some(vec![start]);
        }

        let mut sequence = 0_u64;
        self.parents[start_index] = Some(start_index);
        self.frontier
            .push(Reverse((start.manhattan_distance(goal), sequence, start_index)));

        while let Some(Reverse((_, _, index))) = self.frontier.pop() {
            if index == goal_index {
                return self.reconstruct(board, start_index, goal_index);
            }
            let cell = board.cell_at(index)?;
            for (_, next) in board.open_neighbors(cell) {
                let Some(next_index) = board.index(next) else {
                    continue;
                };
                if self.parents[next_index].is_some() {
                    continue;
                }
                self.parents[next_index] = Some(index);
                sequence += 1;
                self.frontier
                    .push(Reverse((next.manhattan_distance(goal), sequence, next_index)));
            }
        }

        None
    }

    /// Cheapest path where entering a remembered mouse cell costs `1 + penalty`.
    ///
    /// Ordered by `f = g + h`, then by lower `h`, then by insertion order.
    pub fn a_star_with_memory(
        &mut self,
        board: &BoardView<'_>,
        start: CellCoord,
        goal: CellCoord,
        memory: &MovementMemory,
        penalty: &MemoryPenalty,
    ) -> Option<Vec<CellCoord>> {
        let (start_index, goal_index) = self.prepare(board, start, goal)?;
        if start_index == goal_index {
            return Some(vec![start]);
        }

        let mut sequence = 0_u64;
        self.costs[start_index] = 0;
        self.parents[start_index] = Some(start_index);
        let heuristic = start.manhattan_distance(goal);
        self.open
            .push(Reverse((heuristic, heuristic, sequence, start_index)));

        while let Some(Reverse((_, _, _, index))) = self.open.pop() {
            if self.closed[index] {
                continue;
            }
            self.closed[index] = true;
            if index == goal_index {
                return self.reconstruct(board, start_index, goal_index);
            }

            let cell = board.cell_at(index)?;
            let reached = self.costs[index];
            for (_, next) in board.open_neighbors(cell) {
                let Some(next_index) = board.index(next) else {
                    continue;
                };
                if self.closed[next_index] {
                    continue;
                }
                let step = 1_u32.saturating_add(memory.penalty(next, penalty));
                let tentative = reached.saturating_add(step);
                if tentative >= self.costs[next_index] {
                    continue;
                }

                self.costs[next_index] = tentative;
                self.parents[next_index] = Some(index);
                let heuristic = next.manhattan_distance(goal);
                sequence += 1;
                self.open.push(Reverse((
                    tentative.saturating_add(heuristic),
                    heuristic,
                    sequence,
                    next_index,
                )));
            }
        }

        None
    }

    /// Fills the step-count field from `origin` across every reachable open cell.
    pub fn flood(&mut self, board: &BoardView<'_>, origin: CellCoord) {
        self.reset(board.cell_count());
        let Some(origin_index) = board.index(origin).filter(|_| board.is_open(origin)) else {
            return;
        };

        self.costs[origin_index] = 0;
        self.queue.push_back(origin_index);
        while let Some(index) = self.queue.pop_front() {
            let Some(cell) = board.cell_at(index) else {
                continue;
            };
            let reached = self.costs[index];
            for (_, next) in board.open_neighbors(cell) {
                if let Some(next_index) = board.index(next) {
                    if self.costs[next_index] == UNREACHED {
                        self.costs[next_index] = reached + 1;
                        self.queue.push_back(next_index);
                    }
                }
            }
        }
    }

    /// Steps needed to reach `cell` according to the most recent [`Self::flood`].
    ///
    /// Any search run after the flood invalidates the field.
    #[must_use]
    pub fn steps_to(&self, board: &BoardView<'_>, cell: CellCoord) -> Option<u32> {
        let index = board.index(cell)?;
        self.costs
            .get(index)
            .copied()
            .filter(|steps| *steps != UNREACHED)
    }

    fn prepare(
        &mut self,
        board: &BoardView<'_>,
        start: CellCoord,
        goal: CellCoord,
    ) -> Option<(usize, usize)> {
        self.reset(board.cell_count());
        if !board.is_open(start) || !board.is_open(goal) {
            return None;
        }
        Some((board.index(start)?, board.index(goal)?))
    }

    fn reset(&mut self, cell_count: usize) {
        self.parents.clear();
        self.parents.resize(cell_count, None);
        self.costs.clear();
        self.costs.resize(cell_count, UNREACHED);
        self.closed.clear();
        self.closed.resize(cell_count, false);
        self.queue.clear();
        self.frontier.clear();
        self.open.clear();
    }

    fn reconstruct(
        &self,
        board: &BoardView<'_>,
        start_index: usize,
        goal_index: usize,
    ) -> Option<Vec<CellCoord>> {
        let mut path = vec![board.cell_at(goal_index)?];
        let mut index = goal_index;
        while index != start_index {
            index = self.parents[index]?;
            path.push(board.cell_at(index)?);
            if path.len() > self.parents.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}
