//! Single-step choosers used when searches give no answer or the cat is stuck.

use cat_chase_core::{BoardView, CellCoord};

use crate::memory::{MovementMemory, StuckDetector};
use crate::random::RandomSource;

/// Penalties applied by [`heuristic_step`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepPenalties {
    pub(crate) revisit: u32,
    pub(crate) dead_end: u32,
}

/// Neighbour of `from` with the lowest penalised distance to `target`.
///
/// Stepping onto `target` itself is never penalised. Ties keep the first
/// neighbour in direction order.
pub(crate) fn heuristic_step(
    board: &BoardView<'_>,
    from: CellCoord,
    target: CellCoord,
    memory: &MovementMemory,
    penalties: StepPenalties,
) -> Option<CellCoord> {
    let mut best: Option<(u32, CellCoord)> = None;
    for (_, next) in board.open_neighbors(from) {
        let mut score = next.manhattan_distance(target);
        if next != target {
            if memory.contains(next) {
                score = score.saturating_add(penalties.revisit);
            }
            if board.blocked_sides(next) >= 3 {
                score = score.saturating_add(penalties.dead_end);
            }
        }

        if best.map_or(true, |(lowest, _)| score < lowest) {
            best = Some((score, next));
        }
    }

    best.map(|(_, cell)| cell)
}

/// Random open neighbour of `from`, preferring cells the cat has not just visited.
pub(crate) fn unstick_step<R: RandomSource>(
    board: &BoardView<'_>,
    from: CellCoord,
    history: &StuckDetector,
    rng: &mut R,
) -> Option<CellCoord> {
    let neighbors: Vec<CellCoord> = board.open_neighbors(from).map(|(_, cell)| cell).collect();
    if neighbors.is_empty() {
        return None;
    }

    let fresh: Vec<CellCoord> = neighbors
        .iter()
        .copied()
        .filter(|cell| !history.recently_visited(*cell))
        .collect();
    let pool = if fresh.is_empty() { neighbors } else { fresh };
    pool.get(rng.pick(pool.len())).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use cat_chase_core::CellState;

    const PENALTIES: StepPenalties = StepPenalties {
        revisit: 2,
        dead_end: 3,
    };

    fn cell(column: u32, row: u32) -> CellCoord {
        CellCoord::new(column, row)
    }

    #[test]
    fn heuristic_prefers_closer_cells() {
        let cells = vec![CellState::Open; 25];
        let board = BoardView::new(&cells, 5);
        let memory = MovementMemory::new(6);

        let step = heuristic_step(&board, cell(2, 2), cell(2, 4), &memory, PENALTIES);

        assert_eq!(step, Some(cell(2, 3)));
    }

    #[test]
    fn heuristic_avoids_remembered_and_dead_end_cells() {
        // (3,2) is a dead end closed on three sides.
        let mut cells = vec![CellState::Open; 25];
        cells[3 + 5] = CellState::Wall;
        cells[3 + 3 * 5] = CellState::Wall;
        cells[4 + 2 * 5] = CellState::Wall;
        let board = BoardView::new(&cells, 5);
        let mut memory = MovementMemory::new(6);
        memory.record(cell(2, 3));

        let step = heuristic_step(&board, cell(2, 2), cell(4, 4), &memory, PENALTIES);

        assert_eq!(step, Some(cell(2, 1)));
    }

    #[test]
    fn heuristic_still_steps_onto_target() {
        // Target (0,1) is a remembered dead end.
        let mut cells = vec![CellState::Open; 9];
        cells[0] = CellState::Wall;
        cells[6] = CellState::Wall;
        let board = BoardView::new(&cells, 3);
        let mut memory = MovementMemory::new(6);
        memory.record(cell(0, 1));

        let step = heuristic_step(&board, cell(1, 1), cell(0, 1), &memory, PENALTIES);

        assert_eq!(step, Some(cell(0, 1)));
    }

    #[test]
    fn unstick_prefers_unvisited_neighbours() {
        let cells = vec![CellState::Open; 9];
        let board = BoardView::new(&cells, 3);
        let mut history = StuckDetector::new(5);
        history.observe(cell(1, 0));
        history.observe(cell(1, 1));
        let mut rng = ScriptedRandom::new(vec![0]);

        let step = unstick_step(&board, cell(1, 1), &history, &mut rng);

        assert_eq!(step, Some(cell(2, 1)));
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn unstick_without_neighbours_holds() {
        let cells = vec![CellState::Open, CellState::Wall, CellState::Wall, CellState::Wall];
        let board = BoardView::new(&cells, 2);
        let history = StuckDetector::new(5);
        let mut rng = ScriptedRandom::default();

        assert_eq!(unstick_step(&board, cell(0, 0), &history, &mut rng), None);
        assert_eq!(rng.draws(), 0);
    }
}
