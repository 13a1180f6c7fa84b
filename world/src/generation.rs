//! Seeded level generator for walls, spawn cells and cheese.

use std::collections::BTreeSet;

use cat_chase_core::{BoardView, CellCoord, CellState, Difficulty, CHEESE_PER_ROUND};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::navigation::is_connected;

const MAX_LAYOUT_ATTEMPTS: usize = 32;
const MAX_SPAWN_ATTEMPTS: usize = 256;
const MAX_CHEESE_ATTEMPTS: usize = 1_024;
const SPAWN_SEPARATION: u32 = 10;
const MOUSE_SPAWN_EXTENT: u32 = 5;
const CAT_SPAWN_EXTENT: u32 = 6;

/// Complete round layout produced by [`generate`].
#[derive(Clone, Debug)]
pub(crate) struct GeneratedLevel {
    pub(crate) cells: Vec<CellState>,
    pub(crate) mouse: CellCoord,
    pub(crate) cat: CellCoord,
    pub(crate) cheese: Vec<CellCoord>,
}

/// Number of interior walls placed for a difficulty.
///
/// Easier rounds get more cover for the mouse.
#[must_use]
pub(crate) const fn wall_count(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 20,
        Difficulty::Medium => 15,
        Difficulty::Hard => 10,
    }
}

/// Generates a connected board with spawns and cheese for the provided seed.
pub(crate) fn generate(size: u32, difficulty: Difficulty, seed: u64) -> GeneratedLevel {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells = generate_walls(&mut rng, size, wall_count(difficulty));
    let board = BoardView::new(&cells, size);
    let (mouse, cat) = choose_spawns(&mut rng, &board);
    let cheese = place_cheese(&mut rng, &board, mouse, cat);

    GeneratedLevel {
        cells,
        mouse,
        cat,
        cheese,
    }
}

fn generate_walls(rng: &mut ChaCha8Rng, size: u32, requested: usize) -> Vec<CellState> {
    let cell_count = usize::try_from(size).unwrap_or(0).pow(2);
    let interior = usize::try_from(size.saturating_sub(2)).unwrap_or(0).pow(2);
    // leave at least half of the interior open
    let wall_total = requested.min(interior / 2);

    let mut walls = BTreeSet::new();
    let mut cells = vec![CellState::Open; cell_count];

    for _ in 0..MAX_LAYOUT_ATTEMPTS {
        walls.clear();
        while walls.len() < wall_total {
            let _ = walls.insert(random_interior_cell(rng, size));
        }

        paint(&mut cells, size, &walls);
        if is_connected(&BoardView::new(&cells, size)) {
            return cells;
        }
    }

    // Drop walls from the last attempt until the board is connected again.
    while let Some(wall) = walls.pop_last() {
        paint(&mut cells, size, &walls);
        log::debug!("dropped wall at {wall:?} to keep the board connected");
        if is_connected(&BoardView::new(&cells, size)) {
            break;
        }
    }

    cells
}

fn paint(cells: &mut [CellState], size: u32, walls: &BTreeSet<CellCoord>) {
    cells.fill(CellState::Open);
    let width = usize::try_from(size).unwrap_or(0);
    for wall in walls {
        let column = usize::try_from(wall.column()).unwrap_or(usize::MAX);
        let row = usize::try_from(wall.row()).unwrap_or(usize::MAX);
        if let Some(slot) = row
            .checked_mul(width)
            .and_then(|offset| offset.checked_add(column))
            .and_then(|index| cells.get_mut(index))
        {
            *slot = CellState::Wall;
        }
    }
}

fn random_interior_cell(rng: &mut ChaCha8Rng, size: u32) -> CellCoord {
    let upper = size.saturating_sub(2).max(1);
    CellCoord::new(rng.gen_range(1..=upper), rng.gen_range(1..=upper))
}

fn choose_spawns(rng: &mut ChaCha8Rng, board: &BoardView<'_>) -> (CellCoord, CellCoord) {
    let size = board.size();
    let upper = size.saturating_sub(2).max(1);
    let mouse_upper = MOUSE_SPAWN_EXTENT.min(upper);
    let cat_lower = size.saturating_sub(CAT_SPAWN_EXTENT).clamp(1, upper);

    let mut best: Option<(CellCoord, CellCoord)> = None;
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let mouse = CellCoord::new(
            rng.gen_range(1..=mouse_upper),
            rng.gen_range(1..=mouse_upper),
        );
        let cat = CellCoord::new(
            rng.gen_range(cat_lower..=upper),
            rng.gen_range(cat_lower..=upper),
        );
        if mouse == cat || !board.is_open(mouse) || !board.is_open(cat) {
            continue;
        }

        let separation = mouse.manhattan_distance(cat);
        if separation > SPAWN_SEPARATION {
            return (mouse, cat);
        }
        if best.map_or(true, |(m, c)| separation > m.manhattan_distance(c)) {
            best = Some((mouse, cat));
        }
    }

    best.unwrap_or_else(|| fallback_spawns(board))
}

fn fallback_spawns(board: &BoardView<'_>) -> (CellCoord, CellCoord) {
    let origin = board.open_cells().next().unwrap_or(CellCoord::new(0, 0));
    let farthest = board
        .open_cells()
        .max_by_key(|cell| origin.manhattan_distance(*cell))
        .unwrap_or(origin);
    (origin, farthest)
}

fn place_cheese(
    rng: &mut ChaCha8Rng,
    board: &BoardView<'_>,
    mouse: CellCoord,
    cat: CellCoord,
) -> Vec<CellCoord> {
    let wanted = usize::try_from(CHEESE_PER_ROUND).unwrap_or(0);
    let mut cheese = Vec::with_capacity(wanted);
    let free = |cell: CellCoord, placed: &[CellCoord]| {
        board.is_open(cell) && cell != mouse && cell != cat && !placed.contains(&cell)
    };

    for _ in 0..MAX_CHEESE_ATTEMPTS {
        if cheese.len() == wanted {
            return cheese;
        }
        let cell = random_interior_cell(rng, board.size());
        if free(cell, &cheese) {
            cheese.push(cell);
        }
    }

    for cell in board.open_cells() {
        if cheese.len() == wanted {
            break;
        }
        if free(cell, &cheese) {
            cheese.push(cell);
        }
    }

    cheese
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_chase_core::DEFAULT_BOARD_SIZE;

    #[test]
    fn same_seed_reproduces_layout() {
        let first = generate(DEFAULT_BOARD_SIZE, Difficulty::Medium, 7);
        let second = generate(DEFAULT_BOARD_SIZE, Difficulty::Medium, 7);

        assert_eq!(first.cells, second.cells);
        assert_eq!(first.mouse, second.mouse);
        assert_eq!(first.cat, second.cat);
        assert_eq!(first.cheese, second.cheese);
    }

    #[test]
    fn generated_boards_are_connected_with_expected_walls() {
        for difficulty in Difficulty::ALL {
            for seed in 0..32 {
                let level = generate(DEFAULT_BOARD_SIZE, difficulty, seed);
                let board = BoardView::new(&level.cells, DEFAULT_BOARD_SIZE);
                let walls = level
                    .cells
                    .iter()
                    .filter(|state| **state == CellState::Wall)
                    .count();

                assert!(is_connected(&board), "seed {seed} produced a split board");
                assert!(walls <= wall_count(difficulty));
                for edge in 0..DEFAULT_BOARD_SIZE {
                    assert!(board.is_open(CellCoord::new(edge, 0)));
                    assert!(board.is_open(CellCoord::new(0, edge)));
                }
            }
        }
    }

    #[test]
    fn spawns_and_cheese_sit_on_distinct_open_cells() {
        for seed in 0..32 {
            let level = generate(DEFAULT_BOARD_SIZE, Difficulty::Easy, seed);
            let board = BoardView::new(&level.cells, DEFAULT_BOARD_SIZE);

            assert!(board.is_open(level.mouse));
            assert!(board.is_open(level.cat));
            assert_ne!(level.mouse, level.cat);
            assert!(level.mouse.manhattan_distance(level.cat) > SPAWN_SEPARATION);
            assert_eq!(level.cheese.len(), 3);
            for (index, cell) in level.cheese.iter().enumerate() {
                assert!(board.is_open(*cell));
                assert_ne!(*cell, level.mouse);
                assert_ne!(*cell, level.cat);
                assert!(!level.cheese[index + 1..].contains(cell));
            }
        }
    }
}
