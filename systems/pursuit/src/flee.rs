//! Evasion planning while the mouse is empowered.

use std::cmp::Reverse;

use cat_chase_core::{BoardView, CellCoord, ChaseSnapshot};

use crate::config::FleeTuning;
use crate::memory::MovementMemory;
use crate::search::SearchWorkspace;

/// Chooses cat steps away from an empowered mouse, caching a distant safe cell.
#[derive(Clone, Debug, Default)]
pub(crate) struct FleePlanner {
    target: Option<CellCoord>,
}

impl FleePlanner {
    /// Drops the cached safe cell.
    pub(crate) fn clear(&mut self) {
        self.target = None;
    }

    /// Currently cached safe cell, if any.
    pub(crate) fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Next cell for the cat, or `None` when it should hold position.
    pub(crate) fn plan(
        &mut self,
        snapshot: &ChaseSnapshot<'_>,
        memory: &MovementMemory,
        workspace: &mut SearchWorkspace,
        tuning: &FleeTuning,
    ) -> Option<CellCoord> {
        let board = snapshot.board;
        let (cat, mouse) = (snapshot.cat, snapshot.mouse);

        if cat.manhattan_distance(mouse) > tuning.safety_radius {
            return hold_separation(&board, cat, mouse, memory, workspace, tuning);
        }

        self.refresh_target(&board, cat, mouse, workspace, tuning);
        let routed = self
            .target
            .and_then(|target| workspace.breadth_first(&board, cat, target))
            .and_then(|path| path.get(1).copied());
        let step =
            routed.or_else(|| retreat_step(&board, cat, mouse, memory, tuning.revisit_penalty));

        keep_distance(&board, cat, mouse, step, memory, tuning.revisit_penalty)
    }

    fn refresh_target(
        &mut self,
        board: &BoardView<'_>,
        cat: CellCoord,
        mouse: CellCoord,
        workspace: &mut SearchWorkspace,
        tuning: &FleeTuning,
    ) {
        if let Some(target) = self.target {
            if target == cat
                || target.manhattan_distance(mouse) < tuning.min_target_distance
                || !board.is_open(target)
            {
                log::debug!("flee target {target:?} is stale");
                self.target = None;
            }
        }

        if self.target.is_none() {
            self.target = select_safe_cell(board, cat, mouse, workspace);
            if let Some(target) = self.target {
                log::debug!("flee target set to {target:?}");
            }
        }
    }
}

/// Rejects a step that brings the cat closer to the mouse when an alternative exists.
///
/// Holding position counts as an alternative, so the result never shrinks the gap.
pub(crate) fn keep_distance(
    board: &BoardView<'_>,
    cat: CellCoord,
    mouse: CellCoord,
    step: Option<CellCoord>,
    memory: &MovementMemory,
    revisit_penalty: u32,
) -> Option<CellCoord> {
    let distance = cat.manhattan_distance(mouse);
    let next = step?;
    if next.manhattan_distance(mouse) >= distance {
        return Some(next);
    }

    let widening = board
        .open_neighbors(cat)
        .map(|(_, cell)| cell)
        .filter(|cell| cell.manhattan_distance(mouse) >= distance);
    best_retreat(widening, mouse, memory, revisit_penalty)
}

/// Step toward the cell nearest `optimal_separation` within the strategic radius.
///
/// A step that would shrink the gap is dropped in favour of holding.
fn hold_separation(
    board: &BoardView<'_>,
    cat: CellCoord,
    mouse: CellCoord,
    memory: &MovementMemory,
    workspace: &mut SearchWorkspace,
    tuning: &FleeTuning,
) -> Option<CellCoord> {
    workspace.flood(board, cat);
    let candidates: Vec<(CellCoord, u32)> = board
        .open_cells()
        .filter(|cell| cell.manhattan_distance(cat) <= tuning.strategic_radius)
        .filter_map(|cell| workspace.steps_to(board, cell).map(|steps| (cell, steps)))
        .collect();
    let any_fresh = candidates.iter().any(|(cell, _)| !memory.contains(*cell));

    let (target, _) = candidates
        .into_iter()
        .filter(|(cell, _)| !any_fresh || !memory.contains(*cell))
        .min_by_key(|(cell, steps)| {
            (
                cell.manhattan_distance(mouse).abs_diff(tuning.optimal_separation),
                *steps,
            )
        })?;
    if target == cat {
        return None;
    }

    let distance = cat.manhattan_distance(mouse);
    workspace
        .breadth_first(board, cat, target)
        .and_then(|path| path.get(1).copied())
        .filter(|next| next.manhattan_distance(mouse) >= distance)
}

fn select_safe_cell(
    board: &BoardView<'_>,
    cat: CellCoord,
    mouse: CellCoord,
    workspace: &mut SearchWorkspace,
) -> Option<CellCoord> {
    let distance = cat.manhattan_distance(mouse);
    workspace.flood(board, cat);

    safe_cells(board.size())
        .into_iter()
        .filter(|cell| board.is_open(*cell) && cell.manhattan_distance(mouse) > distance)
        .filter_map(|cell| workspace.steps_to(board, cell).map(|steps| (cell, steps)))
        .min_by_key(|(cell, steps)| (Reverse(cell.manhattan_distance(mouse)), *steps))
        .map(|(cell, _)| cell)
}

/// Corners followed by edge midpoints.
fn safe_cells(size: u32) -> Vec<CellCoord> {
    if size == 0 {
        return Vec::new();
    }
    let last = size - 1;
    let mid = size / 2;
    vec![
        CellCoord::new(0, 0),
        CellCoord::new(last, 0),
        CellCoord::new(0, last),
        CellCoord::new(last, last),
        CellCoord::new(mid, 0),
        CellCoord::new(0, mid),
        CellCoord::new(last, mid),
        CellCoord::new(mid, last),
    ]
}

fn retreat_step(
    board: &BoardView<'_>,
    cat: CellCoord,
    mouse: CellCoord,
    memory: &MovementMemory,
    revisit_penalty: u32,
) -> Option<CellCoord> {
    best_retreat(
        board.open_neighbors(cat).map(|(_, cell)| cell),
        mouse,
        memory,
        revisit_penalty,
    )
}

fn best_retreat(
    cells: impl Iterator<Item = CellCoord>,
    mouse: CellCoord,
    memory: &MovementMemory,
    revisit_penalty: u32,
) -> Option<CellCoord> {
    let mut best: Option<(i64, CellCoord)> = None;
    for cell in cells {
        let mut score = i64::from(cell.manhattan_distance(mouse));
        if memory.contains(cell) {
            score -= i64::from(revisit_penalty);
        }
        if best.map_or(true, |(highest, _)| score > highest) {
            best = Some((score, cell));
        }
    }
    best.map(|(_, cell)| cell)
}
