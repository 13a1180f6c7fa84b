//! Heading projection used by the hard cat to cut the mouse off.

use cat_chase_core::{BoardView, CellCoord, Direction};

/// Cell the mouse occupies after one more step along `heading`, or its current cell if blocked.
pub(crate) fn predicted_cell(
    board: &BoardView<'_>,
    mouse: CellCoord,
    heading: Direction,
) -> CellCoord {
    board.neighbor(mouse, heading).unwrap_or(mouse)
}

/// First projected mouse cell the cat can reach no later than one step after the mouse.
///
/// Walks at most `lookahead` steps along `heading`, stopping at the first wall
/// or board edge. `cat_steps` reports the cat's step count to a cell.
pub(crate) fn interception_cell<F>(
    board: &BoardView<'_>,
    mouse: CellCoord,
    heading: Direction,
    lookahead: u32,
    cat_steps: F,
) -> Option<CellCoord>
where
    F: Fn(CellCoord) -> Option<u32>,
{
    let mut projected = mouse;
    for ahead in 1..=lookahead {
        projected = board.neighbor(projected, heading)?;
        if cat_steps(projected).is_some_and(|steps| steps <= ahead.saturating_add(1)) {
            return Some(projected);
        }
    }
    None
}
