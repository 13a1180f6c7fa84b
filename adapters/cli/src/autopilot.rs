//! Scripted mouse used to drive unattended rounds.

use cat_chase_core::{BoardView, CellCoord, Direction};
use cat_chase_system_pursuit::SearchWorkspace;
use cat_chase_world::{query, World};

/// Mouse that collects cheese, dodges an adjacent cat and hunts it once empowered.
#[derive(Debug, Default)]
pub(crate) struct MouseAutopilot {
    workspace: SearchWorkspace,
}

impl MouseAutopilot {
    /// Direction of the next mouse step, or `None` to stay put.
    pub(crate) fn next_step(&mut self, world: &World) -> Option<Direction> {
        let board = query::board_view(world);
        let mouse = query::mouse_cell(world);
        let cat = query::cat_cell(world);

        let next = if query::is_mouse_empowered(world) {
            self.first_step(&board, mouse, cat)
        } else if mouse.manhattan_distance(cat) <= 1 {
            dodge(&board, mouse, cat)
        } else {
            self.nearest_cheese_step(&board, mouse, query::cheese_cells(world))
        };

        next.and_then(|cell| Direction::between(mouse, cell))
    }

    fn nearest_cheese_step(
        &mut self,
        board: &BoardView<'_>,
        mouse: CellCoord,
        cheese: &[CellCoord],
    ) -> Option<CellCoord> {
        let mut best: Option<(usize, CellCoord)> = None;
        for target in cheese {
            let Some(path) = self.workspace.breadth_first(board, mouse, *target) else {
                continue;
            };
            let Some(next) = path.get(1).copied() else {
                continue;
            };
            if best.map_or(true, |(length, _)| path.len() < length) {
                best = Some((path.len(), next));
            }
        }
        best.map(|(_, next)| next)
    }

    fn first_step(
        &mut self,
        board: &BoardView<'_>,
        from: CellCoord,
        to: CellCoord,
    ) -> Option<CellCoord> {
        self.workspace
            .breadth_first(board, from, to)
            .and_then(|path| path.get(1).copied())
    }
}

fn dodge(board: &BoardView<'_>, mouse: CellCoord, cat: CellCoord) -> Option<CellCoord> {
    let mut best: Option<(u32, CellCoord)> = None;
    for (_, next) in board.open_neighbors(mouse) {
        let distance = next.manhattan_distance(cat);
        if distance > 1 && best.map_or(true, |(farthest, _)| distance > farthest) {
            best = Some((distance, next));
        }
    }
    best.map(|(_, next)| next)
}

#[cfg(test)]
mod tests {
    use cat_chase_core::{Command, Difficulty};
    use cat_chase_world::{self as world, Layout};

    use super::*;

    fn cell(column: u32, row: u32) -> CellCoord {
        CellCoord::new(column, row)
    }

    #[test]
    fn walks_toward_the_nearest_cheese() {
        let mut layout = Layout::open(6, cell(2, 2), cell(5, 5), Difficulty::Easy);
        layout.cheese = vec![cell(2, 0), cell(5, 2)];
        let world = World::from_layout(layout).expect("valid layout");

        let step = MouseAutopilot::default().next_step(&world);

        assert_eq!(step, Some(Direction::North));
    }

    #[test]
    fn steps_away_from_an_adjacent_cat() {
        let mut layout = Layout::open(6, cell(2, 2), cell(2, 3), Difficulty::Easy);
        layout.cheese = vec![cell(2, 5)];
        let world = World::from_layout(layout).expect("valid layout");

        let step = MouseAutopilot::default().next_step(&world);

        assert_eq!(step, Some(Direction::North));
    }

    #[test]
    fn empowered_mouse_hunts_the_cat() {
        let mut layout = Layout::open(6, cell(0, 0), cell(4, 0), Difficulty::Hard);
        layout.cheese = vec![cell(1, 0), cell(2, 0), cell(3, 0)];
        let mut world = World::from_layout(layout).expect("valid layout");
        let mut events = Vec::new();
        for _ in 0..3 {
            world::apply(
                &mut world,
                Command::StepMouse {
                    direction: Direction::East,
                },
                &mut events,
            );
        }
        assert!(query::is_mouse_empowered(&world));

        let step = MouseAutopilot::default().next_step(&world);

        assert_eq!(step, Some(Direction::East));
    }
}
