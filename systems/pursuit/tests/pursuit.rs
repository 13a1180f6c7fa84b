use std::time::Duration;

use cat_chase_core::{
    Actor, BoardView, CellCoord, CellState, ChaseSnapshot, Command, Difficulty, Direction, Event,
};
use cat_chase_system_pursuit::{
    DecisionSource, MemoryPenalty, MovementMemory, Pursuit, PursuitConfig, ScriptedRandom,
    SearchWorkspace,
};
use cat_chase_world::{self as world, query, RoundPhase, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn cell(column: u32, row: u32) -> CellCoord {
    CellCoord::new(column, row)
}

fn chase(
    board: BoardView<'_>,
    mouse: CellCoord,
    cat: CellCoord,
    difficulty: Difficulty,
) -> ChaseSnapshot<'_> {
    ChaseSnapshot {
        board,
        mouse,
        cat,
        role_reversed: false,
        difficulty,
    }
}

fn scripted_pursuit() -> Pursuit<ScriptedRandom> {
    Pursuit::with_random(PursuitConfig::default(), ScriptedRandom::new(vec![0]))
        .expect("default config is valid")
}

#[test]
fn easy_cat_follows_a_shortest_path_across_an_open_board() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);
    let mut workspace = SearchWorkspace::new();

    let path = workspace
        .breadth_first(&board, cell(8, 8), cell(1, 1))
        .expect("open board is connected");
    assert_eq!(path.len() - 1, 14);

    let mut pursuit = Pursuit::default();
    let decision = pursuit.decide(&chase(board, cell(1, 1), cell(8, 8), Difficulty::Easy));

    assert_eq!(decision.source, DecisionSource::Path);
    assert!(matches!(
        decision.direction,
        Some(Direction::West) | Some(Direction::North)
    ));
}

#[test]
fn fleeing_cat_widens_a_two_cell_gap() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);
    let mouse = cell(4, 4);
    let cat = cell(6, 4);
    let mut pursuit = Pursuit::default();

    let decision = pursuit.decide(&ChaseSnapshot {
        board,
        mouse,
        cat,
        role_reversed: true,
        difficulty: Difficulty::Hard,
    });

    assert_eq!(decision.source, DecisionSource::Flee);
    let next = cat
        .step(decision.direction.expect("open board leaves room to flee"))
        .expect("step stays on the board");
    assert_eq!(next.manhattan_distance(mouse), 3);
    assert_eq!(pursuit.flee_target(), Some(cell(9, 9)));
}

#[test]
fn distant_fleeing_cat_holds_instead_of_closing_in() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);
    let mut pursuit = Pursuit::default();

    let decision = pursuit.decide(&ChaseSnapshot {
        board,
        mouse: cell(2, 2),
        cat: cell(9, 8),
        role_reversed: true,
        difficulty: Difficulty::Medium,
    });

    assert_eq!(decision.direction, None);
    assert_eq!(decision.source, DecisionSource::Hold);
}

#[test]
fn corridor_oscillation_forces_an_unstick_move_by_the_fourth_decision() {
    // Single open row; the mouse sits at its far end.
    let mut cells = vec![CellState::Wall; 25];
    for column in 0..5 {
        cells[10 + column] = CellState::Open;
    }
    let board = BoardView::new(&cells, 5);
    let mouse = cell(4, 2);
    let mut pursuit = scripted_pursuit();

    let mut sources = Vec::new();
    for cat in [cell(1, 2), cell(2, 2), cell(1, 2), cell(2, 2)] {
        sources.push(pursuit.decide(&chase(board, mouse, cat, Difficulty::Medium)).source);
    }

    assert_eq!(
        sources,
        vec![
            DecisionSource::Path,
            DecisionSource::Path,
            DecisionSource::Path,
            DecisionSource::Unstick,
        ]
    );
    assert_eq!(pursuit.random().draws(), 1);
    assert_eq!(pursuit.stuck_detector().oscillations(), 2);
}

#[test]
fn stalled_cat_switches_to_unstick_after_the_limit() {
    let cells = vec![CellState::Open; 36];
    let board = BoardView::new(&cells, 6);
    let snapshot = chase(board, cell(0, 0), cell(5, 5), Difficulty::Easy);
    let mut pursuit = scripted_pursuit();

    for _ in 0..4 {
        assert_eq!(pursuit.decide(&snapshot).source, DecisionSource::Path);
    }
    let decision = pursuit.decide(&snapshot);

    assert_eq!(decision.source, DecisionSource::Unstick);
    assert!(decision.direction.is_some());
    assert_eq!(pursuit.random().draws(), 1);
}

#[test]
fn random_source_is_untouched_outside_the_unstick_fallback() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);
    let mut pursuit = scripted_pursuit();
    let mut cat = cell(9, 9);

    for difficulty in Difficulty::ALL {
        let decision = pursuit.decide(&chase(board, cell(0, 0), cat, difficulty));
        cat = cat
            .step(decision.direction.expect("mouse is reachable"))
            .expect("step stays on the board");
    }

    assert_eq!(pursuit.random().draws(), 0);
}

#[test]
fn memory_weighted_a_star_routes_around_recent_mouse_cells() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);
    let mut memory = MovementMemory::new(6);
    memory.record(cell(0, 2));
    let mut workspace = SearchWorkspace::new();

    let path = workspace
        .a_star_with_memory(&board, cell(0, 0), cell(0, 4), &memory, &MemoryPenalty::default())
        .expect("open board is connected");

    assert!(!path.contains(&cell(0, 2)));
    assert_eq!(path.first(), Some(&cell(0, 0)));
    assert_eq!(path.last(), Some(&cell(0, 4)));
}

#[test]
fn cooldown_caps_cat_moves_per_difficulty() {
    let cells = vec![CellState::Open; 100];
    let board = BoardView::new(&cells, 10);

    for (difficulty, expected) in [
        (Difficulty::Easy, 2),
        (Difficulty::Medium, 2),
        (Difficulty::Hard, 4),
    ] {
        let snapshot = chase(board, cell(0, 0), cell(9, 9), difficulty);
        let mut pursuit = Pursuit::default();
        let mut commands = Vec::new();
        let mut fired_at = Vec::new();

        for tick in 1..=20_u64 {
            let now = Duration::from_millis(tick * 50);
            let before = commands.len();
            pursuit.handle(&[Event::TimeAdvanced { now }], &snapshot, &mut commands);
            if commands.len() > before {
                fired_at.push(now);
            }
        }

        assert_eq!(commands.len(), expected, "{difficulty:?}");
        let delay = pursuit.config().cooldown.delay(difficulty);
        for pair in fired_at.windows(2) {
            assert!(pair[1] - pair[0] >= delay);
        }
    }
}

#[test]
fn simulated_rounds_only_produce_legal_cat_moves() {
    let mouse_script = [
        Direction::East,
        Direction::South,
        Direction::East,
        Direction::North,
        Direction::South,
        Direction::West,
    ];

    for difficulty in Difficulty::ALL {
        for seed in 0..8 {
            let mut world = World::new();
            let mut pursuit =
                Pursuit::new(PursuitConfig::default(), seed).expect("default config is valid");
            let mut events = Vec::new();
            world::apply(&mut world, Command::StartRound { difficulty, seed }, &mut events);

            for tick in 1..=400_u64 {
                world::apply(
                    &mut world,
                    Command::Tick {
                        now: Duration::from_millis(tick * 50),
                    },
                    &mut events,
                );
                if tick % 6 == 0 {
                    let step = usize::try_from(tick / 6).expect("small tick");
                    let direction = mouse_script[step % mouse_script.len()];
                    world::apply(&mut world, Command::StepMouse { direction }, &mut events);
                }

                let mut commands = Vec::new();
                pursuit.handle(&events, &query::chase_snapshot(&world), &mut commands);
                events.clear();

                for command in commands {
                    world::apply(&mut world, command, &mut events);
                }
                let board = query::board_view(&world);
                for event in &events {
                    match event {
                        Event::MoveRejected {
                            actor: Actor::Cat,
                            direction,
                        } => {
                            panic!("cat step {direction:?} rejected on {difficulty:?} seed {seed}")
                        }
                        Event::CatAdvanced { from, to } => {
                            assert_eq!(from.manhattan_distance(*to), 1);
                            assert!(board.is_open(*to));
                        }
                        _ => {}
                    }
                }

                if matches!(query::phase(&world), RoundPhase::Over(_)) {
                    break;
                }
            }
        }
    }
}

#[test]
fn breadth_first_agrees_with_brute_force_on_random_boards() {
    let mut workspace = SearchWorkspace::new();
    let memory = MovementMemory::new(6);

    for seed in 0..12 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cells: Vec<CellState> = (0..36)
            .map(|_| {
                if rng.gen_bool(0.3) {
                    CellState::Wall
                } else {
                    CellState::Open
                }
            })
            .collect();
        let board = BoardView::new(&cells, 6);
        let open: Vec<CellCoord> = board.open_cells().collect();

        for start in &open {
            let expected = brute_force_distances(&board, *start);
            for goal in &open {
                let goal_index = board.index(*goal).expect("goal on board");
                let shortest = workspace.breadth_first(&board, *start, *goal);
                assert_eq!(
                    shortest
                        .as_ref()
                        .map(|path| u32::try_from(path.len() - 1).expect("short path")),
                    expected[goal_index],
                    "seed {seed}: {start:?} -> {goal:?}"
                );

                let greedy = workspace.greedy_best_first(&board, *start, *goal);
                assert_eq!(greedy.is_some(), shortest.is_some());
                if let Some(path) = greedy {
                    assert_walkable(&board, &path, *start, *goal);
                }

                let cheapest = workspace.a_star_with_memory(
                    &board,
                    *start,
                    *goal,
                    &memory,
                    &MemoryPenalty::default(),
                );
                assert_eq!(cheapest.as_ref().map(Vec::len), shortest.as_ref().map(Vec::len));
            }
        }
    }
}

#[test]
fn fleeing_cat_never_closes_the_gap_inside_the_safety_radius() {
    let mut workspace = SearchWorkspace::new();

    for seed in 0..6 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cells = vec![CellState::Open; 100];
        for _ in 0..12 {
            let column = rng.gen_range(1..9_usize);
            let row = rng.gen_range(1..9_usize);
            cells[row * 10 + column] = CellState::Wall;
        }
        let board = BoardView::new(&cells, 10);
        let mut mouse = cell(0, 0);
        let mut cat = cell(3, 0);
        let mut pursuit =
            Pursuit::new(PursuitConfig::default(), seed).expect("default config is valid");

        for _ in 0..40 {
            let distance = cat.manhattan_distance(mouse);
            let decision = pursuit.decide(&ChaseSnapshot {
                board,
                mouse,
                cat,
                role_reversed: true,
                difficulty: Difficulty::Medium,
            });
            if let Some(direction) = decision.direction {
                let next = board.neighbor(cat, direction).expect("cat steps onto open cells");
                if distance <= pursuit.config().flee.safety_radius {
                    assert!(
                        next.manhattan_distance(mouse) >= distance,
                        "seed {seed}: {cat:?} -> {next:?} closed on {mouse:?}"
                    );
                }
                cat = next;
            }

            let Some(path) = workspace.breadth_first(&board, mouse, cat) else {
                break;
            };
            match path.get(1) {
                Some(next) if *next != cat => mouse = *next,
                _ => break,
            }
        }
    }
}

fn brute_force_distances(board: &BoardView<'_>, start: CellCoord) -> Vec<Option<u32>> {
    let mut distances = vec![None; board.cell_count()];
    distances[board.index(start).expect("start on board")] = Some(0);

    loop {
        let mut changed = false;
        for current in board.open_cells() {
            let Some(reached) = distances[board.index(current).expect("cell on board")] else {
                continue;
            };
            for (_, next) in board.open_neighbors(current) {
                let index = board.index(next).expect("cell on board");
                let slot: &mut Option<u32> = &mut distances[index];
                if slot.map_or(true, |known| reached + 1 < known) {
                    *slot = Some(reached + 1);
                    changed = true;
                }
            }
        }
        if !changed {
            return distances;
        }
    }
}

fn assert_walkable(board: &BoardView<'_>, path: &[CellCoord], start: CellCoord, goal: CellCoord) {
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    for pair in path.windows(2) {
        assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        assert!(board.is_open(pair[1]));
    }
}
