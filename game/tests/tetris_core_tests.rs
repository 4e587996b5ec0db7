use tetris::tetris_core::{
    ActivePiece, BOARD_HEIGHT, BOARD_WIDTH, Color, ColorMode, Command, CommandOutcome, EMPTY_ROW,
    SPAWN_POS, Shape, ShapeKind, SpawnCheck, TetrisCore, Vec2i,
};

fn core_with(kinds: Vec<ShapeKind>) -> TetrisCore {
    let mut core = TetrisCore::new(0);
    core.set_available_shapes(kinds);
    core.initialize_game();
    core
}

fn o_piece_at(x: i32, y: i32) -> ActivePiece {
    ActivePiece::new(ShapeKind::O, Color::Yellow, Vec2i::new(x, y))
}

fn fill_row_except(core: &mut TetrisCore, y: usize, gaps: &[usize]) {
    for x in 0..BOARD_WIDTH {
        if !gaps.contains(&x) {
            core.set_cell(x, y, Some(Color::Red));
        }
    }
}

fn filled_cells(core: &TetrisCore) -> usize {
    core.board().iter().flatten().filter(|c| c.is_some()).count()
}

#[test]
fn new_engine_has_empty_board_and_no_piece() {
    let core = TetrisCore::new(1);
    assert_eq!(core.board().len(), BOARD_HEIGHT);
    assert!(core.board().iter().all(|row| row.len() == BOARD_WIDTH));
    assert_eq!(filled_cells(&core), 0);
    assert!(core.active_piece().is_none());
    assert_eq!(core.score(), 0);
    assert!(!core.is_game_over());
}

#[test]
fn initialize_spawns_at_origin() {
    let core = core_with(ShapeKind::all());
    let piece = core.active_piece().expect("piece after start");
    assert_eq!(piece.pos, SPAWN_POS);
    assert_eq!(piece.shape, piece.kind.shape());
    assert!(Color::PALETTE.contains(&piece.color));
}

#[test]
fn o_piece_twenty_soft_drops_locks_at_bottom() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_active_piece(o_piece_at(3, 0));

    let outcomes: Vec<_> = (0..20).map(|_| core.soft_drop()).collect();

    // 18 moves take the piece from row 0 to row 18, the 19th drop locks it.
    assert!(outcomes[..18].iter().all(|o| *o == CommandOutcome::Moved));
    assert_eq!(outcomes[18], CommandOutcome::Locked { lines_cleared: 0 });
    for y in [18, 19] {
        for x in [3, 4] {
            assert_eq!(core.board()[y][x], Some(Color::Yellow), "cell ({x},{y})");
        }
    }
    assert_eq!(filled_cells(&core), 4);
    assert_eq!(core.score(), 0);
    assert!(!core.is_game_over());
    // The replacement piece got one drop of its own.
    assert_eq!(core.active_piece().unwrap().pos, Vec2i::new(3, 1));
}

#[test]
fn vertical_i_completes_row_and_scores_100() {
    let mut core = core_with(vec![ShapeKind::O]);
    fill_row_except(&mut core, 19, &[9]);
    let vertical = ShapeKind::I.shape().rotated_cw();
    core.set_active_piece(
        ActivePiece::new(ShapeKind::I, Color::Cyan, Vec2i::new(9, 16)).with_shape(vertical),
    );

    assert_eq!(core.soft_drop(), CommandOutcome::Locked { lines_cleared: 1 });
    assert_eq!(core.score(), 100);
    assert_eq!(core.lines_cleared(), 1);
    // The three I cells above the cleared row shifted down by one.
    for y in 17..20 {
        assert_eq!(core.board()[y][9], Some(Color::Cyan));
        assert!(core.board()[y][..9].iter().all(Option::is_none));
    }
    assert_eq!(core.board()[16], EMPTY_ROW);
}

#[test]
fn reset_mid_game_clears_everything() {
    let mut core = core_with(vec![ShapeKind::O]);
    fill_row_except(&mut core, 19, &[]);
    core.clear_lines();
    core.set_cell(0, 19, Some(Color::Blue));
    assert_eq!(core.score(), 100);

    core.reset();
    assert_eq!(core.score(), 0);
    assert_eq!(filled_cells(&core), 0);
    assert!(!core.is_game_over());
    assert_eq!(core.active_piece().unwrap().pos, SPAWN_POS);
}

#[test]
fn clear_lines_keeps_order_and_pads_top() {
    let mut core = TetrisCore::new(0);
    fill_row_except(&mut core, 19, &[]);
    fill_row_except(&mut core, 18, &[0]);
    fill_row_except(&mut core, 17, &[]);
    core.set_cell(5, 16, Some(Color::Green));

    assert_eq!(core.clear_lines(), 2);
    assert_eq!(core.score(), 200);
    let board = core.board();
    assert!(board[..18].iter().all(|row| *row == EMPTY_ROW));
    // Surviving rows keep their relative order: row 16 above the partial row 18.
    assert_eq!(board[18][5], Some(Color::Green));
    assert_eq!(board[18].iter().filter(|c| c.is_some()).count(), 1);
    assert_eq!(board[19][0], None);
    assert!(board[19][1..].iter().all(Option::is_some));
}

#[test]
fn clear_lines_on_full_board_empties_it() {
    let mut core = TetrisCore::new(0);
    for y in 0..BOARD_HEIGHT {
        fill_row_except(&mut core, y, &[]);
    }
    assert_eq!(core.clear_lines(), BOARD_HEIGHT);
    assert_eq!(core.score(), 100 * BOARD_HEIGHT as u32);
    assert_eq!(filled_cells(&core), 0);
}

#[test]
fn collides_reports_walls_floor_and_stack() {
    let mut core = TetrisCore::new(0);
    let o = ShapeKind::O.shape();
    assert!(!core.collides(&o, 0, 0));
    assert!(!core.collides(&o, 8, 18));
    assert!(core.collides(&o, -1, 0));
    assert!(core.collides(&o, 9, 0));
    assert!(core.collides(&o, 0, 19));

    core.set_cell(4, 10, Some(Color::Red));
    assert!(core.collides(&o, 3, 9));
    assert!(!core.collides(&o, 5, 9));
    // Above the board only the side walls count.
    assert!(!core.collides(&o, 0, -2));
    assert!(core.collides(&o, -1, -2));
}

#[test]
fn collides_is_a_pure_query() {
    let mut core = core_with(vec![ShapeKind::O]);
    let before = core.snapshot();
    let o = ShapeKind::O.shape();
    assert!(core.collides(&o, -5, -5));
    assert!(core.would_overflow_top(&o, -5, -5));
    assert_eq!(core.snapshot(), before);
    assert!(!core.is_game_over());
    core.soft_drop();
    assert!(!core.is_game_over());
}

#[test]
fn would_overflow_top_needs_collision_and_negative_row() {
    let core = TetrisCore::new(0);
    let o = ShapeKind::O.shape();
    assert!(!core.would_overflow_top(&o, 0, -1));
    assert!(core.would_overflow_top(&o, -1, -1));
    assert!(!core.would_overflow_top(&o, -1, 0));
}

#[test]
fn horizontal_moves_stop_at_walls() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_active_piece(o_piece_at(0, 5));
    assert_eq!(core.move_left(), CommandOutcome::Blocked);
    assert_eq!(core.active_piece().unwrap().pos, Vec2i::new(0, 5));

    for _ in 0..8 {
        assert_eq!(core.move_right(), CommandOutcome::Moved);
    }
    assert_eq!(core.move_right(), CommandOutcome::Blocked);
    assert_eq!(core.active_piece().unwrap().pos, Vec2i::new(8, 5));
    assert_eq!(core.move_horizontal(0), CommandOutcome::Blocked);
}

#[test]
fn rotate_keeps_origin_and_changes_shape() {
    let mut core = core_with(vec![ShapeKind::T]);
    core.set_active_piece(ActivePiece::new(ShapeKind::T, Color::Purple, Vec2i::new(4, 5)));
    assert_eq!(core.rotate(), CommandOutcome::Moved);
    let piece = core.active_piece().unwrap();
    assert_eq!(piece.pos, Vec2i::new(4, 5));
    assert_eq!(piece.shape, ShapeKind::T.shape().rotated_cw());
}

#[test]
fn blocked_rotation_is_discarded_without_kick() {
    let mut core = core_with(vec![ShapeKind::I]);
    // Horizontal I resting on the floor cannot stand up.
    core.set_active_piece(ActivePiece::new(ShapeKind::I, Color::Cyan, Vec2i::new(3, 19)));
    let before = *core.active_piece().unwrap();
    assert_eq!(core.rotate(), CommandOutcome::Blocked);
    assert_eq!(*core.active_piece().unwrap(), before);

    // Vertical I against the right wall cannot lie down.
    let vertical = ShapeKind::I.shape().rotated_cw();
    core.set_active_piece(
        ActivePiece::new(ShapeKind::I, Color::Cyan, Vec2i::new(9, 5)).with_shape(vertical),
    );
    assert_eq!(core.rotate(), CommandOutcome::Blocked);
    assert_eq!(core.active_piece().unwrap().pos, Vec2i::new(9, 5));
    assert_eq!(core.active_piece().unwrap().shape, vertical);
}

#[test]
fn lock_at_top_row_ends_the_game() {
    let mut core = core_with(vec![ShapeKind::O]);
    fill_row_except(&mut core, 2, &[0]);
    core.set_active_piece(o_piece_at(3, 0));

    assert_eq!(core.soft_drop(), CommandOutcome::GameOver { lines_cleared: 0 });
    assert!(core.is_game_over());
    assert!(core.active_piece().is_none());
    assert_eq!(core.board()[0][3], Some(Color::Yellow));
}

#[test]
fn overflowing_the_top_ends_the_game() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_active_piece(o_piece_at(0, -1));
    assert_eq!(core.move_left(), CommandOutcome::GameOver { lines_cleared: 0 });
    assert!(core.is_game_over());
}

#[test]
fn commands_after_game_over_do_nothing() {
    let mut core = core_with(vec![ShapeKind::O]);
    fill_row_except(&mut core, 2, &[0]);
    core.set_active_piece(o_piece_at(3, 0));
    core.soft_drop();
    assert!(core.is_game_over());

    let board = *core.board();
    let score = core.score();
    for command in [
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::Rotate,
    ] {
        assert_eq!(core.apply(command), CommandOutcome::Halted);
        assert_eq!(*core.board(), board);
        assert_eq!(core.score(), score);
        assert!(core.is_game_over());
    }
    assert_eq!(core.tick(), CommandOutcome::Halted);

    core.reset();
    assert!(!core.is_game_over());
}

#[test]
fn deferred_spawn_overlap_is_caught_by_next_drop() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_cell(3, 1, Some(Color::Red));
    core.set_active_piece(o_piece_at(6, 18));

    // Locks the current piece; the new O spawns over (3,1) without ending the game.
    assert_eq!(core.soft_drop(), CommandOutcome::Locked { lines_cleared: 0 });
    assert!(!core.is_game_over());
    assert_eq!(core.active_piece().unwrap().pos, SPAWN_POS);

    // It cannot descend, locks on row 0 and the game ends.
    assert_eq!(core.soft_drop(), CommandOutcome::GameOver { lines_cleared: 0 });
}

#[test]
fn immediate_spawn_check_ends_game_on_blocked_spawn() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_spawn_check(SpawnCheck::Immediate);
    core.set_cell(3, 1, Some(Color::Red));
    core.set_active_piece(o_piece_at(6, 18));

    assert_eq!(core.soft_drop(), CommandOutcome::GameOver { lines_cleared: 0 });
    assert!(core.is_game_over());
}

#[test]
fn by_shape_color_mode_uses_kind_colors() {
    let mut core = TetrisCore::new(9);
    core.set_color_mode(ColorMode::ByShape);
    core.initialize_game();
    for _ in 0..50 {
        let piece = *core.active_piece().unwrap();
        assert_eq!(piece.color, piece.kind.color());
        core.reset();
    }
}

#[test]
fn same_seed_same_piece_sequence() {
    let sequence = |seed| {
        let mut core = TetrisCore::new(seed);
        core.initialize_game();
        (0..30)
            .map(|_| {
                let p = *core.active_piece().unwrap();
                core.reset();
                (p.kind, p.color)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(sequence(42), sequence(42));
}

#[test]
fn every_command_bumps_revision() {
    let mut core = core_with(vec![ShapeKind::O]);
    let mut last = core.revision();
    for command in [
        Command::MoveLeft,
        Command::MoveLeft,
        Command::Rotate,
        Command::SoftDrop,
    ] {
        core.apply(command);
        assert!(core.revision() > last);
        last = core.revision();
    }
}

#[test]
fn blocked_command_still_bumps_revision() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_active_piece(o_piece_at(0, 5));
    let before = core.revision();

    assert_eq!(core.apply(Command::MoveLeft), CommandOutcome::Blocked);
    assert_eq!(core.active_piece().unwrap().pos, Vec2i::new(0, 5));
    assert!(core.revision() > before);
}

#[test]
fn halted_command_still_bumps_revision() {
    let mut core = core_with(vec![ShapeKind::O]);
    fill_row_except(&mut core, 2, &[0]);
    core.set_active_piece(o_piece_at(3, 0));
    core.soft_drop();
    assert!(core.is_game_over());

    for command in [
        Command::MoveLeft,
        Command::MoveRight,
        Command::SoftDrop,
        Command::Rotate,
    ] {
        let before = core.revision();
        assert_eq!(core.apply(command), CommandOutcome::Halted);
        assert!(core.revision() > before);
    }
}

#[test]
fn board_with_active_piece_overlays_current_piece() {
    let mut core = core_with(vec![ShapeKind::O]);
    core.set_active_piece(o_piece_at(0, 0));
    let board = core.board_with_active_piece();
    assert_eq!(board[0][0], Some(Color::Yellow));
    assert_eq!(board[1][1], Some(Color::Yellow));
    assert_eq!(filled_cells(&core), 0);
}

#[test]
fn shape_from_rows_round_trips_to_rows() {
    let s = Shape::from_rows(&[&[0, 1], &[1, 1]]);
    assert_eq!(s.to_rows(), vec![vec![false, true], vec![true, true]]);
}
