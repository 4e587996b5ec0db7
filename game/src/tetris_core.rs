use std::ops::Add;

use serde::{Deserialize, Serialize};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;
pub const SPAWN_POS: Vec2i = Vec2i { x: 3, y: 0 };
pub const POINTS_PER_LINE: u32 = 100;

const SHAPE_MAX: usize = 4;

/// A board cell: empty, or the color of the piece that locked there.
pub type Cell = Option<Color>;
/// Row-major grid, `board[0]` is the top row.
pub type Board = [[Cell; BOARD_WIDTH]; BOARD_HEIGHT];

pub const EMPTY_ROW: [Cell; BOARD_WIDTH] = [None; BOARD_WIDTH];
pub const EMPTY_BOARD: Board = [EMPTY_ROW; BOARD_HEIGHT];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    T,
    I,
    O,
    S,
    Z,
    L,
    J,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::T,
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::L,
        ShapeKind::J,
    ];

    pub fn all() -> Vec<ShapeKind> {
        Self::ALL.to_vec()
    }

    /// Spawn orientation of this kind.
    pub fn shape(self) -> Shape {
        match self {
            ShapeKind::T => Shape::from_rows(&[&[1, 1, 1], &[0, 1, 0]]),
            ShapeKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            ShapeKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            ShapeKind::S => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            ShapeKind::Z => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            ShapeKind::L => Shape::from_rows(&[&[1, 1, 1], &[1, 0, 0]]),
            ShapeKind::J => Shape::from_rows(&[&[1, 1, 1], &[0, 0, 1]]),
        }
    }

    /// Color used when pieces are colored by kind.
    pub fn color(self) -> Color {
        match self {
            ShapeKind::I => Color::Cyan,
            ShapeKind::O => Color::Yellow,
            ShapeKind::T => Color::Purple,
            ShapeKind::S => Color::Green,
            ShapeKind::Z => Color::Red,
            ShapeKind::J => Color::Blue,
            ShapeKind::L => Color::Orange,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl Color {
    pub const PALETTE: [Color; 7] = [
        Color::Cyan,
        Color::Yellow,
        Color::Purple,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::Orange,
    ];

    pub const fn rgba(self) -> [u8; 4] {
        match self {
            Color::Cyan => [0, 229, 255, 255],
            Color::Yellow => [255, 215, 0, 255],
            Color::Purple => [160, 32, 240, 255],
            Color::Green => [0, 200, 0, 255],
            Color::Red => [220, 20, 60, 255],
            Color::Blue => [30, 144, 255, 255],
            Color::Orange => [255, 140, 0, 255],
        }
    }
}

/// How a freshly spawned piece picks its color.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Uniform draw from the palette, independent of the shape.
    #[default]
    Random,
    ByShape,
}

/// Whether spawning checks the new piece against the board right away.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpawnCheck {
    /// A blocked spawn is only noticed by the next drop, move or rotation.
    #[default]
    Deferred,
    /// A spawn into occupied cells ends the game immediately.
    Immediate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Self::Output {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Occupancy matrix of a piece in one orientation, at most 4x4.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [bool; SHAPE_MAX * SHAPE_MAX],
}

impl Shape {
    /// Builds a shape from rows of 0/1 flags. Panics on an empty or oversized matrix, which is a
    /// programming error rather than a runtime condition.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        assert!(!rows.is_empty() && rows.len() <= SHAPE_MAX, "bad shape height");
        let cols = rows[0].len();
        assert!(cols > 0 && cols <= SHAPE_MAX, "bad shape width");

        let mut cells = [false; SHAPE_MAX * SHAPE_MAX];
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged shape rows");
            for (c, &v) in row.iter().enumerate() {
                cells[r * SHAPE_MAX + c] = v != 0;
            }
        }

        Self {
            rows: rows.len() as u8,
            cols: cols as u8,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.cells[row * SHAPE_MAX + col]
    }

    /// `(row, col)` of every occupied cell, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows())
            .flat_map(move |r| (0..self.cols()).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.is_filled(r, c))
    }

    /// Clockwise quarter turn of the bounding box: reverse the row order, then transpose.
    pub fn rotated_cw(&self) -> Shape {
        let rows = self.rows();
        let mut cells = [false; SHAPE_MAX * SHAPE_MAX];
        for r in 0..self.cols() {
            for c in 0..rows {
                cells[r * SHAPE_MAX + c] = self.is_filled(rows - 1 - c, r);
            }
        }
        Shape {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows())
            .map(|r| (0..self.cols()).map(|c| self.is_filled(r, c)).collect())
            .collect()
    }
}

/// The falling piece. `pos` is the top-left of the shape's bounding box in board coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: ShapeKind,
    pub shape: Shape,
    pub color: Color,
    pub pos: Vec2i,
}

impl ActivePiece {
    pub fn new(kind: ShapeKind, color: Color, pos: Vec2i) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            color,
            pos,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Board coordinates `(x, y)` of every occupied cell; rows may be negative.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied()
            .map(move |(r, c)| (self.pos.x + c as i32, self.pos.y + r as i32))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// What a single command did to the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved,
    Blocked,
    Locked { lines_cleared: usize },
    GameOver { lines_cleared: usize },
    /// The game was already over; nothing changed.
    Halted,
}

impl CommandOutcome {
    pub fn lines_cleared(self) -> usize {
        match self {
            CommandOutcome::Locked { lines_cleared }
            | CommandOutcome::GameOver { lines_cleared } => lines_cleared,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TetrisSnapshot {
    pub board: Board,
    pub active: Option<ActivePiece>,
    pub score: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetrisCore {
    board: Board,
    active: Option<ActivePiece>,
    available_shapes: Vec<ShapeKind>,
    #[serde(default)]
    color_mode: ColorMode,
    #[serde(default)]
    spawn_check: SpawnCheck,
    rng: Rng,
    score: u32,
    lines_cleared: u32,
    game_over: bool,
    #[serde(default)]
    revision: u64,
}

impl TetrisCore {
    /// An engine with an empty board and no active piece. Call `reset` (or `initialize_game`)
    /// to start a round.
    pub fn new(seed: u64) -> Self {
        Self {
            board: EMPTY_BOARD,
            active: None,
            available_shapes: ShapeKind::all(),
            color_mode: ColorMode::default(),
            spawn_check: SpawnCheck::default(),
            rng: Rng::new(seed),
            score: 0,
            lines_cleared: 0,
            game_over: false,
            revision: 0,
        }
    }

    pub fn set_available_shapes(&mut self, shapes: Vec<ShapeKind>) {
        if shapes.is_empty() {
            self.available_shapes = ShapeKind::all();
        } else {
            self.available_shapes = shapes;
        }
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub fn set_spawn_check(&mut self, check: SpawnCheck) {
        self.spawn_check = check;
    }

    /// Empty board, zero score, game-over cleared, fresh piece at the spawn origin.
    pub fn reset(&mut self) {
        self.board = EMPTY_BOARD;
        self.active = None;
        self.score = 0;
        self.lines_cleared = 0;
        self.game_over = false;
        self.request_render();
        self.spawn_new_piece();
        tracing::info!("game reset");
    }

    pub fn initialize_game(&mut self) {
        self.reset();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Bumped on every command; a renderer redraws whenever this changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> TetrisSnapshot {
        TetrisSnapshot {
            board: self.board,
            active: self.active,
            score: self.score,
            lines_cleared: self.lines_cleared,
            game_over: self.game_over,
            revision: self.revision,
        }
    }

    /// The board with the active piece painted in (cells above the board are dropped).
    pub fn board_with_active_piece(&self) -> Board {
        let mut board = self.board;
        if let Some(piece) = &self.active {
            for (x, y) in piece.cells() {
                if let Some(cell) = cell_mut(&mut board, x, y) {
                    *cell = Some(piece.color);
                }
            }
        }
        board
    }

    pub fn set_active_piece(&mut self, piece: ActivePiece) {
        self.active = Some(piece);
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: Cell) {
        if y < BOARD_HEIGHT && x < BOARD_WIDTH {
            self.board[y][x] = value;
        }
    }

    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::MoveLeft => self.move_horizontal(-1),
            Command::MoveRight => self.move_horizontal(1),
            Command::SoftDrop => self.soft_drop(),
            Command::Rotate => self.rotate(),
        }
    }

    pub fn move_left(&mut self) -> CommandOutcome {
        self.move_horizontal(-1)
    }

    pub fn move_right(&mut self) -> CommandOutcome {
        self.move_horizontal(1)
    }

    /// Shifts the piece one column towards the sign of `direction`.
    pub fn move_horizontal(&mut self, direction: i32) -> CommandOutcome {
        self.request_render();
        if self.game_over {
            return CommandOutcome::Halted;
        }
        let Some(piece) = self.active else {
            return CommandOutcome::Blocked;
        };
        let dx = direction.signum();
        if dx == 0 {
            return CommandOutcome::Blocked;
        }

        let target = piece.pos + Vec2i::new(dx, 0);
        if self.placement_rejected(&piece.shape, target) {
            return self.rejected_outcome();
        }
        self.active = Some(ActivePiece { pos: target, ..piece });
        CommandOutcome::Moved
    }

    /// One row down; when the piece cannot descend it locks, full rows clear, and the next piece
    /// spawns unless the lock ended the game. The gravity tick is the same operation.
    pub fn soft_drop(&mut self) -> CommandOutcome {
        self.request_render();
        if self.game_over {
            return CommandOutcome::Halted;
        }
        let Some(piece) = self.active else {
            return CommandOutcome::Blocked;
        };

        let target = piece.pos + Vec2i::new(0, 1);
        if !self.placement_rejected(&piece.shape, target) {
            self.active = Some(ActivePiece { pos: target, ..piece });
            return CommandOutcome::Moved;
        }

        self.lock_active_piece();
        let lines_cleared = self.clear_lines();
        if !self.game_over {
            self.spawn_new_piece();
        }

        if self.game_over {
            tracing::info!(score = self.score, lines = self.lines_cleared, "game over");
            CommandOutcome::GameOver { lines_cleared }
        } else {
            CommandOutcome::Locked { lines_cleared }
        }
    }

    pub fn tick(&mut self) -> CommandOutcome {
        self.soft_drop()
    }

    /// Clockwise rotation in place. No kicks: a blocked rotation is simply discarded.
    pub fn rotate(&mut self) -> CommandOutcome {
        self.request_render();
        if self.game_over {
            return CommandOutcome::Halted;
        }
        let Some(piece) = self.active else {
            return CommandOutcome::Blocked;
        };

        let rotated = piece.shape.rotated_cw();
        if self.placement_rejected(&rotated, piece.pos) {
            return self.rejected_outcome();
        }
        self.active = Some(piece.with_shape(rotated));
        CommandOutcome::Moved
    }

    /// True if `shape` at `(x, y)` leaves the side walls, passes the floor, or overlaps a filled
    /// cell. Cells above the board only collide through the side walls.
    pub fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        shape.occupied().any(|(r, c)| {
            let bx = x + c as i32;
            let by = y + r as i32;
            if bx < 0 || bx >= BOARD_WIDTH as i32 || by >= BOARD_HEIGHT as i32 {
                return true;
            }
            by >= 0 && self.board[by as usize][bx as usize].is_some()
        })
    }

    /// True if the placement is rejected while part of the shape still sits above the board,
    /// i.e. the piece cannot be placed without occupying rows above the visible grid.
    pub fn would_overflow_top(&self, shape: &Shape, x: i32, y: i32) -> bool {
        self.collides(shape, x, y) && shape.occupied().any(|(r, _)| y + (r as i32) < 0)
    }

    /// Writes the active piece into the board. Locking with the origin on row 0 ends the game.
    pub fn lock_active_piece(&mut self) -> bool {
        let Some(piece) = self.active.take() else {
            return false;
        };
        for (x, y) in piece.cells() {
            if let Some(cell) = cell_mut(&mut self.board, x, y) {
                *cell = Some(piece.color);
            }
        }
        tracing::debug!(kind = ?piece.kind, x = piece.pos.x, y = piece.pos.y, "piece locked");

        if piece.pos.y == 0 {
            self.game_over = true;
        }
        true
    }

    /// Removes every full row, pads the top with empty rows and scores 100 per row.
    pub fn clear_lines(&mut self) -> usize {
        let kept: Vec<[Cell; BOARD_WIDTH]> = self
            .board
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .copied()
            .collect();
        let cleared = BOARD_HEIGHT - kept.len();
        if cleared == 0 {
            return 0;
        }

        let mut next = EMPTY_BOARD;
        next[cleared..].copy_from_slice(&kept);
        self.board = next;

        self.score = self
            .score
            .saturating_add(POINTS_PER_LINE.saturating_mul(cleared as u32));
        self.lines_cleared = self.lines_cleared.saturating_add(cleared as u32);
        tracing::debug!(cleared, score = self.score, "lines cleared");
        cleared
    }

    /// Places a random piece at the spawn origin. Returns `false` only when an immediate spawn
    /// check finds it blocked (which ends the game).
    pub fn spawn_new_piece(&mut self) -> bool {
        let kind = self.draw_shape();
        let color = match self.color_mode {
            ColorMode::Random => Color::PALETTE[self.rng.below(Color::PALETTE.len())],
            ColorMode::ByShape => kind.color(),
        };
        let piece = ActivePiece::new(kind, color, SPAWN_POS);
        self.active = Some(piece);
        tracing::debug!(kind = ?kind, color = ?color, "spawned piece");

        if self.spawn_check == SpawnCheck::Immediate
            && self.collides(&piece.shape, piece.pos.x, piece.pos.y)
        {
            self.game_over = true;
            tracing::info!(score = self.score, "spawn blocked");
            return false;
        }
        true
    }

    pub fn draw_shape(&mut self) -> ShapeKind {
        if self.available_shapes.is_empty() {
            self.available_shapes = ShapeKind::all();
        }
        let idx = self.rng.below(self.available_shapes.len());
        self.available_shapes[idx]
    }

    fn request_render(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Collision check used by the command paths: a rejected placement that would overflow the
    /// top of the board ends the game.
    fn placement_rejected(&mut self, shape: &Shape, pos: Vec2i) -> bool {
        if !self.collides(shape, pos.x, pos.y) {
            return false;
        }
        if self.would_overflow_top(shape, pos.x, pos.y) {
            self.game_over = true;
        }
        true
    }

    fn rejected_outcome(&self) -> CommandOutcome {
        if self.game_over {
            tracing::info!(score = self.score, "game over: piece above the board");
            CommandOutcome::GameOver { lines_cleared: 0 }
        } else {
            CommandOutcome::Blocked
        }
    }
}

fn cell_mut(board: &mut Board, x: i32, y: i32) -> Option<&mut Cell> {
    if x < 0 || y < 0 {
        return None;
    }
    board.get_mut(y as usize)?.get_mut(x as usize)
}

/// Xorshift generator; serializable so a saved engine resumes the same piece sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 {
            0x9E37_79B9_7F4A_7C15
        } else {
            seed
        };
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }

    /// Uniform in `0..n` (rejection sampling, no modulo bias). `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize {
        let n = n as u32;
        let zone = u32::MAX - (u32::MAX % n);
        loop {
            let v = self.next_u32();
            if v < zone {
                return (v % n) as usize;
            }
        }
    }
}
