use engine::graphics::{Color, Renderer2d, measure_text};
use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Rect, Size};

use crate::tetris_core::{BOARD_HEIGHT, BOARD_WIDTH, Board, TetrisCore};

pub const CELL_SIZE: u32 = 30;
pub const BOARD_PIXEL_WIDTH: u32 = BOARD_WIDTH as u32 * CELL_SIZE;
pub const BOARD_PIXEL_HEIGHT: u32 = BOARD_HEIGHT as u32 * CELL_SIZE;
pub const WINDOW_SIZE: SurfaceSize = SurfaceSize::new(BOARD_PIXEL_WIDTH, 700);

const SCORE_BAND_HEIGHT: u32 = 36;
const BUTTON_SIZE: Size = Size { w: 120, h: 44 };
const SCORE_TEXT_SCALE: u32 = 3;
const BUTTON_TEXT_SCALE: u32 = 2;
const GAME_OVER_TEXT_SCALE: u32 = 5;

const COLOR_BACKGROUND: Color = [0, 0, 0, 255];
const COLOR_CELL_OUTLINE: Color = [0, 0, 0, 255];
const COLOR_TEXT: Color = [255, 255, 255, 255];
const COLOR_BUTTON: Color = [255, 255, 255, 255];
const COLOR_BUTTON_HOVER: Color = [210, 210, 220, 255];
const COLOR_BUTTON_TEXT: Color = [0, 0, 0, 255];
const COLOR_GAME_OVER: Color = [255, 0, 0, 255];

pub const RESTART_LABEL: &str = "RESTART";
pub const GAME_OVER_LABEL: &str = "GAME OVER";

/// Pixel regions of the game screen: the board on top, the score line under it and the
/// restart button at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub board: Rect,
    pub score: Rect,
    pub restart_button: Rect,
}

impl ViewLayout {
    pub fn compute(size: SurfaceSize) -> Self {
        let board = Rect::new(0, 0, BOARD_PIXEL_WIDTH, BOARD_PIXEL_HEIGHT);
        let score = Rect::new(0, board.bottom(), size.width, SCORE_BAND_HEIGHT);
        let below = Rect::new(
            0,
            score.bottom(),
            size.width,
            size.height.saturating_sub(score.bottom()),
        );
        let restart_button = below.place(BUTTON_SIZE, Anchor::Center);
        Self {
            board,
            score,
            restart_button,
        }
    }

    /// Screen rect of board cell `(x, y)`; row 0 is the top row.
    pub fn cell_rect(&self, x: usize, y: usize) -> Rect {
        Rect::new(
            self.board.x + x as u32 * CELL_SIZE,
            self.board.y + y as u32 * CELL_SIZE,
            CELL_SIZE,
            CELL_SIZE,
        )
    }

    pub fn hits_restart(&self, pos: (u32, u32)) -> bool {
        self.restart_button.contains(pos.0, pos.1)
    }
}

/// Label under the board. Upper case because the block font only has capital glyphs
/// (`glyph_rows` folds every letter to upper case).
pub fn score_text(score: u32) -> String {
    format!("SCORE: {score}")
}

/// Draws the whole screen for `core` and returns the layout used, so callers can hit-test
/// against exactly what was drawn.
pub fn draw_game(
    frame: &mut dyn Renderer2d,
    core: &TetrisCore,
    cursor: Option<(u32, u32)>,
) -> ViewLayout {
    let layout = ViewLayout::compute(frame.size());
    frame.clear(COLOR_BACKGROUND);

    draw_board(frame, &layout, &core.board_with_active_piece());
    draw_score(frame, &layout, core.score());

    let hovered = cursor.is_some_and(|pos| layout.hits_restart(pos));
    draw_restart_button(frame, &layout, hovered);

    if core.is_game_over() {
        draw_game_over(frame, &layout);
    }
    layout
}

fn draw_cell(frame: &mut dyn Renderer2d, rect: Rect, color: Color) {
    frame.fill_rect(rect, color);
    frame.rect_outline(rect, COLOR_CELL_OUTLINE);
}

fn draw_board(frame: &mut dyn Renderer2d, layout: &ViewLayout, board: &Board) {
    for (y, row) in board.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Some(color) = cell {
                draw_cell(frame, layout.cell_rect(x, y), color.rgba());
            }
        }
    }
}

fn draw_centered_text(
    frame: &mut dyn Renderer2d,
    area: Rect,
    text: &str,
    color: Color,
    scale: u32,
) {
    let (w, h) = measure_text(text, scale);
    let at = area.place(Size::new(w, h), Anchor::Center);
    frame.draw_text_scaled(at.x, at.y, text, color, scale);
}

fn draw_score(frame: &mut dyn Renderer2d, layout: &ViewLayout, score: u32) {
    draw_centered_text(
        frame,
        layout.score,
        &score_text(score),
        COLOR_TEXT,
        SCORE_TEXT_SCALE,
    );
}

fn draw_restart_button(frame: &mut dyn Renderer2d, layout: &ViewLayout, hovered: bool) {
    let rect = layout.restart_button;
    let fill = if hovered {
        COLOR_BUTTON_HOVER
    } else {
        COLOR_BUTTON
    };
    frame.fill_rect(rect, fill);
    frame.rect_outline(rect, COLOR_BUTTON_TEXT);
    draw_centered_text(
        frame,
        rect,
        RESTART_LABEL,
        COLOR_BUTTON_TEXT,
        BUTTON_TEXT_SCALE,
    );
}

fn draw_game_over(frame: &mut dyn Renderer2d, layout: &ViewLayout) {
    draw_centered_text(
        frame,
        layout.board,
        GAME_OVER_LABEL,
        COLOR_GAME_OVER,
        GAME_OVER_TEXT_SCALE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_window_regions() {
        let layout = ViewLayout::compute(WINDOW_SIZE);
        assert_eq!(layout.board, Rect::new(0, 0, 300, 600));
        assert_eq!(layout.score.y, 600);
        assert!(layout.restart_button.y >= layout.score.bottom());
        assert!(layout.restart_button.bottom() <= WINDOW_SIZE.height);
        assert_eq!(layout.cell_rect(9, 19), Rect::new(270, 570, 30, 30));
    }

    #[test]
    fn restart_hit_test_uses_button_rect() {
        let layout = ViewLayout::compute(WINDOW_SIZE);
        let b = layout.restart_button;
        assert!(layout.hits_restart((b.x + 1, b.y + 1)));
        assert!(!layout.hits_restart((b.x + b.w, b.y)));
        assert!(!layout.hits_restart((10, 10)));
    }

    #[test]
    fn score_text_format() {
        assert_eq!(score_text(0), "SCORE: 0");
        assert_eq!(score_text(1200), "SCORE: 1200");
    }
}
