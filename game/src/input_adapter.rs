use engine::app::InputFrame;
use winit::event::VirtualKeyCode;

use crate::agent::TetrisAction;
use crate::view::ViewLayout;

/// Arrow keys, with WASD as an alternative; `R` restarts.
pub fn map_key_to_action(key: VirtualKeyCode) -> Option<TetrisAction> {
    match key {
        VirtualKeyCode::Left | VirtualKeyCode::A => Some(TetrisAction::MoveLeft),
        VirtualKeyCode::Right | VirtualKeyCode::D => Some(TetrisAction::MoveRight),
        VirtualKeyCode::Down | VirtualKeyCode::S => Some(TetrisAction::SoftDrop),
        VirtualKeyCode::Up | VirtualKeyCode::W => Some(TetrisAction::Rotate),
        VirtualKeyCode::R => Some(TetrisAction::Reset),
        _ => None,
    }
}

/// Actions for one frame of input, in arrival order. A click released over the restart button
/// adds a `Reset` after the key actions.
pub fn actions_for_frame(input: &InputFrame, layout: &ViewLayout) -> Vec<TetrisAction> {
    let mut actions: Vec<TetrisAction> = input
        .keys_pressed
        .iter()
        .copied()
        .filter_map(map_key_to_action)
        .collect();

    let clicked_restart = input.mouse_up && input.mouse_pos.is_some_and(|pos| layout.hits_restart(pos));
    if clicked_restart {
        actions.push(TetrisAction::Reset);
    }
    actions
}
