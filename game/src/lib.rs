pub mod agent;
pub mod input_adapter;
pub mod script;
pub mod session;
pub mod settings;
pub mod state;
pub mod tetris_core;
pub mod view;
