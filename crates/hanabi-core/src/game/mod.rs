pub mod action;
pub mod engine;
pub mod error;
pub mod event;
pub mod game_loop;
pub mod outcome;
pub mod serialization;
pub mod state;
