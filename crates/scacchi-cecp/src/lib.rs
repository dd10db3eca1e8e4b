//! CECP (xboard) protocol handling for scacchi.

pub mod command;
pub mod engine;
pub mod error;
pub mod game;

pub use command::Command;
pub use engine::run;
pub use error::ProtocolError;
pub use game::Game;
