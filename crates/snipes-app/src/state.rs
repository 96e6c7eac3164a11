//! State shared between the driver thread and the game loop thread.

use std::sync::{Arc, Mutex};

use snipes_core::commands::PlayerCommand;
use snipes_core::state::GameStateSnapshot;

/// Commands sent from the driver to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot slot, updated by the game loop thread after each tick.
/// Consumers poll it; a slow consumer can never stall the simulation.
pub type SharedSnapshot = Arc<Mutex<Option<GameStateSnapshot>>>;
