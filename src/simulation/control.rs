//! Discrete control commands from the embedding application.
//!
//! Keyboard handling, UI buttons and remote control all live outside the
//! core; whatever the source, they arrive here as one of these commands and
//! map to a single manager-level transition.

use serde::{Deserialize, Serialize};

/// A control event delivered to the generation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Halt stepping; simulation state is preserved.
    Pause,
    /// Resume stepping after a pause.
    Resume,
    /// Throw the current population away and reseed from fresh random
    /// genomes, resetting the generation record.
    RestartGeneration,
    /// Force the current generation to terminate, exactly as if the time
    /// budget had elapsed; accumulated fitness is kept as-is.
    SkipGeneration,
    /// Stop the simulation loop entirely.
    Quit,
}
