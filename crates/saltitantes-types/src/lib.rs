//! Shared type definitions for the Saltitantes creature simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: the simulation core mutates these types, the engine binary
//! renders and persists them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers for creatures and sessions
//! - [`enums`] -- Closed variants (creature roles, shapes, session phases)
//! - [`structs`] -- Core entity structs (creatures, render frames, stats)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CreatureRole, SessionPhase, ShapeKind, SimulationOutcome};
pub use ids::{CreatureId, SessionId};
pub use structs::{Creature, Frame, RenderItem, SessionStats};

#[cfg(test)]
mod tests {
    //! Round-trip checks for the types that cross the persistence boundary.

    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn session_stats_survive_json() {
        let mut stats = SessionStats::new("ana");
        stats.simulations = 3;
        stats.successful_simulations = 1;
        stats.points_history.push(120.0);

        let json = serde_json::to_string(&stats).unwrap();
        let back: SessionStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn roles_serialize_as_snake_case() {
        let json = serde_json::to_string(&CreatureRole::Guardian).unwrap();
        assert_eq!(json, "\"guardian\"");
    }
}
