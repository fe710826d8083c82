//! Enumeration types for the Saltitantes simulation.
//!
//! Creature roles are closed variants, so a creature can never be both a
//! cluster and the guardian.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Creature Role
// ---------------------------------------------------------------------------

/// The role a creature plays in the roster.
///
/// A plain creature is [`CreatureRole::Normal`]. Clusters are produced by
/// merging co-located creatures; the guardian is created once per session
/// when the simulation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatureRole {
    /// An ordinary creature added before or during the simulation.
    Normal,
    /// A merged creature holding the summed gold of its members.
    Cluster,
    /// The unique terminal agent that absorbs nearby clusters.
    Guardian,
}

impl CreatureRole {
    /// Whether this role is the guardian.
    pub const fn is_guardian(self) -> bool {
        matches!(self, Self::Guardian)
    }

    /// Whether this role is a cluster.
    pub const fn is_cluster(self) -> bool {
        matches!(self, Self::Cluster)
    }

    /// The shape the render surface draws for this role.
    pub const fn shape(self) -> ShapeKind {
        match self {
            Self::Normal => ShapeKind::Circle,
            Self::Cluster => ShapeKind::Rect,
            Self::Guardian => ShapeKind::Triangle,
        }
    }
}

// ---------------------------------------------------------------------------
// Render Shapes
// ---------------------------------------------------------------------------

/// Shape drawn for a creature on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Filled circle (normal creatures).
    Circle,
    /// Filled square (clusters).
    Rect,
    /// Filled upward triangle (the guardian).
    Triangle,
}

// ---------------------------------------------------------------------------
// Session Lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle phase of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Pre-start: creatures may be freely added and removed.
    Idle,
    /// Guardian created, periodic ticks active.
    Running,
    /// Ticks halted and the outcome computed. Terminal until reset.
    Stopped,
}

/// Final outcome of a stopped simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationOutcome {
    /// The accumulated score reached the win threshold.
    Win,
    /// The accumulated score stayed below the win threshold.
    Loss,
}

impl SimulationOutcome {
    /// Whether the player won.
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Win)
    }
}
