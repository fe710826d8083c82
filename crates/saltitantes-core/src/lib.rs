//! Simulation engine for the Saltitantes creature simulation.
//!
//! Creatures bounce along a ground line, steal gold from their nearest
//! neighbor, merge into clusters when they land on top of each other, and
//! are eventually swallowed by a guardian. The player wins when the score
//! accumulated by those events reaches the configured threshold.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `saltitantes-config.yaml` into
//!   strongly-typed structs.
//! - [`planner`] -- [`TargetPlanner`]: gold-driven target positions.
//! - [`roster`] -- [`Roster`]: ordered creatures with the guardian last.
//! - [`physics`] -- Gravity, bouncing and the round-robin mover.
//! - [`theft`] -- Nearest-neighbor theft.
//! - [`cluster`] -- Grouping co-located creatures into clusters.
//! - [`guardian`] -- Guardian spawn and cluster absorption.
//! - [`collaborators`] -- Score, persistence and render traits.
//! - [`session`] -- [`Session`]: lifecycle, ticks and end conditions.
//! - [`operator`] -- Run control shared with the tick tasks.
//! - [`runner`] -- [`SessionController`]: the two periodic tick tasks.
//!
//! [`TargetPlanner`]: planner::TargetPlanner
//! [`Roster`]: roster::Roster
//! [`Session`]: session::Session
//! [`SessionController`]: runner::SessionController

pub mod cluster;
pub mod collaborators;
pub mod config;
pub mod guardian;
pub mod operator;
pub mod physics;
pub mod planner;
pub mod roster;
pub mod runner;
pub mod session;
pub mod theft;
