//! Serializable simulation records.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Read-only view of an agent for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: DVec2,
    /// Heading angle of the velocity (radians).
    pub heading: f64,
    pub alive: bool,
    /// Cached hit point of every ray, `None` when the ray saw no wall.
    pub hit_points: Vec<Option<DVec2>>,
}

/// State of every agent at a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub generation: usize,
    pub tick: usize,
    pub agents: Vec<AgentSnapshot>,
}

/// Summary of a finished generation.
///
/// Fitness values are measured right before the population is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation index, starting at 0.
    pub generation: usize,

    /// Ticks until every agent finished.
    pub ticks: usize,

    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub std_dev_fitness: f64,

    /// Agents stopped by a wall.
    pub n_crashed: usize,
    /// Agents stopped by their time to live.
    pub n_expired: usize,
}
