use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::design::{Observation, ObservationPhase};
use crate::model::{OptimizationResult, SurfaceModel};

/// Unique workflow run identifier.
pub type RunId = Uuid;

/// Workflow phase. The controller only moves through these in sequence;
/// `Error` is reachable from any non-terminal phase, `Idle` via reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Starting,
    Doe,
    Modeling,
    Optimization,
    Refinement,
    Complete,
    Error,
}

impl Phase {
    /// Phases from which a new run may be started.
    pub fn can_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Complete | Phase::Error)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Starting => "starting",
            Phase::Doe => "doe",
            Phase::Modeling => "modeling",
            Phase::Optimization => "optimization",
            Phase::Refinement => "refinement",
            Phase::Complete => "complete",
            Phase::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Top-level configuration for a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub id: RunId,
    pub name: String,

    /// Number of design variables (dimensionality of the design space).
    pub num_variables: usize,
    /// Levels per variable for the full-factorial DoE grid.
    pub num_levels: usize,

    /// Points sampled around the predicted optimum during refinement.
    pub refinement_count: usize,
    /// Radius of the refinement pattern in normalized coordinates.
    pub refinement_radius: f64,

    pub created_at: DateTime<Utc>,
}

impl WorkflowConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            num_variables: 2,
            num_levels: 4,
            refinement_count: 5,
            refinement_radius: 0.1,
            created_at: Utc::now(),
        }
    }

    pub fn with_design_space(mut self, num_variables: usize, num_levels: usize) -> Self {
        self.num_variables = num_variables;
        self.num_levels = num_levels;
        self
    }

    pub fn with_refinement(mut self, count: usize, radius: f64) -> Self {
        self.refinement_count = count;
        self.refinement_radius = radius;
        self
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::new("optimization_workflow")
    }
}

/// In-memory state of a single workflow run.
///
/// Exclusively owned and mutated by the controller; other components are
/// pure functions over their explicit inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub id: RunId,
    pub phase: Phase,
    /// Progress percentage in [0, 100], monotone within a run.
    pub progress: f64,
    /// All observations collected so far, DoE before refinement.
    pub observations: Vec<Observation>,
    pub model: Option<SurfaceModel>,
    pub optimization: Option<OptimizationResult>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn idle() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            progress: 0.0,
            observations: Vec::new(),
            model: None,
            optimization: None,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn mark_started(&mut self) {
        self.phase = Phase::Starting;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_complete(&mut self) {
        self.phase = Phase::Complete;
        self.progress = 100.0;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, message: String) {
        self.phase = Phase::Error;
        self.error = Some(message);
        self.finished_at = Some(Utc::now());
    }

    /// Append an observation, preserving collection order.
    pub fn record(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Observations collected during a given phase.
    pub fn observations_in(&self, phase: ObservationPhase) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.phase == phase)
    }

    /// The refinement observation with the lowest measurement, if any.
    pub fn best_refinement(&self) -> Option<&Observation> {
        self.observations_in(ObservationPhase::Refinement)
            .min_by(|a, b| {
                a.measurement
                    .partial_cmp(&b.measurement)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Final summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_points: usize,
    pub r_squared: f64,
    pub predicted_optimum: crate::design::DesignPoint,
    pub predicted_value: f64,
    /// Best-measured refinement point, when refinement produced data.
    pub experimental_optimum: Option<crate::design::DesignPoint>,
    pub experimental_value: Option<f64>,
}
