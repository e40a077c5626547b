use serde::{Deserialize, Serialize};

use crate::design::DesignPoint;
use crate::run::{Phase, RunSummary};

/// Discrete events emitted by the controller for the external reporting
/// channel (dashboard, log collector, test harness).
///
/// Fire-and-forget from the engine's perspective: no acknowledgment is
/// expected and a slow or absent consumer never blocks the workflow. The
/// serialized form is the wire payload for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    PhaseChanged {
        phase: Phase,
    },
    DoeGenerated {
        points: Vec<DesignPoint>,
    },
    PointMeasured {
        point: DesignPoint,
        measurement: f64,
        index: usize,
        total: usize,
    },
    ModelFitted {
        coefficients: Vec<f64>,
        r_squared: f64,
        n_points: usize,
    },
    OptimizationComplete {
        optimal_point: DesignPoint,
        optimal_value: f64,
        iterations: usize,
        converged: bool,
    },
    RefinementComplete {
        best_point: Option<DesignPoint>,
        best_measurement: Option<f64>,
    },
    WorkflowComplete {
        summary: RunSummary,
    },
    Error {
        message: String,
    },
    ResetComplete,
}

impl WorkflowEvent {
    /// Short name of the event variant, matching the serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "phase_changed",
            Self::DoeGenerated { .. } => "doe_generated",
            Self::PointMeasured { .. } => "point_measured",
            Self::ModelFitted { .. } => "model_fitted",
            Self::OptimizationComplete { .. } => "optimization_complete",
            Self::RefinementComplete { .. } => "refinement_complete",
            Self::WorkflowComplete { .. } => "workflow_complete",
            Self::Error { .. } => "error",
            Self::ResetComplete => "reset_complete",
        }
    }
}
