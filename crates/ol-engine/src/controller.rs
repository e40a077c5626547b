//! Workflow controller: the phase state machine driving a run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ol_algo::{fit, full_factorial, minimize, refinement_points, OptimizerSettings};
use ol_types::{
    Bounds, DesignPoint, Observation, ObservationPhase, OlError, OlResult, Phase, RunState,
    RunSummary, WorkflowConfig, WorkflowError, WorkflowEvent,
};
use tracing::{info, warn};

use crate::measurement::MeasurementSource;
use crate::reporting::EventSink;

/// Progress reached once the full DoE grid has been measured.
const DOE_PROGRESS_END: f64 = 50.0;
const MODELING_PROGRESS: f64 = 60.0;
const OPTIMIZATION_PROGRESS: f64 = 70.0;
const REFINEMENT_PROGRESS_END: f64 = 95.0;

/// Handle for requesting a reset while a run is mid-flight.
///
/// The controller checks the flag around every measurement call, so a reset
/// issued during a blocking acquisition takes effect as soon as that call
/// returns; the in-flight result is discarded, never applied to the new state.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn request_reset(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Orchestrates one optimization run at a time:
/// `idle → starting → doe → modeling → optimization → refinement → complete`,
/// with `error` reachable from any non-terminal phase and `reset` back to
/// `idle` from anywhere.
///
/// The controller is the exclusive owner of its [`RunState`] and the only
/// place component failures are caught: a failed phase moves the run to
/// `error` (leaving the state inspectable) rather than continuing. Multiple
/// concurrent runs require one controller each.
pub struct WorkflowController {
    config: WorkflowConfig,
    source: Arc<dyn MeasurementSource>,
    sink: Arc<dyn EventSink>,
    settings: OptimizerSettings,
    state: RunState,
    cancel: Arc<AtomicBool>,
}

impl WorkflowController {
    pub fn new(
        config: WorkflowConfig,
        source: Arc<dyn MeasurementSource>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            source,
            sink,
            settings: OptimizerSettings::default(),
            state: RunState::idle(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_optimizer_settings(mut self, settings: OptimizerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current run state, inspectable in any phase including `error`.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Handle for resetting the run from outside the controller task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancel),
        }
    }

    /// Run the full workflow to completion.
    ///
    /// Valid only from `idle`, `complete`, or `error`; a controller with an
    /// active run rejects the request instead of starting a second run
    /// against the same state.
    pub async fn start(&mut self) -> OlResult<RunSummary> {
        if !self.state.phase.can_start() {
            return Err(WorkflowError::AlreadyRunning {
                phase: self.state.phase.to_string(),
            }
            .into());
        }

        self.cancel.store(false, Ordering::SeqCst);
        self.state = RunState::idle();
        self.state.mark_started();
        self.sink.emit(WorkflowEvent::PhaseChanged {
            phase: Phase::Starting,
        });
        info!(run_id = %self.state.id, name = %self.config.name, "starting optimization workflow");

        match self.run_phases().await {
            Ok(summary) => Ok(summary),
            Err(OlError::Workflow(WorkflowError::Cancelled)) => {
                info!(run_id = %self.state.id, "run reset mid-flight; discarding state");
                self.state = RunState::idle();
                self.cancel.store(false, Ordering::SeqCst);
                self.sink.emit(WorkflowEvent::ResetComplete);
                Err(WorkflowError::Cancelled.into())
            }
            Err(err) => {
                let message = err.to_string();
                warn!(run_id = %self.state.id, %message, "workflow failed");
                self.state.mark_failed(message.clone());
                self.sink.emit(WorkflowEvent::Error { message });
                self.sink.emit(WorkflowEvent::PhaseChanged { phase: Phase::Error });
                Err(err)
            }
        }
    }

    /// Discard the run state and return to `idle`.
    ///
    /// Permitted in any phase; a second reset while already idle is a no-op.
    pub fn reset(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }
        info!(run_id = %self.state.id, phase = %self.state.phase, "resetting run state");
        self.state = RunState::idle();
        self.cancel.store(false, Ordering::SeqCst);
        self.sink.emit(WorkflowEvent::ResetComplete);
    }

    async fn run_phases(&mut self) -> OlResult<RunSummary> {
        // Design of Experiments
        self.set_phase(Phase::Doe);
        let points = full_factorial(self.config.num_variables, self.config.num_levels)?;
        self.sink.emit(WorkflowEvent::DoeGenerated {
            points: points.clone(),
        });
        self.measure_all(&points, ObservationPhase::Doe, 0.0, DOE_PROGRESS_END)
            .await?;

        // Response-surface modeling
        self.set_phase(Phase::Modeling);
        let model = fit(&self.state.observations)?;
        self.sink.emit(WorkflowEvent::ModelFitted {
            coefficients: model.coefficients.clone(),
            r_squared: model.r_squared,
            n_points: model.n_points,
        });
        self.state.model = Some(model.clone());
        self.state.progress = MODELING_PROGRESS;

        // Model-based optimization
        self.set_phase(Phase::Optimization);
        let bounds = Bounds::unit(self.config.num_variables);
        let optimum = minimize(&model, &bounds, None, &self.settings)?;
        if !optimum.converged {
            // Non-convergence is a result, not a failure; keep the best point.
            warn!(
                iterations = optimum.iterations,
                "optimizer hit its iteration cap; continuing with best point"
            );
        }
        self.sink.emit(WorkflowEvent::OptimizationComplete {
            optimal_point: optimum.optimal_point.clone(),
            optimal_value: optimum.optimal_value,
            iterations: optimum.iterations,
            converged: optimum.converged,
        });
        self.state.optimization = Some(optimum.clone());
        self.state.progress = OPTIMIZATION_PROGRESS;

        // Local refinement around the predicted optimum
        self.set_phase(Phase::Refinement);
        let refine = refinement_points(
            &optimum.optimal_point,
            self.config.refinement_radius,
            self.config.refinement_count,
        )?;
        self.measure_all(
            &refine,
            ObservationPhase::Refinement,
            OPTIMIZATION_PROGRESS,
            REFINEMENT_PROGRESS_END,
        )
        .await?;
        let best = self.state.best_refinement().cloned();
        self.sink.emit(WorkflowEvent::RefinementComplete {
            best_point: best.as_ref().map(|o| o.point.clone()),
            best_measurement: best.as_ref().map(|o| o.measurement),
        });

        // Final summary
        let summary = RunSummary {
            total_points: self.state.observations.len(),
            r_squared: model.r_squared,
            predicted_optimum: optimum.optimal_point.clone(),
            predicted_value: optimum.optimal_value,
            experimental_optimum: best.as_ref().map(|o| o.point.clone()),
            experimental_value: best.as_ref().map(|o| o.measurement),
        };
        self.state.mark_complete();
        self.sink.emit(WorkflowEvent::PhaseChanged {
            phase: Phase::Complete,
        });
        self.sink.emit(WorkflowEvent::WorkflowComplete {
            summary: summary.clone(),
        });
        info!(
            run_id = %self.state.id,
            total_points = summary.total_points,
            r_squared = summary.r_squared,
            predicted = %summary.predicted_optimum,
            "workflow complete"
        );
        Ok(summary)
    }

    /// Measure each point in order, appending observations and advancing
    /// progress linearly from `from` to `to`.
    async fn measure_all(
        &mut self,
        points: &[DesignPoint],
        phase: ObservationPhase,
        from: f64,
        to: f64,
    ) -> OlResult<()> {
        let total = points.len();
        for (i, point) in points.iter().enumerate() {
            self.check_cancelled()?;
            let outcome = self.source.measure(point).await;
            // A reset issued while the call was in flight wins: the result
            // is discarded rather than applied to the new state.
            self.check_cancelled()?;
            let measurement = outcome.map_err(|e| WorkflowError::MeasurementUnavailable {
                point_index: i,
                message: e.to_string(),
            })?;

            let index = self.state.observations.len();
            self.state
                .record(Observation::new(point.clone(), measurement, index, phase));
            self.state.progress = from + (to - from) * (i + 1) as f64 / total as f64;
            self.sink.emit(WorkflowEvent::PointMeasured {
                point: point.clone(),
                measurement,
                index,
                total,
            });
        }
        Ok(())
    }

    fn check_cancelled(&self) -> OlResult<()> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(WorkflowError::Cancelled.into());
        }
        Ok(())
    }

    fn set_phase(&mut self, phase: Phase) {
        self.state.phase = phase;
        info!(run_id = %self.state.id, %phase, "phase change");
        self.sink.emit(WorkflowEvent::PhaseChanged { phase });
    }
}
