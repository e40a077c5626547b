use thiserror::Error;

/// Main error type for the OptiLoop system
#[derive(Error, Debug)]
pub enum OlError {
    #[error("Algorithm error: {0}")]
    Algo(#[from] AlgoError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the pure algorithm components.
#[derive(Error, Debug)]
pub enum AlgoError {
    /// Caller-side precondition violation; never retried.
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// The least-squares system cannot be solved for the given observations:
    /// either too few of them or an exactly collinear point set.
    #[error(
        "Singular fit: {n_observations} observation(s) for {n_terms} basis terms ({message})"
    )]
    SingularFit {
        n_observations: usize,
        n_terms: usize,
        message: String,
    },
}

/// Errors raised while driving a workflow run.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The external measurement source was unreachable or returned no usable
    /// value for a point. Aborts the current phase.
    #[error("Measurement unavailable at point {point_index}: {message}")]
    MeasurementUnavailable { point_index: usize, message: String },

    /// A `start` was issued against a controller that already has an active run.
    #[error("A run is already active (phase: {phase})")]
    AlreadyRunning { phase: String },

    /// The run was reset while a phase was mid-flight.
    #[error("Run was reset while in progress")]
    Cancelled,
}

/// Result type alias for OptiLoop operations
pub type OlResult<T> = Result<T, OlError>;

impl AlgoError {
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_fit_display_names_counts() {
        let err = AlgoError::SingularFit {
            n_observations: 3,
            n_terms: 6,
            message: "underdetermined".into(),
        };
        let text = err.to_string();
        assert!(text.contains("3 observation(s)"));
        assert!(text.contains("6 basis terms"));
    }

    #[test]
    fn algo_error_converts_to_top_level() {
        let err: OlError = AlgoError::invalid_parameters("num_levels must be >= 2").into();
        match err {
            OlError::Algo(AlgoError::InvalidParameters { .. }) => (),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }

    #[test]
    fn workflow_error_converts_to_top_level() {
        let err: OlError = WorkflowError::AlreadyRunning {
            phase: "doe".into(),
        }
        .into();
        assert!(err.to_string().contains("already active"));
    }
}
