//! Gradient descent over a fitted response surface.

use ol_types::{
    AlgoError, Bounds, DesignPoint, OlResult, OptimizationResult, SurfaceModel, TerminationReason,
};
use tracing::debug;

/// Tunables for the gradient search.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    /// Fixed step size applied against the gradient.
    pub learning_rate: f64,
    /// Hard stop; reaching it is reported, not an error.
    pub max_iterations: usize,
    /// Convergence threshold on the step-to-step change in predicted value.
    pub value_tolerance: f64,
    /// Convergence threshold on the gradient norm.
    pub gradient_tolerance: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iterations: 100,
            value_tolerance: 1e-9,
            gradient_tolerance: 1e-6,
        }
    }
}

/// Minimize the model's predicted value within `bounds`.
///
/// Each iteration steps against the analytic gradient and clamps the result
/// component-wise back into the box, so a point that would leave the feasible
/// region is forced onto the nearest boundary. The trajectory is exactly
/// reproducible for fixed inputs; there is no randomness here.
///
/// Hitting `max_iterations` terminates the search with `converged = false`
/// and the best point found so far.
pub fn minimize(
    model: &SurfaceModel,
    bounds: &Bounds,
    start: Option<DesignPoint>,
    settings: &OptimizerSettings,
) -> OlResult<OptimizationResult> {
    if bounds.dim() != model.num_variables {
        return Err(AlgoError::invalid_parameters(format!(
            "bounds have {} dimension(s), model expects {}",
            bounds.dim(),
            model.num_variables
        ))
        .into());
    }
    let start = start.unwrap_or_else(|| bounds.center());
    if start.dim() != model.num_variables {
        return Err(AlgoError::invalid_parameters(format!(
            "start point has {} dimension(s), model expects {}",
            start.dim(),
            model.num_variables
        ))
        .into());
    }

    let mut point = bounds.clamp(&start);
    let mut value = model.predict(&point);
    let mut iterations = 0;

    let (converged, termination) = loop {
        let grad = model.gradient(&point);
        let grad_norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        if grad_norm < settings.gradient_tolerance {
            break (true, TerminationReason::GradientTolerance);
        }
        if iterations >= settings.max_iterations {
            break (false, TerminationReason::MaxIterations);
        }
        iterations += 1;

        let stepped = DesignPoint::new(
            point
                .coords()
                .iter()
                .zip(grad.iter())
                .map(|(x, g)| x - settings.learning_rate * g)
                .collect(),
        );
        let next = bounds.clamp(&stepped);
        let next_value = model.predict(&next);
        let value_change = (value - next_value).abs();
        point = next;
        value = next_value;

        if value_change < settings.value_tolerance {
            break (true, TerminationReason::ValueTolerance);
        }
    };

    debug!(
        iterations,
        converged,
        value,
        point = %point,
        "gradient search finished"
    );

    Ok(OptimizationResult {
        optimal_point: point,
        optimal_value: value,
        iterations,
        converged,
        termination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// y = (x1 − a)² + (x2 − b)², expanded into the quadratic basis.
    fn bowl(a: f64, b: f64) -> SurfaceModel {
        SurfaceModel {
            coefficients: vec![1.0, 1.0, 0.0, -2.0 * a, -2.0 * b, a * a + b * b],
            r_squared: 1.0,
            n_points: 16,
            num_variables: 2,
        }
    }

    #[test]
    fn converges_to_interior_minimum() {
        let model = bowl(0.3, 0.6);
        let result = minimize(&model, &Bounds::unit(2), None, &OptimizerSettings::default()).unwrap();

        assert!(result.converged);
        assert!(result.iterations <= 100);
        assert_relative_eq!(result.optimal_point.coords()[0], 0.3, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point.coords()[1], 0.6, epsilon = 1e-3);
        assert!(result.optimal_value < 1e-4);
    }

    #[test]
    fn exterior_minimum_lands_on_nearest_boundary() {
        // Unconstrained minimum at (1.5, 0.4): x1 must clamp to 1.0.
        let model = bowl(1.5, 0.4);
        let result = minimize(&model, &Bounds::unit(2), None, &OptimizerSettings::default()).unwrap();

        assert_relative_eq!(result.optimal_point.coords()[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.optimal_point.coords()[1], 0.4, epsilon = 1e-3);
    }

    #[test]
    fn trajectory_is_deterministic() {
        let model = bowl(0.25, 0.75);
        let settings = OptimizerSettings::default();
        let a = minimize(&model, &Bounds::unit(2), None, &settings).unwrap();
        let b = minimize(&model, &Bounds::unit(2), None, &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn iteration_cap_is_a_hard_stop_not_an_error() {
        // A steep slope with no interior minimum and a tiny step size cannot
        // satisfy either tolerance in one iteration.
        let model = SurfaceModel {
            coefficients: vec![0.0, 0.0, 0.0, -100.0, 0.0, 0.0],
            r_squared: 1.0,
            n_points: 16,
            num_variables: 2,
        };
        let settings = OptimizerSettings {
            max_iterations: 1,
            learning_rate: 1e-6,
            ..OptimizerSettings::default()
        };
        let result = minimize(&model, &Bounds::unit(2), None, &settings).unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.termination, TerminationReason::MaxIterations);
    }

    #[test]
    fn custom_start_is_clamped_before_searching() {
        let model = bowl(0.5, 0.5);
        let start = DesignPoint::new(vec![4.0, -3.0]);
        let result = minimize(
            &model,
            &Bounds::unit(2),
            Some(start),
            &OptimizerSettings::default(),
        )
        .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point.coords()[0], 0.5, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point.coords()[1], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn dimension_mismatch_is_invalid() {
        let model = bowl(0.5, 0.5);
        match minimize(&model, &Bounds::unit(3), None, &OptimizerSettings::default()) {
            Err(ol_types::OlError::Algo(AlgoError::InvalidParameters { .. })) => (),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }

    #[test]
    fn flat_surface_converges_immediately() {
        let model = SurfaceModel {
            coefficients: vec![0.0; 6],
            r_squared: 0.0,
            n_points: 16,
            num_variables: 2,
        };
        let result = minimize(&model, &Bounds::unit(2), None, &OptimizerSettings::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.termination, TerminationReason::GradientTolerance);
    }
}
