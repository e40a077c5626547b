//! Quadratic response-surface fitting via SVD least squares.

use nalgebra::{DMatrix, DVector};
use ol_types::{quadratic_basis, quadratic_basis_size, AlgoError, Observation, OlResult, SurfaceModel};
use tracing::debug;

/// Relative cutoff for treating singular values as zero.
const SINGULAR_VALUE_RCOND: f64 = 1e-10;

/// Fit a quadratic response surface to the given observations.
///
/// Builds the design matrix over the fixed quadratic basis and solves the
/// least-squares problem through an SVD, which stays well-behaved for
/// overdetermined and marginally-conditioned systems where a normal-equation
/// inverse would not. Goodness of fit is the standard coefficient of
/// determination; when all measurements are identical (zero total variance)
/// it reports 0 rather than an undefined ratio.
pub fn fit(observations: &[Observation]) -> OlResult<SurfaceModel> {
    let first = observations.first().ok_or_else(|| {
        AlgoError::invalid_parameters("at least one observation is required")
    })?;
    let dim = first.point.dim();
    if dim == 0 {
        return Err(AlgoError::invalid_parameters("observations have zero-dimensional points").into());
    }
    if let Some(bad) = observations.iter().find(|o| o.point.dim() != dim) {
        return Err(AlgoError::invalid_parameters(format!(
            "mixed dimensionality: expected {dim}, found {}",
            bad.point.dim()
        ))
        .into());
    }

    let n_obs = observations.len();
    let n_terms = quadratic_basis_size(dim);
    if n_obs < n_terms {
        return Err(AlgoError::SingularFit {
            n_observations: n_obs,
            n_terms,
            message: "fewer observations than basis terms".into(),
        }
        .into());
    }

    let mut rows = Vec::with_capacity(n_obs * n_terms);
    for obs in observations {
        rows.extend(quadratic_basis(&obs.point));
    }
    let design = DMatrix::from_row_slice(n_obs, n_terms, &rows);
    let y = DVector::from_iterator(n_obs, observations.iter().map(|o| o.measurement));

    let svd = design.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let eps = (max_sv * SINGULAR_VALUE_RCOND).max(f64::MIN_POSITIVE);

    if svd.rank(eps) < n_terms {
        return Err(AlgoError::SingularFit {
            n_observations: n_obs,
            n_terms,
            message: "design matrix is rank-deficient (collinear points)".into(),
        }
        .into());
    }

    let coeffs = svd.solve(&y, eps).map_err(|e| AlgoError::SingularFit {
        n_observations: n_obs,
        n_terms,
        message: e.to_string(),
    })?;

    let predictions = &design * &coeffs;
    let residuals = &y - &predictions;
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let mean = y.iter().sum::<f64>() / n_obs as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean) * (v - mean)).sum();
    let r_squared = if ss_tot > f64::EPSILON {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    debug!(n_obs, n_terms, r_squared, "fitted response surface");

    Ok(SurfaceModel {
        coefficients: coeffs.iter().copied().collect(),
        r_squared,
        n_points: n_obs,
        num_variables: dim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doe::full_factorial;
    use approx::assert_relative_eq;
    use ol_types::{DesignPoint, ObservationPhase, OlError, SurfaceModel};

    fn observe_exact(model_coeffs: &[f64], points: Vec<DesignPoint>) -> Vec<Observation> {
        let model = SurfaceModel {
            coefficients: model_coeffs.to_vec(),
            r_squared: 1.0,
            n_points: 0,
            num_variables: points[0].dim(),
        };
        points
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let y = model.predict(&p);
                Observation::new(p, y, i, ObservationPhase::Doe)
            })
            .collect()
    }

    #[test]
    fn recovers_known_coefficients_from_noiseless_data() {
        // y = 0.5·x1² + 0.8·x2² + 1.0·x1·x2 − 0.5·x1 − 1.12·x2 + 0.517
        let truth = [0.5, 0.8, 1.0, -0.5, -1.12, 0.517];
        let points = full_factorial(2, 4).unwrap();
        let observations = observe_exact(&truth, points);

        let model = fit(&observations).unwrap();
        assert_eq!(model.coefficients.len(), 6);
        assert_eq!(model.n_points, 16);
        for (fitted, expected) in model.coefficients.iter().zip(truth.iter()) {
            assert_relative_eq!(*fitted, *expected, epsilon = 1e-9);
        }
        assert_relative_eq!(model.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn too_few_observations_is_singular() {
        let truth = [1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let points = vec![
            DesignPoint::new(vec![0.0, 0.0]),
            DesignPoint::new(vec![0.5, 0.5]),
            DesignPoint::new(vec![1.0, 1.0]),
        ];
        let observations = observe_exact(&truth, points);
        match fit(&observations) {
            Err(OlError::Algo(AlgoError::SingularFit {
                n_observations: 3,
                n_terms: 6,
                ..
            })) => (),
            other => panic!("expected SingularFit, got {other:?}"),
        }
    }

    #[test]
    fn collinear_points_are_singular() {
        // Eight observations but all on the line x2 = x1: the basis columns
        // x1², x2², and x1·x2 coincide, so the matrix is rank-deficient.
        let points: Vec<DesignPoint> = (0..8)
            .map(|i| {
                let t = i as f64 / 7.0;
                DesignPoint::new(vec![t, t])
            })
            .collect();
        let observations = observe_exact(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0], points);
        match fit(&observations) {
            Err(OlError::Algo(AlgoError::SingularFit { .. })) => (),
            other => panic!("expected SingularFit, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_invalid() {
        match fit(&[]) {
            Err(OlError::Algo(AlgoError::InvalidParameters { .. })) => (),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }

    #[test]
    fn constant_measurements_report_defined_r_squared() {
        let points = full_factorial(2, 3).unwrap();
        let observations: Vec<Observation> = points
            .into_iter()
            .enumerate()
            .map(|(i, p)| Observation::new(p, 2.5, i, ObservationPhase::Doe))
            .collect();
        let model = fit(&observations).unwrap();
        assert!(model.r_squared.is_finite());
        assert_eq!(model.r_squared, 0.0);
    }

    #[test]
    fn one_dimensional_fit_works() {
        // y = 2·x² − x + 0.25, basis {x², x, 1}
        let truth = [2.0, -1.0, 0.25];
        let points = full_factorial(1, 5).unwrap();
        let observations = observe_exact(&truth, points);
        let model = fit(&observations).unwrap();
        for (fitted, expected) in model.coefficients.iter().zip(truth.iter()) {
            assert_relative_eq!(*fitted, *expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn mixed_dimensionality_is_invalid() {
        let observations = vec![
            Observation::new(DesignPoint::new(vec![0.0, 0.0]), 1.0, 0, ObservationPhase::Doe),
            Observation::new(DesignPoint::new(vec![0.5]), 1.0, 1, ObservationPhase::Doe),
        ];
        match fit(&observations) {
            Err(OlError::Algo(AlgoError::InvalidParameters { .. })) => (),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }
}
