use serde::{Deserialize, Serialize};

use crate::design::DesignPoint;

/// Number of terms in the quadratic basis for `dim` design variables:
/// squares, pairwise products, linear terms, and the bias.
pub fn quadratic_basis_size(dim: usize) -> usize {
    dim + dim * dim.saturating_sub(1) / 2 + dim + 1
}

/// Evaluate the quadratic basis at a point.
///
/// Term order is fixed: `x1², …, xd²`, then pairwise products `xi·xj` for
/// `i < j` in lexicographic order, then `x1, …, xd`, then the constant 1.
/// For two variables this is `{x1², x2², x1·x2, x1, x2, 1}`.
pub fn quadratic_basis(point: &DesignPoint) -> Vec<f64> {
    let x = point.coords();
    let dim = x.len();
    let mut terms = Vec::with_capacity(quadratic_basis_size(dim));

    for &xi in x {
        terms.push(xi * xi);
    }
    for i in 0..dim {
        for j in (i + 1)..dim {
            terms.push(x[i] * x[j]);
        }
    }
    terms.extend_from_slice(x);
    terms.push(1.0);
    terms
}

/// A fitted quadratic response-surface model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceModel {
    /// Coefficients in the fixed basis order of [`quadratic_basis`].
    pub coefficients: Vec<f64>,
    /// Coefficient of determination between predictions and measurements.
    pub r_squared: f64,
    /// Number of observations the fit used.
    pub n_points: usize,
    /// Number of design variables.
    pub num_variables: usize,
}

impl SurfaceModel {
    /// Predicted response at a point.
    pub fn predict(&self, point: &DesignPoint) -> f64 {
        quadratic_basis(point)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(term, coeff)| term * coeff)
            .sum()
    }

    /// Analytic gradient of the predicted response at a point.
    ///
    /// Derived directly from the basis coefficients; no finite differences.
    pub fn gradient(&self, point: &DesignPoint) -> Vec<f64> {
        let x = point.coords();
        let dim = x.len();
        let c = &self.coefficients;
        let linear_offset = dim + dim * dim.saturating_sub(1) / 2;

        let mut grad = vec![0.0; dim];
        for k in 0..dim {
            // Square term: d/dxk (c_k * xk²)
            grad[k] = 2.0 * c[k] * x[k];
            // Linear term
            grad[k] += c[linear_offset + k];
        }
        // Pairwise products: c * xi·xj contributes c·xj to grad[i] and c·xi to grad[j]
        let mut idx = dim;
        for i in 0..dim {
            for j in (i + 1)..dim {
                grad[i] += c[idx] * x[j];
                grad[j] += c[idx] * x[i];
                idx += 1;
            }
        }
        grad
    }
}

/// Why the optimizer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Step-to-step change in predicted value fell below tolerance.
    ValueTolerance,
    /// Gradient norm fell below tolerance.
    GradientTolerance,
    /// Hard iteration cap reached without converging.
    MaxIterations,
}

/// Outcome of a gradient search over a fitted surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_point: DesignPoint,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
    pub termination: TerminationReason,
}
