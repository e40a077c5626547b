//! Refinement sampling around a predicted optimum.

use ol_types::{AlgoError, DesignPoint, OlResult};

/// Generate `count` points clustered around `center` within `radius`.
///
/// The first point is the center itself so the predicted optimum is always
/// re-measured. For two-variable designs the remaining points sit on a ring
/// of `radius` around the center; for other dimensionalities they are
/// axis-aligned offsets of ±`radius`, cycling through the dimensions. All
/// points are clamped into the unit hypercube, and the pattern is fully
/// deterministic for fixed inputs.
pub fn refinement_points(
    center: &DesignPoint,
    radius: f64,
    count: usize,
) -> OlResult<Vec<DesignPoint>> {
    if count < 1 {
        return Err(AlgoError::invalid_parameters("count must be >= 1").into());
    }
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(AlgoError::invalid_parameters("radius must be positive and finite").into());
    }
    let dim = center.dim();
    if dim == 0 {
        return Err(AlgoError::invalid_parameters("center must have at least one dimension").into());
    }

    let mut points = Vec::with_capacity(count);
    points.push(center.clamped_unit());

    if dim == 2 {
        // Ring of evenly spaced angles around the center.
        let ring = count - 1;
        for i in 0..ring {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / ring as f64;
            let offset = DesignPoint::new(vec![
                center.coords()[0] + radius * angle.cos(),
                center.coords()[1] + radius * angle.sin(),
            ]);
            points.push(offset.clamped_unit());
        }
    } else {
        // ± offsets along each axis in turn.
        for i in 0..count - 1 {
            let axis = (i / 2) % dim;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let mut coords = center.coords().to_vec();
            coords[axis] += sign * radius;
            points.push(DesignPoint::new(coords).clamped_unit());
        }
    }

    Ok(points)
}
