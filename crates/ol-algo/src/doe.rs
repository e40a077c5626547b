//! Full-factorial Design of Experiments generation.

use ol_types::{AlgoError, DesignPoint, OlResult};

/// Generate a full-factorial grid in the unit hypercube.
///
/// Produces the Cartesian product of `num_levels` equally spaced values in
/// [0, 1] (both endpoints included) across `num_variables` dimensions,
/// `num_levels^num_variables` points in total. The last dimension varies
/// fastest, so enumeration is row-major over the grid and deterministic.
pub fn full_factorial(num_variables: usize, num_levels: usize) -> OlResult<Vec<DesignPoint>> {
    if num_variables < 1 {
        return Err(AlgoError::invalid_parameters("num_variables must be >= 1").into());
    }
    if num_levels < 2 {
        return Err(AlgoError::invalid_parameters("num_levels must be >= 2").into());
    }

    let total = num_levels
        .checked_pow(num_variables as u32)
        .ok_or_else(|| {
            AlgoError::invalid_parameters(format!(
                "grid of {num_levels}^{num_variables} points overflows"
            ))
        })?;

    let levels: Vec<f64> = (0..num_levels)
        .map(|i| i as f64 / (num_levels - 1) as f64)
        .collect();

    // Cartesian product, one axis at a time (last axis ends up fastest).
    let mut points: Vec<Vec<f64>> = vec![Vec::with_capacity(num_variables)];
    for _ in 0..num_variables {
        let mut next = Vec::with_capacity(points.len() * num_levels);
        for existing in &points {
            for &level in &levels {
                let mut coords = existing.clone();
                coords.push(level);
                next.push(coords);
            }
        }
        points = next;
    }

    debug_assert_eq!(points.len(), total);
    Ok(points.into_iter().map(DesignPoint::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ol_types::OlError;

    #[test]
    fn produces_levels_pow_variables_points() {
        for (vars, levels) in [(1, 2), (2, 4), (3, 3), (4, 2)] {
            let points = full_factorial(vars, levels).unwrap();
            assert_eq!(points.len(), levels.pow(vars as u32));
            assert!(points.iter().all(|p| p.dim() == vars));
        }
    }

    #[test]
    fn all_coordinates_in_unit_range() {
        let points = full_factorial(3, 5).unwrap();
        for point in &points {
            for &c in point.coords() {
                assert!((0.0..=1.0).contains(&c), "coordinate out of range: {c}");
            }
        }
    }

    #[test]
    fn first_all_zeros_last_all_ones() {
        let points = full_factorial(2, 4).unwrap();
        assert_eq!(points.first().unwrap().coords(), &[0.0, 0.0]);
        assert_eq!(points.last().unwrap().coords(), &[1.0, 1.0]);
    }

    #[test]
    fn last_dimension_varies_fastest() {
        let points = full_factorial(2, 2).unwrap();
        let coords: Vec<&[f64]> = points.iter().map(|p| p.coords()).collect();
        assert_eq!(
            coords,
            vec![
                &[0.0, 0.0][..],
                &[0.0, 1.0][..],
                &[1.0, 0.0][..],
                &[1.0, 1.0][..]
            ]
        );
    }

    #[test]
    fn no_duplicate_points() {
        let points = full_factorial(2, 4).unwrap();
        for (i, a) in points.iter().enumerate() {
            for b in points.iter().skip(i + 1) {
                assert_ne!(a, b, "duplicate point in grid");
            }
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        for (vars, levels) in [(0, 4), (2, 1), (2, 0)] {
            match full_factorial(vars, levels) {
                Err(OlError::Algo(AlgoError::InvalidParameters { .. })) => (),
                other => panic!("expected InvalidParameters, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_overflowing_grid() {
        match full_factorial(64, 1000) {
            Err(OlError::Algo(AlgoError::InvalidParameters { .. })) => (),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
    }
}
