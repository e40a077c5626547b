use serde::{Deserialize, Serialize};

/// A single candidate design in normalized coordinates.
///
/// Every coordinate lives in [0, 1]; the dimensionality is fixed for the
/// duration of a run. Points are immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignPoint {
    coords: Vec<f64>,
}

impl DesignPoint {
    pub fn new(coords: Vec<f64>) -> Self {
        Self { coords }
    }

    /// Number of design variables.
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Component-wise clamp into the unit hypercube.
    pub fn clamped_unit(&self) -> Self {
        Self {
            coords: self.coords.iter().map(|c| c.clamp(0.0, 1.0)).collect(),
        }
    }

    /// Euclidean distance to another point of the same dimensionality.
    pub fn distance(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f64>> for DesignPoint {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl std::fmt::Display for DesignPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c:.4}")?;
        }
        write!(f, ")")
    }
}

/// Per-dimension search bounds, `[low, high]` inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub dims: Vec<(f64, f64)>,
}

impl Bounds {
    /// The unit hypercube `[0, 1]^d`.
    pub fn unit(dim: usize) -> Self {
        Self {
            dims: vec![(0.0, 1.0); dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dims.len()
    }

    /// Midpoint of the box, used as the default optimizer start.
    pub fn center(&self) -> DesignPoint {
        DesignPoint::new(self.dims.iter().map(|(lo, hi)| (lo + hi) / 2.0).collect())
    }

    /// Clamp a point component-wise into the box.
    pub fn clamp(&self, point: &DesignPoint) -> DesignPoint {
        DesignPoint::new(
            point
                .coords()
                .iter()
                .zip(self.dims.iter())
                .map(|(c, (lo, hi))| c.clamp(*lo, *hi))
                .collect(),
        )
    }
}

/// Which workflow phase produced an observation.
///
/// Tagged explicitly on each observation so the DoE/refinement split never
/// depends on positional indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationPhase {
    Doe,
    Refinement,
}

/// A measured design point.
///
/// Append-only: once collected into a run's sequence an observation is never
/// mutated or removed. DoE observations always precede refinement ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub point: DesignPoint,
    pub measurement: f64,
    /// Order of collection across the whole run.
    pub index: usize,
    pub phase: ObservationPhase,
}

impl Observation {
    pub fn new(point: DesignPoint, measurement: f64, index: usize, phase: ObservationPhase) -> Self {
        Self {
            point,
            measurement,
            index,
            phase,
        }
    }
}
