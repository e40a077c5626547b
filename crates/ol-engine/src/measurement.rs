//! Measurement acquisition boundary.
//!
//! The engine never talks to a transport directly: it consumes a
//! [`MeasurementSource`] that yields one scalar per design point. The
//! remote tool-invocation shape (`invoke(tool, parameters)`) is captured by
//! [`ToolTransport`], and [`ToolMeasurementSource`] adapts any such
//! transport into a measurement source. [`SimulatedRig`] is a fully
//! in-process source for demos and tests.

use async_trait::async_trait;
use ol_types::{DesignPoint, OlError, OlResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::sync::Mutex;
use tracing::debug;

/// Per-point measurement acquisition.
///
/// Invoked one point at a time, sequentially with respect to the controller.
/// Any failure aborts the current workflow phase.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Obtain a (possibly noisy) scalar measurement at a design point.
    async fn measure(&self, point: &DesignPoint) -> OlResult<f64>;

    /// Human-readable source name.
    fn name(&self) -> &str;
}

/// Remote-procedure boundary: a tool name plus named parameters, returning a
/// JSON value or a failure. Timeouts and retries are the transport's
/// responsibility; the engine treats any failure as a failed measurement.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn invoke(&self, tool: &str, parameters: serde_json::Value) -> OlResult<serde_json::Value>;
}

/// Adapts a [`ToolTransport`] into a [`MeasurementSource`] by invoking the
/// measurement tool with the point's coordinates.
pub struct ToolMeasurementSource<T> {
    transport: T,
    tool_name: String,
}

impl<T: ToolTransport> ToolMeasurementSource<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            tool_name: "collect_measurement".to_string(),
        }
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }
}

#[async_trait]
impl<T: ToolTransport> MeasurementSource for ToolMeasurementSource<T> {
    async fn measure(&self, point: &DesignPoint) -> OlResult<f64> {
        let parameters = serde_json::json!({ "design_variables": point.coords() });
        let value = self.transport.invoke(&self.tool_name, parameters).await?;

        // Tolerate sources that return the number as a JSON string.
        match &value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| OlError::Internal(format!("non-finite measurement: {n}"))),
            serde_json::Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| OlError::Internal(format!("unparseable measurement: {s:?}"))),
            other => Err(OlError::Internal(format!(
                "unexpected measurement payload: {other}"
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.tool_name
    }
}

/// In-process measurement rig simulating a data-collection robot.
///
/// The true response is a known quadratic bowl; Gaussian sensor noise is
/// added on top. The noise RNG is owned here and shared with nothing else,
/// so the algorithm components stay deterministic.
pub struct SimulatedRig {
    noise_sigma: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedRig {
    pub fn new(noise_sigma: f64) -> Self {
        Self {
            noise_sigma,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeded rig for reproducible runs.
    pub fn with_seed(noise_sigma: f64, seed: u64) -> Self {
        Self {
            noise_sigma,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Zero-noise rig; measurements equal the true response exactly.
    pub fn noiseless() -> Self {
        Self::new(0.0)
    }

    /// The rig's true (unknown to the workflow) response surface.
    ///
    /// For two variables: 0.5·(x1−0.5)² + 0.8·(x2−0.7)² + x1·x2. Other
    /// dimensionalities get the analogous bowl with centers and weights
    /// alternating between (0.5, 0.5) and (0.7, 0.8), plus the same first
    /// cross term when there are at least two variables.
    pub fn true_response(coords: &[f64]) -> f64 {
        let mut value = 0.0;
        for (i, &x) in coords.iter().enumerate() {
            let (center, weight) = if i % 2 == 0 { (0.5, 0.5) } else { (0.7, 0.8) };
            value += weight * (x - center) * (x - center);
        }
        if coords.len() >= 2 {
            value += coords[0] * coords[1];
        }
        value
    }
}

#[async_trait]
impl MeasurementSource for SimulatedRig {
    async fn measure(&self, point: &DesignPoint) -> OlResult<f64> {
        let mut value = Self::true_response(point.coords());
        if self.noise_sigma > 0.0 {
            let normal = Normal::new(0.0, self.noise_sigma)
                .map_err(|e| OlError::Internal(format!("invalid noise distribution: {e}")))?;
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| OlError::Internal("rig RNG lock poisoned".to_string()))?;
            value += normal.sample(&mut *rng);
        }
        debug!(point = %point, value, "simulated measurement");
        Ok(value)
    }

    fn name(&self) -> &str {
        "simulated_rig"
    }
}
