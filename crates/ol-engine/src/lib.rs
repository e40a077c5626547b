//! OptiLoop workflow engine.
//!
//! Drives the closed-loop optimization sequence: full-factorial DoE,
//! per-point measurement through an external source, response-surface
//! fitting, gradient search, and local refinement. The controller owns the
//! run state and reports progress through a fire-and-forget event sink.

pub mod controller;
pub mod measurement;
pub mod reporting;

pub use controller::{CancelHandle, WorkflowController};
pub use measurement::{MeasurementSource, SimulatedRig, ToolMeasurementSource, ToolTransport};
pub use reporting::{ChannelSink, EventSink, NullSink, TracingSink};
