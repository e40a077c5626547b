//! # ol-algo
//!
//! Pure algorithm components for the OptiLoop workflow: full-factorial
//! design generation, quadratic response-surface fitting, gradient-based
//! optimization over the fitted surface, and local refinement sampling.
//!
//! Every function here is deterministic over its explicit inputs and holds
//! no state; the workflow controller in `ol-engine` owns all sequencing.

mod doe;
mod optimizer;
mod refine;
mod surface;

pub use doe::full_factorial;
pub use optimizer::{minimize, OptimizerSettings};
pub use refine::refinement_points;
pub use surface::fit;
