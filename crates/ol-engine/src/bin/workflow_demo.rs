//! End-to-end demo: full optimization loop against the simulated rig.
//!
//! ```text
//! OPTILOOP_NOISE_SIGMA=0.05 cargo run --bin ol-workflow
//! ```

use std::sync::Arc;

use ol_engine::{ChannelSink, SimulatedRig, WorkflowController};
use ol_types::WorkflowConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let noise_sigma = std::env::var("OPTILOOP_NOISE_SIGMA")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.1);

    let config = WorkflowConfig::new("demo_run")
        .with_design_space(2, 4)
        .with_refinement(5, 0.1);

    let (sink, mut events) = ChannelSink::new();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(payload) => info!(kind = event.kind(), %payload, "event"),
                Err(_) => info!(kind = event.kind(), "event"),
            }
        }
    });

    let mut controller = WorkflowController::new(
        config,
        Arc::new(SimulatedRig::new(noise_sigma)),
        Arc::new(sink),
    );
    let summary = controller.start().await?;

    info!(
        total_points = summary.total_points,
        r_squared = summary.r_squared,
        predicted_optimum = %summary.predicted_optimum,
        predicted_value = summary.predicted_value,
        "workflow finished"
    );
    if let (Some(point), Some(value)) =
        (&summary.experimental_optimum, summary.experimental_value)
    {
        info!(point = %point, value, "experimentally verified optimum");
    }

    // Dropping the controller drops the sink, which closes the event stream.
    drop(controller);
    reporter.await?;
    Ok(())
}
