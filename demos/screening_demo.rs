//! Demonstration of a complete screening session.
//!
//! This example shows how to:
//! 1. Create a simulated sample source
//! 2. Start a continuous inference session
//! 3. Receive per-tick inference results
//! 4. Finish the session with the local fallback merge
//! 5. Inspect the longitudinal record
//!
//! Run with: cargo run --example screening_demo
//!
//! No camera or network is needed; samples come from the built-in
//! simulation and the remote collaborator is left disabled.

use std::time::Duration;

use neuropath_engine::{
    config::EngineConfig,
    records::LongitudinalRecordStore,
    remote::RemoteError,
    session::ContinuousInferenceSession,
    source::SimulatedSource,
    SCREENING_DISCLAIMER,
};

#[tokio::main]
async fn main() {
    println!("NeuroPath Engine - Screening Demo");
    println!("=================================");
    println!();

    // Display screening disclaimer
    println!("{SCREENING_DISCLAIMER}");
    println!();

    // Create components
    let engine = EngineConfig {
        capacity: 100,
        min_to_score: 10,
        tick_interval: Duration::from_millis(50),
    };
    let source = Box::new(SimulatedSource::new(7, 50));
    let mut session = ContinuousInferenceSession::new(engine, source);

    println!("Running a 5 second screening session...");
    println!();

    // Start the session; results arrive in tick order
    let started = session.start(|result| {
        println!(
            "  score {:>4.1} (confidence {:.2}) [{}]",
            result.score,
            result.confidence,
            result.behavioral_tags.join(", ")
        );
    });
    if !started {
        eprintln!("Session could not start");
        return;
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    session.stop().await;

    println!();
    println!("Session stopped with {} samples", session.captured_samples().len());
    println!();

    // Finish locally; the merge falls back to the deterministic summary
    // when no remote collaborator is configured.
    let mut store = LongitudinalRecordStore::new();
    if let Some((result, record)) = session.finish(Err(RemoteError::Disabled), &mut store).await {
        println!("Final result");
        println!("  Score: {:.1} / 10", result.score);
        println!("  Confidence: {:.2}", result.confidence);
        println!("  Tags: {}", result.behavioral_tags.join(", "));
        println!("  Explanation: {}", result.explanation);
        println!();
        println!(
            "Recorded session {} at {} with {} samples",
            record.id,
            record.date.format("%Y-%m-%d %H:%M:%S"),
            record.features.len()
        );
    }

    session.dispose().await;
    println!();
    println!("Demo complete.");
}
