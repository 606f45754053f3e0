//! Tick driver lifecycle.

use dialflow_engine::prelude::*;
use dialflow_engine::sink::mock::RecordingOutputSink;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_driver_emits_tokens_and_stops() {
    let output = Arc::new(RecordingOutputSink::new());
    let engine = Arc::new(DialEngine::default().with_output_sink(output.clone()));
    engine.impulse("Scroll", 40.0, Direction::Clockwise);

    let driver = TickDriver::spawn(Arc::clone(&engine), Duration::from_millis(5));
    assert!(driver.is_running());

    tokio::time::sleep(Duration::from_millis(200)).await;
    driver.stop().await;
    assert!(!driver.is_running());
    assert!(!output.is_empty());

    // Stopped: no further ticks reach the wheel.
    let settled = engine.wheel_state("Scroll");
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(engine.wheel_state("Scroll"), settled);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let engine = Arc::new(DialEngine::default());
    let driver = TickDriver::spawn(engine, Duration::from_millis(16));
    driver.stop().await;
    driver.stop().await;
    assert!(!driver.is_running());
}

#[tokio::test]
async fn test_zero_period_is_clamped() {
    let engine = Arc::new(DialEngine::default());
    let driver = TickDriver::spawn(engine, Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(driver.is_running());
    driver.stop().await;
}
