//! Concurrency tests for the dial engine.

use dialflow_engine::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_concurrent_impulses_on_separate_wheels() {
    let engine = Arc::new(DialEngine::default());
    let mut handles = vec![];

    for i in 0..8 {
        let engine_clone = Arc::clone(&engine);
        let handle = thread::spawn(move || {
            let wheel = format!("wheel_{i}");
            for _ in 0..100 {
                engine_clone.impulse(&wheel, 5.0, Direction::Clockwise);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    assert_eq!(engine.status().active_wheels.len(), 8);
}

#[test]
fn test_ticks_race_with_impulses_and_tuning() {
    let engine = Arc::new(DialEngine::default());
    let start = Instant::now();
    engine.impulse_at("Scroll", 50.0, Direction::Clockwise, start);

    let ticker = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            let mut total = 0usize;
            for i in 1..=500u32 {
                total += engine.tick_at(start + TICK_PERIOD * i).len();
            }
            total
        })
    };
    let tuner = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 0..200u32 {
                engine.update_tuning(Some(f64::from(5 + i % 96)), Some(f64::from(1 + i % 100)));
            }
        })
    };
    let pusher = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..200 {
                engine.impulse_at("Jog", 3.0, Direction::CounterClockwise, start);
            }
        })
    };

    assert!(tuner.join().is_ok(), "Tuner thread should not panic");
    assert!(pusher.join().is_ok(), "Pusher thread should not panic");
    let ticked = ticker.join();
    assert!(ticked.is_ok(), "Ticker thread should not panic");

    let tuning = engine.tuning();
    assert!((5.0..=100.0).contains(&tuning.friction()));
    assert!((1.0..=100.0).contains(&tuning.sensitivity()));
    assert_eq!(engine.status().tuning_version, 200);
}

#[test]
fn test_concurrent_reports_are_serialized() -> TestResult {
    let engine = Arc::new(DialEngine::new(EngineConfig::mx_dialpad()));
    engine.connect();
    engine.process_report(&Report::new(0, vec![0u8; 8]))?;

    let mut handles = vec![];
    for t in 0..4u64 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let mut errors = 0;
            for i in 0..50u64 {
                let code = if i % 2 == 0 { 1 } else { 0 };
                let report = Report::new(t * 100 + i, vec![0, 0, 0, 0, 0, 0, code, 0]);
                if engine_clone.process_report(&report).is_err() {
                    errors += 1;
                }
            }
            errors
        }));
    }

    let mut errors = 0;
    for handle in handles {
        errors += handle.join().ok().ok_or("thread panicked")?;
    }

    assert_eq!(errors, 0);
    assert_eq!(engine.status().report_count, 201);
    Ok(())
}

#[test]
fn test_mode_toggle_under_contention() {
    let engine = Arc::new(DialEngine::default());
    engine.impulse("Scroll", 1.0, Direction::Clockwise);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..25 {
                    engine.toggle_mode();
                }
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    // 100 toggles in total.
    assert_eq!(engine.mode(), TokenMode::Primary);
    let tokens = engine.observe("Scroll", 10.0);
    assert!(matches!(
        tokens.as_deref(),
        Ok([DirectionToken { mode: TokenMode::Primary, .. }])
    ));
}

#[test]
fn test_wheels_created_during_mode_toggles_follow_final_mode() -> TestResult {
    let engine = Arc::new(DialEngine::default());

    let toggler = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..301 {
                engine.toggle_mode();
            }
        })
    };
    let creators: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    let wheel = format!("wheel_{t}_{i}");
                    assert!(matches!(engine.observe(&wheel, 0.0).as_deref(), Ok([])));
                }
            })
        })
        .collect();

    assert!(toggler.join().is_ok(), "Toggler thread should not panic");
    for handle in creators {
        assert!(handle.join().is_ok(), "Creator thread should not panic");
    }

    let mode = engine.mode();
    assert_eq!(mode, TokenMode::Alternate);
    for t in 0..4 {
        for i in 0..50 {
            let tokens = engine.observe(&format!("wheel_{t}_{i}"), 10.0)?;
            assert_eq!(tokens.len(), 1);
            assert!(tokens.iter().all(|token| token.mode == mode));
        }
    }
    Ok(())
}
