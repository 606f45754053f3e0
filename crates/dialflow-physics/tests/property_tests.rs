//! Property tests for the wheel model and emitter.

use dialflow_physics::prelude::*;
use std::time::Instant;

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Clockwise), Just(Direction::CounterClockwise)]
    }

    proptest! {
        #[test]
        fn tuning_always_in_range(friction in -1e6f64..1e6, sensitivity in -1e6f64..1e6) {
            let t = TuningParameters::new(friction, sensitivity);
            prop_assert!((5.0..=100.0).contains(&t.friction()));
            prop_assert!((1.0..=100.0).contains(&t.sensitivity()));
            prop_assert!((0.8..=0.99).contains(&t.decay_rate()));
            prop_assert!(t.acceleration_rate() > 0.0 && t.acceleration_rate() <= 0.5);
        }

        #[test]
        fn coasting_never_reverses(
            amount in 1u8..=128,
            dir in direction(),
            friction in 5.0f64..100.0,
            sensitivity in 1.0f64..100.0,
        ) {
            let tuning = TuningParameters::new(friction, sensitivity);
            let mut wheel = WheelPhysics::new();
            let start = Instant::now();
            wheel.on_impulse(f64::from(amount), dir, &tuning, start);

            let mut settled = false;
            for i in 1..=2_000u32 {
                match wheel.tick(&tuning, start + TICK_PERIOD * i) {
                    TickOutcome::Advanced { velocity, step, .. } => {
                        prop_assert!(velocity * dir.sign() > 0.0);
                        prop_assert!(step * dir.sign() > 0.0);
                    }
                    TickOutcome::Settled => {
                        settled = true;
                        break;
                    }
                    TickOutcome::Idle => prop_assert!(false, "idle before settling"),
                }
            }
            prop_assert!(settled);
        }

        #[test]
        fn emitter_keeps_residual_below_threshold(positions in prop::collection::vec(-1e4f64..1e4, 1..50)) {
            let mut emitter = ImpulseEmitter::new();
            let mut net = 0i64;
            for position in positions {
                for token in emitter.observe(position) {
                    net += if token.direction == Direction::Clockwise { 1 } else { -1 };
                }
                prop_assert!((position - emitter.last_emitted()).abs() < DEFAULT_THRESHOLD);
            }
            prop_assert!((emitter.last_emitted() - net as f64 * DEFAULT_THRESHOLD).abs() < 1e-6);
        }
    }
}
