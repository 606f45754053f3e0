//! Session orchestration: decoding, wheel routing and token emission.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::sink::{EventSink, OutputSink, ReportSource};
use dialflow_physics::{
    Direction, DirectionToken, ImpulseEmitter, TickOutcome, TokenMode, TuningHandle,
    TuningParameters, WheelPhysics, WheelSnapshot,
};
use dialflow_report::{
    ButtonAction, DecodedReport, DecoderConfig, DecoderState, Event, Report, ScrollDirection,
    decode,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Physics and emitter of one named wheel.
#[derive(Debug, Default)]
struct WheelChannel {
    physics: WheelPhysics,
    emitter: ImpulseEmitter,
}

/// One token produced by a tick, tagged with its wheel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedToken {
    /// Wheel that produced the token.
    pub wheel: String,
    /// The token.
    pub token: DirectionToken,
}

/// Snapshot of the engine for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    /// Whether a device session is open.
    pub connected: bool,
    /// Reports decoded in the current session.
    pub report_count: u64,
    /// Current tuning.
    pub tuning: TuningParameters,
    /// Number of tuning updates so far.
    pub tuning_version: u64,
    /// Token vocabulary for new tokens.
    pub mode: TokenMode,
    /// Wheels currently in motion, sorted by name.
    pub active_wheels: Vec<String>,
}

/// Maps a device scroll direction onto a wheel rotation.
pub fn rotation_of(direction: ScrollDirection) -> Direction {
    match direction {
        ScrollDirection::Up => Direction::Clockwise,
        ScrollDirection::Down => Direction::CounterClockwise,
    }
}

/// Dial pad session engine.
///
/// Decode calls are serialized through one lock around the decoder session.
/// Wheels are created on their first impulse and each sits behind its own
/// lock, so ticking one wheel never waits on another.
pub struct DialEngine {
    decoder: Mutex<DecoderState>,
    config: RwLock<Arc<DecoderConfig>>,
    wheels: RwLock<HashMap<String, Arc<Mutex<WheelChannel>>>>,
    tuning: TuningHandle,
    mode: RwLock<TokenMode>,
    mode_toggle_button: RwLock<Option<String>>,
    connected: AtomicBool,
    event_sink: Option<Arc<dyn EventSink>>,
    output_sink: Option<Arc<dyn OutputSink>>,
}

impl std::fmt::Debug for DialEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialEngine")
            .field("connected", &self.is_connected())
            .field("wheels", &self.wheels.read().len())
            .field("tuning", &self.tuning.snapshot())
            .finish_non_exhaustive()
    }
}

impl Default for DialEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DialEngine {
    /// Create an engine. No device session is open until [`connect`](Self::connect).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            decoder: Mutex::new(DecoderState::new()),
            config: RwLock::new(Arc::new(config.decoder)),
            wheels: RwLock::new(HashMap::new()),
            tuning: TuningHandle::new(config.tuning),
            mode: RwLock::new(TokenMode::Primary),
            mode_toggle_button: RwLock::new(config.mode_toggle_button),
            connected: AtomicBool::new(false),
            event_sink: None,
            output_sink: None,
        }
    }

    /// Publish every decoded report to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Dispatch every emitted token to `sink`.
    #[must_use]
    pub fn with_output_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.output_sink = Some(sink);
        self
    }

    /// Open a device session with fresh decoder and wheel state.
    pub fn connect(&self) {
        self.reset_session();
        self.connected.store(true, Ordering::Release);
        tracing::info!("Device session opened");
    }

    /// Close the device session. Decoder state is dropped and every wheel is
    /// brought to rest; wheels stay registered.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        self.reset_session();
        tracing::info!("Device session closed");
    }

    /// Whether a device session is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn reset_session(&self) {
        self.decoder.lock().reset();
        for channel in self.wheels.read().values() {
            let mut channel = channel.lock();
            channel.physics.reset();
            channel.emitter.reset();
        }
    }

    /// Decode a report captured now.
    ///
    /// # Errors
    ///
    /// See [`process_report_at`](Self::process_report_at).
    pub fn process_report(&self, report: &Report) -> EngineResult<DecodedReport> {
        self.process_report_at(report, Instant::now())
    }

    /// Decode a report, feed its scroll events to the wheels and publish it.
    ///
    /// A press of the configured mode toggle button switches the token mode.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disconnected`] outside a session. A report whose
    /// length differs from the previous one returns [`EngineError::Decode`]
    /// and restarts the decoder session.
    pub fn process_report_at(&self, report: &Report, now: Instant) -> EngineResult<DecodedReport> {
        if !self.is_connected() {
            return Err(EngineError::Disconnected);
        }

        let config = Arc::clone(&self.config.read());
        let decoded = {
            let mut state = self.decoder.lock();
            match decode(report, &config, &mut state) {
                Ok(decoded) => decoded,
                Err(err) => {
                    state.reset();
                    tracing::warn!(error = %err, "Decoder session restarted");
                    return Err(err.into());
                }
            }
        };

        let toggle_button = self.mode_toggle_button.read().clone();
        for event in &decoded.events {
            match event {
                Event::Scroll {
                    name,
                    direction,
                    magnitude,
                    ..
                } => {
                    self.impulse_at(name, f64::from(*magnitude), rotation_of(*direction), now);
                }
                Event::Button {
                    name,
                    action: ButtonAction::Press,
                    ..
                } if toggle_button.as_deref() == Some(name.as_str()) => {
                    let mode = self.toggle_mode();
                    tracing::info!(button = %name, ?mode, "Token mode toggled");
                }
                _ => {}
            }
        }

        tracing::debug!(
            count = decoded.count,
            events = decoded.events.len(),
            hex = %decoded.hex,
            "Report decoded"
        );

        if let Some(sink) = &self.event_sink {
            sink.publish(&decoded);
        }
        Ok(decoded)
    }

    /// Read one report from `source` and process it.
    ///
    /// Returns `Ok(None)` when the source had nothing within `timeout`.
    ///
    /// # Errors
    ///
    /// Source errors and the errors of [`process_report`](Self::process_report).
    pub fn poll_source(
        &self,
        source: &mut dyn ReportSource,
        timeout: Duration,
    ) -> EngineResult<Option<DecodedReport>> {
        match source.read_report(timeout)? {
            Some(report) => self.process_report(&report).map(Some),
            None => Ok(None),
        }
    }

    fn channel(&self, wheel: &str) -> Arc<Mutex<WheelChannel>> {
        if let Some(channel) = self.wheels.read().get(wheel) {
            return Arc::clone(channel);
        }
        let mut wheels = self.wheels.write();
        // Read under the registry lock so a concurrent mode switch either
        // sees this wheel or has already stored its mode.
        let mode = *self.mode.read();
        let channel = wheels.entry(wheel.to_string()).or_insert_with(|| {
            tracing::debug!(wheel, "Wheel registered");
            let mut channel = WheelChannel::default();
            channel.emitter.set_mode(mode);
            Arc::new(Mutex::new(channel))
        });
        Arc::clone(channel)
    }

    /// Apply a rotation impulse to `wheel` now.
    pub fn impulse(&self, wheel: &str, amount: f64, direction: Direction) -> bool {
        self.impulse_at(wheel, amount, direction, Instant::now())
    }

    /// Apply a rotation impulse to `wheel`, creating the wheel if needed.
    ///
    /// Returns `true` if the wheel started moving.
    pub fn impulse_at(&self, wheel: &str, amount: f64, direction: Direction, now: Instant) -> bool {
        let tuning = self.tuning.snapshot();
        let channel = self.channel(wheel);
        let started = channel
            .lock()
            .physics
            .on_impulse(amount, direction, &tuning, now);
        if started {
            tracing::debug!(wheel, amount, ?direction, "Wheel started");
        }
        started
    }

    /// Advance every wheel by one tick now.
    pub fn tick(&self) -> Vec<EmittedToken> {
        self.tick_at(Instant::now())
    }

    /// Advance every wheel by one tick and emit tokens for their movement.
    ///
    /// Tuning is read once, so every wheel in this tick sees the same values.
    pub fn tick_at(&self, now: Instant) -> Vec<EmittedToken> {
        let tuning = self.tuning.snapshot();
        let channels: Vec<(String, Arc<Mutex<WheelChannel>>)> = self
            .wheels
            .read()
            .iter()
            .map(|(name, channel)| (name.clone(), Arc::clone(channel)))
            .collect();

        let mut emitted = Vec::new();
        for (wheel, channel) in channels {
            let tokens = {
                let mut channel = channel.lock();
                match channel.physics.tick(&tuning, now) {
                    TickOutcome::Advanced { position, .. } => channel.emitter.observe(position),
                    TickOutcome::Settled => {
                        tracing::debug!(wheel = %wheel, "Wheel settled");
                        Vec::new()
                    }
                    TickOutcome::Idle => Vec::new(),
                }
            };
            emitted.extend(tokens.into_iter().map(|token| EmittedToken {
                wheel: wheel.clone(),
                token,
            }));
        }

        if let Some(sink) = &self.output_sink {
            for item in &emitted {
                sink.emit(&item.wheel, item.token);
            }
        }
        emitted
    }

    /// Feed an externally computed position to a wheel's emitter.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NonFinitePosition`] for NaN or infinite input.
    pub fn observe(&self, wheel: &str, position: f64) -> EngineResult<Vec<DirectionToken>> {
        if !position.is_finite() {
            return Err(EngineError::NonFinitePosition(position));
        }
        let tokens = self.channel(wheel).lock().emitter.observe(position);
        if let Some(sink) = &self.output_sink {
            for token in &tokens {
                sink.emit(wheel, *token);
            }
        }
        Ok(tokens)
    }

    /// Replace the decoder mapping. Session state and scroll positions persist.
    pub fn update_config(&self, config: DecoderConfig) {
        *self.config.write() = Arc::new(config);
        tracing::info!("Decoder mapping replaced");
    }

    /// Apply mapping, tuning and toggle button from an engine configuration.
    pub fn apply_config(&self, config: &EngineConfig) {
        self.update_config(config.decoder.clone());
        self.tuning.set(config.tuning);
        *self.mode_toggle_button.write() = config.mode_toggle_button.clone();
    }

    /// Current decoder mapping.
    pub fn decoder_config(&self) -> Arc<DecoderConfig> {
        Arc::clone(&self.config.read())
    }

    /// Update friction and/or sensitivity. Takes effect on the next tick.
    pub fn update_tuning(&self, friction: Option<f64>, sensitivity: Option<f64>) -> TuningParameters {
        self.tuning.update(friction, sensitivity)
    }

    /// Current tuning.
    pub fn tuning(&self) -> TuningParameters {
        self.tuning.snapshot()
    }

    /// Reset one wheel's physics and emitter.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownWheel`] if the wheel never received an
    /// impulse.
    pub fn reset_wheel(&self, wheel: &str) -> EngineResult<()> {
        let channel = self
            .wheels
            .read()
            .get(wheel)
            .cloned()
            .ok_or_else(|| EngineError::unknown_wheel(wheel))?;
        let mut channel = channel.lock();
        channel.physics.reset();
        channel.emitter.reset();
        tracing::debug!(wheel, "Wheel reset");
        Ok(())
    }

    /// Physics snapshot of one wheel.
    pub fn wheel_state(&self, wheel: &str) -> Option<WheelSnapshot> {
        let channel = self.wheels.read().get(wheel).cloned()?;
        let snapshot = channel.lock().physics.snapshot();
        Some(snapshot)
    }

    /// Set the token mode of every wheel.
    pub fn set_mode(&self, mode: TokenMode) {
        *self.mode.write() = mode;
        for channel in self.wheels.read().values() {
            channel.lock().emitter.set_mode(mode);
        }
    }

    /// Switch the token mode of every wheel. Returns the new mode.
    pub fn toggle_mode(&self) -> TokenMode {
        let mode = {
            let mut guard = self.mode.write();
            *guard = guard.toggled();
            *guard
        };
        for channel in self.wheels.read().values() {
            channel.lock().emitter.set_mode(mode);
        }
        mode
    }

    /// Current token mode.
    pub fn mode(&self) -> TokenMode {
        *self.mode.read()
    }

    /// Status snapshot.
    pub fn status(&self) -> EngineStatus {
        let (tuning_version, tuning) = self.tuning.versioned_snapshot();
        let mut active_wheels: Vec<String> = self
            .wheels
            .read()
            .iter()
            .filter(|(_, channel)| channel.lock().physics.is_running())
            .map(|(name, _)| name.clone())
            .collect();
        active_wheels.sort_unstable();

        EngineStatus {
            connected: self.is_connected(),
            report_count: self.decoder.lock().report_count(),
            tuning,
            tuning_version,
            mode: self.mode(),
            active_wheels,
        }
    }
}
