//! Link driver: state machine plus transmission scheduler
//!
//! One tokio task owns the transport, the parameters, and the mapper, and
//! multiplexes four inputs: transport events, control commands, the
//! periodic send tick, and the active reconnect deadline. Reconnection is a
//! phased sequence of bounded waits inside the same loop, so events and
//! commands keep flowing while an attempt is pending.

use std::time::Duration;

use glam::Vec3;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use feltsight_core::frame;
use feltsight_core::mapper::CommandMapper;
use feltsight_core::params::ControlParameters;

use crate::command::{LinkCommand, LinkHandle};
use crate::config::LinkConfig;
use crate::health::HealthCounters;
use crate::state::LinkState;
use crate::transport::{
    CharacteristicProperty, EventReceiver, Peripheral, Transport, TransportEvent,
    COMMAND_SERVICE, NOTIFY_CHARACTERISTIC, WRITE_CHARACTERISTIC,
};
use crate::velocity::VelocitySource;

/// Pause between stopping a stale scan and rescanning, and between failed
/// reconnect attempts.
const RECONNECT_STEP_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReconnectPhase {
    /// Direct connect to the previously-bound peripheral issued; waiting
    DirectWait,
    /// Stale scan stopped; short pause before rescanning
    PreScanPause,
    /// Fresh scan running; waiting for discovery + connection
    ScanWait,
    /// Attempt exhausted; short pause before the next one
    Backoff,
}

#[derive(Debug, Clone, Copy)]
struct ReconnectSequence {
    attempts: u32,
    phase: ReconnectPhase,
}

/// Owns one link session end to end.
pub struct LinkDriver<T: Transport, V: VelocitySource> {
    transport: T,
    events: EventReceiver,
    events_open: bool,
    commands: mpsc::UnboundedReceiver<LinkCommand>,
    status_tx: watch::Sender<String>,
    velocity: V,
    config: LinkConfig,
    params: ControlParameters,
    mapper: CommandMapper,
    state: LinkState,
    health: HealthCounters,
    bound_peripheral: Option<Peripheral>,
    write_char_bound: bool,
    reconnect: Option<ReconnectSequence>,
    reconnect_deadline: Option<Instant>,
}

impl<T: Transport, V: VelocitySource> LinkDriver<T, V> {
    /// Spawn the driver task and return its control handle.
    pub fn spawn(
        transport: T,
        events: EventReceiver,
        velocity: V,
        config: LinkConfig,
        params: ControlParameters,
    ) -> (LinkHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel("Initializing...".to_string());

        let driver = Self {
            transport,
            events,
            events_open: true,
            commands: command_rx,
            status_tx,
            velocity,
            config,
            params,
            mapper: CommandMapper::new(),
            state: LinkState::Idle,
            health: HealthCounters::new(Instant::now()),
            bound_peripheral: None,
            write_char_bound: false,
            reconnect: None,
            reconnect_deadline: None,
        };

        let handle = LinkHandle::new(command_tx, status_rx);
        let task = tokio::spawn(driver.run());
        (handle, task)
    }

    async fn run(mut self) {
        let mut send_timer = tokio::time::interval(self.config.send_interval());
        send_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            "Link driver started (targets: {:?}, interval {:?})",
            self.config.target_names(),
            self.config.send_interval()
        );

        loop {
            tokio::select! {
                event = self.events.recv(), if self.events_open => {
                    match event {
                        Some(event) => self.on_transport_event(event),
                        None => {
                            warn!("Transport event stream closed");
                            self.events_open = false;
                        }
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        Some(LinkCommand::Stop) | None => break,
                        Some(command) => self.on_command(command),
                    }
                }
                _ = send_timer.tick(), if self.state.can_transmit() => {
                    self.transmit_tick();
                }
                _ = wait_deadline(self.reconnect_deadline), if self.reconnect_deadline.is_some() => {
                    self.advance_reconnect();
                }
            }
        }

        // Single explicit stop: halt scanning and any reconnect sequence,
        // then release the transport handle by dropping it.
        let _ = self.transport.stop_scan();
        self.reconnect = None;
        self.reconnect_deadline = None;
        info!("Link driver stopped");
    }

    // ---- status -----------------------------------------------------------

    fn set_state(&mut self, state: LinkState) {
        self.state = state;
        self.publish_status(state.to_string());
    }

    fn set_state_with(&mut self, state: LinkState, status: String) {
        self.state = state;
        self.publish_status(status);
    }

    fn publish_status(&self, status: String) {
        debug!("Link status: {}", status);
        let _ = self.status_tx.send(status);
    }

    // ---- transport events -------------------------------------------------

    fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PoweredOn => self.on_powered_on(),
            TransportEvent::Discovered(peripheral) => self.on_discovered(peripheral),
            TransportEvent::Connected(peripheral) => self.on_connected(peripheral),
            TransportEvent::ServiceDiscovered { service } => self.on_service_discovered(service),
            TransportEvent::CharacteristicDiscovered {
                characteristic,
                properties,
            } => self.on_characteristic_discovered(characteristic, &properties),
            TransportEvent::Notification {
                characteristic,
                payload,
            } => {
                trace!(
                    "Telemetry notification on {} ({} bytes)",
                    characteristic,
                    payload.len()
                );
            }
        }
    }

    fn on_powered_on(&mut self) {
        // Duplicate power-on events while already scanning or connected are
        // ignored, and a reconnect sequence keeps control of scanning.
        if self.state != LinkState::Idle || self.reconnect.is_some() {
            return;
        }
        info!("Radio powered on, starting scan");
        self.start_scan();
    }

    fn on_discovered(&mut self, peripheral: Peripheral) {
        if self.state != LinkState::Scanning {
            return;
        }

        if !peripheral.name.is_empty() {
            debug!("Device discovered: {}", peripheral.name);
        }

        if !self.config.matches_device(&peripheral.name) {
            return;
        }

        info!("Target device found: {}", peripheral.name);
        if let Err(e) = self.transport.stop_scan() {
            warn!("Failed to stop scan: {}", e);
        }
        self.set_state_with(
            LinkState::Connecting,
            format!("Connecting to: {}", peripheral.name),
        );
        if let Err(e) = self.transport.connect(&peripheral) {
            warn!("Failed to initiate connection: {}", e);
        }
    }

    fn on_connected(&mut self, peripheral: Peripheral) {
        // Accepted while a connection is pending, including the direct
        // phase of a reconnect. Duplicates past that point are ignored.
        if self.state != LinkState::Connecting && self.state != LinkState::Reconnecting {
            return;
        }

        info!("Connected to device: {}", peripheral.name);
        self.set_state_with(
            LinkState::ServiceDiscovery,
            format!("Connected: {}", peripheral.name),
        );
        self.bound_peripheral = Some(peripheral);

        if let Err(e) = self.transport.discover_services() {
            warn!("Failed to start service discovery: {}", e);
        }
    }

    fn on_service_discovered(&mut self, service: uuid::Uuid) {
        if self.state != LinkState::ServiceDiscovery {
            return;
        }
        if service != COMMAND_SERVICE {
            debug!("Ignoring unrelated service {}", service);
            return;
        }
        if let Err(e) = self.transport.discover_characteristics(service) {
            warn!("Failed to start characteristic discovery: {}", e);
        }
    }

    fn on_characteristic_discovered(
        &mut self,
        characteristic: uuid::Uuid,
        properties: &[CharacteristicProperty],
    ) {
        if characteristic == WRITE_CHARACTERISTIC {
            if self.state != LinkState::ServiceDiscovery {
                return;
            }
            info!("Write characteristic found, link ready");
            self.write_char_bound = true;
            self.enter_ready();
        } else if characteristic == NOTIFY_CHARACTERISTIC {
            if properties.contains(&CharacteristicProperty::Notify) {
                if let Err(e) = self.transport.subscribe(characteristic) {
                    warn!("Failed to subscribe to telemetry: {}", e);
                }
            }
        } else {
            debug!("Ignoring unrelated characteristic {}", characteristic);
        }
    }

    fn enter_ready(&mut self) {
        self.health = HealthCounters::new(Instant::now());
        self.reconnect = None;
        self.reconnect_deadline = None;
        self.set_state(LinkState::Ready);
    }

    // ---- commands ---------------------------------------------------------

    fn on_command(&mut self, command: LinkCommand) {
        match command {
            LinkCommand::SetMultiplier(multiplier) => {
                self.params.set_multiplier(multiplier);
                // Control changes are felt immediately, not on the next tick
                self.send_now();
            }
            LinkCommand::SetVelocityThresholds { min, max } => {
                self.params.set_velocity_thresholds(min, max);
            }
            LinkCommand::SetMuteThreshold(threshold) => {
                self.params.set_mute_threshold(threshold);
            }
            LinkCommand::SetNormalVolume(volume) => {
                self.params.set_normal_volume(volume);
            }
            LinkCommand::SetVectorFilterEnabled(enabled) => {
                self.params.set_vector_filter_enabled(enabled);
            }
            LinkCommand::SetMagnitudeFilterEnabled(enabled) => {
                self.params.set_magnitude_filter_enabled(enabled);
            }
            LinkCommand::SetFilterStrength(strength) => {
                self.params.set_filter_strength(strength);
                self.send_now();
            }
            LinkCommand::SetFailureThreshold(threshold) => {
                self.config.failure_threshold = threshold.max(1);
                debug!("Failure threshold set to {}", self.config.failure_threshold);
            }
            LinkCommand::SetAutoReconnect(enabled) => {
                self.config.auto_reconnect = enabled;
                debug!(
                    "Auto reconnect {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            LinkCommand::ResetFilters => {
                self.mapper.reset_filters();
                debug!("All filters reset");
            }
            LinkCommand::Reconnect => self.on_manual_reconnect(),
            LinkCommand::SendNow => self.send_now(),
            // Stop is consumed by the run loop
            LinkCommand::Stop => {}
        }
    }

    fn on_manual_reconnect(&mut self) {
        info!("Manual reconnect triggered");
        self.write_char_bound = false;
        self.publish_status("Manual Reconnect Triggered...".to_string());
        self.start_reconnect();
    }

    // ---- transmission -----------------------------------------------------

    fn transmit_tick(&mut self) {
        self.transmit_once();
        self.check_link_health();
    }

    /// Single guarded send outside the periodic cadence.
    fn send_now(&mut self) {
        if !self.state.can_transmit() {
            warn!("Link not ready, cannot send ({})", self.state);
            return;
        }
        self.transmit_once();
    }

    fn transmit_once(&mut self) {
        let now = Instant::now();
        let raw = self.velocity.latest().unwrap_or(Vec3::ZERO);
        let levels = self.mapper.map(raw, &self.params);
        let payload = frame::encode(levels.speed_byte, levels.volume_byte);

        if !self.write_char_bound {
            warn!("Write characteristic not available, counting failure");
            self.health.record_failure();
            return;
        }

        match self.transport.write(WRITE_CHARACTERISTIC, &payload) {
            Ok(()) => {
                self.health.record_success(now);
                debug!(
                    "Frame sent ({:.1}x, volume {}%): {}",
                    levels.playback_rate(),
                    levels.volume_byte,
                    hex::encode_upper(payload)
                );
            }
            Err(e) => {
                // Recoverable telemetry; the health counters decide when the
                // link is actually gone.
                warn!("Failed to send frame: {}", e);
                self.health.record_failure();
            }
        }
    }

    fn check_link_health(&mut self) {
        if self.state != LinkState::Ready {
            return;
        }

        let now = Instant::now();
        if !self.health.link_lost(
            now,
            self.config.send_interval(),
            self.config.failure_threshold(),
        ) {
            return;
        }

        warn!(
            "Connection appears to be lost: {} consecutive failures, {:.1}s since last successful send",
            self.health.consecutive_failures(),
            self.health.silence(now).as_secs_f32()
        );

        if self.config.auto_reconnect {
            self.set_state_with(
                LinkState::Degraded,
                "Connection Lost, Reconnecting...".to_string(),
            );
            self.start_reconnect();
        } else {
            self.set_state(LinkState::Degraded);
        }
    }

    // ---- reconnect sequence -----------------------------------------------

    /// Start a fresh reconnect sequence, superseding any in-flight one.
    fn start_reconnect(&mut self) {
        self.reconnect = Some(ReconnectSequence {
            attempts: 0,
            phase: ReconnectPhase::Backoff,
        });
        self.begin_reconnect_attempt();
    }

    fn begin_reconnect_attempt(&mut self) {
        let Some(sequence) = self.reconnect.as_mut() else {
            return;
        };

        let cap = self.config.max_reconnect_attempts;
        if cap > 0 && sequence.attempts >= cap {
            info!("Maximum reconnect attempts ({}) reached, giving up", cap);
            self.reconnect = None;
            self.reconnect_deadline = None;
            self.set_state_with(
                LinkState::Degraded,
                format!("Reconnect Failed: Max attempts reached ({})", cap),
            );
            return;
        }

        sequence.attempts += 1;
        let attempt = sequence.attempts;
        info!("Reconnect attempt {}", attempt);
        self.set_state_with(
            LinkState::Reconnecting,
            format!("Reconnecting (Attempt {})...", attempt),
        );

        if let Some(peripheral) = self.bound_peripheral.clone() {
            debug!("Trying direct reconnect to {}", peripheral.name);
            if let Err(e) = self.transport.connect(&peripheral) {
                warn!("Direct reconnect failed to start: {}", e);
            }
            self.set_reconnect_phase(ReconnectPhase::DirectWait, self.config.reconnect_interval());
        } else {
            // Never bound: go straight to a clean rescan
            let _ = self.transport.stop_scan();
            self.set_reconnect_phase(ReconnectPhase::PreScanPause, RECONNECT_STEP_PAUSE);
        }
    }

    fn set_reconnect_phase(&mut self, phase: ReconnectPhase, wait: Duration) {
        if let Some(sequence) = self.reconnect.as_mut() {
            sequence.phase = phase;
            self.reconnect_deadline = Some(Instant::now() + wait);
        }
    }

    /// A reconnect deadline elapsed without the link reaching `Ready`.
    fn advance_reconnect(&mut self) {
        self.reconnect_deadline = None;
        let Some(sequence) = self.reconnect else {
            return;
        };

        match sequence.phase {
            ReconnectPhase::DirectWait => {
                debug!("Direct reconnect window elapsed, falling back to scan");
                let _ = self.transport.stop_scan();
                self.set_reconnect_phase(ReconnectPhase::PreScanPause, RECONNECT_STEP_PAUSE);
            }
            ReconnectPhase::PreScanPause => {
                self.start_scan();
                self.set_reconnect_phase(ReconnectPhase::ScanWait, self.config.reconnect_interval());
            }
            ReconnectPhase::ScanWait => {
                debug!("Scan window elapsed without connection");
                self.set_reconnect_phase(ReconnectPhase::Backoff, RECONNECT_STEP_PAUSE);
            }
            ReconnectPhase::Backoff => self.begin_reconnect_attempt(),
        }
    }

    fn start_scan(&mut self) {
        match self.transport.start_scan() {
            Ok(()) => self.set_state(LinkState::Scanning),
            Err(e) => {
                warn!("Failed to start scan: {}", e);
                self.publish_status(format!("Scan Failed: {}", e));
            }
        }
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
