use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};

use super::doppler::FrequencyPlan;
use super::error::TrackerError;
use super::limits::{clamp, BelowHorizon, RotorLimits, UnwrapState};
use super::pass_monitor::PassMonitor;
use crate::endpoint::{FrequencyControl, Positioner};
use crate::ephemeris::{ObserverLocation, PositionSample, PositionSource, Target};

/// Where tick timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    System,
    /// Tick `n` is computed for `start + n * period`.
    Fixed(DateTime<Utc>),
}

impl Clock {
    fn timestamp(&self, tick: u64, period: Duration) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(start) => u32::try_from(tick)
                .ok()
                .and_then(|ticks| period.checked_mul(ticks))
                .and_then(|offset| chrono::Duration::from_std(offset).ok())
                .and_then(|offset| start.checked_add_signed(offset))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub observer: ObserverLocation,
    pub target: Target,
    pub period: Duration,
    pub clock: Clock,
    /// Added to every raw azimuth before limits apply (true vs. magnetic north).
    pub azimuth_offset_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerMode {
    Idle,
    Running,
    Stopped { ticks: u64 },
}

/// Rotor client plus the state carried between its commands.
pub struct RotorChannel<R> {
    client: R,
    limits: RotorLimits,
    below_horizon: BelowHorizon,
    unwrap: UnwrapState,
    target_up: bool,
}

impl<R: Positioner> RotorChannel<R> {
    pub fn new(client: R, limits: RotorLimits, below_horizon: BelowHorizon) -> Self {
        Self {
            client,
            limits,
            below_horizon,
            unwrap: UnwrapState::default(),
            target_up: false,
        }
    }

    async fn dispatch(&mut self, sample: &PositionSample, azimuth_offset_deg: f64) {
        let up = sample.elevation_deg >= 0.0;
        if up && !self.target_up {
            // New pass: leave a parked limit, taking the turn nearest the rotor.
            self.unwrap = self.unwrap.reacquire();
        }
        self.target_up = up;

        if !up && self.below_horizon == BelowHorizon::Skip {
            log::debug!("Target below horizon, rotor left in place");
            return;
        }

        let (command, unwrap) = clamp(
            sample.azimuth_deg + azimuth_offset_deg,
            sample.elevation_deg,
            &self.limits,
            self.unwrap,
        );
        self.unwrap = unwrap;

        if !self.client.is_connected() {
            if let Err(e) = self.client.connect().await {
                log::warn!("Rotor unavailable, retrying next tick: {}", e);
                return;
            }
            log::info!("Rotor connected");
        }

        match self
            .client
            .set_position(command.azimuth_deg, command.elevation_deg)
            .await
        {
            Ok(()) => log::debug!(
                "Rotor commanded to az {:.2} el {:.2} (unwrapped {:?})",
                command.azimuth_deg,
                command.elevation_deg,
                self.unwrap.continuous_deg()
            ),
            Err(e) => log::warn!("Rotor command failed: {}", e),
        }
    }
}

/// Radio client plus the frequency plan and optional AOS/LOS tracking.
pub struct RadioChannel<F> {
    client: F,
    plan: FrequencyPlan,
    pass_monitor: Option<PassMonitor>,
}

impl<F: FrequencyControl> RadioChannel<F> {
    pub fn new(client: F, plan: FrequencyPlan, pass_monitor: Option<PassMonitor>) -> Self {
        Self {
            client,
            plan,
            pass_monitor,
        }
    }

    async fn dispatch(&mut self, sample: &PositionSample) {
        if !self.client.is_connected() {
            if let Err(e) = self.client.connect().await {
                log::warn!("Radio unavailable, retrying next tick: {}", e);
                return;
            }
            log::info!("Radio connected");
        }

        let event = self
            .pass_monitor
            .as_mut()
            .and_then(|monitor| monitor.update(sample.elevation_deg));
        if let Some(event) = event {
            match self.client.announce(event).await {
                Ok(()) => log::info!("Sent {} to radio", event),
                Err(e) => {
                    log::warn!("Radio rejected {}: {}", event, e);
                    if !self.client.is_connected() {
                        return;
                    }
                }
            }
        }

        let frequency_hz = self.plan.target_hz(sample.radial_velocity_m_s);
        match self.client.set_frequency(frequency_hz).await {
            Ok(()) => log::info!(
                "Radio tuned to {:.0} Hz (shift {:+.1} Hz)",
                frequency_hz,
                frequency_hz - self.plan.rest_hz
            ),
            Err(e) => log::warn!("Radio tuning failed: {}", e),
        }
    }
}

/// Fixed-cadence tracking loop driving a rotor and/or a radio.
pub struct Tracker<S, R, F> {
    config: TrackerConfig,
    source: S,
    rotor: Option<RotorChannel<R>>,
    radio: Option<RadioChannel<F>>,
    mode: TrackerMode,
    ticks: u64,
}

impl<S, R, F> Tracker<S, R, F>
where
    S: PositionSource,
    R: Positioner,
    F: FrequencyControl,
{
    pub fn new(
        config: TrackerConfig,
        source: S,
        rotor: Option<RotorChannel<R>>,
        radio: Option<RadioChannel<F>>,
    ) -> Self {
        Self {
            config,
            source,
            rotor,
            radio,
            mode: TrackerMode::Idle,
            ticks: 0,
        }
    }

    pub fn mode(&self) -> &TrackerMode {
        &self.mode
    }

    /// Run until `stop_rx` fires (or its sender is dropped). The stop signal
    /// is honoured while waiting for the next tick.
    pub async fn run(&mut self, mut stop_rx: oneshot::Receiver<()>) -> Result<(), TrackerError> {
        if self.mode != TrackerMode::Idle {
            return Err(TrackerError::Stopped);
        }
        if self.rotor.is_none() && self.radio.is_none() {
            return Err(TrackerError::NothingToDrive);
        }

        self.mode = TrackerMode::Running;
        log::info!(
            "Tracking {} every {:?} from {:.4}, {:.4}",
            self.config.target,
            self.config.period,
            self.config.observer.latitude_deg,
            self.config.observer.longitude_deg
        );

        let period = self.config.period;
        let mut deadline = Instant::now();

        loop {
            let timestamp = self.config.clock.timestamp(self.ticks, period);
            self.tick(timestamp).await;
            self.ticks += 1;

            let Some(next) = deadline.checked_add(period) else {
                log::error!("Period {:?} cannot be scheduled, stopping", period);
                break;
            };
            deadline = next;
            let now = Instant::now();
            if now > deadline {
                log::warn!(
                    "Tick {} overran the {:?} period by {:?}, starting the next one now",
                    self.ticks,
                    period,
                    now - deadline
                );
            }

            let should_stop = tokio::select! {
                biased;
                _ = &mut stop_rx => true,
                _ = sleep_until(deadline) => false,
            };
            if should_stop {
                break;
            }
        }

        if let Some(rotor) = self.rotor.as_mut() {
            rotor.client.disconnect();
        }
        if let Some(radio) = self.radio.as_mut() {
            radio.client.disconnect();
        }
        self.mode = TrackerMode::Stopped { ticks: self.ticks };
        log::info!("Tracking stopped after {} ticks", self.ticks);
        Ok(())
    }

    async fn tick(&mut self, timestamp: DateTime<Utc>) {
        let sample = match self
            .source
            .sample(&self.config.observer, &self.config.target, timestamp)
        {
            Ok(sample) => sample,
            Err(e) => {
                log::error!("Skipping tick at {}: {}", timestamp, e);
                return;
            }
        };

        log::info!(
            "{} at {}: az {:.2}° el {:.2}° range {:.0} km radial {:+.1} m/s",
            self.config.target,
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            sample.azimuth_deg,
            sample.elevation_deg,
            sample.range_km,
            sample.radial_velocity_m_s
        );

        if let Some(radio) = self.radio.as_mut() {
            radio.dispatch(&sample).await;
        }
        if let Some(rotor) = self.rotor.as_mut() {
            rotor.dispatch(&sample, self.config.azimuth_offset_deg).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::radio::PassEvent;
    use crate::endpoint::error::EndpointError;
    use crate::ephemeris::{Body, Ephemeris, LookupError};
    use crate::tracker::doppler::corrected_frequency;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const PERIOD: Duration = Duration::from_secs(30);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap()
    }

    fn config() -> TrackerConfig {
        TrackerConfig {
            observer: ObserverLocation::new(40.0, -75.0, 0.0),
            target: Target::Body(Body::Moon),
            period: PERIOD,
            clock: Clock::Fixed(t0()),
            azimuth_offset_deg: 0.0,
        }
    }

    fn assert_elapsed(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "elapsed {:?}, expected {:?}",
            actual,
            expected
        );
    }

    /// Replays look angles; `None` entries fail the lookup.
    struct Script(Mutex<VecDeque<Option<(f64, f64)>>>);

    impl Script {
        fn new(entries: Vec<Option<(f64, f64)>>) -> Self {
            Self(Mutex::new(entries.into()))
        }
    }

    impl PositionSource for Script {
        fn sample(
            &self,
            _observer: &ObserverLocation,
            _target: &Target,
            timestamp: DateTime<Utc>,
        ) -> Result<PositionSample, LookupError> {
            match self.0.lock().unwrap().pop_front().flatten() {
                Some((azimuth_deg, elevation_deg)) => Ok(PositionSample {
                    timestamp,
                    azimuth_deg,
                    elevation_deg,
                    range_km: 384_400.0,
                    radial_velocity_m_s: 250.0,
                }),
                None => Err(LookupError::OutOfRange(timestamp)),
            }
        }
    }

    type Requests = Arc<Mutex<Vec<(DateTime<Utc>, Instant)>>>;

    /// Records every request and stops the loop after `limit` of them.
    struct Recording<S> {
        inner: S,
        limit: usize,
        requests: Requests,
        stop: Mutex<Option<oneshot::Sender<()>>>,
    }

    impl<S> Recording<S> {
        fn new(inner: S, limit: usize, stop: oneshot::Sender<()>) -> Self {
            Self {
                inner,
                limit,
                requests: Requests::default(),
                stop: Mutex::new(Some(stop)),
            }
        }
    }

    impl<S: PositionSource> PositionSource for Recording<S> {
        fn sample(
            &self,
            observer: &ObserverLocation,
            target: &Target,
            timestamp: DateTime<Utc>,
        ) -> Result<PositionSample, LookupError> {
            let count = {
                let mut requests = self.requests.lock().unwrap();
                requests.push((timestamp, Instant::now()));
                requests.len()
            };
            if count >= self.limit {
                if let Some(stop) = self.stop.lock().unwrap().take() {
                    let _ = stop.send(());
                }
            }
            self.inner.sample(observer, target, timestamp)
        }
    }

    #[derive(Debug, Default)]
    struct Journal {
        rotor_connects: usize,
        rotor_attempts: usize,
        positions: Vec<(f64, f64)>,
        radio_connects: usize,
        frequencies: Vec<f64>,
        events: Vec<PassEvent>,
    }

    type SharedJournal = Arc<Mutex<Journal>>;

    struct MockRotor {
        journal: SharedJournal,
        connected: bool,
        failing: bool,
    }

    impl MockRotor {
        fn new(journal: &SharedJournal) -> Self {
            Self {
                journal: journal.clone(),
                connected: false,
                failing: false,
            }
        }

        fn failing(journal: &SharedJournal) -> Self {
            Self {
                failing: true,
                ..Self::new(journal)
            }
        }
    }

    impl Positioner for MockRotor {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> Result<(), EndpointError> {
            self.journal.lock().unwrap().rotor_connects += 1;
            self.connected = true;
            Ok(())
        }

        async fn set_position(&mut self, azimuth: f64, elevation: f64) -> Result<(), EndpointError> {
            let mut journal = self.journal.lock().unwrap();
            journal.rotor_attempts += 1;
            if self.failing {
                self.connected = false;
                return Err(EndpointError::Closed);
            }
            journal.positions.push((azimuth, elevation));
            Ok(())
        }

        fn disconnect(&mut self) {
            self.connected = false;
        }
    }

    struct MockRadio {
        journal: SharedJournal,
        connected: bool,
        failing: bool,
        latency: Duration,
    }

    impl MockRadio {
        fn new(journal: &SharedJournal) -> Self {
            Self {
                journal: journal.clone(),
                connected: false,
                failing: false,
                latency: Duration::ZERO,
            }
        }
    }

    impl FrequencyControl for MockRadio {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> Result<(), EndpointError> {
            self.journal.lock().unwrap().radio_connects += 1;
            if self.failing {
                return Err(EndpointError::Connect {
                    endpoint: "mock".to_string(),
                    source: std::io::ErrorKind::ConnectionRefused.into(),
                });
            }
            self.connected = true;
            Ok(())
        }

        async fn set_frequency(&mut self, frequency_hz: f64) -> Result<(), EndpointError> {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.journal.lock().unwrap().frequencies.push(frequency_hz);
            Ok(())
        }

        async fn announce(&mut self, event: PassEvent) -> Result<(), EndpointError> {
            self.journal.lock().unwrap().events.push(event);
            Ok(())
        }

        fn disconnect(&mut self) {
            self.connected = false;
        }
    }

    fn plan() -> FrequencyPlan {
        FrequencyPlan {
            rest_hz: 144_000_000.0,
            doppler: true,
        }
    }

    fn rotor(client: MockRotor) -> Option<RotorChannel<MockRotor>> {
        Some(RotorChannel::new(
            client,
            RotorLimits::default(),
            BelowHorizon::Clamp,
        ))
    }

    fn radio(client: MockRadio) -> Option<RadioChannel<MockRadio>> {
        Some(RadioChannel::new(client, plan(), None))
    }

    #[tokio::test(start_paused = true)]
    async fn moon_tick_dispatches_doppler_frequency_on_schedule() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let source = Recording::new(Ephemeris::default(), 2, stop_tx);
        let requests = source.requests.clone();

        let mut tracker = Tracker::new(
            config(),
            source,
            None::<RotorChannel<MockRotor>>,
            radio(MockRadio::new(&journal)),
        );
        tracker.run(stop_rx).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, t0());
        assert_eq!(requests[1].0, t0() + chrono::Duration::seconds(30));
        assert_elapsed(requests[1].1 - requests[0].1, PERIOD);

        let expected = Ephemeris::default()
            .sample(&config().observer, &config().target, t0())
            .unwrap();
        let journal = journal.lock().unwrap();
        assert_eq!(journal.radio_connects, 1);
        assert_eq!(journal.frequencies.len(), 2);
        assert_eq!(
            journal.frequencies[0],
            corrected_frequency(144_000_000.0, expected.radial_velocity_m_s)
        );
        assert!((journal.frequencies[0] - 144_000_000.0).abs() < 1_000.0);
        assert_eq!(tracker.mode(), &TrackerMode::Stopped { ticks: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_failure_skips_only_its_own_tick() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![Some((100.0, 20.0)), None, Some((101.0, 21.0))]);
        let source = Recording::new(script, 3, stop_tx);
        let requests = source.requests.clone();

        let mut tracker = Tracker::new(
            config(),
            source,
            rotor(MockRotor::new(&journal)),
            radio(MockRadio::new(&journal)),
        );
        tracker.run(stop_rx).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].0, t0() + chrono::Duration::seconds(60));
        assert_elapsed(requests[1].1 - requests[0].1, PERIOD);
        assert_elapsed(requests[2].1 - requests[1].1, PERIOD);

        let journal = journal.lock().unwrap();
        assert_eq!(journal.frequencies.len(), 2);
        assert_eq!(journal.positions, vec![(100.0, 20.0), (101.0, 21.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn rotor_failure_does_not_block_radio() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![Some((10.0, 5.0)); 3]);
        let source = Recording::new(script, 3, stop_tx);

        let mut tracker = Tracker::new(
            config(),
            source,
            rotor(MockRotor::failing(&journal)),
            radio(MockRadio::new(&journal)),
        );
        tracker.run(stop_rx).await.unwrap();

        let journal = journal.lock().unwrap();
        assert_eq!(journal.frequencies.len(), 3);
        assert_eq!(journal.rotor_attempts, 3);
        assert_eq!(journal.rotor_connects, 3);
        assert!(journal.positions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn radio_failure_does_not_block_rotor() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![Some((10.0, 5.0)); 3]);
        let source = Recording::new(script, 3, stop_tx);
        let failing_radio = MockRadio {
            failing: true,
            ..MockRadio::new(&journal)
        };

        let mut tracker = Tracker::new(
            config(),
            source,
            rotor(MockRotor::new(&journal)),
            radio(failing_radio),
        );
        tracker.run(stop_rx).await.unwrap();

        let journal = journal.lock().unwrap();
        assert_eq!(journal.radio_connects, 3);
        assert!(journal.frequencies.is_empty());
        assert_eq!(journal.positions.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_starts_next_tick_immediately_on_fixed_schedule() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![Some((10.0, 5.0)); 3]);
        let source = Recording::new(script, 3, stop_tx);
        let requests = source.requests.clone();
        let slow_radio = MockRadio {
            latency: Duration::from_secs(45),
            ..MockRadio::new(&journal)
        };

        let mut tracker = Tracker::new(
            config(),
            source,
            None::<RotorChannel<MockRotor>>,
            radio(slow_radio),
        );
        tracker.run(stop_rx).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_elapsed(requests[1].1 - requests[0].1, Duration::from_secs(45));
        assert_elapsed(requests[2].1 - requests[1].1, Duration::from_secs(45));
        assert_eq!(requests[1].0, t0() + chrono::Duration::seconds(30));
        assert_eq!(requests[2].0, t0() + chrono::Duration::seconds(60));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_the_sleep_phase() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![Some((10.0, 5.0))]);
        let source = Recording::new(script, 1, stop_tx);
        let long_period = TrackerConfig {
            period: Duration::from_secs(3600),
            ..config()
        };

        let began = Instant::now();
        let mut tracker = Tracker::new(
            long_period,
            source,
            rotor(MockRotor::new(&journal)),
            None::<RadioChannel<MockRadio>>,
        );
        tracker.run(stop_rx).await.unwrap();

        assert!(began.elapsed() < Duration::from_secs(1));
        assert_eq!(tracker.mode(), &TrackerMode::Stopped { ticks: 1 });
        assert_eq!(tracker.run(oneshot::channel().1).await, Err(TrackerError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn rotor_follows_target_through_north_inside_limits() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![
            Some((358.0, 30.0)),
            Some((2.0, 30.0)),
            Some((5.0, 31.0)),
        ]);
        let source = Recording::new(script, 3, stop_tx);
        let limits = RotorLimits::new(Some(350.0), Some(370.0), None).unwrap();
        let rotor = RotorChannel::new(MockRotor::new(&journal), limits, BelowHorizon::Clamp);

        let mut tracker = Tracker::new(
            config(),
            source,
            Some(rotor),
            None::<RadioChannel<MockRadio>>,
        );
        tracker.run(stop_rx).await.unwrap();

        let azimuths: Vec<f64> = journal.lock().unwrap().positions.iter().map(|p| p.0).collect();
        assert_eq!(azimuths, vec![358.0, 362.0, 365.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn below_horizon_policy_and_pass_announcements() {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let script = Script::new(vec![
            Some((90.0, -5.0)),
            Some((95.0, 15.0)),
            Some((100.0, 20.0)),
            Some((105.0, 8.0)),
        ]);
        let source = Recording::new(script, 4, stop_tx);
        let rotor = RotorChannel::new(
            MockRotor::new(&journal),
            RotorLimits::default(),
            BelowHorizon::Skip,
        );
        let radio = RadioChannel::new(
            MockRadio::new(&journal),
            plan(),
            Some(PassMonitor::new(10.0)),
        );

        let mut tracker = Tracker::new(config(), source, Some(rotor), Some(radio));
        tracker.run(stop_rx).await.unwrap();

        let journal = journal.lock().unwrap();
        assert_eq!(journal.positions.len(), 3);
        assert_eq!(journal.events, vec![PassEvent::Aos, PassEvent::Los]);
        assert_eq!(journal.frequencies.len(), 4);
    }

    async fn commanded_azimuths(samples: Vec<(f64, f64)>, below_horizon: BelowHorizon) -> Vec<f64> {
        let journal = SharedJournal::default();
        let (stop_tx, stop_rx) = oneshot::channel();
        let count = samples.len();
        let script = Script::new(samples.into_iter().map(Some).collect());
        let source = Recording::new(script, count, stop_tx);
        let limits = RotorLimits::new(Some(-90.0), Some(450.0), None).unwrap();
        let rotor = RotorChannel::new(MockRotor::new(&journal), limits, below_horizon);

        let mut tracker = Tracker::new(
            config(),
            source,
            Some(rotor),
            None::<RadioChannel<MockRadio>>,
        );
        tracker.run(stop_rx).await.unwrap();

        let azimuths = journal.lock().unwrap().positions.iter().map(|p| p.0).collect();
        azimuths
    }

    #[tokio::test(start_paused = true)]
    async fn new_pass_continues_from_the_rotor_position() {
        let samples = vec![
            (60.0, 5.0),
            (180.0, 30.0),
            (300.0, 5.0),
            (330.0, -5.0),
            (30.0, -10.0),
            (60.0, 2.0),
        ];
        assert_eq!(
            commanded_azimuths(samples.clone(), BelowHorizon::Clamp).await,
            vec![60.0, 180.0, 300.0, 330.0, 390.0, 420.0]
        );
        assert_eq!(
            commanded_azimuths(samples, BelowHorizon::Skip).await,
            vec![60.0, 180.0, 300.0, 420.0]
        );
    }

    #[tokio::test]
    async fn refuses_to_run_without_endpoints() {
        let (_stop_tx, stop_rx) = oneshot::channel();
        let mut tracker: Tracker<_, MockRotor, MockRadio> =
            Tracker::new(config(), Script::new(vec![]), None, None);
        assert_eq!(tracker.run(stop_rx).await, Err(TrackerError::NothingToDrive));
        assert_eq!(tracker.mode(), &TrackerMode::Idle);
    }
}
