//! Periodic acquisition loop with self-healing recovery.
//!
//! [`Poller::step`] runs one poll cycle and is usable from any scheduler
//! (timer callback, executor task, superloop). [`Poller::run`] is a blocking
//! loop that keeps a fixed reference tick so per-cycle bus latency does not
//! accumulate as drift.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::device::Max30102;
use crate::error::{Error, ErrorKind, Result};
use crate::fifo::{BACKLOG_LIMIT, Sample};
use crate::interface::Max30102Interface;

/// Millisecond time source used to schedule poll cycles.
pub trait Monotonic {
    /// Milliseconds since an arbitrary, fixed epoch. Must never go backwards.
    fn now_ms(&mut self) -> u64;
}

/// Tuning knobs for [`Poller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollConfig {
    /// Target period between poll cycles.
    pub interval_ms: u32,
    /// Consecutive empty polls tolerated before the sensor is re-initialized.
    pub no_data_limit: u32,
    /// Pause after a failed read, once the FIFO has been cleared.
    pub error_backoff_ms: u32,
    /// Pause between the soft reset and re-initialization.
    pub resync_settle_ms: u32,
    /// Pause before the first poll cycle of [`Poller::run`].
    pub startup_settle_ms: u32,
    /// Log one line per this many consecutive empty polls.
    pub no_data_log_period: u32,
    /// Configuration applied when the sensor is re-initialized.
    pub sensor: Config,
}

impl PollConfig {
    /// Rejects settings the loop cannot run with.
    pub fn validate<E>(&self) -> Result<(), E> {
        if self.interval_ms == 0 || self.no_data_log_period == 0 {
            return Err(Error::InvalidParam);
        }

        Ok(())
    }

    /// FIFO entries the sensor produces during one poll interval.
    pub fn entries_per_cycle(&self) -> u64 {
        u64::from(self.interval_ms) * u64::from(self.sensor.fifo_rate_hz()) / 1_000
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 25,
            no_data_limit: 100,
            error_backoff_ms: 100,
            resync_settle_ms: 100,
            startup_settle_ms: 200,
            no_data_log_period: 40,
            sensor: Config::default(),
        }
    }
}

/// Recovery stage a poll cycle went through; see [`PollEvent::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollState {
    /// Steady state.
    Sampling,
    /// Clearing the FIFO after a failed read.
    RecoveringFromReadError,
    /// Resetting and re-initializing a sensor that stopped producing data.
    ResyncingSensor,
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollEvent {
    /// A valid sample was read.
    Sample(Sample),
    /// Nothing to read this cycle.
    NoData,
    /// The read failed and the loop backed off. `fifo_cleared` is false
    /// when clearing the FIFO afterwards failed as well.
    ReadError {
        /// Classification of the failed read.
        kind: ErrorKind,
        /// Whether the FIFO pointers were reset.
        fifo_cleared: bool,
    },
    /// The sensor was reset and re-initialized after sustained silence.
    Resynced,
    /// Re-initialization failed; the next cycles keep polling regardless.
    ResyncFailed(ErrorKind),
}

impl PollEvent {
    /// The recovery stage that produced this event.
    pub fn state(&self) -> PollState {
        match self {
            Self::Sample(_) | Self::NoData => PollState::Sampling,
            Self::ReadError { .. } => PollState::RecoveringFromReadError,
            Self::Resynced | Self::ResyncFailed(_) => PollState::ResyncingSensor,
        }
    }
}

/// Drives [`Max30102::read_sample`] and escalates recovery across cycles.
#[derive(Debug, Clone)]
pub struct Poller {
    config: PollConfig,
    no_data_count: u32,
    sample_count: u32,
}

impl Poller {
    /// Creates a poller with both counters at zero.
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            no_data_count: 0,
            sample_count: 0,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Consecutive empty polls since the last sample or resync.
    pub fn no_data_count(&self) -> u32 {
        self.no_data_count
    }

    /// Valid samples emitted so far; wraps on overflow.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Runs one poll cycle.
    ///
    /// Read errors are handled here (FIFO clear plus back-off) and reported
    /// in the returned event rather than propagated. Each cycle finishes
    /// back in [`PollState::Sampling`]. Once the empty-poll counter exceeds
    /// [`PollConfig::no_data_limit`] the sensor is reset and fully
    /// re-initialized with [`PollConfig::sensor`].
    pub fn step<IFACE, CommE>(
        &mut self,
        sensor: &mut Max30102<IFACE>,
        delay: &mut impl DelayNs,
    ) -> PollEvent
    where
        IFACE: Max30102Interface<Error = CommE>,
    {
        let event = match sensor.read_sample(delay) {
            Ok(sample) if sample.valid => {
                self.sample_count = self.sample_count.wrapping_add(1);
                self.no_data_count = 0;
                PollEvent::Sample(sample)
            }
            Ok(_) | Err(Error::NoData) => {
                self.no_data_count = self.no_data_count.saturating_add(1);
                if (self.no_data_count - 1) % self.config.no_data_log_period.max(1) == 0 {
                    debug!(
                        "no data after {=u32} samples (count: {=u32})",
                        self.sample_count,
                        self.no_data_count
                    );
                }
                PollEvent::NoData
            }
            Err(err) => {
                let kind = err.kind();
                let fifo_cleared = self.recover_from_read_error(sensor, delay, kind);
                PollEvent::ReadError { kind, fifo_cleared }
            }
        };

        if self.no_data_count > self.config.no_data_limit {
            return self.resync(sensor, delay);
        }

        event
    }

    /// Polls until `cancel` is set, handing every sample to `on_sample`.
    ///
    /// Cycles are scheduled at `start + k * interval_ms`, measured on
    /// `clock`. A cycle that overruns its slot is followed immediately by
    /// the next one. `cancel` is checked once per cycle; on exit the sensor
    /// is shut down and the result of that write is returned.
    pub fn run<IFACE, CommE, C, F>(
        &mut self,
        sensor: &mut Max30102<IFACE>,
        delay: &mut impl DelayNs,
        clock: &mut C,
        cancel: &AtomicBool,
        mut on_sample: F,
    ) -> Result<(), CommE>
    where
        IFACE: Max30102Interface<Error = CommE>,
        C: Monotonic,
        F: FnMut(Sample),
    {
        self.config.validate()?;
        if self.config.entries_per_cycle() > u64::from(BACKLOG_LIMIT) {
            warn!(
                "{=u64} FIFO entries per {=u32} ms cycle, backlog will be dropped",
                self.config.entries_per_cycle(),
                self.config.interval_ms
            );
        }

        info!("waiting {=u32} ms for sensor to stabilize", self.config.startup_settle_ms);
        delay.delay_ms(self.config.startup_settle_ms);

        let interval = u64::from(self.config.interval_ms);
        let mut next_tick = clock.now_ms();

        while !cancel.load(Ordering::Acquire) {
            if let PollEvent::Sample(sample) = self.step(sensor, delay) {
                on_sample(sample);
            }

            next_tick += interval;
            let now = clock.now_ms();
            if next_tick > now {
                let wait = (next_tick - now).min(u64::from(u32::MAX));
                delay.delay_ms(wait as u32);
            }
        }

        info!("acquisition stopped after {=u32} samples", self.sample_count);
        sensor.deinit()
    }

    // Returns whether the FIFO clear succeeded. The back-off runs either way.
    fn recover_from_read_error<IFACE, CommE>(
        &mut self,
        sensor: &mut Max30102<IFACE>,
        delay: &mut impl DelayNs,
        kind: ErrorKind,
    ) -> bool
    where
        IFACE: Max30102Interface<Error = CommE>,
    {
        warn!("sample read error: {}", kind);

        let cleared = match sensor.clear_fifo() {
            Ok(()) => true,
            Err(err) => {
                error!("FIFO clear during recovery failed: {}", err.kind());
                false
            }
        };
        delay.delay_ms(self.config.error_backoff_ms);

        cleared
    }

    fn resync<IFACE, CommE>(
        &mut self,
        sensor: &mut Max30102<IFACE>,
        delay: &mut impl DelayNs,
    ) -> PollEvent
    where
        IFACE: Max30102Interface<Error = CommE>,
    {
        warn!("no data for {=u32} polls, resetting sensor", self.no_data_count);

        if let Err(err) = sensor.reset() {
            warn!("soft reset before resync failed: {}", err.kind());
        }
        delay.delay_ms(self.config.resync_settle_ms);
        let outcome = sensor.init(self.config.sensor, delay);

        self.no_data_count = 0;

        match outcome {
            Ok(()) => PollEvent::Resynced,
            Err(err) => {
                error!("resync failed: {}", err.kind());
                PollEvent::ResyncFailed(err.kind())
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(PollConfig::default())
    }
}
