//! High-level MAX30102 device driver implementation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fifo::{BACKLOG_LIMIT, FifoState, SAMPLE_BYTES, Sample};
use crate::interface::Max30102Interface;
use crate::interface::i2c::I2cInterface;
use crate::registers::{
    EXPECTED_PART_ID,
    FifoConfig,
    MODE_RESET,
    MODE_SHUTDOWN,
    ModeConfig,
    REG_FIFO_DATA,
    REG_FIFO_RD_PTR,
    REG_FIFO_WR_PTR,
    REG_LED1_PA,
    REG_LED2_PA,
    REG_OVF_COUNTER,
    REG_PART_ID,
    REG_REV_ID,
    Register,
    SpO2Config,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

// Time for an in-progress conversion to stop after shutdown (milliseconds).
const SHUTDOWN_SETTLE_MS: u32 = 50;
// Soft reset completion time (milliseconds).
const RESET_SETTLE_MS: u32 = 100;
// Time for the LEDs and ADC to start after the mode write (milliseconds).
const START_SETTLE_MS: u32 = 50;
// Pause between the steps of the overflow recovery sequence (milliseconds).
const OVERFLOW_RECOVERY_DELAY_MS: u32 = 10;
// Every Nth `read_sample` logs the raw FIFO pointers.
const POINTER_LOG_PERIOD: u32 = 10;

/// High-level synchronous driver for the MAX30102 pulse oximeter.
///
/// The driver owns its bus interface, so every multi-register sequence runs
/// to completion without another agent touching the device in between.
pub struct Max30102<IFACE> {
    interface: IFACE,
    config: Config,
    reads: u32,
}

impl<IFACE> Max30102<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    ///
    /// Nothing is written to the device until [`Max30102::init`].
    pub fn new(interface: IFACE) -> Self {
        Self {
            interface,
            config: Config::default(),
            reads: 0,
        }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> IFACE {
        self.interface
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration applied by the last successful
    /// [`Max30102::init`], or the default before any.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of [`Max30102::read_sample`] calls so far, wrapping.
    pub fn read_count(&self) -> u32 {
        self.reads
    }
}

impl<I2C> Max30102<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I²C transports at the default address.
    pub fn new_i2c(i2c: I2C) -> Self {
        Self::new(I2cInterface::new(i2c))
    }

    /// Releases the driver, returning the I²C bus.
    pub fn release_i2c(self) -> I2C {
        self.release().release()
    }
}

impl<IFACE, CommE> Max30102<IFACE>
where
    IFACE: Max30102Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization & Global Configuration ==========================
    // ==================================================================
    /// Brings the sensor from any state into sampling with `config`.
    ///
    /// The sequence halts sampling, soft-resets, confirms the part
    /// identifier, programs FIFO, SpO2 and LED registers, then starts the
    /// requested mode with the FIFO cleared on both sides of the start so
    /// no start-up transient is ever read back as data. The first failing
    /// step aborts the sequence; call `init` again to retry. The stored
    /// configuration only changes once the whole sequence has succeeded.
    pub fn init(&mut self, config: Config, delay: &mut impl DelayNs) -> Result<(), CommE> {
        let encoded = config.encode();

        self.write(ModeConfig::ADDRESS, MODE_SHUTDOWN)?;
        delay.delay_ms(SHUTDOWN_SETTLE_MS);

        self.reset()?;
        delay.delay_ms(RESET_SETTLE_MS);

        let part_id = self.part_id()?;
        if part_id != EXPECTED_PART_ID {
            error!("unexpected part id {=u8:#x}", part_id);
            return Err(Error::PartIdMismatch(part_id));
        }
        info!("MAX30102 detected, part id {=u8:#x}", part_id);

        self.clear_fifo()?;

        self.write(FifoConfig::ADDRESS, encoded.fifo_config)?;
        debug!("FIFO config written: {=u8:#x}", encoded.fifo_config);

        self.write(SpO2Config::ADDRESS, encoded.spo2_config)?;
        debug!("SpO2 config written: {=u8:#x}", encoded.spo2_config);

        self.set_led_power(encoded.led1, encoded.led2)?;

        self.clear_fifo()?;

        self.write(ModeConfig::ADDRESS, encoded.mode_config)?;
        delay.delay_ms(START_SETTLE_MS);

        self.clear_fifo()?;
        self.config = config;
        info!(
            "MAX30102 sampling in {} at {=u32} Hz, {=u8}-bit, {=u32} nA full scale",
            config.mode,
            config.fifo_rate_hz(),
            config.pulse_width.adc_bits(),
            config.adc_range.full_scale_na()
        );
        Ok(())
    }

    /// Puts the sensor into shutdown.
    pub fn deinit(&mut self) -> Result<(), CommE> {
        self.write(ModeConfig::ADDRESS, MODE_SHUTDOWN)
    }

    /// Issues a soft reset. Callers wait for completion themselves.
    pub fn reset(&mut self) -> Result<(), CommE> {
        self.write(ModeConfig::ADDRESS, MODE_RESET)
    }

    /// Writes the LED1 (red) and LED2 (infrared) drive currents.
    pub fn set_led_power(&mut self, led1: u8, led2: u8) -> Result<(), CommE> {
        self.write(REG_LED1_PA, led1)?;
        self.write(REG_LED2_PA, led2)
    }

    // ==================================================================
    // == Identification ================================================
    // ==================================================================
    /// Reads the part identifier (`0x15` on a MAX30102).
    pub fn part_id(&mut self) -> Result<u8, CommE> {
        self.read(REG_PART_ID)
    }

    /// Reads the silicon revision identifier.
    pub fn revision_id(&mut self) -> Result<u8, CommE> {
        self.read(REG_REV_ID)
    }

    // ==================================================================
    // == Data Acquisition & FIFO =======================================
    // ==================================================================
    /// Reads the FIFO write pointer, read pointer and overflow counter.
    pub fn read_fifo_state(&mut self) -> Result<FifoState, CommE> {
        let write_ptr = self.read(REG_FIFO_WR_PTR)?;
        let read_ptr = self.read(REG_FIFO_RD_PTR)?;
        let overflow = self.read(REG_OVF_COUNTER)?;
        Ok(FifoState::from_registers(write_ptr, read_ptr, overflow))
    }

    /// Resets the write pointer, overflow counter and read pointer.
    ///
    /// All three must be written for the pointers to agree again; a
    /// failure part-way through is returned as-is.
    pub fn clear_fifo(&mut self) -> Result<(), CommE> {
        self.write(REG_FIFO_WR_PTR, 0x00)?;
        self.write(REG_OVF_COUNTER, 0x00)?;
        self.write(REG_FIFO_RD_PTR, 0x00)
    }

    /// Burst-reads raw bytes from `FIFO_DATA`.
    pub fn read_fifo_raw(&mut self, buf: &mut [u8]) -> Result<(), CommE> {
        if buf.is_empty() {
            return Err(Error::InvalidParam);
        }

        Self::bus(self.interface.read_many(REG_FIFO_DATA, buf))
    }

    /// Reads one red+IR sample, recovering the FIFO when it misbehaves.
    ///
    /// Returns [`Error::NoData`] when nothing is pending, after an overflow
    /// recovery, and after dropping a backlog larger than
    /// [`BACKLOG_LIMIT`] entries. Stale entries are discarded rather than
    /// drained.
    pub fn read_sample(&mut self, delay: &mut impl DelayNs) -> Result<Sample, CommE> {
        self.reads = self.reads.wrapping_add(1);
        let state = self.read_fifo_state()?;

        if self.reads % POINTER_LOG_PERIOD == 0 {
            debug!(
                "FIFO wr {=u8}, rd {=u8}, ovf {=u8}",
                state.write_ptr,
                state.read_ptr,
                state.overflow
            );
        }

        if state.has_overflowed() {
            warn!(
                "FIFO overflow (wr {=u8}, rd {=u8}, ovf {=u8}), restarting",
                state.write_ptr,
                state.read_ptr,
                state.overflow
            );
            self.recover_from_overflow(delay)?;
            return Err(Error::NoData);
        }

        let available = state.samples_available();
        if available == 0 {
            return Err(Error::NoData);
        }

        if available > BACKLOG_LIMIT {
            warn!("FIFO backlog of {=u8} samples, clearing", available);
            self.clear_fifo()?;
            return Err(Error::NoData);
        }

        let mut raw = [0u8; SAMPLE_BYTES];
        self.read_fifo_raw(&mut raw)?;
        Ok(Sample::from_fifo_bytes(&raw))
    }

    // ==================================================================
    // == Internal Helpers ==============================================
    // ==================================================================
    fn recover_from_overflow(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.write(ModeConfig::ADDRESS, MODE_SHUTDOWN)?;
        delay.delay_ms(OVERFLOW_RECOVERY_DELAY_MS);

        self.clear_fifo()?;
        delay.delay_ms(OVERFLOW_RECOVERY_DELAY_MS);

        let mode = self.config.encode().mode_config;
        self.write(ModeConfig::ADDRESS, mode)
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), CommE> {
        Self::bus(self.interface.write_register(register, value))
    }

    fn read(&mut self, register: u8) -> Result<u8, CommE> {
        Self::bus(self.interface.read_register(register))
    }

    fn bus<T>(result: core::result::Result<T, CommE>) -> Result<T, CommE> {
        result.map_err(|err| {
            if IFACE::is_timeout(&err) {
                Error::Timeout(err)
            } else {
                Error::Transport(err)
            }
        })
    }
}
