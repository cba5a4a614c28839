//! Register map definitions for the MAX30102 pulse oximeter.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{AdcRange, Mode, PulseWidth, SampleAverage, SampleRate};

/// Register address of `INTR_STATUS_1`.
pub const REG_INTR_STATUS_1: u8 = 0x00;
/// Register address of `INTR_STATUS_2`.
pub const REG_INTR_STATUS_2: u8 = 0x01;
/// Register address of `INTR_ENABLE_1`.
pub const REG_INTR_ENABLE_1: u8 = 0x02;
/// Register address of `INTR_ENABLE_2`.
pub const REG_INTR_ENABLE_2: u8 = 0x03;
/// Register address of `FIFO_WR_PTR`.
pub const REG_FIFO_WR_PTR: u8 = 0x04;
/// Register address of `OVF_COUNTER`.
pub const REG_OVF_COUNTER: u8 = 0x05;
/// Register address of `FIFO_RD_PTR`.
pub const REG_FIFO_RD_PTR: u8 = 0x06;
/// Register address of `FIFO_DATA`.
pub const REG_FIFO_DATA: u8 = 0x07;
/// Register address of `FIFO_CONFIG`.
pub const REG_FIFO_CONFIG: u8 = 0x08;
/// Register address of `MODE_CONFIG`.
pub const REG_MODE_CONFIG: u8 = 0x09;
/// Register address of `SPO2_CONFIG`.
pub const REG_SPO2_CONFIG: u8 = 0x0A;
/// Register address of `LED1_PA` (red).
pub const REG_LED1_PA: u8 = 0x0C;
/// Register address of `LED2_PA` (infrared).
pub const REG_LED2_PA: u8 = 0x0D;
/// Register address of `MULTI_LED_CTRL1`.
pub const REG_MULTI_LED_CTRL1: u8 = 0x11;
/// Register address of `MULTI_LED_CTRL2`.
pub const REG_MULTI_LED_CTRL2: u8 = 0x12;
/// Register address of `TEMP_INTR`.
pub const REG_TEMP_INTR: u8 = 0x1F;
/// Register address of `TEMP_FRAC`.
pub const REG_TEMP_FRAC: u8 = 0x20;
/// Register address of `TEMP_CONFIG`.
pub const REG_TEMP_CONFIG: u8 = 0x21;
/// Register address of `REV_ID`.
pub const REG_REV_ID: u8 = 0xFE;
/// Register address of `PART_ID`.
pub const REG_PART_ID: u8 = 0xFF;

/// Value `PART_ID` must hold on a genuine MAX30102.
pub const EXPECTED_PART_ID: u8 = 0x15;

/// `MODE_CONFIG` value that halts sampling.
pub const MODE_SHUTDOWN: u8 = 0x80;
/// `MODE_CONFIG` value that pulses the soft reset.
pub const MODE_RESET: u8 = 0x40;

/// Address metadata for register value types.
pub trait Register {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
}

/// Bitfield representation of the `MODE_CONFIG` register (address `0x09`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    // LED mode selection (bits 1:0).
    pub mode: Mode,
    #[skip]
    __: B4,
    // Soft reset request (bit 6).
    pub reset: bool,
    // Power-save shutdown (bit 7).
    pub shutdown: bool,
}

impl From<ModeConfig> for u8 {
    fn from(value: ModeConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `FIFO_CONFIG` register (address `0x08`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoConfig {
    // Free-slot count that raises the almost-full interrupt (bits 3:0).
    pub almost_full: B4,
    // Overwrite oldest samples when the FIFO is full (bit 4).
    pub rollover: bool,
    // Samples averaged per FIFO entry (bits 7:5).
    pub sample_average: SampleAverage,
}

impl From<FifoConfig> for u8 {
    fn from(value: FifoConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `SPO2_CONFIG` register (address `0x0A`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpO2Config {
    // LED pulse width and ADC resolution (bits 1:0).
    pub pulse_width: PulseWidth,
    // Sample rate (bits 4:2).
    pub sample_rate: SampleRate,
    // ADC full-scale range (bits 6:5).
    pub adc_range: AdcRange,
    #[skip]
    __: B1,
}

impl From<SpO2Config> for u8 {
    fn from(value: SpO2Config) -> Self {
        value.into_bytes()[0]
    }
}

/// Shared layout of `FIFO_WR_PTR`, `OVF_COUNTER` and `FIFO_RD_PTR`.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoPointer {
    // 5-bit pointer or counter value (bits 4:0).
    pub value: B5,
    #[skip]
    __: B3,
}

impl From<u8> for FifoPointer {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl Register for ModeConfig {
    const ADDRESS: u8 = REG_MODE_CONFIG;
}

impl Register for FifoConfig {
    const ADDRESS: u8 = REG_FIFO_CONFIG;
}

impl Register for SpO2Config {
    const ADDRESS: u8 = REG_SPO2_CONFIG;
}

/// Builds the `MODE_CONFIG` byte that starts sampling in `mode`.
pub fn running_mode(mode: Mode) -> u8 {
    u8::from(ModeConfig::new().with_mode(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_layout_matches_datasheet() {
        assert_eq!(running_mode(Mode::HeartRate), 0x02);
        assert_eq!(running_mode(Mode::SpO2), 0x03);
        assert_eq!(u8::from(ModeConfig::new().with_shutdown(true)), MODE_SHUTDOWN);
        assert_eq!(u8::from(ModeConfig::new().with_reset(true)), MODE_RESET);
    }

    #[test]
    fn fifo_config_layout_matches_datasheet() {
        let config = FifoConfig::new()
            .with_almost_full(0x0A)
            .with_rollover(true)
            .with_sample_average(SampleAverage::Avg4);

        assert_eq!(u8::from(config), 0b010_1_1010);
    }

    #[test]
    fn spo2_config_layout_matches_datasheet() {
        let config = SpO2Config::new()
            .with_pulse_width(PulseWidth::Us411)
            .with_sample_rate(SampleRate::Hz400)
            .with_adc_range(AdcRange::Na16384);

        assert_eq!(u8::from(config), 0b0_11_011_11);
    }

    #[test]
    fn register_metadata_points_at_datasheet_addresses() {
        assert_eq!(<ModeConfig as Register>::ADDRESS, REG_MODE_CONFIG);
        assert_eq!(<FifoConfig as Register>::ADDRESS, REG_FIFO_CONFIG);
        assert_eq!(<SpO2Config as Register>::ADDRESS, REG_SPO2_CONFIG);
    }

    #[test]
    fn pointer_ignores_reserved_bits() {
        assert_eq!(FifoPointer::from(0xFF).value(), 0x1F);
        assert_eq!(FifoPointer::from(0x25).value(), 0x05);
    }
}
