//! Strongly typed parameter enumerations for the MAX30102 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the register definitions. Prefer
//! these types over raw integers to keep configuration values valid and
//! explicit.
//!
//! # Examples
//!
//! ```rust
//! use max30102::params::{AdcRange, Mode, SampleRate};
//!
//! let mode = Mode::SpO2;
//! let rate = SampleRate::Hz100;
//! let range = AdcRange::Na4096;
//! let _ = (mode, rate, range);
//! ```

use modular_bitfield::prelude::Specifier;

/// LED operating modes encoded in `MODE_CONFIG[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Mode {
    /// Red LED only.
    HeartRate = 0b10,
    /// Red and infrared LEDs.
    SpO2 = 0b11,
}

/// Samples averaged per FIFO entry, encoded in `FIFO_CONFIG[7:5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum SampleAverage {
    /// No averaging.
    Avg1 = 0b000,
    /// 2 samples.
    Avg2 = 0b001,
    /// 4 samples.
    Avg4 = 0b010,
    /// 8 samples.
    Avg8 = 0b011,
    /// 16 samples.
    Avg16 = 0b100,
    /// 32 samples.
    Avg32 = 0b101,
}

impl SampleAverage {
    /// Returns the number of raw conversions folded into one FIFO entry.
    pub const fn samples(self) -> u8 {
        match self {
            Self::Avg1 => 1,
            Self::Avg2 => 2,
            Self::Avg4 => 4,
            Self::Avg8 => 8,
            Self::Avg16 => 16,
            Self::Avg32 => 32,
        }
    }
}

/// Sample rate selections encoded in `SPO2_CONFIG[4:2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum SampleRate {
    /// 50 samples per second.
    Hz50 = 0b000,
    /// 100 samples per second.
    Hz100 = 0b001,
    /// 200 samples per second.
    Hz200 = 0b010,
    /// 400 samples per second.
    Hz400 = 0b011,
    /// 800 samples per second.
    Hz800 = 0b100,
    /// 1000 samples per second.
    Hz1000 = 0b101,
    /// 1600 samples per second.
    Hz1600 = 0b110,
    /// 3200 samples per second.
    Hz3200 = 0b111,
}

impl SampleRate {
    /// Returns the sample rate in hertz.
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz50 => 50,
            Self::Hz100 => 100,
            Self::Hz200 => 200,
            Self::Hz400 => 400,
            Self::Hz800 => 800,
            Self::Hz1000 => 1_000,
            Self::Hz1600 => 1_600,
            Self::Hz3200 => 3_200,
        }
    }
}

/// LED pulse widths encoded in `SPO2_CONFIG[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PulseWidth {
    /// 69 µs pulse, 15-bit ADC resolution.
    Us69 = 0b00,
    /// 118 µs pulse, 16-bit ADC resolution.
    Us118 = 0b01,
    /// 215 µs pulse, 17-bit ADC resolution.
    Us215 = 0b10,
    /// 411 µs pulse, 18-bit ADC resolution.
    Us411 = 0b11,
}

impl PulseWidth {
    /// Returns the effective ADC resolution in bits.
    pub const fn adc_bits(self) -> u8 {
        match self {
            Self::Us69 => 15,
            Self::Us118 => 16,
            Self::Us215 => 17,
            Self::Us411 => 18,
        }
    }
}

/// ADC full-scale ranges encoded in `SPO2_CONFIG[6:5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum AdcRange {
    /// 2048 nA full scale.
    Na2048 = 0b00,
    /// 4096 nA full scale.
    Na4096 = 0b01,
    /// 8192 nA full scale.
    Na8192 = 0b10,
    /// 16384 nA full scale.
    Na16384 = 0b11,
}

impl AdcRange {
    /// Returns the full-scale current in nanoamperes.
    pub const fn full_scale_na(self) -> u32 {
        match self {
            Self::Na2048 => 2_048,
            Self::Na4096 => 4_096,
            Self::Na8192 => 8_192,
            Self::Na16384 => 16_384,
        }
    }
}
