//! Configuration primitives for the MAX30102 driver.

use crate::params::{AdcRange, Mode, PulseWidth, SampleAverage, SampleRate};
use crate::registers::{FifoConfig, SpO2Config, running_mode};

// FIFO_CONFIG[3:0] width.
const ALMOST_FULL_MASK: u8 = 0x0F;

/// User-facing configuration for the MAX30102 sensor.
///
/// Applied as a whole by [`Max30102::init`](crate::Max30102::init); changing
/// it afterwards requires another `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// LED mode written last during initialization.
    pub mode: Mode,
    /// Sample rate selection.
    pub sample_rate: SampleRate,
    /// LED pulse width selection.
    pub pulse_width: PulseWidth,
    /// ADC full-scale range.
    pub adc_range: AdcRange,
    /// On-chip sample averaging.
    pub sample_average: SampleAverage,
    /// LED1 (red) drive current code.
    pub red_led_power: u8,
    /// LED2 (infrared) drive current code.
    pub ir_led_power: u8,
    /// Overwrite oldest entries when the FIFO is full.
    pub rollover: bool,
    /// Almost-full interrupt threshold; only the low 4 bits are used.
    pub almost_full_threshold: u8,
}

/// Register bytes produced by [`Config::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodedConfig {
    /// `FIFO_CONFIG` value.
    pub fifo_config: u8,
    /// `SPO2_CONFIG` value.
    pub spo2_config: u8,
    /// `MODE_CONFIG` value that starts sampling.
    pub mode_config: u8,
    /// `LED1_PA` value.
    pub led1: u8,
    /// `LED2_PA` value.
    pub led2: u8,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Rate at which entries land in the FIFO, after on-chip averaging.
    pub fn fifo_rate_hz(&self) -> u32 {
        self.sample_rate.hz() / u32::from(self.sample_average.samples())
    }

    /// Encodes every field into its register byte.
    pub fn encode(&self) -> EncodedConfig {
        let fifo = FifoConfig::new()
            .with_sample_average(self.sample_average)
            .with_rollover(self.rollover)
            .with_almost_full(self.almost_full_threshold & ALMOST_FULL_MASK);
        let spo2 = SpO2Config::new()
            .with_adc_range(self.adc_range)
            .with_sample_rate(self.sample_rate)
            .with_pulse_width(self.pulse_width);

        EncodedConfig {
            fifo_config: fifo.into(),
            spo2_config: spo2.into(),
            mode_config: running_mode(self.mode),
            led1: self.red_led_power,
            led2: self.ir_led_power,
        }
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the LED mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Overrides the sample rate.
    pub fn sample_rate(mut self, sample_rate: SampleRate) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Overrides the LED pulse width.
    pub fn pulse_width(mut self, pulse_width: PulseWidth) -> Self {
        self.config.pulse_width = pulse_width;
        self
    }

    /// Overrides the ADC range.
    pub fn adc_range(mut self, adc_range: AdcRange) -> Self {
        self.config.adc_range = adc_range;
        self
    }

    /// Overrides the on-chip averaging.
    pub fn sample_average(mut self, sample_average: SampleAverage) -> Self {
        self.config.sample_average = sample_average;
        self
    }

    /// Sets both LED drive currents.
    pub fn led_power(mut self, red: u8, ir: u8) -> Self {
        self.config.red_led_power = red;
        self.config.ir_led_power = ir;
        self
    }

    /// Enables or disables FIFO rollover.
    pub fn rollover(mut self, rollover: bool) -> Self {
        self.config.rollover = rollover;
        self
    }

    /// Sets the almost-full threshold, masked to 4 bits.
    pub fn almost_full_threshold(mut self, threshold: u8) -> Self {
        self.config.almost_full_threshold = threshold & ALMOST_FULL_MASK;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::SpO2,
            sample_rate: SampleRate::Hz50,
            pulse_width: PulseWidth::Us215,
            adc_range: AdcRange::Na4096,
            sample_average: SampleAverage::Avg1,
            red_led_power: 0x1F,
            ir_led_power: 0x1F,
            rollover: true,
            almost_full_threshold: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_encodes_to_conservative_settings() {
        let encoded = Config::default().encode();

        assert_eq!(encoded.fifo_config, 0x1A);
        assert_eq!(encoded.spo2_config, 0x22);
        assert_eq!(encoded.mode_config, 0x03);
        assert_eq!(encoded.led1, 0x1F);
        assert_eq!(encoded.led2, 0x1F);
    }

    #[test]
    fn fifo_rate_accounts_for_averaging() {
        assert_eq!(Config::default().fifo_rate_hz(), 50);

        let config = Config::new()
            .sample_rate(SampleRate::Hz400)
            .sample_average(SampleAverage::Avg4)
            .build();
        assert_eq!(config.fifo_rate_hz(), 100);
        assert_eq!(config.pulse_width.adc_bits(), 17);
        assert_eq!(config.adc_range.full_scale_na(), 4_096);
    }

    #[test]
    fn builder_masks_threshold() {
        let config = Config::new().almost_full_threshold(0xF7).build();
        assert_eq!(config.almost_full_threshold, 0x07);
    }

    #[test]
    fn encode_masks_threshold_set_directly() {
        let config = Config {
            almost_full_threshold: 0xFF,
            rollover: false,
            ..Config::default()
        };
        assert_eq!(config.encode().fifo_config, 0x0F);
    }

    #[test]
    fn builder_overrides_every_field() {
        let encoded = Config::new()
            .mode(Mode::HeartRate)
            .sample_rate(SampleRate::Hz3200)
            .pulse_width(PulseWidth::Us69)
            .adc_range(AdcRange::Na16384)
            .sample_average(SampleAverage::Avg32)
            .led_power(0x24, 0x7F)
            .rollover(false)
            .almost_full_threshold(0)
            .build()
            .encode();

        assert_eq!(
            encoded,
            EncodedConfig {
                fifo_config: 0xA0,
                spo2_config: 0x7C,
                mode_config: 0x02,
                led1: 0x24,
                led2: 0x7F,
            }
        );
    }
}
