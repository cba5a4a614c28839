//! FIFO pointer arithmetic and sample decoding.

use crate::registers::FifoPointer;

/// Number of slots in the on-chip FIFO ring.
pub const FIFO_DEPTH: u8 = 32;
/// Bytes per FIFO slot in SpO2 mode: three for red, three for infrared.
pub const SAMPLE_BYTES: usize = 6;
/// Pending-entry count above which the backlog is dropped instead of drained.
pub const BACKLOG_LIMIT: u8 = 8;

// The ADC is at most 18 bits wide; the upper 6 bits of each channel are unused.
const CHANNEL_MASK: u32 = 0x03_FFFF;

/// A decoded FIFO sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Red channel intensity (18-bit).
    pub red: u32,
    /// Infrared channel intensity (18-bit).
    pub ir: u32,
    /// `true` only when the sample came from a successful FIFO read.
    pub valid: bool,
}

impl Sample {
    /// Decodes one red+IR slot read from `FIFO_DATA`.
    pub fn from_fifo_bytes(raw: &[u8; SAMPLE_BYTES]) -> Self {
        Self {
            red: unpack_channel(raw[0], raw[1], raw[2]),
            ir: unpack_channel(raw[3], raw[4], raw[5]),
            valid: true,
        }
    }
}

#[inline]
fn unpack_channel(msb: u8, mid: u8, lsb: u8) -> u32 {
    u32::from_be_bytes([0, msb, mid, lsb]) & CHANNEL_MASK
}

/// Snapshot of the FIFO pointer registers taken during a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoState {
    /// Slot the device writes next.
    pub write_ptr: u8,
    /// Slot the host reads next.
    pub read_ptr: u8,
    /// Entries lost since the FIFO last filled up.
    pub overflow: u8,
}

impl FifoState {
    /// Builds a snapshot from raw register bytes, discarding reserved bits.
    pub fn from_registers(write_ptr: u8, read_ptr: u8, overflow: u8) -> Self {
        Self {
            write_ptr: FifoPointer::from(write_ptr).value(),
            read_ptr: FifoPointer::from(read_ptr).value(),
            overflow: FifoPointer::from(overflow).value(),
        }
    }

    /// Returns `true` when the device dropped samples.
    pub const fn has_overflowed(&self) -> bool {
        self.overflow > 0
    }

    /// Number of unread entries between the read and write pointers.
    pub const fn samples_available(&self) -> u8 {
        samples_available(self.write_ptr, self.read_ptr)
    }
}

/// Forward distance from `read_ptr` to `write_ptr` around the 32-slot ring.
pub const fn samples_available(write_ptr: u8, read_ptr: u8) -> u8 {
    let write_ptr = write_ptr & (FIFO_DEPTH - 1);
    let read_ptr = read_ptr & (FIFO_DEPTH - 1);
    if write_ptr >= read_ptr {
        write_ptr - read_ptr
    } else {
        (FIFO_DEPTH - read_ptr) + write_ptr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_matches_ring_distance() {
        for write in 0..FIFO_DEPTH {
            for read in 0..FIFO_DEPTH {
                let expected = (write as i16 - read as i16).rem_euclid(FIFO_DEPTH as i16) as u8;
                assert_eq!(samples_available(write, read), expected, "w={write} r={read}");
            }
        }
    }

    #[test]
    fn available_known_points() {
        assert_eq!(samples_available(5, 5), 0);
        assert_eq!(samples_available(2, 30), 4);
        assert_eq!(samples_available(30, 2), 28);
        assert_eq!(samples_available(0, 31), 1);
    }

    #[test]
    fn decode_discards_upper_six_bits() {
        let sample = Sample::from_fifo_bytes(&[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);
        assert_eq!(sample.red, 0x23456);
        assert_eq!(sample.ir, 0x09ABC);
        assert!(sample.valid);
    }

    #[test]
    fn decode_full_scale() {
        let sample = Sample::from_fifo_bytes(&[0xFF; SAMPLE_BYTES]);
        assert_eq!(sample.red, 0x3FFFF);
        assert_eq!(sample.ir, 0x3FFFF);
    }

    #[test]
    fn default_sample_is_invalid() {
        assert!(!Sample::default().valid);
    }

    #[test]
    fn state_masks_reserved_pointer_bits() {
        let state = FifoState::from_registers(0xE3, 0x01, 0x00);
        assert_eq!(state.write_ptr, 3);
        assert_eq!(state.samples_available(), 2);
        assert!(!state.has_overflowed());
        assert!(FifoState::from_registers(0, 0, 0x1F).has_overflowed());
    }
}
