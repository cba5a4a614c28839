//! In-memory register file standing in for a MAX30102 in unit tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::interface::Max30102Interface;
use crate::poll::Monotonic;
use crate::registers::{
    EXPECTED_PART_ID, REG_FIFO_DATA, REG_FIFO_RD_PTR, REG_FIFO_WR_PTR, REG_OVF_COUNTER,
    REG_PART_ID, REG_REV_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeError {
    Nack,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    access: Access,
    register: u8,
    error: FakeError,
    once: bool,
}

/// Shared nanosecond counter advanced by [`FakeDelay`] and bus latency.
#[derive(Debug, Clone, Default)]
pub struct SimTime(Rc<Cell<u64>>);

impl SimTime {
    pub fn advance_ns(&self, ns: u64) {
        self.0.set(self.0.get() + ns);
    }

    pub fn now_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }
}

pub struct FakeDelay {
    time: SimTime,
    pub total_ns: u64,
}

impl FakeDelay {
    pub fn new(time: SimTime) -> Self {
        Self { time, total_ns: 0 }
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        self.time.advance_ns(ns as u64);
    }
}

pub struct FakeClock(pub SimTime);

impl Monotonic for FakeClock {
    fn now_ms(&mut self) -> u64 {
        self.0.now_ms()
    }
}

pub struct FakeSensor {
    pub regs: [u8; 256],
    pub writes: Vec<(u8, u8)>,
    pub fifo: VecDeque<u8>,
    faults: Vec<Fault>,
    latency: Option<(SimTime, u64)>,
}

impl FakeSensor {
    pub fn new() -> Self {
        let mut regs = [0u8; 256];
        regs[REG_PART_ID as usize] = EXPECTED_PART_ID;
        regs[REG_REV_ID as usize] = 0x03;
        Self {
            regs,
            writes: Vec::new(),
            fifo: VecDeque::new(),
            faults: Vec::new(),
            latency: None,
        }
    }

    pub fn set_pointers(&mut self, write_ptr: u8, read_ptr: u8, overflow: u8) {
        self.regs[REG_FIFO_WR_PTR as usize] = write_ptr;
        self.regs[REG_FIFO_RD_PTR as usize] = read_ptr;
        self.regs[REG_OVF_COUNTER as usize] = overflow;
    }

    pub fn pointers(&self) -> (u8, u8, u8) {
        (
            self.regs[REG_FIFO_WR_PTR as usize],
            self.regs[REG_FIFO_RD_PTR as usize],
            self.regs[REG_OVF_COUNTER as usize],
        )
    }

    pub fn push_slot(&mut self, bytes: [u8; 6]) {
        self.fifo.extend(bytes);
    }

    pub fn fail(&mut self, access: Access, register: u8, error: FakeError) {
        self.faults.push(Fault { access, register, error, once: false });
    }

    pub fn fail_once(&mut self, access: Access, register: u8, error: FakeError) {
        self.faults.push(Fault { access, register, error, once: true });
    }

    pub fn heal(&mut self) {
        self.faults.clear();
    }

    pub fn with_latency(mut self, time: SimTime, ns_per_access: u64) -> Self {
        self.latency = Some((time, ns_per_access));
        self
    }

    pub fn writes_to(&self, register: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(reg, _)| *reg == register)
            .map(|(_, value)| *value)
            .collect()
    }

    fn access(&mut self, access: Access, register: u8) -> Result<(), FakeError> {
        if let Some((time, ns)) = &self.latency {
            time.advance_ns(*ns);
        }
        let hit = self
            .faults
            .iter()
            .position(|fault| fault.access == access && fault.register == register);
        match hit {
            Some(index) => {
                let fault = self.faults[index];
                if fault.once {
                    self.faults.remove(index);
                }
                Err(fault.error)
            }
            None => Ok(()),
        }
    }
}

impl Max30102Interface for FakeSensor {
    type Error = FakeError;

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.access(Access::Write, register)?;
        self.writes.push((register, value));
        self.regs[register as usize] = value;
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        self.access(Access::Read, register)?;
        Ok(self.regs[register as usize])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.access(Access::Read, register)?;
        if register == REG_FIFO_DATA {
            for byte in buf.iter_mut() {
                *byte = self.fifo.pop_front().unwrap_or(0);
            }
            let slots = (buf.len() / 6) as u8;
            let read_ptr = &mut self.regs[REG_FIFO_RD_PTR as usize];
            *read_ptr = (*read_ptr + slots) % 32;
        } else {
            let start = register as usize;
            buf.copy_from_slice(&self.regs[start..start + buf.len()]);
        }
        Ok(())
    }

    fn is_timeout(error: &Self::Error) -> bool {
        matches!(error, FakeError::Timeout)
    }
}
