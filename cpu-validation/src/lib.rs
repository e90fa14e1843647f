//! Data-driven Z80 validation support.
//!
//! Test vectors are JSON files (optionally gzip-compressed) holding an
//! initial CPU+RAM state, the expected final state, a total T-state count,
//! and queued I/O port bytes. The `gen_z80_tests` binary produces
//! regression vectors from the interpreter itself; externally generated
//! vectors in the same shape drop into the same runner.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use markiii_core::core::{Bus, InterruptState};
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with access recording ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    IoRead,
    IoWrite,
}

#[derive(Clone, Debug)]
pub struct BusAccess {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub accesses: Vec<BusAccess>,
    /// Bytes served to `io_read`, in order. Empty queue reads 0xFF.
    pub port_queue: Vec<u8>,
    port_cursor: usize,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            accesses: Vec::new(),
            port_queue: Vec::new(),
            port_cursor: 0,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.accesses.push(BusAccess { addr, data, op: BusOp::Read });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.accesses.push(BusAccess { addr, data, op: BusOp::Write });
    }

    fn io_read(&mut self, port: u16) -> u8 {
        let data = self
            .port_queue
            .get(self.port_cursor)
            .copied()
            .unwrap_or(0xFF);
        self.port_cursor += 1;
        self.accesses.push(BusAccess { addr: port, data, op: BusOp::IoRead });
        data
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.accesses.push(BusAccess { addr: port, data, op: BusOp::IoWrite });
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState::default()
    }
}

// --- JSON test vector types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Z80TestCase {
    pub name: String,
    pub initial: Z80CpuState,
    #[serde(rename = "final")]
    pub final_state: Z80CpuState,
    /// Total T-states the instruction must report.
    pub cycles: u32,
    /// Bytes served to IN instructions, in order.
    #[serde(default)]
    pub ports: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Z80CpuState {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub i: u8,
    pub r: u8,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub af_prime: u16,
    pub bc_prime: u16,
    pub de_prime: u16,
    pub hl_prime: u16,
    pub iff1: u8,
    pub iff2: u8,
    pub im: u8,
    pub halted: u8,
    pub ram: Vec<(u16, u8)>,
}

/// Read a vector file, transparently decompressing `.gz`.
pub fn read_test_file(path: &Path) -> std::io::Result<Vec<Z80TestCase>> {
    let mut raw = String::new();
    if path.extension().is_some_and(|e| e == "gz") {
        GzDecoder::new(File::open(path)?).read_to_string(&mut raw)?;
    } else {
        File::open(path)?.read_to_string(&mut raw)?;
    }
    serde_json::from_str(&raw).map_err(std::io::Error::other)
}
