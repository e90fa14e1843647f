//! SMS memory and I/O bus.
//!
//! Memory map (reads):
//!   0x0000-0x03FF  ROM slot 0 bank 0 (never paged)
//!   0x0400-0x3FFF  ROM slot 0 (mapper page A)
//!   0x4000-0x7FFF  ROM slot 1 (mapper page B)
//!   0x8000-0xBFFF  ROM slot 2 (mapper page C) or cartridge RAM
//!   0xC000-0xDFFF  Work RAM (8 KiB)
//!   0xE000-0xFFFF  Work RAM mirror
//!
//! While the BIOS overlay is enabled, 0x0000-0x3FFF reads come from the
//! BIOS image instead of the cartridge (same fixed-first-KiB rule).
//! Mapper latches live at 0xFFFC-0xFFFF; writes also land in the RAM
//! mirror. The I/O decoder only looks at address bits 7..6, with the
//! even/odd split inside each quarter.

use log::debug;
use markiii_core::core::{Bus, InterruptState};
use markiii_core::device::{ControllerPorts, PsgConfig, SmsVdp, Sn76489};

use crate::sms::cartridge::{Bios, Cartridge};

const RAM_SIZE: usize = 0x2000;

// 0xFFFC control latch bits
const RAM_SELECT_ENABLE: u8 = 0x08;
const RAM_SELECT_PAGE: u8 = 0x04;

// Port 0x3E memory-control bits
const MEMCTL_BIOS_DISABLE: u8 = 0x08;

/// Optional model of the SMS I/O wait-state generator: VDP-port accesses
/// cost extra cycles.
#[derive(Clone, Copy, Debug)]
pub struct WaitStateConfig {
    /// Cycles added per penalized I/O access.
    pub penalty_cycles: u32,
    /// Whether penalties are folded into the per-instruction cycle count
    /// reported to the scheduler (they always advance the VDP/PSG).
    pub include_in_cycles: bool,
}

impl Default for WaitStateConfig {
    fn default() -> Self {
        Self {
            penalty_cycles: 4,
            include_in_cycles: true,
        }
    }
}

/// Bus traffic counters, kept for tests and debugging.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusStats {
    pub reads: u64,
    pub writes: u64,
    pub io_reads: u64,
    pub io_writes: u64,
    pub mapper_writes: u64,
}

/// Per-instruction trace record handed to the `on_trace` hook.
#[derive(Clone, Copy, Debug)]
pub struct TraceEvent {
    /// PC at the start of the instruction (or interrupt acceptance).
    pub pc: u16,
    /// Reported cycle cost of the step.
    pub cycles: u32,
    pub irq_accepted: bool,
}

/// Diagnostic hooks invoked around CPU I/O and instruction retirement.
/// The core behaves identically with all hooks absent; an `on_io_read`
/// result overrides the bus value.
#[derive(Default)]
pub struct CpuDebugHooks {
    pub on_io_read: Option<Box<dyn FnMut(u8, u16) -> Option<u8>>>,
    pub on_io_write: Option<Box<dyn FnMut(u8, u8, u16)>>,
    pub on_trace: Option<Box<dyn FnMut(TraceEvent)>>,
}

pub struct SmsBus {
    cart: Cartridge,
    bios: Option<Bios>,
    ram: Box<[u8; RAM_SIZE]>,

    allow_cart_ram: bool,
    ram_select: u8,       // 0xFFFC latch
    mapper_pages: [u8; 3], // 0xFFFD/E/F latches
    memory_control: u8,   // port 0x3E latch
    pub pause_pressed: bool,

    pub vdp: SmsVdp,
    pub psg: Sn76489,
    pub controllers: ControllerPorts,

    wait: Option<WaitStateConfig>,
    wait_penalty: u32,

    stats: BusStats,
    hooks: CpuDebugHooks,
    current_pc: u16,
}

impl SmsBus {
    pub fn new(
        cart: Cartridge,
        bios: Option<Bios>,
        allow_cart_ram: bool,
        wait: Option<WaitStateConfig>,
        psg_config: PsgConfig,
    ) -> Self {
        let mut bus = Self {
            cart,
            bios,
            ram: Box::new([0; RAM_SIZE]),
            allow_cart_ram,
            ram_select: 0,
            mapper_pages: [0, 1, 2],
            memory_control: 0,
            pause_pressed: false,
            vdp: SmsVdp::new(),
            psg: Sn76489::new(psg_config),
            controllers: ControllerPorts::new(),
            wait,
            wait_penalty: 0,
            stats: BusStats::default(),
            hooks: CpuDebugHooks::default(),
            current_pc: 0,
        };
        bus.reset();
        bus
    }

    /// Restore power-on bus state. ROM, BIOS image, and cartridge RAM
    /// contents are preserved (cartridge RAM is battery-backed).
    pub fn reset(&mut self) {
        use markiii_core::core::Component;

        self.ram.fill(0);
        self.ram_select = 0;
        self.mapper_pages = [0, 1, 2];
        self.memory_control = 0;
        self.pause_pressed = false;
        self.wait_penalty = 0;
        self.stats = BusStats::default();
        self.vdp.reset();
        self.psg.reset();
        self.controllers.reset();
    }

    pub fn set_hooks(&mut self, hooks: CpuDebugHooks) {
        self.hooks = hooks;
    }

    /// Called by the machine at each instruction boundary.
    pub fn begin_instruction(&mut self, pc: u16) {
        self.current_pc = pc;
    }

    /// Drain the wait-state penalty accumulated by the last instruction.
    pub fn take_wait_penalty(&mut self) -> u32 {
        std::mem::take(&mut self.wait_penalty)
    }

    pub fn emit_trace(&mut self, event: TraceEvent) {
        if let Some(hook) = self.hooks.on_trace.as_mut() {
            hook(event);
        }
    }

    pub fn wait_config(&self) -> Option<WaitStateConfig> {
        self.wait
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }

    pub fn memory_control(&self) -> u8 {
        self.memory_control
    }

    pub fn mapper_page(&self, slot: usize) -> u8 {
        self.mapper_pages[slot]
    }

    pub fn cart(&self) -> &Cartridge {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    fn bios_enabled(&self) -> bool {
        self.bios.is_some() && self.memory_control & MEMCTL_BIOS_DISABLE == 0
    }

    fn cart_ram_mapped(&self) -> bool {
        self.allow_cart_ram && self.ram_select & RAM_SELECT_ENABLE != 0
    }

    fn cart_ram_base(&self) -> usize {
        if self.ram_select & RAM_SELECT_PAGE != 0 {
            0x4000
        } else {
            0
        }
    }

    /// Read from the BIOS overlay. The first KiB is fixed; the rest pages
    /// through mapper slot A, modulo the image size.
    fn bios_read(&self, addr: u16) -> u8 {
        let Some(bios) = self.bios.as_ref() else {
            return 0xFF;
        };
        let offset = if addr < 0x0400 {
            addr as usize
        } else {
            self.mapper_pages[0] as usize * 0x4000 + (addr as usize & 0x3FFF)
        };
        bios.read(offset)
    }

    fn set_mapper_page(&mut self, slot: usize, data: u8) {
        let page = data & 0x3F;
        self.stats.mapper_writes += 1;
        if page as usize >= self.cart.bank_count() {
            debug!(
                "mapper slot {} set to page 0x{:02X} beyond {} banks (wraps)",
                slot,
                page,
                self.cart.bank_count()
            );
        }
        self.mapper_pages[slot] = page;
    }

    /// True when the wait-state model penalizes this port: the VDP port
    /// pair and its bits-7..6 mirrors, excluding the PSG write port 0x7F.
    fn port_has_wait(&self, port: u8) -> bool {
        let low6 = port & 0x3F;
        (low6 == 0x3E || low6 == 0x3F) && port != 0x7F
    }

    fn apply_wait(&mut self, port: u8) {
        if let Some(cfg) = self.wait {
            if self.port_has_wait(port) {
                self.wait_penalty += cfg.penalty_cycles;
            }
        }
    }
}

impl Bus for SmsBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.stats.reads += 1;
        match addr {
            0x0000..=0x3FFF => {
                if self.bios_enabled() {
                    self.bios_read(addr)
                } else if addr < 0x0400 {
                    self.cart.read_fixed(addr)
                } else {
                    self.cart.read_banked(self.mapper_pages[0], addr)
                }
            }
            0x4000..=0x7FFF => self.cart.read_banked(self.mapper_pages[1], addr),
            0x8000..=0xBFFF => {
                if self.cart_ram_mapped() {
                    let base = self.cart_ram_base();
                    self.cart.ram()[base + (addr as usize & 0x3FFF)]
                } else {
                    self.cart.read_banked(self.mapper_pages[2], addr)
                }
            }
            _ => self.ram[addr as usize & (RAM_SIZE - 1)],
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.stats.writes += 1;
        match addr {
            0xC000..=0xFFFF => {
                self.ram[addr as usize & (RAM_SIZE - 1)] = data;
                match addr {
                    0xFFFC => self.ram_select = data,
                    0xFFFD => self.set_mapper_page(0, data),
                    0xFFFE => self.set_mapper_page(1, data),
                    0xFFFF => self.set_mapper_page(2, data),
                    _ => {}
                }
            }
            0x8000..=0xBFFF => {
                if self.cart_ram_mapped() {
                    let base = self.cart_ram_base();
                    self.cart.ram_mut()[base + (addr as usize & 0x3FFF)] = data;
                }
                // ROM writes are ignored
            }
            _ => {} // ROM: ignored
        }
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.stats.io_reads += 1;
        let port = port as u8;
        self.apply_wait(port);

        if let Some(hook) = self.hooks.on_io_read.as_mut() {
            if let Some(val) = hook(port, self.current_pc) {
                return val;
            }
        }

        match port & 0xC0 {
            // 0x00-0x3F: memory control / I/O control are write-only
            0x00 => 0xFF,
            // 0x40-0x7F: H counter on even ports, V counter on odd
            0x40 => {
                if port & 1 == 0 {
                    self.vdp.h_counter()
                } else {
                    self.vdp.v_counter()
                }
            }
            // 0x80-0xBF: VDP data / status
            0x80 => {
                if port & 1 == 0 {
                    self.vdp.read_data()
                } else {
                    self.vdp.read_status()
                }
            }
            // 0xC0-0xFF: controller ports
            _ => {
                if port & 1 == 0 {
                    self.controllers.port_dc()
                } else {
                    self.controllers.port_dd()
                }
            }
        }
    }

    fn io_write(&mut self, port: u16, data: u8) {
        self.stats.io_writes += 1;
        let port = port as u8;
        self.apply_wait(port);

        if let Some(hook) = self.hooks.on_io_write.as_mut() {
            hook(port, data, self.current_pc);
        }

        match port & 0xC0 {
            // 0x00-0x3F: memory control on even ports, I/O control on odd
            0x00 => {
                if port & 1 == 0 {
                    if (data ^ self.memory_control) & MEMCTL_BIOS_DISABLE != 0 {
                        debug!(
                            "BIOS overlay {} at pc=0x{:04X}",
                            if data & MEMCTL_BIOS_DISABLE != 0 { "disabled" } else { "enabled" },
                            self.current_pc
                        );
                    }
                    self.memory_control = data;
                } else {
                    self.controllers.write_control(data);
                }
            }
            // 0x40-0x7F: PSG
            0x40 => self.psg.write(data),
            // 0x80-0xBF: VDP data / control
            0x80 => {
                if port & 1 == 0 {
                    self.vdp.write_data(data)
                } else {
                    self.vdp.write_control(data)
                }
            }
            // 0xC0-0xFF: no writable device
            _ => {}
        }
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState {
            nmi: self.pause_pressed,
            irq: self.vdp.irq_pending(),
            irq_vector: 0xFF, // nothing drives the data bus on the SMS
        }
    }
}
