//! Sega Master System (NTSC) machine wiring.
//!
//! Hardware: Zilog Z80 @ 3.579545 MHz, 315-5124 VDP (Mode 4, 256×192),
//! SN76489 PSG, 8 KiB work RAM, Sega-mapper cartridges up to 1 MiB with
//! optional battery-backed RAM, optional boot BIOS overlay.
//!
//! Scheduling is cycle-driven at instruction granularity: the CPU runs one
//! whole instruction, then the VDP and PSG advance by its cycle count, and
//! the VDP interrupt line is sampled at the next instruction boundary.

pub mod bus;
pub mod cartridge;

use markiii_core::core::machine::{InputButton, Machine};
use markiii_core::core::Component;
use markiii_core::cpu::state::Z80State;
use markiii_core::cpu::z80::{Step, Z80};
use markiii_core::cpu::{Cpu, CpuStateTrait};
use markiii_core::device::{ControllerState, PsgConfig};

use crate::sms::bus::{CpuDebugHooks, SmsBus, WaitStateConfig};
use crate::sms::cartridge::{Bios, Cartridge, SmsConfigError};

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
// CPU clock:   3.579545 MHz (NTSC colorburst)
// Scanline:    228 CPU cycles
// Frame:       262 lines × 228 = 59736 CPU cycles
// Frame rate:  3579545 / 59736 ≈ 59.92 Hz

pub const CPU_CLOCK_HZ: u64 = 3_579_545;
pub const CYCLES_PER_FRAME: u64 = 59_736;

// ---------------------------------------------------------------------------
// Input button IDs
// ---------------------------------------------------------------------------
pub const INPUT_P1_UP: u8 = 0;
pub const INPUT_P1_DOWN: u8 = 1;
pub const INPUT_P1_LEFT: u8 = 2;
pub const INPUT_P1_RIGHT: u8 = 3;
pub const INPUT_P1_BUTTON1: u8 = 4;
pub const INPUT_P1_BUTTON2: u8 = 5;
pub const INPUT_P2_UP: u8 = 6;
pub const INPUT_P2_DOWN: u8 = 7;
pub const INPUT_P2_LEFT: u8 = 8;
pub const INPUT_P2_RIGHT: u8 = 9;
pub const INPUT_P2_BUTTON1: u8 = 10;
pub const INPUT_P2_BUTTON2: u8 = 11;
pub const INPUT_PAUSE: u8 = 12;
pub const INPUT_RESET: u8 = 13;

const SMS_INPUT_MAP: &[InputButton] = &[
    InputButton { id: INPUT_P1_UP, name: "P1 Up" },
    InputButton { id: INPUT_P1_DOWN, name: "P1 Down" },
    InputButton { id: INPUT_P1_LEFT, name: "P1 Left" },
    InputButton { id: INPUT_P1_RIGHT, name: "P1 Right" },
    InputButton { id: INPUT_P1_BUTTON1, name: "P1 Button 1" },
    InputButton { id: INPUT_P1_BUTTON2, name: "P1 Button 2" },
    InputButton { id: INPUT_P2_UP, name: "P2 Up" },
    InputButton { id: INPUT_P2_DOWN, name: "P2 Down" },
    InputButton { id: INPUT_P2_LEFT, name: "P2 Left" },
    InputButton { id: INPUT_P2_RIGHT, name: "P2 Right" },
    InputButton { id: INPUT_P2_BUTTON1, name: "P2 Button 1" },
    InputButton { id: INPUT_P2_BUTTON2, name: "P2 Button 2" },
    InputButton { id: INPUT_PAUSE, name: "Pause" },
    InputButton { id: INPUT_RESET, name: "Reset" },
];

/// Machine construction parameters. Everything is plain data except the
/// optional diagnostic hooks; the core runs identically without them.
#[derive(Default)]
pub struct SmsConfig {
    /// Cartridge ROM image (multiple of 16 KiB, at most 1 MiB).
    pub cart: Vec<u8>,
    /// Wire up battery-backed cartridge RAM behind the 0xFFFC latch.
    pub allow_cart_ram: bool,
    /// Boot BIOS image (power-of-two multiple of 1 KiB).
    pub bios: Option<Vec<u8>>,
    /// Enable the I/O wait-state model.
    pub wait: Option<WaitStateConfig>,
    /// With no BIOS, pre-program post-boot VDP/CPU state.
    pub use_manual_init: bool,
    pub psg: PsgConfig,
    pub controller1: ControllerState,
    pub controller2: ControllerState,
    /// Called with the (reported) cycle count after every instruction.
    pub trace: Option<Box<dyn FnMut(u32)>>,
    pub cpu_debug_hooks: CpuDebugHooks,
}

/// Sega Master System.
pub struct SmsSystem {
    cpu: Z80,
    bus: SmsBus,

    trace: Option<Box<dyn FnMut(u32)>>,
    allow_cart_ram: bool,
    has_bios: bool,
    use_manual_init: bool,

    // Debug counters
    cycle_count: u64,
    instruction_count: u64,
    irq_count: u64,
}

impl SmsSystem {
    pub fn new(config: SmsConfig) -> Result<Self, SmsConfigError> {
        let cart = Cartridge::new(config.cart)?;
        let bios = config.bios.map(Bios::new).transpose()?;
        let has_bios = bios.is_some();

        let mut bus = SmsBus::new(
            cart,
            bios,
            config.allow_cart_ram,
            config.wait,
            config.psg,
        );
        bus.set_hooks(config.cpu_debug_hooks);

        let mut system = Self {
            cpu: Z80::new(),
            bus,
            trace: config.trace,
            allow_cart_ram: config.allow_cart_ram,
            has_bios,
            use_manual_init: config.use_manual_init,
            cycle_count: 0,
            instruction_count: 0,
            irq_count: 0,
        };
        system.power_on();
        // Initial pad state applies on top of the power-on defaults
        system.bus.controllers.pad1 = config.controller1;
        system.bus.controllers.pad2 = config.controller2;
        Ok(system)
    }

    fn power_on(&mut self) {
        self.cpu.reset();
        self.cpu.sp = 0xDFF0;
        self.bus.reset();
        self.cycle_count = 0;
        self.instruction_count = 0;
        self.irq_count = 0;

        if !self.has_bios && self.use_manual_init {
            self.manual_init();
        }
    }

    /// Approximate the state the boot BIOS leaves behind: Mode 4 with the
    /// display and frame interrupt enabled, IM 1 with interrupts on.
    fn manual_init(&mut self) {
        const VDP_INIT: [(usize, u8); 11] = [
            (0, 0x36),
            (1, 0xE0),
            (2, 0xFF),
            (3, 0xFF),
            (4, 0xFF),
            (5, 0xFF),
            (6, 0xFB),
            (7, 0x00),
            (8, 0x00),
            (9, 0x00),
            (10, 0xFF),
        ];
        for (reg, val) in VDP_INIT {
            self.bus.vdp.set_register(reg, val);
        }
        self.cpu.im = 1;
        self.cpu.iff1 = true;
        self.cpu.iff2 = true;
    }

    /// Run exactly one instruction (or interrupt acceptance), advance the
    /// VDP and PSG by its cycle cost, and report that cost.
    pub fn step_one(&mut self) -> Step {
        let pc_before = self.cpu.pc;
        self.bus.begin_instruction(pc_before);
        let step = self.cpu.step(&mut self.bus);
        let penalty = self.bus.take_wait_penalty();
        let advance = step.cycles + penalty;

        self.bus.vdp.advance(advance);
        self.bus.psg.advance(advance);

        let include_wait = self.bus.wait_config().is_none_or(|c| c.include_in_cycles);
        let reported = if include_wait { advance } else { step.cycles };

        self.cycle_count += reported as u64;
        self.instruction_count += 1;
        if step.irq_accepted {
            self.irq_count += 1;
        }
        if let Some(trace) = self.trace.as_mut() {
            trace(reported);
        }
        self.bus.emit_trace(bus::TraceEvent {
            pc: pc_before,
            cycles: reported,
            irq_accepted: step.irq_accepted,
        });

        Step {
            cycles: reported,
            irq_accepted: step.irq_accepted,
        }
    }

    /// Run at least `n` CPU cycles (stops at the first instruction boundary
    /// past the budget). Returns the cycles actually run.
    pub fn run_cycles(&mut self, n: u64) -> u64 {
        let mut run = 0u64;
        while run < n {
            run += self.step_one().cycles as u64;
        }
        run
    }

    pub fn get_cpu_state(&self) -> Z80State {
        self.cpu.snapshot()
    }

    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    pub fn bus(&self) -> &SmsBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SmsBus {
        &mut self.bus
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn irq_count(&self) -> u64 {
        self.irq_count
    }

    fn pad_button(&mut self, button: u8, pressed: bool) {
        if button == INPUT_PAUSE {
            // The pause button goes straight to the NMI line
            self.bus.pause_pressed = pressed;
            return;
        }
        let pads = &mut self.bus.controllers;
        match button {
            INPUT_P1_UP => pads.pad1.up = pressed,
            INPUT_P1_DOWN => pads.pad1.down = pressed,
            INPUT_P1_LEFT => pads.pad1.left = pressed,
            INPUT_P1_RIGHT => pads.pad1.right = pressed,
            INPUT_P1_BUTTON1 => pads.pad1.button1 = pressed,
            INPUT_P1_BUTTON2 => pads.pad1.button2 = pressed,
            INPUT_P2_UP => pads.pad2.up = pressed,
            INPUT_P2_DOWN => pads.pad2.down = pressed,
            INPUT_P2_LEFT => pads.pad2.left = pressed,
            INPUT_P2_RIGHT => pads.pad2.right = pressed,
            INPUT_P2_BUTTON1 => pads.pad2.button1 = pressed,
            INPUT_P2_BUTTON2 => pads.pad2.button2 = pressed,
            INPUT_RESET => pads.pad2.reset = pressed,
            _ => {}
        }
    }
}

impl Machine for SmsSystem {
    fn display_size(&self) -> (u32, u32) {
        (
            markiii_core::device::sms_vdp::FRAME_WIDTH as u32,
            markiii_core::device::sms_vdp::FRAME_HEIGHT as u32,
        )
    }

    fn run_frame(&mut self) {
        self.run_cycles(CYCLES_PER_FRAME);
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        self.bus.vdp.render_frame(buffer);
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        self.pad_button(button, pressed);
    }

    fn input_map(&self) -> &[InputButton] {
        SMS_INPUT_MAP
    }

    fn reset(&mut self) {
        self.power_on();
    }

    fn save_nvram(&self) -> Option<&[u8]> {
        if self.allow_cart_ram {
            Some(self.bus.cart().ram())
        } else {
            None
        }
    }

    fn load_nvram(&mut self, data: &[u8]) {
        let ram = self.bus.cart_mut().ram_mut();
        let n = ram.len().min(data.len());
        ram[..n].copy_from_slice(&data[..n]);
    }

    fn fill_audio(&mut self, buffer: &mut [i16]) -> usize {
        self.bus.psg.fill_audio(buffer)
    }

    fn audio_sample_rate(&self) -> u32 {
        self.bus.psg.sample_rate()
    }

    fn frame_rate_hz(&self) -> f64 {
        CPU_CLOCK_HZ as f64 / CYCLES_PER_FRAME as f64
    }
}
