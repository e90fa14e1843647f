/// Generic CPU interface
pub trait Cpu {
    /// Chip-level reset (reset pin behavior, not machine power-on).
    fn reset(&mut self);

    /// Query if CPU is halted internally (HALT instruction)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, Z80State};

// Z80 CPU
pub mod z80;
pub use z80::Z80;
