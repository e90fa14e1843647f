mod alu;
mod bit;
mod block;
mod branch;
mod load_store;
mod stack;

use crate::core::Bus;
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, Z80State},
};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    X = 0x08,  // Unused (copy of bit 3)
    H = 0x10,  // Half Carry
    Y = 0x20,  // Unused (copy of bit 5)
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

/// Result of executing one instruction (or accepting one interrupt).
#[derive(Clone, Copy, Debug)]
pub struct Step {
    /// Exact T-state cost, including any prefix fetches.
    pub cycles: u32,
    /// True when this step was a maskable-interrupt acceptance.
    pub irq_accepted: bool,
}

pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Shadow Registers
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & Special Registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    // Internal state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub ei_delay: bool,

    // Prefix handling for the instruction currently being decoded
    pub(crate) index_mode: IndexMode,

    // Interrupt state
    pub(crate) nmi_previous: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IndexMode {
    HL,
    IX,
    IY,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self {
            a: 0xFF,
            f: 0xFF,
            b: 0xFF,
            c: 0xFF,
            d: 0xFF,
            e: 0xFF,
            h: 0xFF,
            l: 0xFF,
            a_prime: 0xFF,
            f_prime: 0xFF,
            b_prime: 0xFF,
            c_prime: 0xFF,
            d_prime: 0xFF,
            e_prime: 0xFF,
            h_prime: 0xFF,
            l_prime: 0xFF,
            ix: 0xFFFF,
            iy: 0xFFFF,
            i: 0,
            r: 0,
            sp: 0xFFFF,
            pc: 0x0000,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            ei_delay: false,
            index_mode: IndexMode::HL,
            nmi_previous: false,
        }
    }

    // Helpers for 16-bit register access
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    pub fn get_af(&self) -> u16 { ((self.a as u16) << 8) | self.f as u16 }
    pub fn set_af(&mut self, val: u16) { self.a = (val >> 8) as u8; self.f = val as u8; }

    pub fn get_reg8(&self, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            7 => self.a,
            _ => unreachable!("get_reg8 called with index {}", index),
        }
    }

    pub fn set_reg8(&mut self, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            7 => self.a = val,
            _ => unreachable!("set_reg8 called with index {}", index),
        }
    }

    /// Get 8-bit register by index, respecting IX/IY prefix for H/L (undocumented IXH/IXL/IYH/IYL).
    /// Index 6 is NOT handled here — callers must handle (HL)/(IX+d)/(IY+d) separately.
    pub fn get_reg8_ix(&self, index: u8) -> u8 {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => (self.ix >> 8) as u8,
            (5, IndexMode::IX) => self.ix as u8,
            (4, IndexMode::IY) => (self.iy >> 8) as u8,
            (5, IndexMode::IY) => self.iy as u8,
            _ => self.get_reg8(index),
        }
    }

    pub fn set_reg8_ix(&mut self, index: u8, val: u8) {
        match (index, self.index_mode) {
            (4, IndexMode::IX) => self.ix = (self.ix & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IX) => self.ix = (self.ix & 0xFF00) | val as u16,
            (4, IndexMode::IY) => self.iy = (self.iy & 0x00FF) | ((val as u16) << 8),
            (5, IndexMode::IY) => self.iy = (self.iy & 0xFF00) | val as u16,
            _ => self.set_reg8(index, val),
        }
    }

    /// Get 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    /// Index 2 respects current index_mode for DD/FD prefixed instructions.
    pub(crate) fn get_rp(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => match self.index_mode {
                IndexMode::HL => self.get_hl(),
                IndexMode::IX => self.ix,
                IndexMode::IY => self.iy,
            },
            3 => self.sp,
            _ => unreachable!("get_rp called with index {}", index),
        }
    }

    /// Set 16-bit register pair by index (0=BC, 1=DE, 2=HL/IX/IY, 3=SP).
    pub(crate) fn set_rp(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => match self.index_mode {
                IndexMode::HL => self.set_hl(val),
                IndexMode::IX => self.ix = val,
                IndexMode::IY => self.iy = val,
            },
            3 => self.sp = val,
            _ => unreachable!("set_rp called with index {}", index),
        }
    }

    /// Get 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn get_rp_af(&self, index: u8) -> u16 {
        match index {
            0 => self.get_bc(),
            1 => self.get_de(),
            2 => match self.index_mode {
                IndexMode::HL => self.get_hl(),
                IndexMode::IX => self.ix,
                IndexMode::IY => self.iy,
            },
            3 => self.get_af(),
            _ => unreachable!("get_rp_af called with index {}", index),
        }
    }

    /// Set 16-bit register pair by index for PUSH/POP (0=BC, 1=DE, 2=HL/IX/IY, 3=AF).
    pub(crate) fn set_rp_af(&mut self, index: u8, val: u16) {
        match index {
            0 => self.set_bc(val),
            1 => self.set_de(val),
            2 => match self.index_mode {
                IndexMode::HL => self.set_hl(val),
                IndexMode::IX => self.ix = val,
                IndexMode::IY => self.iy = val,
            },
            3 => self.set_af(val),
            _ => unreachable!("set_rp_af called with index {}", index),
        }
    }

    pub(crate) fn condition(&self, cc: u8) -> bool {
        match cc {
            0 => self.f & Flag::Z as u8 == 0,  // NZ
            1 => self.f & Flag::Z as u8 != 0,  // Z
            2 => self.f & Flag::C as u8 == 0,  // NC
            3 => self.f & Flag::C as u8 != 0,  // C
            4 => self.f & Flag::PV as u8 == 0, // PO
            5 => self.f & Flag::PV as u8 != 0, // PE
            6 => self.f & Flag::S as u8 == 0,  // P
            7 => self.f & Flag::S as u8 != 0,  // M
            _ => unreachable!("condition called with code {}", cc),
        }
    }

    // --- Memory access helpers ---

    /// R refresh: bit 7 is preserved, only bits 0-6 count.
    pub(crate) fn inc_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    /// M1 fetch: read opcode byte, advance PC, refresh R.
    pub(crate) fn fetch_opcode<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let op = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.inc_r();
        op
    }

    /// Operand fetch: read byte at PC, advance PC. Not an M1 cycle (no R refresh).
    pub(crate) fn fetch_byte<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u8 {
        let val = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    pub(crate) fn fetch_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus) as u16;
        let hi = self.fetch_byte(bus) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn read_word<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read(addr) as u16;
        let hi = bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn write_word<B: Bus + ?Sized>(&mut self, bus: &mut B, addr: u16, val: u16) {
        bus.write(addr, val as u8);
        bus.write(addr.wrapping_add(1), (val >> 8) as u8);
    }

    pub(crate) fn push_word<B: Bus + ?Sized>(&mut self, bus: &mut B, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        bus.write(self.sp, val as u8);
    }

    pub(crate) fn pop_word<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let hi = bus.read(self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    /// Effective address of the memory operand: HL, or IX/IY plus a signed
    /// displacement fetched from the instruction stream.
    pub(crate) fn addr_hl_or_index<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u16 {
        match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => {
                let d = self.fetch_byte(bus) as i8;
                self.ix.wrapping_add(d as i16 as u16)
            }
            IndexMode::IY => {
                let d = self.fetch_byte(bus) as i8;
                self.iy.wrapping_add(d as i16 as u16)
            }
        }
    }

    // --- Instruction stepping ---

    /// Execute one instruction (or accept one pending interrupt) and return
    /// its exact T-state cost. Interrupts are sampled at the instruction
    /// boundary, before the next fetch; the EI shadow masks IRQ (never NMI)
    /// for exactly one instruction.
    pub fn step<B: Bus + ?Sized>(&mut self, bus: &mut B) -> Step {
        let ints = bus.check_interrupts();

        // NMI: edge-triggered (higher priority than IRQ, not masked by EI)
        let nmi_edge = ints.nmi && !self.nmi_previous;
        self.nmi_previous = ints.nmi;

        if self.ei_delay {
            // EI shadow: skip the IRQ check for one instruction after EI
            self.ei_delay = false;
            if nmi_edge {
                return Step { cycles: self.accept_nmi(bus), irq_accepted: false };
            }
        } else {
            if nmi_edge {
                return Step { cycles: self.accept_nmi(bus), irq_accepted: false };
            }
            if ints.irq && self.iff1 {
                return Step {
                    cycles: self.accept_irq(bus, ints.irq_vector),
                    irq_accepted: true,
                };
            }
        }

        if self.halted {
            // Effective NOP; R keeps refreshing while halted.
            self.inc_r();
            return Step { cycles: 4, irq_accepted: false };
        }

        self.index_mode = IndexMode::HL;
        let mut cycles = 0u32;
        let mut opcode = self.fetch_opcode(bus);

        // DD/FD prefix chain: 4 T each, latest prefix wins. The chain is
        // consumed whole, so no interrupt can land between a prefix and
        // the instruction it modifies.
        loop {
            match opcode {
                0xDD => {
                    self.index_mode = IndexMode::IX;
                    cycles += 4;
                    opcode = self.fetch_opcode(bus);
                }
                0xFD => {
                    self.index_mode = IndexMode::IY;
                    cycles += 4;
                    opcode = self.fetch_opcode(bus);
                }
                _ => break,
            }
        }

        cycles += match opcode {
            0xCB => self.execute_cb(bus),
            0xED => {
                // ED ignores any DD/FD prefix
                self.index_mode = IndexMode::HL;
                self.execute_ed(bus)
            }
            _ => self.execute_main(opcode, bus),
        };

        Step { cycles, irq_accepted: false }
    }

    /// NMI response: 11 T. IFF2 is preserved so RETN can restore it.
    fn accept_nmi<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.halted = false;
        self.inc_r();
        self.iff1 = false;
        self.push_word(bus, self.pc);
        self.pc = 0x0066;
        11
    }

    /// Maskable interrupt response per the current interrupt mode.
    /// IM 0/1: 13 T. IM 2: 19 T. IFF1 and IFF2 are both cleared.
    fn accept_irq<B: Bus + ?Sized>(&mut self, bus: &mut B, vector: u8) -> u32 {
        self.halted = false;
        self.inc_r();
        self.iff1 = false;
        self.iff2 = false;

        match self.im {
            2 => {
                // Indirect through the interrupt vector table at (I << 8) | vector
                self.push_word(bus, self.pc);
                let ptr = ((self.i as u16) << 8) | vector as u16;
                self.pc = self.read_word(bus, ptr);
                19
            }
            _ => {
                // IM 1 jumps to 0x0038. IM 0 executes the byte on the data
                // bus; with nothing driving it that byte is 0xFF = RST 38h,
                // and any other RST opcode jumps to its own target.
                let target = if self.im == 0 && (vector & 0xC7) == 0xC7 {
                    (vector & 0x38) as u16
                } else {
                    0x0038
                };
                self.push_word(bus, self.pc);
                self.pc = target;
                13
            }
        }
    }

    /// Base opcode dispatch. Handlers return the documented T-state count
    /// for the unprefixed form; DD/FD prefix overhead (4 T per prefix) is
    /// accounted by the caller, and handlers with an indexed memory operand
    /// add the remaining displacement penalty themselves.
    fn execute_main<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        match opcode {
            // NOP — 4 T
            0x00 => 4,

            // HALT — 4 T. PC stays past HALT (already incremented by the fetch).
            0x76 => {
                self.halted = true;
                4
            }

            // --- Load/Store ---

            // LD (BC), A — 7 T
            0x02 => self.op_ld_bc_a(bus),
            // LD (DE), A — 7 T
            0x12 => self.op_ld_de_a(bus),
            // LD (nn), HL — 16 T
            0x22 => self.op_ld_nn_hl(bus),
            // LD (nn), A — 13 T
            0x32 => self.op_ld_nn_a(bus),

            // EX AF, AF' — 4 T
            0x08 => self.op_ex_af_af(),

            // LD A, (BC) — 7 T
            0x0A => self.op_ld_a_bc(bus),
            // LD A, (DE) — 7 T
            0x1A => self.op_ld_a_de(bus),
            // LD HL, (nn) — 16 T
            0x2A => self.op_ld_hl_nn_ind(bus),
            // LD A, (nn) — 13 T
            0x3A => self.op_ld_a_nn(bus),

            // LD rr, nn (0x01/0x11/0x21/0x31) — 10 T
            op if (op & 0xCF) == 0x01 => self.op_ld_rr_nn(op, bus),

            // LD r, n (0x06, 0x0E, ... 0x3E) — 7 T / LD (HL), n — 10 T
            op if (op & 0xC7) == 0x06 => self.op_ld_r_n(op, bus),

            // LD r, r' (0x40-0x7F excluding 0x76) — 4/7 T
            op if (op & 0xC0) == 0x40 => self.op_ld_r_r(op, bus),

            // LD SP, HL — 6 T
            0xF9 => self.op_ld_sp_hl(),

            // EX DE, HL — 4 T
            0xEB => self.op_ex_de_hl(),
            // EXX — 4 T
            0xD9 => self.op_exx(),
            // EX (SP), HL — 19 T
            0xE3 => self.op_ex_sp_hl(bus),

            // --- Stack ---

            // PUSH rr (0xC5/D5/E5/F5) — 11 T
            op if (op & 0xCF) == 0xC5 => self.op_push(op, bus),
            // POP rr (0xC1/D1/E1/F1) — 10 T
            op if (op & 0xCF) == 0xC1 => self.op_pop(op, bus),

            // --- ALU ---

            // ALU A, r (0x80 - 0xBF) — 4 T (reg) or 7 T ((HL))
            op if (op & 0xC0) == 0x80 => self.op_alu_r(op, bus),
            // ALU A, n (0xC6, 0xCE, ... 0xFE) — 7 T
            op if (op & 0xC7) == 0xC6 => self.op_alu_n(op, bus),

            // INC r (0x04, 0x0C...) — 4 T (reg) or 11 T ((HL))
            op if (op & 0xC7) == 0x04 => self.op_inc_dec_r(op, bus),
            // DEC r (0x05, 0x0D...) — 4 T (reg) or 11 T ((HL))
            op if (op & 0xC7) == 0x05 => self.op_inc_dec_r(op, bus),

            // ADD HL,rr (0x09/0x19/0x29/0x39) — 11 T
            op if (op & 0xCF) == 0x09 => self.op_add_hl_rr(op),
            // INC rr (0x03/0x13/0x23/0x33) — 6 T
            op if (op & 0xCF) == 0x03 => self.op_inc_dec_rr(op),
            // DEC rr (0x0B/0x1B/0x2B/0x3B) — 6 T
            op if (op & 0xCF) == 0x0B => self.op_inc_dec_rr(op),

            // Accumulator rotates — 4 T
            0x07 => self.op_rlca(),
            0x0F => self.op_rrca(),
            0x17 => self.op_rla(),
            0x1F => self.op_rra(),

            // Misc ALU — 4 T
            0x27 => self.op_daa(),
            0x2F => self.op_cpl(),
            0x37 => self.op_scf(),
            0x3F => self.op_ccf(),

            // --- Branch/Control Flow ---

            // JP nn — 10 T
            0xC3 => self.op_jp_nn(bus),
            // JP (HL) — 4 T
            0xE9 => self.op_jp_hl(),
            // JR e — 12 T
            0x18 => self.op_jr_e(bus),
            // DJNZ e — 13/8 T
            0x10 => self.op_djnz(bus),
            // CALL nn — 17 T
            0xCD => self.op_call_nn(bus),
            // RET — 10 T
            0xC9 => self.op_ret(bus),
            // IN A,(n) — 11 T
            0xDB => self.op_in_a_n(bus),
            // OUT (n),A — 11 T
            0xD3 => self.op_out_n_a(bus),

            // DI — 4 T
            0xF3 => self.op_di(),
            // EI — 4 T
            0xFB => self.op_ei(),

            // JP cc,nn — 10 T
            op if (op & 0xC7) == 0xC2 => self.op_jp_cc_nn(op, bus),
            // JR cc,e — 12/7 T (NZ/Z/NC/C only)
            op if (op & 0xE7) == 0x20 => self.op_jr_cc_e(op, bus),
            // CALL cc,nn — 17/10 T
            op if (op & 0xC7) == 0xC4 => self.op_call_cc_nn(op, bus),
            // RET cc — 11/5 T
            op if (op & 0xC7) == 0xC0 => self.op_ret_cc(op, bus),
            // RST p — 11 T
            op if (op & 0xC7) == 0xC7 => self.op_rst(op, bus),

            // All 256 base opcodes are matched above; keep the interpreter
            // total anyway.
            _ => 4,
        }
    }

    /// ED prefix dispatch. Returned counts are totals including the prefix.
    fn execute_ed<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let opcode = self.fetch_opcode(bus);

        match opcode {
            // --- Specific ED opcodes (low 3 bits = 111) ---
            0x47 => self.op_ld_i_a(),         // LD I,A — 9T
            0x4F => self.op_ld_r_a(),         // LD R,A — 9T
            0x57 => self.op_ld_a_i(),         // LD A,I — 9T
            0x5F => self.op_ld_a_r(),         // LD A,R — 9T
            0x67 => self.op_rrd(bus),         // RRD — 18T
            0x6F => self.op_rld(bus),         // RLD — 18T

            // --- Block transfer/compare/IO ---
            0xA0 | 0xA8 => self.op_ldi_ldd(opcode, bus),   // LDI/LDD — 16T
            0xA1 | 0xA9 => self.op_cpi_cpd(opcode, bus),   // CPI/CPD — 16T
            0xA2 | 0xAA => self.op_ini_ind(opcode, bus),   // INI/IND — 16T
            0xA3 | 0xAB => self.op_outi_outd(opcode, bus), // OUTI/OUTD — 16T
            0xB0 | 0xB8 => self.op_ldir_lddr(opcode, bus), // LDIR/LDDR — 21/16T
            0xB1 | 0xB9 => self.op_cpir_cpdr(opcode, bus), // CPIR/CPDR — 21/16T
            0xB2 | 0xBA => self.op_inir_indr(opcode, bus), // INIR/INDR — 21/16T
            0xB3 | 0xBB => self.op_otir_otdr(opcode, bus), // OTIR/OTDR — 21/16T

            // --- Pattern-based (40-7F range, low 3 bits 0-6) ---
            op if (op & 0xC7) == 0x40 => self.op_in_r_c(op, bus),  // IN r,(C) — 12T
            op if (op & 0xC7) == 0x41 => self.op_out_c_r(op, bus), // OUT (C),r — 12T
            op if (op & 0xCF) == 0x42 => self.op_sbc_hl_rr(op),    // SBC HL,rr — 15T
            op if (op & 0xCF) == 0x43 => self.op_ld_nn_rr_ed(op, bus), // LD (nn),rr — 20T
            op if (op & 0xC7) == 0x44 => self.op_neg(),            // NEG — 8T
            op if (op & 0xC7) == 0x45 => self.op_retn(bus),        // RETN/RETI — 14T
            op if (op & 0xC7) == 0x46 => self.op_im(op),           // IM 0/1/2 — 8T
            op if (op & 0xCF) == 0x4A => self.op_adc_hl_rr(op),    // ADC HL,rr — 15T
            op if (op & 0xCF) == 0x4B => self.op_ld_rr_nn_ed(op, bus), // LD rr,(nn) — 20T

            // ED NOP — 8T: undefined subcodes act as NOP
            _ => 8,
        }
    }
}

impl Cpu for Z80 {
    fn reset(&mut self) {
        self.pc = 0x0000;
        self.sp = 0xFFFF;
        self.a = 0xFF;
        self.f = 0xFF;
        self.i = 0;
        self.r = 0;
        self.im = 0;
        self.iff1 = false;
        self.iff2 = false;
        self.halted = false;
        self.ei_delay = false;
        self.index_mode = IndexMode::HL;
        self.nmi_previous = false;
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime,
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
        }
    }
}
