use crate::core::Bus;
use crate::cpu::z80::{Flag, IndexMode, Z80};

impl Z80 {
    /// CB prefix entry. For DD CB / FD CB the displacement byte precedes the
    /// sub-opcode, and neither is an M1 fetch (no R refresh). Returned counts
    /// include the CB prefix; DD/FD prefix cycles are counted by the caller.
    pub(crate) fn execute_cb<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        if self.index_mode != IndexMode::HL {
            let base = match self.index_mode {
                IndexMode::IX => self.ix,
                IndexMode::IY => self.iy,
                IndexMode::HL => unreachable!(),
            };
            let d = self.fetch_byte(bus) as i8;
            let addr = base.wrapping_add(d as i16 as u16);
            let op = self.fetch_byte(bus);
            self.execute_index_cb(op, addr, bus)
        } else {
            let op = self.fetch_opcode(bus);
            self.execute_cb_op(op, bus)
        }
    }

    /// Plain CB operations. Register forms always use the base register set
    /// (CB never substitutes IXH/IXL).
    fn execute_cb_op<B: Bus + ?Sized>(&mut self, op: u8, bus: &mut B) -> u32 {
        let y = (op >> 3) & 0x07;
        let r = op & 0x07;

        match op >> 6 {
            // Rotates/shifts — 8 T (reg), 15 T ((HL))
            0 => {
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr);
                    let result = self.do_rotate_shift(y, val);
                    bus.write(addr, result);
                    15
                } else {
                    let val = self.get_reg8(r);
                    let result = self.do_rotate_shift(y, val);
                    self.set_reg8(r, result);
                    8
                }
            }
            // BIT y, r — 8 T / BIT y, (HL) — 12 T
            // X/Y come from the operand for registers, and from the high
            // byte of the tested address for the memory form.
            1 => {
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr);
                    self.set_bit_flags(y, val, (addr >> 8) as u8);
                    12
                } else {
                    let val = self.get_reg8(r);
                    self.set_bit_flags(y, val, val);
                    8
                }
            }
            // RES/SET y, r — 8 T / (HL) — 15 T
            _ => {
                let set = (op >> 6) == 3;
                if r == 6 {
                    let addr = self.get_hl();
                    let val = bus.read(addr);
                    let result = Self::apply_res_set(y, val, set);
                    bus.write(addr, result);
                    15
                } else {
                    let val = self.get_reg8(r);
                    let result = Self::apply_res_set(y, val, set);
                    self.set_reg8(r, result);
                    8
                }
            }
        }
    }

    /// DD CB d op / FD CB d op. All forms operate on (IX+d); the
    /// undocumented variants with a register field also copy the result into
    /// that register. Returned counts exclude the 4 T DD/FD prefix:
    /// BIT 16 (20 total), others 19 (23 total).
    fn execute_index_cb<B: Bus + ?Sized>(&mut self, op: u8, addr: u16, bus: &mut B) -> u32 {
        let y = (op >> 3) & 0x07;
        let r = op & 0x07;

        match op >> 6 {
            0 => {
                let val = bus.read(addr);
                let result = self.do_rotate_shift(y, val);
                bus.write(addr, result);
                if r != 6 {
                    self.set_reg8(r, result);
                }
                19
            }
            1 => {
                let val = bus.read(addr);
                self.set_bit_flags(y, val, (addr >> 8) as u8);
                16
            }
            _ => {
                let set = (op >> 6) == 3;
                let val = bus.read(addr);
                let result = Self::apply_res_set(y, val, set);
                bus.write(addr, result);
                if r != 6 {
                    self.set_reg8(r, result);
                }
                19
            }
        }
    }

    /// Shared rotate/shift core for the CB group, including the
    /// undocumented SLL. Sets S, Z, PV (parity), C; H = N = 0; X/Y from result.
    fn do_rotate_shift(&mut self, kind: u8, val: u8) -> u8 {
        let old_c = (self.f & Flag::C as u8) != 0;
        let (result, carry) = match kind {
            0 => (val.rotate_left(1), (val & 0x80) != 0),            // RLC
            1 => (val.rotate_right(1), (val & 0x01) != 0),           // RRC
            2 => ((val << 1) | old_c as u8, (val & 0x80) != 0),      // RL
            3 => ((val >> 1) | ((old_c as u8) << 7), (val & 0x01) != 0), // RR
            4 => (val << 1, (val & 0x80) != 0),                      // SLA
            5 => ((val >> 1) | (val & 0x80), (val & 0x01) != 0),     // SRA
            6 => ((val << 1) | 0x01, (val & 0x80) != 0),             // SLL
            7 => (val >> 1, (val & 0x01) != 0),                      // SRL
            _ => unreachable!(),
        };

        let mut f = 0;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if Self::get_parity(result) { f |= Flag::PV as u8; }
        if carry { f |= Flag::C as u8; }
        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        result
    }

    /// BIT flags: Z from the tested bit, PV = Z, H = 1, N = 0,
    /// S only for BIT 7 of a set bit, C preserved, X/Y from `xy_source`.
    fn set_bit_flags(&mut self, bit: u8, val: u8, xy_source: u8) {
        let tested = val & (1 << bit);
        let mut f = (self.f & Flag::C as u8) | Flag::H as u8;
        if tested == 0 {
            f |= Flag::Z as u8 | Flag::PV as u8;
        }
        if bit == 7 && tested != 0 {
            f |= Flag::S as u8;
        }
        f |= xy_source & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    fn apply_res_set(bit: u8, val: u8, set: bool) -> u8 {
        if set {
            val | (1 << bit)
        } else {
            val & !(1 << bit)
        }
    }
}
