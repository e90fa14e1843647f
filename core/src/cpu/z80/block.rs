use crate::core::Bus;
use crate::cpu::z80::{Flag, Z80};

// The repeating forms execute one iteration per step and rewind PC by 2
// while they will repeat, so the scheduler sees a normal instruction
// boundary (and can accept interrupts) between iterations.

impl Z80 {
    /// LDI/LDD — 16 T
    pub(crate) fn op_ldi_ldd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let _ = self.do_ld_block(opcode, bus);
        16
    }

    /// LDIR/LDDR — 21 T while repeating, 16 T on the final iteration
    pub(crate) fn op_ldir_lddr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if self.do_ld_block(opcode, bus) {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    /// One LDI/LDD iteration. Returns true while BC is nonzero afterwards.
    /// BC = 0 on entry behaves as 0x10000: one iteration, then wrap to 0xFFFF.
    fn do_ld_block<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let decrement = (opcode & 0x08) != 0;
        let hl = self.get_hl();
        let de = self.get_de();
        let val = bus.read(hl);
        bus.write(de, val);

        if decrement {
            self.set_hl(hl.wrapping_sub(1));
            self.set_de(de.wrapping_sub(1));
        } else {
            self.set_hl(hl.wrapping_add(1));
            self.set_de(de.wrapping_add(1));
        }
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        // S, Z, C preserved; H = N = 0; PV = (BC != 0).
        // Undocumented X/Y come from (value + A): bit 3 -> X, bit 1 -> Y.
        let n = val.wrapping_add(self.a);
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::C as u8);
        if bc != 0 { f |= Flag::PV as u8; }
        if (n & 0x08) != 0 { f |= Flag::X as u8; }
        if (n & 0x02) != 0 { f |= Flag::Y as u8; }
        self.f = f;

        bc != 0
    }

    /// CPI/CPD — 16 T
    pub(crate) fn op_cpi_cpd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let _ = self.do_cp_block(opcode, bus);
        16
    }

    /// CPIR/CPDR — 21/16 T. Repeats while BC != 0 and the comparison missed.
    pub(crate) fn op_cpir_cpdr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if self.do_cp_block(opcode, bus) {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    /// One CPI/CPD iteration. Returns true while the repeat condition holds
    /// (BC != 0 and A != (HL)).
    fn do_cp_block<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let decrement = (opcode & 0x08) != 0;
        let hl = self.get_hl();
        let val = bus.read(hl);

        if decrement {
            self.set_hl(hl.wrapping_sub(1));
        } else {
            self.set_hl(hl.wrapping_add(1));
        }
        let bc = self.get_bc().wrapping_sub(1);
        self.set_bc(bc);

        let result = self.a.wrapping_sub(val);
        let half = (self.a & 0x0F) < (val & 0x0F);

        // C preserved; N = 1; PV = (BC != 0); S/Z/H from the comparison.
        // X/Y from (A - value - half_borrow): bit 3 -> X, bit 1 -> Y.
        let n = result.wrapping_sub(half as u8);
        let mut f = (self.f & Flag::C as u8) | Flag::N as u8;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if half { f |= Flag::H as u8; }
        if bc != 0 { f |= Flag::PV as u8; }
        if (n & 0x08) != 0 { f |= Flag::X as u8; }
        if (n & 0x02) != 0 { f |= Flag::Y as u8; }
        self.f = f;

        bc != 0 && result != 0
    }

    /// INI/IND — 16 T
    pub(crate) fn op_ini_ind<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let _ = self.do_in_block(opcode, bus);
        16
    }

    /// INIR/INDR — 21/16 T. Repeats while B != 0.
    pub(crate) fn op_inir_indr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if self.do_in_block(opcode, bus) {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    fn do_in_block<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let decrement = (opcode & 0x08) != 0;
        let port = self.get_bc();
        let val = bus.io_read(port);
        let hl = self.get_hl();
        bus.write(hl, val);

        if decrement {
            self.set_hl(hl.wrapping_sub(1));
        } else {
            self.set_hl(hl.wrapping_add(1));
        }
        self.b = self.b.wrapping_sub(1);

        self.set_block_io_flags(val, decrement);
        self.b != 0
    }

    /// OUTI/OUTD — 16 T
    pub(crate) fn op_outi_outd<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let _ = self.do_out_block(opcode, bus);
        16
    }

    /// OTIR/OTDR — 21/16 T. Repeats while B != 0.
    pub(crate) fn op_otir_otdr<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if self.do_out_block(opcode, bus) {
            self.pc = self.pc.wrapping_sub(2);
            21
        } else {
            16
        }
    }

    fn do_out_block<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> bool {
        let decrement = (opcode & 0x08) != 0;
        let hl = self.get_hl();
        let val = bus.read(hl);

        // B decrements before it appears on the port address bus
        self.b = self.b.wrapping_sub(1);
        let port = self.get_bc();
        bus.io_write(port, val);

        if decrement {
            self.set_hl(hl.wrapping_sub(1));
        } else {
            self.set_hl(hl.wrapping_add(1));
        }

        self.set_block_io_flags(val, decrement);
        self.b != 0
    }

    /// Shared flag rule for the block I/O family:
    /// N = bit 7 of the transferred byte; C = H = carry out of
    /// (value + ((C reg ± 1) & 0xFF)); PV = parity of ((that sum) & 7) XOR B;
    /// S/Z/X/Y from the decremented B.
    fn set_block_io_flags(&mut self, val: u8, decrement: bool) {
        let c_adj = if decrement {
            self.c.wrapping_sub(1)
        } else {
            self.c.wrapping_add(1)
        };
        let k = val as u16 + c_adj as u16;

        let mut f = 0;
        if self.b == 0 { f |= Flag::Z as u8; }
        if (self.b & 0x80) != 0 { f |= Flag::S as u8; }
        if (val & 0x80) != 0 { f |= Flag::N as u8; }
        if k > 0xFF {
            f |= Flag::C as u8 | Flag::H as u8;
        }
        if Self::get_parity((k as u8 & 0x07) ^ self.b) {
            f |= Flag::PV as u8;
        }
        f |= self.b & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }
}
