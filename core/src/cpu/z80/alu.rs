use crate::core::Bus;
use crate::cpu::z80::{Flag, IndexMode, Z80};

impl Z80 {
    // --- Flag Helpers ---

    pub(crate) fn get_parity(val: u8) -> bool {
        val.count_ones() % 2 == 0
    }

    fn update_flags_logic(&mut self, result: u8, is_and: bool) {
        let mut f = 0;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if Self::get_parity(result) { f |= Flag::PV as u8; }
        if is_and { f |= Flag::H as u8; } // AND sets H, others clear it
        // N is 0, C is 0

        // Undocumented X/Y
        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    fn do_add(&mut self, val: u8, carry_in: bool) {
        let a = self.a;
        let c_val = if carry_in && (self.f & Flag::C as u8) != 0 { 1 } else { 0 };
        let result_u16 = (a as u16) + (val as u16) + (c_val as u16);
        let result = result_u16 as u8;

        let mut f = 0;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        // H: ((A & 0xF) + (val & 0xF) + c) > 0xF
        if ((a & 0xF) + (val & 0xF) + c_val) > 0xF { f |= Flag::H as u8; }
        // P/V: Overflow = (op1 ^ res) & (op2 ^ res) & 0x80
        if ((a ^ result) & (val ^ result) & 0x80) != 0 { f |= Flag::PV as u8; }
        // C: result > 0xFF
        if result_u16 > 0xFF { f |= Flag::C as u8; }

        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.a = result;
        self.f = f;
    }

    fn do_sub(&mut self, val: u8, carry_in: bool) {
        let a = self.a;
        let c_val = if carry_in && (self.f & Flag::C as u8) != 0 { 1 } else { 0 };
        let result_u16 = (a as u16).wrapping_sub(val as u16).wrapping_sub(c_val as u16);
        let result = result_u16 as u8;

        let mut f = Flag::N as u8;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        // H: (A & 0xF) < ((val & 0xF) + c)
        if (a & 0xF) < ((val & 0xF) + c_val) { f |= Flag::H as u8; }
        // P/V: Overflow = (op1 ^ op2) & (op1 ^ res) & 0x80
        if ((a ^ val) & (a ^ result) & 0x80) != 0 { f |= Flag::PV as u8; }
        // C: borrow
        if result_u16 > 0xFF { f |= Flag::C as u8; }

        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.a = result;
        self.f = f;
    }

    fn do_cp(&mut self, val: u8) {
        let a = self.a;
        let result_u16 = (a as u16).wrapping_sub(val as u16);
        let result = result_u16 as u8;

        let mut f = Flag::N as u8;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if (a & 0xF) < (val & 0xF) { f |= Flag::H as u8; }
        if ((a ^ val) & (a ^ result) & 0x80) != 0 { f |= Flag::PV as u8; }
        if result_u16 > 0xFF { f |= Flag::C as u8; }

        // CP takes X/Y from the operand, not the result
        f |= val & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    fn perform_alu_op(&mut self, op: u8, val: u8) {
        match op {
            0 => self.do_add(val, false), // ADD
            1 => self.do_add(val, true),  // ADC
            2 => self.do_sub(val, false), // SUB
            3 => self.do_sub(val, true),  // SBC
            4 => { self.a &= val; self.update_flags_logic(self.a, true); }  // AND
            5 => { self.a ^= val; self.update_flags_logic(self.a, false); } // XOR
            6 => { self.a |= val; self.update_flags_logic(self.a, false); } // OR
            7 => self.do_cp(val),         // CP
            _ => unreachable!(),
        }
    }

    pub(crate) fn calc_inc_flags(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        let mut f = self.f & Flag::C as u8; // C preserved
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if (result & 0x0F) == 0 { f |= Flag::H as u8; }
        if val == 0x7F { f |= Flag::PV as u8; }
        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        result
    }

    pub(crate) fn calc_dec_flags(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        let mut f = (self.f & Flag::C as u8) | Flag::N as u8;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if (val & 0x0F) == 0 { f |= Flag::H as u8; }
        if val == 0x80 { f |= Flag::PV as u8; }
        f |= result & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        result
    }

    // --- Instructions ---

    /// ALU A, r — ADD, ADC, SUB, SBC, AND, XOR, OR, CP
    /// Opcode mask: 10 xxx zzz
    /// 4 T (reg), 7 T ((HL)), 15 T ((IX+d), prefix counted by caller)
    pub(crate) fn op_alu_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let alu_op = (opcode >> 3) & 0x07;
        let r = opcode & 0x07;

        if r == 6 {
            let indexed = self.index_mode != IndexMode::HL;
            let addr = self.addr_hl_or_index(bus);
            let val = bus.read(addr);
            self.perform_alu_op(alu_op, val);
            if indexed { 15 } else { 7 }
        } else {
            let val = self.get_reg8_ix(r);
            self.perform_alu_op(alu_op, val);
            4
        }
    }

    /// ALU A, n — 7 T
    /// Opcode mask: 11 xxx 110
    pub(crate) fn op_alu_n<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let alu_op = (opcode >> 3) & 0x07;
        let val = self.fetch_byte(bus);
        self.perform_alu_op(alu_op, val);
        7
    }

    /// INC/DEC r — 4 T (reg), 11 T ((HL)), 19 T ((IX+d), prefix counted by caller)
    /// Opcode mask: 00 rrr 10x
    pub(crate) fn op_inc_dec_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let r = (opcode >> 3) & 0x07;
        let is_dec = (opcode & 0x01) != 0;

        if r == 6 {
            let indexed = self.index_mode != IndexMode::HL;
            let addr = self.addr_hl_or_index(bus);
            let val = bus.read(addr);
            let result = if is_dec {
                self.calc_dec_flags(val)
            } else {
                self.calc_inc_flags(val)
            };
            bus.write(addr, result);
            if indexed { 19 } else { 11 }
        } else {
            let val = self.get_reg8_ix(r);
            let result = if is_dec {
                self.calc_dec_flags(val)
            } else {
                self.calc_inc_flags(val)
            };
            self.set_reg8_ix(r, result);
            4
        }
    }

    /// ADD HL,rr (HL may be IX/IY under prefix) — 11 T
    /// S, Z, PV unaffected; H from bit 11, C from bit 15, X/Y from high byte.
    pub(crate) fn op_add_hl_rr(&mut self, opcode: u8) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let hl = self.get_rp(2);
        let val = self.get_rp(rr);
        let result = hl.wrapping_add(val);

        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        if ((hl & 0x0FFF) + (val & 0x0FFF)) > 0x0FFF { f |= Flag::H as u8; }
        if (hl as u32 + val as u32) > 0xFFFF { f |= Flag::C as u8; }
        f |= ((result >> 8) as u8) & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;

        self.set_rp(2, result);
        11
    }

    /// ADC HL,rr — 15 T (full flags, 16-bit)
    pub(crate) fn op_adc_hl_rr(&mut self, opcode: u8) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let hl = self.get_hl();
        let val = self.get_rp(rr);
        let c_val = (self.f & Flag::C as u8) as u32;
        let result_u32 = hl as u32 + val as u32 + c_val;
        let result = result_u32 as u16;

        let mut f = 0;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x8000) != 0 { f |= Flag::S as u8; }
        if ((hl & 0x0FFF) + (val & 0x0FFF) + c_val as u16) > 0x0FFF { f |= Flag::H as u8; }
        if ((hl ^ result) & (val ^ result) & 0x8000) != 0 { f |= Flag::PV as u8; }
        if result_u32 > 0xFFFF { f |= Flag::C as u8; }
        f |= ((result >> 8) as u8) & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;

        self.set_hl(result);
        15
    }

    /// SBC HL,rr — 15 T (full flags, 16-bit)
    pub(crate) fn op_sbc_hl_rr(&mut self, opcode: u8) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let hl = self.get_hl();
        let val = self.get_rp(rr);
        let c_val = (self.f & Flag::C as u8) as u32;
        let result_u32 = (hl as u32).wrapping_sub(val as u32).wrapping_sub(c_val);
        let result = result_u32 as u16;

        let mut f = Flag::N as u8;
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x8000) != 0 { f |= Flag::S as u8; }
        if (hl & 0x0FFF) < (val & 0x0FFF) + c_val as u16 { f |= Flag::H as u8; }
        if ((hl ^ val) & (hl ^ result) & 0x8000) != 0 { f |= Flag::PV as u8; }
        if result_u32 > 0xFFFF { f |= Flag::C as u8; }
        f |= ((result >> 8) as u8) & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;

        self.set_hl(result);
        15
    }

    /// INC/DEC rr — 6 T (no flags)
    pub(crate) fn op_inc_dec_rr(&mut self, opcode: u8) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let val = self.get_rp(rr);
        let result = if (opcode & 0x08) != 0 {
            val.wrapping_sub(1)
        } else {
            val.wrapping_add(1)
        };
        self.set_rp(rr, result);
        6
    }

    // Accumulator rotates: S, Z, PV preserved; H = N = 0; X/Y from A.

    /// RLCA — 4 T
    pub(crate) fn op_rlca(&mut self) -> u32 {
        let carry = (self.a & 0x80) != 0;
        self.a = self.a.rotate_left(1);
        self.set_rotate_a_flags(carry);
        4
    }

    /// RRCA — 4 T
    pub(crate) fn op_rrca(&mut self) -> u32 {
        let carry = (self.a & 0x01) != 0;
        self.a = self.a.rotate_right(1);
        self.set_rotate_a_flags(carry);
        4
    }

    /// RLA — 4 T (rotate through carry)
    pub(crate) fn op_rla(&mut self) -> u32 {
        let carry = (self.a & 0x80) != 0;
        let old_c = (self.f & Flag::C as u8) != 0;
        self.a = (self.a << 1) | (old_c as u8);
        self.set_rotate_a_flags(carry);
        4
    }

    /// RRA — 4 T (rotate through carry)
    pub(crate) fn op_rra(&mut self) -> u32 {
        let carry = (self.a & 0x01) != 0;
        let old_c = (self.f & Flag::C as u8) != 0;
        self.a = (self.a >> 1) | ((old_c as u8) << 7);
        self.set_rotate_a_flags(carry);
        4
    }

    fn set_rotate_a_flags(&mut self, carry: bool) {
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        if carry { f |= Flag::C as u8; }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    /// DAA — 4 T. BCD adjust after ADD/SUB per the N flag.
    pub(crate) fn op_daa(&mut self) -> u32 {
        let a = self.a;
        let n = (self.f & Flag::N as u8) != 0;
        let h = (self.f & Flag::H as u8) != 0;
        let c = (self.f & Flag::C as u8) != 0;

        let mut adjust = 0u8;
        let mut carry_out = c;
        if h || (a & 0x0F) > 9 {
            adjust |= 0x06;
        }
        if c || a > 0x99 {
            adjust |= 0x60;
            carry_out = true;
        }

        let (result, half) = if n {
            (a.wrapping_sub(adjust), h && (a & 0x0F) < 6)
        } else {
            (a.wrapping_add(adjust), (a & 0x0F) > 9)
        };

        let mut f = if n { Flag::N as u8 } else { 0 };
        if result == 0 { f |= Flag::Z as u8; }
        if (result & 0x80) != 0 { f |= Flag::S as u8; }
        if Self::get_parity(result) { f |= Flag::PV as u8; }
        if half { f |= Flag::H as u8; }
        if carry_out { f |= Flag::C as u8; }
        f |= result & (Flag::X as u8 | Flag::Y as u8);

        self.a = result;
        self.f = f;
        4
    }

    /// CPL — 4 T. H = N = 1, others preserved, X/Y from A.
    pub(crate) fn op_cpl(&mut self) -> u32 {
        self.a = !self.a;
        let mut f = self.f
            & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8 | Flag::C as u8);
        f |= Flag::H as u8 | Flag::N as u8;
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        4
    }

    /// SCF — 4 T. C = 1, H = N = 0, X/Y from A.
    pub(crate) fn op_scf(&mut self) -> u32 {
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        f |= Flag::C as u8;
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        4
    }

    /// CCF — 4 T. H = old C, C inverted, N = 0, X/Y from A.
    pub(crate) fn op_ccf(&mut self) -> u32 {
        let old_c = (self.f & Flag::C as u8) != 0;
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        if old_c { f |= Flag::H as u8; } else { f |= Flag::C as u8; }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
        4
    }

    /// NEG — 8 T. A = 0 - A; PV set iff A was 0x80, C set iff A was nonzero.
    pub(crate) fn op_neg(&mut self) -> u32 {
        let val = self.a;
        self.a = 0;
        self.do_sub(val, false);
        8
    }

    /// RRD — 18 T. Rotate BCD digits right between A and (HL).
    pub(crate) fn op_rrd<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.get_hl();
        let m = bus.read(addr);
        let result = (m >> 4) | (self.a << 4);
        self.a = (self.a & 0xF0) | (m & 0x0F);
        bus.write(addr, result);
        self.set_rrd_rld_flags();
        18
    }

    /// RLD — 18 T. Rotate BCD digits left between A and (HL).
    pub(crate) fn op_rld<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.get_hl();
        let m = bus.read(addr);
        let result = (m << 4) | (self.a & 0x0F);
        self.a = (self.a & 0xF0) | (m >> 4);
        bus.write(addr, result);
        self.set_rrd_rld_flags();
        18
    }

    fn set_rrd_rld_flags(&mut self) {
        let mut f = self.f & Flag::C as u8;
        if self.a == 0 { f |= Flag::Z as u8; }
        if (self.a & 0x80) != 0 { f |= Flag::S as u8; }
        if Self::get_parity(self.a) { f |= Flag::PV as u8; }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }
}
