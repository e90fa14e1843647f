use crate::core::Bus;
use crate::cpu::z80::{Flag, IndexMode, Z80};

impl Z80 {
    /// LD r, n — 7 T / LD (HL), n — 10 T / LD (IX+d), n — 15 T
    /// (prefix counted by caller). The displacement precedes the immediate
    /// in the instruction stream.
    pub(crate) fn op_ld_r_n<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let r = (opcode >> 3) & 0x07;

        if r == 6 {
            let indexed = self.index_mode != IndexMode::HL;
            let addr = self.addr_hl_or_index(bus);
            let val = self.fetch_byte(bus);
            bus.write(addr, val);
            if indexed { 15 } else { 10 }
        } else {
            let val = self.fetch_byte(bus);
            self.set_reg8_ix(r, val);
            7
        }
    }

    /// LD r, r' — 4 T / LD r, (HL) / LD (HL), r — 7 T / indexed — 15 T.
    /// With a memory operand the register side always names the base set
    /// (LD H,(IX+d) loads real H); otherwise H/L become IXH/IXL under prefix.
    pub(crate) fn op_ld_r_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let dst = (opcode >> 3) & 0x07;
        let src = opcode & 0x07;

        if src == 6 {
            let indexed = self.index_mode != IndexMode::HL;
            let addr = self.addr_hl_or_index(bus);
            let val = bus.read(addr);
            self.set_reg8(dst, val);
            if indexed { 15 } else { 7 }
        } else if dst == 6 {
            let indexed = self.index_mode != IndexMode::HL;
            let addr = self.addr_hl_or_index(bus);
            let val = self.get_reg8(src);
            bus.write(addr, val);
            if indexed { 15 } else { 7 }
        } else {
            let val = self.get_reg8_ix(src);
            self.set_reg8_ix(dst, val);
            4
        }
    }

    /// LD rr, nn — 10 T (rr = BC/DE/HL-or-IX-or-IY/SP)
    pub(crate) fn op_ld_rr_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let val = self.fetch_word(bus);
        self.set_rp(rr, val);
        10
    }

    /// LD A, (BC) — 7 T
    pub(crate) fn op_ld_a_bc<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.a = bus.read(self.get_bc());
        7
    }

    /// LD A, (DE) — 7 T
    pub(crate) fn op_ld_a_de<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.a = bus.read(self.get_de());
        7
    }

    /// LD (BC), A — 7 T
    pub(crate) fn op_ld_bc_a<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        bus.write(self.get_bc(), self.a);
        7
    }

    /// LD (DE), A — 7 T
    pub(crate) fn op_ld_de_a<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        bus.write(self.get_de(), self.a);
        7
    }

    /// LD A, (nn) — 13 T
    pub(crate) fn op_ld_a_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        self.a = bus.read(addr);
        13
    }

    /// LD (nn), A — 13 T
    pub(crate) fn op_ld_nn_a<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        bus.write(addr, self.a);
        13
    }

    /// LD SP, HL — 6 T (LD SP,IX/IY under prefix)
    pub(crate) fn op_ld_sp_hl(&mut self) -> u32 {
        self.sp = self.get_rp(2);
        6
    }

    /// LD (nn), HL — 16 T (stores IX/IY under prefix)
    pub(crate) fn op_ld_nn_hl<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        let val = self.get_rp(2);
        self.write_word(bus, addr, val);
        16
    }

    /// LD HL, (nn) — 16 T (loads IX/IY under prefix)
    pub(crate) fn op_ld_hl_nn_ind<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let addr = self.fetch_word(bus);
        let val = self.read_word(bus, addr);
        self.set_rp(2, val);
        16
    }

    /// EX AF, AF' — 4 T
    pub(crate) fn op_ex_af_af(&mut self) -> u32 {
        core::mem::swap(&mut self.a, &mut self.a_prime);
        core::mem::swap(&mut self.f, &mut self.f_prime);
        4
    }

    /// EXX — 4 T. Swaps BC/DE/HL with the shadow set.
    pub(crate) fn op_exx(&mut self) -> u32 {
        core::mem::swap(&mut self.b, &mut self.b_prime);
        core::mem::swap(&mut self.c, &mut self.c_prime);
        core::mem::swap(&mut self.d, &mut self.d_prime);
        core::mem::swap(&mut self.e, &mut self.e_prime);
        core::mem::swap(&mut self.h, &mut self.h_prime);
        core::mem::swap(&mut self.l, &mut self.l_prime);
        4
    }

    /// EX DE, HL — 4 T. Always the base HL, even under DD/FD.
    pub(crate) fn op_ex_de_hl(&mut self) -> u32 {
        core::mem::swap(&mut self.d, &mut self.h);
        core::mem::swap(&mut self.e, &mut self.l);
        4
    }

    /// EX (SP), HL — 19 T (EX (SP),IX/IY — 23 T with the prefix)
    pub(crate) fn op_ex_sp_hl<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let from_stack = self.read_word(bus, self.sp);
        let val = self.get_rp(2);
        self.write_word(bus, self.sp, val);
        self.set_rp(2, from_stack);
        19
    }

    /// LD I, A — 9 T
    pub(crate) fn op_ld_i_a(&mut self) -> u32 {
        self.i = self.a;
        9
    }

    /// LD R, A — 9 T. The only way bit 7 of R changes.
    pub(crate) fn op_ld_r_a(&mut self) -> u32 {
        self.r = self.a;
        9
    }

    /// LD A, I — 9 T. PV reflects IFF2 at read time.
    pub(crate) fn op_ld_a_i(&mut self) -> u32 {
        self.a = self.i;
        self.set_ld_a_ir_flags();
        9
    }

    /// LD A, R — 9 T. PV reflects IFF2 at read time.
    pub(crate) fn op_ld_a_r(&mut self) -> u32 {
        self.a = self.r;
        self.set_ld_a_ir_flags();
        9
    }

    fn set_ld_a_ir_flags(&mut self) {
        let mut f = self.f & Flag::C as u8;
        if self.a == 0 { f |= Flag::Z as u8; }
        if (self.a & 0x80) != 0 { f |= Flag::S as u8; }
        if self.iff2 { f |= Flag::PV as u8; }
        f |= self.a & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;
    }

    /// ED LD (nn), rr — 20 T
    pub(crate) fn op_ld_nn_rr_ed<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let addr = self.fetch_word(bus);
        let val = self.get_rp(rr);
        self.write_word(bus, addr, val);
        20
    }

    /// ED LD rr, (nn) — 20 T
    pub(crate) fn op_ld_rr_nn_ed<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let rr = (opcode >> 4) & 0x03;
        let addr = self.fetch_word(bus);
        let val = self.read_word(bus, addr);
        self.set_rp(rr, val);
        20
    }

    /// IN r,(C) — 12 T. Port address = BC. r = 6 sets flags only
    /// (undocumented IN (C)).
    pub(crate) fn op_in_r_c<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let r = (opcode >> 3) & 0x07;
        let val = bus.io_read(self.get_bc());

        let mut f = self.f & Flag::C as u8;
        if val == 0 { f |= Flag::Z as u8; }
        if (val & 0x80) != 0 { f |= Flag::S as u8; }
        if Self::get_parity(val) { f |= Flag::PV as u8; }
        f |= val & (Flag::X as u8 | Flag::Y as u8);
        self.f = f;

        if r != 6 {
            self.set_reg8(r, val);
        }
        12
    }

    /// OUT (C),r — 12 T. r = 6 writes 0 (undocumented OUT (C),0).
    pub(crate) fn op_out_c_r<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let r = (opcode >> 3) & 0x07;
        let val = if r == 6 { 0 } else { self.get_reg8(r) };
        bus.io_write(self.get_bc(), val);
        12
    }

    /// IN A,(n) — 11 T. Port address = (A << 8) | n. No flags.
    pub(crate) fn op_in_a_n<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let n = self.fetch_byte(bus);
        let port = ((self.a as u16) << 8) | n as u16;
        self.a = bus.io_read(port);
        11
    }

    /// OUT (n),A — 11 T. Port address = (A << 8) | n.
    pub(crate) fn op_out_n_a<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let n = self.fetch_byte(bus);
        let port = ((self.a as u16) << 8) | n as u16;
        bus.io_write(port, self.a);
        11
    }
}
