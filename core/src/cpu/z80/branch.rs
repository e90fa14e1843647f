use crate::core::Bus;
use crate::cpu::z80::{IndexMode, Z80};

impl Z80 {
    /// JP nn — 10 T
    pub(crate) fn op_jp_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.fetch_word(bus);
        10
    }

    /// JP cc,nn — 10 T whether or not taken
    pub(crate) fn op_jp_cc_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let target = self.fetch_word(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = target;
        }
        10
    }

    /// JP (HL) — 4 T (JP (IX)/(IY) under prefix)
    pub(crate) fn op_jp_hl(&mut self) -> u32 {
        self.pc = match self.index_mode {
            IndexMode::HL => self.get_hl(),
            IndexMode::IX => self.ix,
            IndexMode::IY => self.iy,
        };
        4
    }

    /// JR e — 12 T
    pub(crate) fn op_jr_e<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        self.pc = self.pc.wrapping_add(offset as i16 as u16);
        12
    }

    /// JR cc,e — 12 T taken, 7 T not taken (NZ/Z/NC/C only)
    pub(crate) fn op_jr_cc_e<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        if self.condition((opcode >> 3) & 0x03) {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            12
        } else {
            7
        }
    }

    /// DJNZ e — 13 T taken, 8 T not taken. No flags.
    pub(crate) fn op_djnz<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch_byte(bus) as i8;
        self.b = self.b.wrapping_sub(1);
        if self.b != 0 {
            self.pc = self.pc.wrapping_add(offset as i16 as u16);
            13
        } else {
            8
        }
    }

    /// CALL nn — 17 T
    pub(crate) fn op_call_nn<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        let target = self.fetch_word(bus);
        self.push_word(bus, self.pc);
        self.pc = target;
        17
    }

    /// CALL cc,nn — 17 T taken, 10 T not taken
    pub(crate) fn op_call_cc_nn<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        let target = self.fetch_word(bus);
        if self.condition((opcode >> 3) & 0x07) {
            self.push_word(bus, self.pc);
            self.pc = target;
            17
        } else {
            10
        }
    }

    /// RET — 10 T
    pub(crate) fn op_ret<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.pc = self.pop_word(bus);
        10
    }

    /// RET cc — 11 T taken, 5 T not taken
    pub(crate) fn op_ret_cc<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        if self.condition((opcode >> 3) & 0x07) {
            self.pc = self.pop_word(bus);
            11
        } else {
            5
        }
    }

    /// RST p — 11 T. Target = opcode bits 5:3 × 8.
    pub(crate) fn op_rst<B: Bus + ?Sized>(&mut self, opcode: u8, bus: &mut B) -> u32 {
        self.push_word(bus, self.pc);
        self.pc = (opcode & 0x38) as u16;
        11
    }

    /// DI — 4 T. Takes effect immediately.
    pub(crate) fn op_di(&mut self) -> u32 {
        self.iff1 = false;
        self.iff2 = false;
        4
    }

    /// EI — 4 T. IRQ acceptance stays masked until after the next instruction.
    pub(crate) fn op_ei(&mut self) -> u32 {
        self.iff1 = true;
        self.iff2 = true;
        self.ei_delay = true;
        4
    }

    /// RETN/RETI (all ED x5 subcodes) — 14 T. IFF1 is restored from IFF2.
    pub(crate) fn op_retn<B: Bus + ?Sized>(&mut self, bus: &mut B) -> u32 {
        self.iff1 = self.iff2;
        self.pc = self.pop_word(bus);
        14
    }

    /// IM 0/1/2 — 8 T
    pub(crate) fn op_im(&mut self, opcode: u8) -> u32 {
        self.im = match (opcode >> 3) & 0x03 {
            2 => 1,
            3 => 2,
            _ => 0, // 0 and the undefined "IM 0/1" subcode both select IM 0
        };
        8
    }

}
