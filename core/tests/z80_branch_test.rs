use markiii_core::cpu::z80::Z80;
mod common;
use common::TestBus;

const FLAG_C: u8 = 0x01;
const FLAG_Z: u8 = 0x40;

// ============================================================
// JP
// ============================================================

#[test]
fn test_jp_nn() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xC3, 0x34, 0x12]); // JP 0x1234

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 10);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_jp_cc_same_cost_both_ways() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.f = 0x00;
    bus.load(0, &[0xCA, 0x00, 0x20]); // JP Z,0x2000 — not taken

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 10, "JP cc costs 10 either way");
    assert_eq!(cpu.pc, 3);

    cpu.pc = 0;
    cpu.f = FLAG_Z;
    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 10);
    assert_eq!(cpu.pc, 0x2000);
}

#[test]
fn test_jp_hl_and_indexed() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.set_hl(0x8000);
    bus.load(0, &[0xE9]); // JP (HL)

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 4);
    assert_eq!(cpu.pc, 0x8000);

    cpu.ix = 0x4000;
    bus.load(0x8000, &[0xDD, 0xE9]); // JP (IX)
    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 8);
    assert_eq!(cpu.pc, 0x4000);
}

// ============================================================
// JR / DJNZ
// ============================================================

#[test]
fn test_jr_forward_and_backward() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x18, 0x10]); // JR +0x10

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 12);
    assert_eq!(cpu.pc, 0x0012, "offset is relative to the next instruction");

    bus.load(0x0012, &[0x18, 0xFC]); // JR -4
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x0010);
}

#[test]
fn test_jr_cc_taken_vs_not() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.f = 0x00;
    bus.load(0, &[0x28, 0x05, 0x20, 0x05]); // JR Z,+5; JR NZ,+5

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 7, "not taken");
    assert_eq!(cpu.pc, 2);

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 12, "taken");
    assert_eq!(cpu.pc, 0x0009);
}

#[test]
fn test_jr_carry_conditions() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.f = FLAG_C;
    bus.load(0, &[0x38, 0x02]); // JR C,+2

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 12);
    assert_eq!(cpu.pc, 4);
}

#[test]
fn test_djnz() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.b = 2;
    bus.load(0, &[0x10, 0xFE]); // DJNZ -2 (self)

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 13, "taken");
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.b, 1);

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 8, "not taken once B hits 0");
    assert_eq!(cpu.pc, 2);
    assert_eq!(cpu.b, 0);
}

// ============================================================
// CALL / RET / RST
// ============================================================

#[test]
fn test_call_and_ret() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xFFF0;
    bus.load(0, &[0xCD, 0x00, 0x10]); // CALL 0x1000
    bus.load(0x1000, &[0xC9]); // RET

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 17);
    assert_eq!(cpu.pc, 0x1000);
    assert_eq!(cpu.sp, 0xFFEE);
    assert_eq!(bus.memory[0xFFEE], 0x03, "return address low byte");
    assert_eq!(bus.memory[0xFFEF], 0x00, "return address high byte");

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 10);
    assert_eq!(cpu.pc, 0x0003);
    assert_eq!(cpu.sp, 0xFFF0);
}

#[test]
fn test_call_cc_not_taken() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xFFF0;
    cpu.f = 0x00;
    bus.load(0, &[0xCC, 0x00, 0x10]); // CALL Z,0x1000

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 10, "untaken CALL cc is 10 T-states");
    assert_eq!(cpu.pc, 3);
    assert_eq!(cpu.sp, 0xFFF0, "nothing pushed");
}

#[test]
fn test_ret_cc_costs() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xFFEE;
    bus.memory[0xFFEE] = 0x00;
    bus.memory[0xFFEF] = 0x20;
    cpu.f = 0x00;
    bus.load(0, &[0xC8, 0xC0]); // RET Z; RET NZ

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 5, "untaken RET cc");
    assert_eq!(cpu.pc, 1);

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 11, "taken RET cc");
    assert_eq!(cpu.pc, 0x2000);
}

#[test]
fn test_rst_targets() {
    let mut cpu = Z80::new();
    let mut bus = TestBus::new();
    cpu.sp = 0xFFF0;
    bus.load(0x0100, &[0xFF]); // RST 38h
    cpu.pc = 0x0100;

    let step = cpu.step(&mut bus);
    assert_eq!(step.cycles, 11);
    assert_eq!(cpu.pc, 0x0038);
    assert_eq!(bus.memory[0xFFEE], 0x01, "pushed PC low");

    cpu.pc = 0x0200;
    bus.load(0x0200, &[0xD7]); // RST 10h
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 0x0010);
}
