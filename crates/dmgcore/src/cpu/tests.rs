use proptest::prelude::*;

use super::table::{self, Instruction};
use super::*;
use crate::config::BootState;
use crate::error::Error;

struct TestBus {
    memory: [u8; 0x10000],
    writes: usize,
    stall: u32,
    events: Vec<Event>,
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
            writes: 0,
            stall: 0,
            events: Vec::new(),
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u16) -> Result<u8, MemoryError> {
        Ok(self.memory[addr as usize])
    }

    fn write8(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        self.writes += 1;
        if addr == 0xFF46 {
            self.stall += 640;
        }
        self.memory[addr as usize] = value;
        Ok(())
    }

    fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall)
    }

    fn report(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

impl TestBus {
    fn load(&mut self, addr: u16, program: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + program.len()].copy_from_slice(program);
    }
}

fn cpu_at(pc: u16) -> Cpu {
    let mut cpu = Cpu::with_boot_state(BootState::Zeroed);
    cpu.regs.pc = pc;
    cpu.regs.sp = 0xDFF0;
    cpu
}

#[test]
fn add_from_hl_sets_half_carry_only() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0x86]);
    bus.memory[0xD1C7] = 0x5F;
    cpu.regs.a = 0x18;
    cpu.regs.h = 0xD1;
    cpu.regs.l = 0xC7;

    let cycles = cpu.execute(&mut bus).unwrap();

    assert_eq!(cycles, 8);
    assert_eq!(cpu.regs.a, 0x77);
    assert!(!cpu.regs.zero());
    assert!(!cpu.regs.subtract());
    assert!(cpu.regs.half_carry());
    assert!(!cpu.regs.carry());
    assert_eq!(cpu.regs.pc, 0xC001);
}

#[test]
fn call_nz_not_taken_when_zero_set() {
    let mut cpu = cpu_at(0x8000);
    let mut bus = TestBus::default();
    bus.load(0x8000, &[0xC4, 0x34, 0x12]);
    cpu.regs.sp = 0xFFFE;
    cpu.regs.f = Flags::Z;

    let cycles = cpu.execute(&mut bus).unwrap();

    assert_eq!(cycles, 12);
    assert_eq!(cpu.regs.pc, 0x8003);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(bus.writes, 0);
}

#[test]
fn call_nz_taken_pushes_return_address() {
    let mut cpu = cpu_at(0x8000);
    let mut bus = TestBus::default();
    bus.load(0x8000, &[0xC4, 0x34, 0x12]);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(cpu.execute(&mut bus).unwrap(), 24);
    assert_eq!(cpu.regs.pc, 0x1234);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x80);
    assert_eq!(bus.memory[0xFFFC], 0x03);
}

#[test]
fn every_slot_dispatches_or_fails_as_illegal() {
    for index in 0u16..0x200 {
        let mut cpu = cpu_at(0xC001);
        cpu.regs.set_hl(0xC800);
        let mut bus = TestBus::default();
        bus.load(0xC001, &[0x12, 0x34]);

        let instr = table::lookup(index);
        match cpu.dispatch(&mut bus, index, 0xC000) {
            Ok(cycles) => {
                assert!(!instr.is_illegal(), "slot 0x{index:03X} ({instr}) should fail");
                assert!(cycles >= 4 && cycles % 4 == 0, "slot 0x{index:03X} took {cycles}");
            }
            Err(Error::Decode(err)) => {
                assert!(instr.is_illegal(), "slot 0x{index:03X} ({instr}) failed: {err}");
                assert!(cpu.locked().is_some());
            }
            Err(other) => panic!("slot 0x{index:03X} raised {other}"),
        }
    }
}

#[test]
fn illegal_opcode_locks_and_reports() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0xDD, 0x00]);

    let expected = DecodeError::IllegalOpcode {
        opcode: 0xDD,
        pc: 0xC000,
    };
    assert_eq!(cpu.execute(&mut bus), Err(Error::Decode(expected)));
    // A locked CPU keeps failing without touching the bus again.
    assert_eq!(cpu.step(&mut bus), Err(Error::Decode(expected)));
    assert_eq!(cpu.regs.pc, 0xC001);
    assert!(matches!(
        bus.events.as_slice(),
        [Event::IllegalOpcode { error, .. }] if *error == expected
    ));
}

#[test]
fn prefixed_opcodes_go_through_the_cb_page() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // SWAP A ; BIT 7,(HL) ; SET 0,(HL)
    bus.load(0xC000, &[0xCB, 0x37, 0xCB, 0x7E, 0xCB, 0xC6]);
    cpu.regs.a = 0xF1;
    cpu.regs.set_hl(0xC100);
    bus.memory[0xC100] = 0x80;

    assert_eq!(cpu.execute(&mut bus).unwrap(), 8);
    assert_eq!(cpu.regs.a, 0x1F);
    assert_eq!(cpu.regs.f, Flags::empty());

    assert_eq!(cpu.execute(&mut bus).unwrap(), 12);
    assert!(!cpu.regs.zero());
    assert!(cpu.regs.half_carry());

    assert_eq!(cpu.execute(&mut bus).unwrap(), 16);
    assert_eq!(bus.memory[0xC100], 0x81);
    assert_eq!(cpu.regs.pc, 0xC006);
}

#[test]
fn push_pop_keep_high_byte_above_low_byte() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // PUSH BC ; POP AF
    bus.load(0xC000, &[0xC5, 0xF1]);
    cpu.regs.set_bc(0x12FF);
    cpu.regs.sp = 0xD000;

    assert_eq!(cpu.execute(&mut bus).unwrap(), 16);
    assert_eq!(cpu.regs.sp, 0xCFFE);
    assert_eq!(bus.memory[0xCFFF], 0x12);
    assert_eq!(bus.memory[0xCFFE], 0xFF);

    assert_eq!(cpu.execute(&mut bus).unwrap(), 12);
    assert_eq!(cpu.regs.sp, 0xD000);
    assert_eq!(cpu.regs.a, 0x12);
    // The low nibble of F never holds anything.
    assert_eq!(cpu.regs.af(), 0x12F0);
}

#[test]
fn stack_relative_add_uses_low_byte_carries() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // ADD SP,1 ; LD HL,SP-1
    bus.load(0xC000, &[0xE8, 0x01, 0xF8, 0xFF]);
    cpu.regs.sp = 0x00FF;
    cpu.regs.f = Flags::Z | Flags::N;

    assert_eq!(cpu.execute(&mut bus).unwrap(), 16);
    assert_eq!(cpu.regs.sp, 0x0100);
    assert_eq!(cpu.regs.f, Flags::H | Flags::C);

    assert_eq!(cpu.execute(&mut bus).unwrap(), 12);
    assert_eq!(cpu.regs.hl(), 0x00FF);
    assert_eq!(cpu.regs.f, Flags::empty());
}

#[test]
fn relative_jumps_measure_from_next_instruction() {
    let mut cpu = cpu_at(0xC010);
    let mut bus = TestBus::default();
    // JR -2 loops onto itself.
    bus.load(0xC010, &[0x18, 0xFE]);
    assert_eq!(cpu.execute(&mut bus).unwrap(), 12);
    assert_eq!(cpu.regs.pc, 0xC010);

    // JR Z,+5 with Z clear falls through.
    bus.load(0xC010, &[0x28, 0x05]);
    assert_eq!(cpu.execute(&mut bus).unwrap(), 8);
    assert_eq!(cpu.regs.pc, 0xC012);
}

#[test]
fn conditional_branches_charge_untaken_cost() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // JP C,a16 ; RET NC ; RET C
    bus.load(0xC000, &[0xDA, 0x00, 0xD0, 0xD0, 0xD8]);
    bus.load(0xDFF0, &[0x00, 0xC1]);

    assert_eq!(cpu.execute(&mut bus).unwrap(), 12);
    assert_eq!(cpu.execute(&mut bus).unwrap(), 20);
    assert_eq!(cpu.regs.pc, 0xC100);

    cpu.regs.pc = 0xC004;
    assert_eq!(cpu.execute(&mut bus).unwrap(), 8);
    assert_eq!(cpu.regs.pc, 0xC005);
}

#[test]
fn daa_corrects_bcd_addition() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // LD A,0x45 ; ADD A,0x38 ; DAA
    bus.load(0xC000, &[0x3E, 0x45, 0xC6, 0x38, 0x27]);
    for _ in 0..3 {
        cpu.execute(&mut bus).unwrap();
    }
    assert_eq!(cpu.regs.a, 0x83);
    assert!(!cpu.regs.carry());
    assert!(!cpu.regs.half_carry());
}

#[test]
fn daa_corrects_bcd_subtraction() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // LD A,0x10 ; SUB 0x01 ; DAA
    bus.load(0xC000, &[0x3E, 0x10, 0xD6, 0x01, 0x27]);
    for _ in 0..3 {
        cpu.execute(&mut bus).unwrap();
    }
    assert_eq!(cpu.regs.a, 0x09);
    assert!(cpu.regs.subtract());
}

#[test]
fn add_hl_keeps_zero_and_carries_from_bit_11() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0x09]);
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.regs.f = Flags::Z;

    assert_eq!(cpu.execute(&mut bus).unwrap(), 8);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.regs.f, Flags::Z | Flags::H);
}

#[test]
fn interrupt_is_serviced_through_vector() {
    let mut cpu = cpu_at(0xC123);
    let mut bus = TestBus::default();
    cpu.regs.ime = true;
    bus.memory[0xFFFF] = 0x05;
    bus.memory[0xFF0F] = 0x04;

    assert_eq!(cpu.step(&mut bus).unwrap(), 20);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert!(!cpu.regs.ime);
    assert_eq!(bus.memory[0xFF0F], 0x00);
    assert_eq!(cpu.regs.sp, 0xDFEE);
    assert_eq!(bus.memory[0xDFEF], 0xC1);
    assert_eq!(bus.memory[0xDFEE], 0x23);
}

#[test]
fn halt_wakes_on_pending_interrupt_without_ime() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // HALT ; INC A
    bus.load(0xC000, &[0x76, 0x3C]);
    bus.memory[0xFFFF] = 0x01;

    cpu.step(&mut bus).unwrap();
    assert!(cpu.regs.halted);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert!(cpu.regs.halted);

    bus.memory[0xFF0F] = 0x01;
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert!(!cpu.regs.halted);
    assert_eq!(cpu.regs.a, 1);
    // Not serviced: IF is left alone.
    assert_eq!(bus.memory[0xFF0F], 0x01);
}

#[test]
fn halt_with_pending_interrupt_repeats_next_byte() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0x76, 0x3C, 0x00]);
    bus.memory[0xFFFF] = 0x01;
    bus.memory[0xFF0F] = 0x01;

    cpu.step(&mut bus).unwrap();
    assert!(!cpu.regs.halted);
    cpu.step(&mut bus).unwrap();
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.regs.a, 2);
    assert_eq!(cpu.regs.pc, 0xC002);
}

#[test]
fn ei_takes_effect_after_following_instruction() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // EI ; NOP ; NOP
    bus.load(0xC000, &[0xFB, 0x00, 0x00]);
    bus.memory[0xFFFF] = 0x01;
    bus.memory[0xFF0F] = 0x01;

    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert!(!cpu.regs.ime);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert!(cpu.regs.ime);
    assert_eq!(cpu.regs.pc, 0xC002);
    assert_eq!(cpu.step(&mut bus).unwrap(), 20);
    assert_eq!(cpu.regs.pc, 0x0040);
}

#[test]
fn di_cancels_pending_ei() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0xFB, 0xF3, 0x00]);
    for _ in 0..3 {
        cpu.step(&mut bus).unwrap();
    }
    assert!(!cpu.regs.ime);
}

#[test]
fn stop_idles_until_joypad_line_low() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    bus.load(0xC000, &[0x10, 0x00, 0x3C]);
    bus.memory[0xFF00] = 0xCF;

    cpu.step(&mut bus).unwrap();
    assert!(cpu.regs.stopped);
    assert_eq!(cpu.regs.pc, 0xC002);
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.regs.a, 0);

    bus.memory[0xFF00] = 0xCE;
    cpu.step(&mut bus).unwrap();
    assert!(!cpu.regs.stopped);
    assert_eq!(cpu.regs.a, 1);
}

#[test]
fn stall_cycles_are_added_to_the_instruction() {
    let mut cpu = cpu_at(0xC000);
    let mut bus = TestBus::default();
    // LDH (0x46),A
    bus.load(0xC000, &[0xE0, 0x46]);
    assert_eq!(cpu.execute(&mut bus).unwrap(), 12 + 640);
}

#[test]
fn post_boot_registers_match_dmg() {
    let cpu = Cpu::new();
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
    assert_eq!(table::lookup(0x00), Instruction::Nop);
}

proptest! {
    #[test]
    fn add_then_sub_restores_accumulator(a in any::<u8>(), value in any::<u8>()) {
        let mut cpu = cpu_at(0xC000);
        let mut bus = TestBus::default();
        // ADD A,B ; SUB B
        bus.load(0xC000, &[0x80, 0x90]);
        cpu.regs.a = a;
        cpu.regs.b = value;

        cpu.execute(&mut bus).unwrap();
        let sum = cpu.regs.a;
        prop_assert!(!cpu.regs.subtract());
        prop_assert_eq!(cpu.regs.carry(), a as u16 + value as u16 > 0xFF);
        prop_assert_eq!(cpu.regs.half_carry(), (a & 0x0F) + (value & 0x0F) > 0x0F);

        cpu.execute(&mut bus).unwrap();
        prop_assert_eq!(cpu.regs.a, a);
        prop_assert!(cpu.regs.subtract());
        prop_assert_eq!(cpu.regs.carry(), sum < value);
        prop_assert_eq!(cpu.regs.half_carry(), (sum & 0x0F) < (value & 0x0F));
        prop_assert_eq!(cpu.regs.zero(), a == 0);
    }

    #[test]
    fn daa_leaves_valid_bcd_alone(hi in 0u8..10, lo in 0u8..10, subtract in any::<bool>()) {
        let mut cpu = cpu_at(0xC000);
        let mut bus = TestBus::default();
        bus.load(0xC000, &[0x27]);
        let a = (hi << 4) | lo;
        cpu.regs.a = a;
        cpu.regs.f = if subtract { Flags::N } else { Flags::empty() };

        cpu.execute(&mut bus).unwrap();
        prop_assert_eq!(cpu.regs.a, a);
        prop_assert!(!cpu.regs.carry());
        prop_assert!(!cpu.regs.half_carry());
        prop_assert_eq!(cpu.regs.subtract(), subtract);
    }
}
