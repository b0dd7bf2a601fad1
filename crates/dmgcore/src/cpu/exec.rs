mod control;
mod load;

use crate::diagnostics::Event;
use crate::error::{DecodeError, Error};
use crate::interrupts::{IE_ADDR, IF_ADDR};

use super::table::{self, Instruction, OperandShape, PREFIX, R8};
use super::{Bus, Cpu, Flags};

/// Immediate operand fetched after the opcode bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Arg {
    None,
    I8(i8),
    U8(u8),
    U16(u16),
}

impl Arg {
    fn byte(self) -> u8 {
        match self {
            Arg::U8(v) => v,
            Arg::I8(v) => v as u8,
            Arg::U16(v) => v as u8,
            Arg::None => 0,
        }
    }

    fn word(self) -> u16 {
        match self {
            Arg::U16(v) => v,
            other => other.byte() as u16,
        }
    }

    fn offset(self) -> i8 {
        self.byte() as i8
    }
}

#[inline]
fn mem_cost(reg: R8, reg_cycles: u32, mem_cycles: u32) -> u32 {
    if reg == R8::MemHl {
        mem_cycles
    } else {
        reg_cycles
    }
}

impl Cpu {
    /// Fetch, decode and execute one instruction.
    ///
    /// Returns the T-cycles it took, including any bus stall it caused.
    /// Interrupts, HALT and STOP are not considered here; see
    /// [`Cpu::step`].
    pub fn execute<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Error> {
        if let Some(err) = self.locked {
            return Err(err.into());
        }

        let pc = self.regs.pc;
        let opcode = self.fetch8(bus)?;
        let index = if opcode == PREFIX {
            0x100 | self.fetch8(bus)? as u16
        } else {
            opcode as u16
        };

        let cycles = self.dispatch(bus, index, pc)?;
        self.apply_ime_delay();
        Ok(cycles + bus.take_stall_cycles())
    }

    /// Run the unit in table slot `index`. PC must already point past the
    /// opcode byte(s); `pc` is where they started.
    pub(crate) fn dispatch<B: Bus>(&mut self, bus: &mut B, index: u16, pc: u16) -> Result<u32, Error> {
        let instr = table::lookup(index);
        let arg = match instr.operand() {
            OperandShape::None => Arg::None,
            OperandShape::Signed8 => Arg::I8(self.fetch8(bus)? as i8),
            OperandShape::Unsigned8 => Arg::U8(self.fetch8(bus)?),
            OperandShape::Unsigned16 => Arg::U16(self.fetch16(bus)?),
        };

        let cycles = match instr {
            Instruction::Nop => 4,
            Instruction::Stop => {
                self.regs.stopped = true;
                4
            }
            Instruction::Halt => self.exec_halt(bus)?,
            Instruction::Di => {
                self.regs.ime = false;
                self.ime_pending = false;
                self.ime_delay = false;
                4
            }
            Instruction::Ei => {
                self.ime_pending = true;
                4
            }

            Instruction::LdR16Imm(rr) => {
                self.write_r16(rr, arg.word());
                12
            }
            Instruction::LdIndA(ind) => {
                let addr = self.indirect_addr(ind);
                bus.write8(addr, self.regs.a)?;
                8
            }
            Instruction::LdAInd(ind) => {
                let addr = self.indirect_addr(ind);
                self.regs.a = bus.read8(addr)?;
                8
            }
            Instruction::LdImm16Sp => {
                bus.write16(arg.word(), self.regs.sp)?;
                20
            }
            Instruction::IncR16(rr) => {
                self.write_r16(rr, self.read_r16(rr).wrapping_add(1));
                8
            }
            Instruction::DecR16(rr) => {
                self.write_r16(rr, self.read_r16(rr).wrapping_sub(1));
                8
            }
            Instruction::AddHlR16(rr) => {
                self.alu_add16_hl(self.read_r16(rr));
                8
            }
            Instruction::IncR8(r) => {
                let value = self.read_r8(bus, r)?;
                let result = self.alu_inc8(value);
                self.write_r8(bus, r, result)?;
                mem_cost(r, 4, 12)
            }
            Instruction::DecR8(r) => {
                let value = self.read_r8(bus, r)?;
                let result = self.alu_dec8(value);
                self.write_r8(bus, r, result)?;
                mem_cost(r, 4, 12)
            }
            Instruction::LdR8Imm(r) => {
                self.write_r8(bus, r, arg.byte())?;
                mem_cost(r, 8, 12)
            }
            Instruction::LdR8R8(dst, src) => {
                let value = self.read_r8(bus, src)?;
                self.write_r8(bus, dst, value)?;
                if dst == R8::MemHl || src == R8::MemHl {
                    8
                } else {
                    4
                }
            }
            Instruction::RotateA(op) => {
                self.regs.a = self.alu_shift(op, self.regs.a);
                self.set_flag(Flags::Z, false);
                4
            }
            Instruction::Daa => {
                self.alu_daa();
                4
            }
            Instruction::Cpl => {
                self.regs.a = !self.regs.a;
                self.set_flag(Flags::N, true);
                self.set_flag(Flags::H, true);
                4
            }
            Instruction::Scf => {
                self.set_flag(Flags::N, false);
                self.set_flag(Flags::H, false);
                self.set_flag(Flags::C, true);
                4
            }
            Instruction::Ccf => {
                let carry = self.flag(Flags::C);
                self.set_flag(Flags::N, false);
                self.set_flag(Flags::H, false);
                self.set_flag(Flags::C, !carry);
                4
            }

            Instruction::Alu(op, r) => {
                let value = self.read_r8(bus, r)?;
                self.alu(op, value);
                mem_cost(r, 4, 8)
            }
            Instruction::AluImm(op) => {
                self.alu(op, arg.byte());
                8
            }

            Instruction::Jr => self.jr(arg.offset(), true),
            Instruction::JrCond(cc) => self.jr(arg.offset(), self.condition(cc)),
            Instruction::Jp => self.jp(arg.word(), true),
            Instruction::JpCond(cc) => self.jp(arg.word(), self.condition(cc)),
            Instruction::JpHl => {
                self.regs.pc = self.regs.hl();
                4
            }
            Instruction::Call => self.call(bus, arg.word(), true)?,
            Instruction::CallCond(cc) => self.call(bus, arg.word(), self.condition(cc))?,
            Instruction::Ret => {
                self.regs.pc = self.pop16(bus)?;
                16
            }
            Instruction::RetCond(cc) => self.ret(bus, self.condition(cc))?,
            Instruction::Reti => {
                self.regs.pc = self.pop16(bus)?;
                self.regs.ime = true;
                self.ime_pending = false;
                self.ime_delay = false;
                16
            }
            Instruction::Rst(vector) => {
                self.push16(bus, self.regs.pc)?;
                self.regs.pc = vector as u16;
                16
            }
            Instruction::Push(pair) => {
                self.push16(bus, self.read_pair(pair))?;
                16
            }
            Instruction::Pop(pair) => {
                let value = self.pop16(bus)?;
                self.write_pair(pair, value);
                12
            }

            Instruction::LdhImmA => {
                bus.write8(0xFF00 | arg.word(), self.regs.a)?;
                12
            }
            Instruction::LdhAImm => {
                self.regs.a = bus.read8(0xFF00 | arg.word())?;
                12
            }
            Instruction::LdhCA => {
                bus.write8(0xFF00 | self.regs.c as u16, self.regs.a)?;
                8
            }
            Instruction::LdhAC => {
                self.regs.a = bus.read8(0xFF00 | self.regs.c as u16)?;
                8
            }
            Instruction::LdImm16A => {
                bus.write8(arg.word(), self.regs.a)?;
                16
            }
            Instruction::LdAImm16 => {
                self.regs.a = bus.read8(arg.word())?;
                16
            }
            Instruction::AddSpImm => {
                self.regs.sp = self.alu_add_sp_signed(arg.offset());
                16
            }
            Instruction::LdHlSpImm => {
                let value = self.alu_add_sp_signed(arg.offset());
                self.regs.set_hl(value);
                12
            }
            Instruction::LdSpHl => {
                self.regs.sp = self.regs.hl();
                8
            }

            Instruction::Shift(op, r) => {
                let value = self.read_r8(bus, r)?;
                let result = self.alu_shift(op, value);
                self.write_r8(bus, r, result)?;
                mem_cost(r, 8, 16)
            }
            Instruction::Bit(bit, r) => {
                let value = self.read_r8(bus, r)?;
                self.alu_bit(bit, value);
                mem_cost(r, 8, 12)
            }
            Instruction::Res(bit, r) => {
                let value = self.read_r8(bus, r)?;
                self.write_r8(bus, r, value & !(1 << bit))?;
                mem_cost(r, 8, 16)
            }
            Instruction::Set(bit, r) => {
                let value = self.read_r8(bus, r)?;
                self.write_r8(bus, r, value | (1 << bit))?;
                mem_cost(r, 8, 16)
            }

            Instruction::Prefix => return Err(self.lock(bus, DecodeError::MalformedPrefix { pc }).into()),
            Instruction::Illegal => {
                let err = DecodeError::IllegalOpcode { opcode: index, pc };
                return Err(self.lock(bus, err).into());
            }
        };

        Ok(cycles)
    }

    /// HALT, including the DMG quirk where halting with IME clear and an
    /// interrupt already pending skips the PC increment of the next fetch.
    fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Error> {
        let pending = bus.read8(IE_ADDR)? & bus.read8(IF_ADDR)? & 0x1F;
        if !self.regs.ime && pending != 0 {
            self.halt_bug = true;
        } else {
            self.regs.halted = true;
        }
        Ok(4)
    }

    fn lock<B: Bus>(&mut self, bus: &mut B, error: DecodeError) -> DecodeError {
        if self.locked.is_none() {
            bus.report(&Event::IllegalOpcode {
                error,
                registers: self.regs,
            });
        }
        self.locked = Some(error);
        error
    }

    /// Apply the one-instruction delay of EI.
    fn apply_ime_delay(&mut self) {
        if self.ime_delay {
            self.regs.ime = true;
            self.ime_delay = false;
        } else if self.ime_pending {
            self.ime_pending = false;
            self.ime_delay = true;
        }
    }
}
