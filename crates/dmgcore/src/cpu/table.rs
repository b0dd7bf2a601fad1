//! The 512-slot opcode table.
//!
//! Slots 0x000-0x0FF hold the base instruction set, slots 0x100-0x1FF the
//! instructions reached through the 0xCB escape. Every slot decodes to an
//! [`Instruction`], including the hardware's opcode holes, which decode to
//! [`Instruction::Illegal`].

use std::fmt;

/// Immediate bytes following an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandShape {
    None,
    Signed8,
    Unsigned8,
    Unsigned16,
}

impl OperandShape {
    pub const fn len(self) -> u16 {
        match self {
            OperandShape::None => 0,
            OperandShape::Signed8 | OperandShape::Unsigned8 => 1,
            OperandShape::Unsigned16 => 2,
        }
    }
}

/// 8-bit operand in register-encoding order. `MemHl` is the byte at (HL).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R8 {
    B,
    C,
    D,
    E,
    H,
    L,
    MemHl,
    A,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum R16 {
    Bc,
    De,
    Hl,
    Sp,
}

/// Register pairs as PUSH and POP encode them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackPair {
    Bc,
    De,
    Hl,
    Af,
}

/// Pointer forms used by `LD (rr),A` and `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    Bc,
    De,
    HlInc,
    HlDec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

/// Rotate and shift operations of the CB page; the first four also back
/// the accumulator-only RLCA/RRCA/RLA/RRA.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Stop,
    Halt,
    Di,
    Ei,
    LdR16Imm(R16),
    LdIndA(Indirect),
    LdAInd(Indirect),
    LdImm16Sp,
    IncR16(R16),
    DecR16(R16),
    AddHlR16(R16),
    IncR8(R8),
    DecR8(R8),
    LdR8Imm(R8),
    LdR8R8(R8, R8),
    RotateA(ShiftOp),
    Daa,
    Cpl,
    Scf,
    Ccf,
    Jr,
    JrCond(Cond),
    Alu(AluOp, R8),
    AluImm(AluOp),
    Ret,
    RetCond(Cond),
    Reti,
    Pop(StackPair),
    Push(StackPair),
    Jp,
    JpCond(Cond),
    JpHl,
    Call,
    CallCond(Cond),
    Rst(u8),
    LdhImmA,
    LdhAImm,
    LdhCA,
    LdhAC,
    LdImm16A,
    LdAImm16,
    AddSpImm,
    LdHlSpImm,
    LdSpHl,
    /// The base-page 0xCB slot. Reaching it means the escape byte was
    /// dispatched on its own.
    Prefix,
    Illegal,
    Shift(ShiftOp, R8),
    Bit(u8, R8),
    Res(u8, R8),
    Set(u8, R8),
}

impl Instruction {
    pub const fn operand(self) -> OperandShape {
        match self {
            Instruction::LdR16Imm(_)
            | Instruction::LdImm16Sp
            | Instruction::Jp
            | Instruction::JpCond(_)
            | Instruction::Call
            | Instruction::CallCond(_)
            | Instruction::LdImm16A
            | Instruction::LdAImm16 => OperandShape::Unsigned16,
            Instruction::LdR8Imm(_)
            | Instruction::AluImm(_)
            | Instruction::LdhImmA
            | Instruction::LdhAImm
            | Instruction::Stop => OperandShape::Unsigned8,
            Instruction::Jr
            | Instruction::JrCond(_)
            | Instruction::AddSpImm
            | Instruction::LdHlSpImm => OperandShape::Signed8,
            _ => OperandShape::None,
        }
    }

    pub const fn is_illegal(self) -> bool {
        matches!(self, Instruction::Illegal | Instruction::Prefix)
    }
}

const fn r8(index: u8) -> R8 {
    match index & 0x07 {
        0 => R8::B,
        1 => R8::C,
        2 => R8::D,
        3 => R8::E,
        4 => R8::H,
        5 => R8::L,
        6 => R8::MemHl,
        _ => R8::A,
    }
}

const fn r16(index: u8) -> R16 {
    match index & 0x03 {
        0 => R16::Bc,
        1 => R16::De,
        2 => R16::Hl,
        _ => R16::Sp,
    }
}

const fn stack_pair(index: u8) -> StackPair {
    match index & 0x03 {
        0 => StackPair::Bc,
        1 => StackPair::De,
        2 => StackPair::Hl,
        _ => StackPair::Af,
    }
}

const fn indirect(index: u8) -> Indirect {
    match index & 0x03 {
        0 => Indirect::Bc,
        1 => Indirect::De,
        2 => Indirect::HlInc,
        _ => Indirect::HlDec,
    }
}

const fn cond(index: u8) -> Cond {
    match index & 0x03 {
        0 => Cond::Nz,
        1 => Cond::Z,
        2 => Cond::Nc,
        _ => Cond::C,
    }
}

const fn alu(index: u8) -> AluOp {
    match index & 0x07 {
        0 => AluOp::Add,
        1 => AluOp::Adc,
        2 => AluOp::Sub,
        3 => AluOp::Sbc,
        4 => AluOp::And,
        5 => AluOp::Xor,
        6 => AluOp::Or,
        _ => AluOp::Cp,
    }
}

const fn shift(index: u8) -> ShiftOp {
    match index & 0x07 {
        0 => ShiftOp::Rlc,
        1 => ShiftOp::Rrc,
        2 => ShiftOp::Rl,
        3 => ShiftOp::Rr,
        4 => ShiftOp::Sla,
        5 => ShiftOp::Sra,
        6 => ShiftOp::Swap,
        _ => ShiftOp::Srl,
    }
}

/// Decode a base-page opcode using the usual x/y/z/p/q split.
const fn decode_base(op: u8) -> Instruction {
    let x = op >> 6;
    let y = (op >> 3) & 0x07;
    let z = op & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    match x {
        0 => match z {
            0 => match y {
                0 => Instruction::Nop,
                1 => Instruction::LdImm16Sp,
                2 => Instruction::Stop,
                3 => Instruction::Jr,
                _ => Instruction::JrCond(cond(y - 4)),
            },
            1 => {
                if q == 0 {
                    Instruction::LdR16Imm(r16(p))
                } else {
                    Instruction::AddHlR16(r16(p))
                }
            }
            2 => {
                if q == 0 {
                    Instruction::LdIndA(indirect(p))
                } else {
                    Instruction::LdAInd(indirect(p))
                }
            }
            3 => {
                if q == 0 {
                    Instruction::IncR16(r16(p))
                } else {
                    Instruction::DecR16(r16(p))
                }
            }
            4 => Instruction::IncR8(r8(y)),
            5 => Instruction::DecR8(r8(y)),
            6 => Instruction::LdR8Imm(r8(y)),
            _ => match y {
                0..=3 => Instruction::RotateA(shift(y)),
                4 => Instruction::Daa,
                5 => Instruction::Cpl,
                6 => Instruction::Scf,
                _ => Instruction::Ccf,
            },
        },
        1 => {
            if op == 0x76 {
                Instruction::Halt
            } else {
                Instruction::LdR8R8(r8(y), r8(z))
            }
        }
        2 => Instruction::Alu(alu(y), r8(z)),
        _ => match z {
            0 => match y {
                0..=3 => Instruction::RetCond(cond(y)),
                4 => Instruction::LdhImmA,
                5 => Instruction::AddSpImm,
                6 => Instruction::LdhAImm,
                _ => Instruction::LdHlSpImm,
            },
            1 => {
                if q == 0 {
                    Instruction::Pop(stack_pair(p))
                } else {
                    match p {
                        0 => Instruction::Ret,
                        1 => Instruction::Reti,
                        2 => Instruction::JpHl,
                        _ => Instruction::LdSpHl,
                    }
                }
            }
            2 => match y {
                0..=3 => Instruction::JpCond(cond(y)),
                4 => Instruction::LdhCA,
                5 => Instruction::LdImm16A,
                6 => Instruction::LdhAC,
                _ => Instruction::LdAImm16,
            },
            3 => match y {
                0 => Instruction::Jp,
                1 => Instruction::Prefix,
                6 => Instruction::Di,
                7 => Instruction::Ei,
                _ => Instruction::Illegal,
            },
            4 => match y {
                0..=3 => Instruction::CallCond(cond(y)),
                _ => Instruction::Illegal,
            },
            5 => {
                if q == 0 {
                    Instruction::Push(stack_pair(p))
                } else if p == 0 {
                    Instruction::Call
                } else {
                    Instruction::Illegal
                }
            }
            6 => Instruction::AluImm(alu(y)),
            _ => Instruction::Rst(y * 8),
        },
    }
}

const fn decode_cb(op: u8) -> Instruction {
    let y = (op >> 3) & 0x07;
    let target = r8(op);
    match op >> 6 {
        0 => Instruction::Shift(shift(y), target),
        1 => Instruction::Bit(y, target),
        2 => Instruction::Res(y, target),
        _ => Instruction::Set(y, target),
    }
}

const fn build() -> [Instruction; 512] {
    let mut table = [Instruction::Illegal; 512];
    let mut i = 0;
    while i < 256 {
        table[i] = decode_base(i as u8);
        table[0x100 + i] = decode_cb(i as u8);
        i += 1;
    }
    table
}

/// Escape byte selecting the CB page.
pub const PREFIX: u8 = 0xCB;

pub static OPCODES: [Instruction; 512] = build();

/// Look up a table index; `0x100 | byte` addresses the CB page.
#[inline]
pub fn lookup(index: u16) -> Instruction {
    OPCODES[(index & 0x1FF) as usize]
}

impl fmt::Display for R8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            R8::B => "B",
            R8::C => "C",
            R8::D => "D",
            R8::E => "E",
            R8::H => "H",
            R8::L => "L",
            R8::MemHl => "(HL)",
            R8::A => "A",
        };
        f.write_str(name)
    }
}

impl fmt::Display for R16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            R16::Bc => "BC",
            R16::De => "DE",
            R16::Hl => "HL",
            R16::Sp => "SP",
        })
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackPair::Bc => "BC",
            StackPair::De => "DE",
            StackPair::Hl => "HL",
            StackPair::Af => "AF",
        })
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Indirect::Bc => "(BC)",
            Indirect::De => "(DE)",
            Indirect::HlInc => "(HL+)",
            Indirect::HlDec => "(HL-)",
        })
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cond::Nz => "NZ",
            Cond::Z => "Z",
            Cond::Nc => "NC",
            Cond::C => "C",
        })
    }
}

impl AluOp {
    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        }
    }
}

impl ShiftOp {
    fn mnemonic(self) -> &'static str {
        match self {
            ShiftOp::Rlc => "RLC",
            ShiftOp::Rrc => "RRC",
            ShiftOp::Rl => "RL",
            ShiftOp::Rr => "RR",
            ShiftOp::Sla => "SLA",
            ShiftOp::Sra => "SRA",
            ShiftOp::Swap => "SWAP",
            ShiftOp::Srl => "SRL",
        }
    }
}

/// Mnemonic with immediates shown as placeholders (`d8`, `r8`, `a16`).
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Nop => write!(f, "NOP"),
            Instruction::Stop => write!(f, "STOP"),
            Instruction::Halt => write!(f, "HALT"),
            Instruction::Di => write!(f, "DI"),
            Instruction::Ei => write!(f, "EI"),
            Instruction::LdR16Imm(rr) => write!(f, "LD {rr},d16"),
            Instruction::LdIndA(ind) => write!(f, "LD {ind},A"),
            Instruction::LdAInd(ind) => write!(f, "LD A,{ind}"),
            Instruction::LdImm16Sp => write!(f, "LD (a16),SP"),
            Instruction::IncR16(rr) => write!(f, "INC {rr}"),
            Instruction::DecR16(rr) => write!(f, "DEC {rr}"),
            Instruction::AddHlR16(rr) => write!(f, "ADD HL,{rr}"),
            Instruction::IncR8(r) => write!(f, "INC {r}"),
            Instruction::DecR8(r) => write!(f, "DEC {r}"),
            Instruction::LdR8Imm(r) => write!(f, "LD {r},d8"),
            Instruction::LdR8R8(dst, src) => write!(f, "LD {dst},{src}"),
            Instruction::RotateA(op) => write!(f, "{}A", op.mnemonic()),
            Instruction::Daa => write!(f, "DAA"),
            Instruction::Cpl => write!(f, "CPL"),
            Instruction::Scf => write!(f, "SCF"),
            Instruction::Ccf => write!(f, "CCF"),
            Instruction::Jr => write!(f, "JR r8"),
            Instruction::JrCond(cc) => write!(f, "JR {cc},r8"),
            Instruction::Alu(op, r) => write!(f, "{}{r}", op.mnemonic()),
            Instruction::AluImm(op) => write!(f, "{}d8", op.mnemonic()),
            Instruction::Ret => write!(f, "RET"),
            Instruction::RetCond(cc) => write!(f, "RET {cc}"),
            Instruction::Reti => write!(f, "RETI"),
            Instruction::Pop(rr) => write!(f, "POP {rr}"),
            Instruction::Push(rr) => write!(f, "PUSH {rr}"),
            Instruction::Jp => write!(f, "JP a16"),
            Instruction::JpCond(cc) => write!(f, "JP {cc},a16"),
            Instruction::JpHl => write!(f, "JP HL"),
            Instruction::Call => write!(f, "CALL a16"),
            Instruction::CallCond(cc) => write!(f, "CALL {cc},a16"),
            Instruction::Rst(vector) => write!(f, "RST {vector:02X}H"),
            Instruction::LdhImmA => write!(f, "LDH (a8),A"),
            Instruction::LdhAImm => write!(f, "LDH A,(a8)"),
            Instruction::LdhCA => write!(f, "LD (C),A"),
            Instruction::LdhAC => write!(f, "LD A,(C)"),
            Instruction::LdImm16A => write!(f, "LD (a16),A"),
            Instruction::LdAImm16 => write!(f, "LD A,(a16)"),
            Instruction::AddSpImm => write!(f, "ADD SP,r8"),
            Instruction::LdHlSpImm => write!(f, "LD HL,SP+r8"),
            Instruction::LdSpHl => write!(f, "LD SP,HL"),
            Instruction::Prefix => write!(f, "PREFIX CB"),
            Instruction::Illegal => write!(f, "ILLEGAL"),
            Instruction::Shift(op, r) => write!(f, "{} {r}", op.mnemonic()),
            Instruction::Bit(bit, r) => write!(f, "BIT {bit},{r}"),
            Instruction::Res(bit, r) => write!(f, "RES {bit},{r}"),
            Instruction::Set(bit, r) => write!(f, "SET {bit},{r}"),
        }
    }
}
