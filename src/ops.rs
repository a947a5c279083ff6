use std::fmt;

use crate::word::{bits, sign_extend};

/// Instruction tag held in the top four bits of a word.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    BR,
    ADD,
    LD,
    ST,
    JSR,
    AND,
    LDR,
    STR,
    RTI,
    NOT,
    LDI,
    STI,
    JMP,
    /// Reserved encoding `0b1101`.
    INVALID,
    LEA,
    TRAP,
}

impl Opcode {
    const TABLE: [Opcode; 16] = [
        Self::BR,      // 0x0
        Self::ADD,     // 0x1
        Self::LD,      // 0x2
        Self::ST,      // 0x3
        Self::JSR,     // 0x4
        Self::AND,     // 0x5
        Self::LDR,     // 0x6
        Self::STR,     // 0x7
        Self::RTI,     // 0x8
        Self::NOT,     // 0x9
        Self::LDI,     // 0xA
        Self::STI,     // 0xB
        Self::JMP,     // 0xC
        Self::INVALID, // 0xD
        Self::LEA,     // 0xE
        Self::TRAP,    // 0xF
    ];

    pub fn from_instr(instr: u16) -> Opcode {
        Self::TABLE[(instr >> 12) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BR => "BR",
            Self::ADD => "ADD",
            Self::LD => "LD",
            Self::ST => "ST",
            Self::JSR => "JSR",
            Self::AND => "AND",
            Self::LDR => "LDR",
            Self::STR => "STR",
            Self::RTI => "RTI",
            Self::NOT => "NOT",
            Self::LDI => "LDI",
            Self::STI => "STI",
            Self::JMP => "JMP",
            Self::INVALID => "INVALID",
            Self::LEA => "LEA",
            Self::TRAP => "TRAP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trap vector which stops the machine.
pub const TRAP_HALT: u8 = 0x25;

/// A fully decoded instruction.
///
/// Offsets are stored already extended to a full word, so applying an `Op` is plain wrapping
/// arithmetic.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Add SR1 (source register 1) with SR2 and store in DR (destination register)
    ADD {
        dest_r: usize,
        src_r_1: usize,
        src_r_2: Choice,
    },
    /// Bitwise-and SR1 with SR2 and store in DR
    AND {
        dest_r: usize,
        src_r_1: usize,
        src_r_2: Choice,
    },
    /// Branch if any flag in `nzp` is currently set
    BR { nzp: u16, pc_offset9: u16 },
    /// Set PC to BR to perform a jump on the next cycle
    JMP { base_r: usize },
    /// Jump PC-relative. No return address is saved.
    JSR { pc_offset11: u16 },
    /// Jump to the address held in BR. No return address is saved.
    JSRR { base_r: usize },
    /// Load value directly from a memory address into DR
    LD { dest_r: usize, pc_offset9: u16 },
    /// Load through a pointer stored in memory
    LDI { dest_r: usize, pc_offset9: u16 },
    LDR {
        dest_r: usize,
        base_r: usize,
        offset6: u16,
    },
    LEA { dest_r: usize, pc_offset9: u16 },
    NOT { dest_r: usize, src_r: usize },
    RTI,
    ST { src_r: usize, pc_offset9: u16 },
    STI { src_r: usize, pc_offset9: u16 },
    /// `offset6` is zero-extended, unlike `LDR`.
    STR {
        src_r: usize,
        base_r: usize,
        offset6: u16,
    },
    TRAP { vector: u8 },
}

/// ADD and AND commands support immediate value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Reg(usize),
    /// Sign-extended `imm5`
    Imm(u16),
}

#[inline]
fn reg_at(instr: u16, shift: u32) -> usize {
    bits(instr, shift, 3) as usize
}

impl Op {
    /// Decode an instruction word. Fails only for the reserved opcode, which is returned as is.
    pub fn decode(instr: u16) -> Result<Op, Opcode> {
        let opcode = Opcode::from_instr(instr);
        let dr = reg_at(instr, 9);
        let sr = reg_at(instr, 6);
        let pc_offset9 = sign_extend(instr, 9);

        let op = match opcode {
            Opcode::ADD | Opcode::AND => {
                let src_r_2 = if bits(instr, 5, 1) == 0 {
                    Choice::Reg(reg_at(instr, 0))
                } else {
                    Choice::Imm(sign_extend(instr, 5))
                };
                if opcode == Opcode::ADD {
                    Op::ADD {
                        dest_r: dr,
                        src_r_1: sr,
                        src_r_2,
                    }
                } else {
                    Op::AND {
                        dest_r: dr,
                        src_r_1: sr,
                        src_r_2,
                    }
                }
            }
            Opcode::BR => Op::BR {
                nzp: bits(instr, 9, 3),
                pc_offset9,
            },
            Opcode::JMP => Op::JMP { base_r: sr },
            Opcode::JSR => {
                if bits(instr, 11, 1) == 1 {
                    Op::JSR {
                        pc_offset11: sign_extend(instr, 11),
                    }
                } else {
                    Op::JSRR { base_r: sr }
                }
            }
            Opcode::LD => Op::LD {
                dest_r: dr,
                pc_offset9,
            },
            Opcode::LDI => Op::LDI {
                dest_r: dr,
                pc_offset9,
            },
            Opcode::LDR => Op::LDR {
                dest_r: dr,
                base_r: sr,
                offset6: sign_extend(instr, 6),
            },
            Opcode::LEA => Op::LEA {
                dest_r: dr,
                pc_offset9,
            },
            Opcode::NOT => Op::NOT {
                dest_r: dr,
                src_r: sr,
            },
            Opcode::RTI => Op::RTI,
            Opcode::ST => Op::ST {
                src_r: dr,
                pc_offset9,
            },
            Opcode::STI => Op::STI {
                src_r: dr,
                pc_offset9,
            },
            Opcode::STR => Op::STR {
                src_r: dr,
                base_r: sr,
                offset6: bits(instr, 0, 6),
            },
            Opcode::TRAP => Op::TRAP {
                vector: bits(instr, 0, 8) as u8,
            },
            Opcode::INVALID => return Err(opcode),
        };
        Ok(op)
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Op::ADD { .. } => Opcode::ADD,
            Op::AND { .. } => Opcode::AND,
            Op::BR { .. } => Opcode::BR,
            Op::JMP { .. } => Opcode::JMP,
            Op::JSR { .. } | Op::JSRR { .. } => Opcode::JSR,
            Op::LD { .. } => Opcode::LD,
            Op::LDI { .. } => Opcode::LDI,
            Op::LDR { .. } => Opcode::LDR,
            Op::LEA { .. } => Opcode::LEA,
            Op::NOT { .. } => Opcode::NOT,
            Op::RTI => Opcode::RTI,
            Op::ST { .. } => Opcode::ST,
            Op::STI { .. } => Opcode::STI,
            Op::STR { .. } => Opcode::STR,
            Op::TRAP { .. } => Opcode::TRAP,
        }
    }

    /// Whether the instruction may only run in supervisor mode.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Op::RTI)
    }
}
