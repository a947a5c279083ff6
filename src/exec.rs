//! Instruction decoder and executor.
//!
//! Execution is split in two: [`prepare`] decodes a word and checks privilege without touching
//! the machine, then [`Op::apply`] performs the mutation and cannot fail. A faulting instruction
//! therefore never leaves partial effects behind.

use crate::error::ExecError;
use crate::ops::{Choice, Op, TRAP_HALT};
use crate::state::MachineState;

/// What the engine should do after an instruction completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Proceed,
    /// `TRAP x25` was executed.
    Halt,
}

/// Decode `instr` and check that it may run in the current mode.
pub fn prepare(state: &MachineState, instr: u16) -> Result<Op, ExecError> {
    let op = Op::decode(instr).map_err(|opcode| ExecError::Decode { opcode, instr })?;
    if op.is_privileged() && !state.is_supervisor() {
        return Err(ExecError::Privilege {
            opcode: op.opcode(),
            instr,
        });
    }
    Ok(op)
}

/// Decode and execute a single word against `state`.
///
/// The program counter is expected to already point past `instr`.
pub fn execute(state: &mut MachineState, instr: u16) -> Result<Action, ExecError> {
    let op = prepare(state, instr)?;
    Ok(op.apply(state))
}

impl Op {
    pub fn apply(self, state: &mut MachineState) -> Action {
        match self {
            Op::ADD {
                dest_r,
                src_r_1,
                src_r_2,
            } => {
                let val = state.reg(src_r_1).wrapping_add(operand(state, src_r_2));
                state.set_reg(dest_r, val);
            }
            Op::AND {
                dest_r,
                src_r_1,
                src_r_2,
            } => {
                let val = state.reg(src_r_1) & operand(state, src_r_2);
                state.set_reg(dest_r, val);
            }
            Op::BR { nzp, pc_offset9 } => {
                if nzp & state.flag().bits() != 0 {
                    state.move_pc_relative(pc_offset9);
                }
            }
            Op::JMP { base_r } | Op::JSRR { base_r } => {
                let target = state.reg(base_r);
                state.set_pc(target);
            }
            Op::JSR { pc_offset11 } => state.move_pc_relative(pc_offset11),
            Op::LD { dest_r, pc_offset9 } => {
                let val = state.mem(relative(state, pc_offset9));
                state.set_reg(dest_r, val);
            }
            Op::LDI { dest_r, pc_offset9 } => {
                let ptr = state.mem(relative(state, pc_offset9));
                let val = state.mem(ptr);
                state.set_reg(dest_r, val);
            }
            Op::LDR {
                dest_r,
                base_r,
                offset6,
            } => {
                let val = state.mem(state.reg(base_r).wrapping_add(offset6));
                state.set_reg(dest_r, val);
            }
            // Goes through the flag-updating register write like every other load
            Op::LEA { dest_r, pc_offset9 } => {
                let val = relative(state, pc_offset9);
                state.set_reg(dest_r, val);
            }
            Op::NOT { dest_r, src_r } => {
                let val = !state.reg(src_r);
                state.set_reg(dest_r, val);
            }
            // Privilege already checked; there is no saved state to restore
            Op::RTI => (),
            Op::ST { src_r, pc_offset9 } => {
                let addr = relative(state, pc_offset9);
                state.set_mem(addr, state.reg(src_r));
            }
            Op::STI { src_r, pc_offset9 } => {
                let ptr = state.mem(relative(state, pc_offset9));
                state.set_mem(ptr, state.reg(src_r));
            }
            Op::STR {
                src_r,
                base_r,
                offset6,
            } => {
                let addr = state.reg(base_r).wrapping_add(offset6);
                state.set_mem(addr, state.reg(src_r));
            }
            Op::TRAP { vector } => match vector {
                TRAP_HALT => return Action::Halt,
                // getc, out, puts, in, putsp: no devices are emulated
                0x20..=0x24 => (),
                _ => (),
            },
        }
        Action::Proceed
    }
}

#[inline]
fn operand(state: &MachineState, choice: Choice) -> u16 {
    match choice {
        Choice::Reg(reg) => state.reg(reg),
        Choice::Imm(imm) => imm,
    }
}

#[inline]
fn relative(state: &MachineState, offset: u16) -> u16 {
    state.pc().wrapping_add(offset)
}
