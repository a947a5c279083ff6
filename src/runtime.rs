use crate::error::ExecError;
use crate::exec::{prepare, Action};
use crate::ops::Op;
use crate::state::MachineState;

/// Drives the fetch-decode-execute cycle over an owned [`MachineState`].
pub struct Runtime {
    state: MachineState,
    /// Amount of instructions completed.
    processed: u64,
    status: Status,
}

/// Lifecycle of the run loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// No instruction has been executed yet.
    #[default]
    Idle,
    Running,
    /// `TRAP x25` was executed. Further steps do nothing.
    Halted,
    /// An instruction failed to decode or execute. Further steps report the same fault.
    Faulted(ExecError),
}

/// A completed cycle, as seen by a tracing caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cycle {
    /// Address the instruction was fetched from.
    pub addr: u16,
    pub instr: u16,
    pub op: Op,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(MachineState::new())
    }
}

impl Runtime {
    pub fn new(state: MachineState) -> Self {
        Runtime {
            state,
            processed: 0,
            status: Status::Idle,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn into_state(self) -> MachineState {
        self.state
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// False once the machine has halted or faulted.
    pub fn is_running(&self) -> bool {
        matches!(self.status, Status::Idle | Status::Running)
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<(), ExecError> {
        self.cycle().map(|_| ())
    }

    /// Execute a single instruction, returning what was run.
    ///
    /// Returns `Ok(None)` if the machine is already halted.
    pub fn cycle(&mut self) -> Result<Option<Cycle>, ExecError> {
        match &self.status {
            Status::Halted => return Ok(None),
            Status::Faulted(e) => return Err(e.clone()),
            Status::Idle | Status::Running => (),
        }

        let addr = self.state.pc();
        let instr = self.state.mem(addr);
        // Nothing is mutated until the instruction is known to be valid
        let op = match prepare(&self.state, instr) {
            Ok(op) => op,
            Err(e) => {
                self.status = Status::Faulted(e.clone());
                return Err(e);
            }
        };

        // PC incremented before instruction is performed
        self.state.move_pc_relative(1);
        let action = op.apply(&mut self.state);
        self.processed += 1;

        self.status = match action {
            Action::Proceed => Status::Running,
            Action::Halt => Status::Halted,
        };
        Ok(Some(Cycle { addr, instr, op }))
    }

    /// Step until the machine halts. The first fault aborts the run and is returned.
    pub fn run(&mut self) -> Result<(), ExecError> {
        while self.is_running() {
            self.step()?;
        }
        match &self.status {
            Status::Faulted(e) => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Opcode;

    const HALT: u16 = 0xf025;
    /// ADD R0, R0, #1
    const INC_R0: u16 = 0b0001_000_000_1_00001;

    fn runtime_with(orig: u16, program: &[u16]) -> Runtime {
        let mut state = MachineState::new();
        for (i, word) in program.iter().enumerate() {
            state.set_mem(orig.wrapping_add(i as u16), *word);
        }
        state.set_pc(orig);
        Runtime::new(state)
    }

    #[test]
    fn runs_until_halt() {
        let mut runtime = runtime_with(0x3000, &[INC_R0, INC_R0, HALT]);
        assert_eq!(runtime.status(), &Status::Idle);
        runtime.run().unwrap();
        assert_eq!(runtime.state().reg(0), 2);
        assert_eq!(runtime.processed(), 3);
        assert_eq!(runtime.state().pc(), 0x3003);
        assert_eq!(runtime.status(), &Status::Halted);
        assert!(!runtime.is_running());
    }

    #[test]
    fn halt_stops_before_next_instruction() {
        let mut runtime = runtime_with(0x3000, &[HALT, INC_R0]);
        runtime.run().unwrap();
        assert_eq!(runtime.state().reg(0), 0);
        assert_eq!(runtime.processed(), 1);

        // Stepping a halted machine does nothing
        runtime.step().unwrap();
        assert_eq!(runtime.state().reg(0), 0);
        assert_eq!(runtime.processed(), 1);
        assert_eq!(runtime.state().pc(), 0x3001);
    }

    #[test]
    fn single_steps() {
        let mut runtime = runtime_with(0x3000, &[INC_R0, HALT]);
        let cycle = runtime.cycle().unwrap().unwrap();
        assert_eq!(cycle.addr, 0x3000);
        assert_eq!(cycle.instr, INC_R0);
        assert_eq!(cycle.op.opcode(), Opcode::ADD);
        assert_eq!(runtime.status(), &Status::Running);
        assert!(runtime.is_running());
        assert_eq!(runtime.processed(), 1);

        runtime.step().unwrap();
        assert_eq!(runtime.status(), &Status::Halted);
        assert_eq!(runtime.cycle(), Ok(None));
    }

    #[test]
    fn fault_aborts_run() {
        let mut runtime = runtime_with(0x3000, &[INC_R0, 0xd000, INC_R0, HALT]);
        let e = runtime.run().unwrap_err();
        assert_eq!(e.opcode(), Opcode::INVALID);
        assert!(e.to_string().contains("INVALID"));

        // Only the first instruction completed
        assert_eq!(runtime.processed(), 1);
        assert_eq!(runtime.state().reg(0), 1);
        // PC still points at the faulting word
        assert_eq!(runtime.state().pc(), 0x3001);
        assert!(matches!(runtime.status(), Status::Faulted(_)));

        // The fault is sticky
        assert_eq!(runtime.step(), Err(e.clone()));
        assert_eq!(runtime.run(), Err(e));
        assert_eq!(runtime.processed(), 1);
    }

    #[test]
    fn privilege_fault_is_reported() {
        let mut runtime = runtime_with(0x3000, &[0x8000, HALT]);
        let e = runtime.run().unwrap_err();
        assert!(matches!(
            e,
            ExecError::Privilege {
                opcode: Opcode::RTI,
                ..
            }
        ));
        assert_eq!(runtime.processed(), 0);

        let mut runtime = runtime_with(0x3000, &[0x8000, HALT]);
        runtime.state_mut().set_supervisor(true);
        runtime.run().unwrap();
        assert_eq!(runtime.processed(), 2);
    }

    #[test]
    fn loops_with_branch() {
        // Count R1 down from 5, adding 3 to R0 each time
        let program = [
            0b0101_000_000_1_00000, // AND R0, R0, #0
            0b0101_001_001_1_00000, // AND R1, R1, #0
            0b0001_001_001_1_00101, // ADD R1, R1, #5
            0b0001_000_000_1_00011, // ADD R0, R0, #3
            0b0001_001_001_1_11111, // ADD R1, R1, #-1
            0b0000_001_111111101,   // BRp #-3
            HALT,
        ];
        let mut runtime = runtime_with(0x3000, &program);
        runtime.run().unwrap();
        assert_eq!(runtime.state().reg(0), 15);
        assert_eq!(runtime.state().reg(1), 0);
        assert_eq!(runtime.processed(), 3 + 5 * 3 + 1);
    }

    #[test]
    fn pc_wraps_around_memory() {
        let mut runtime = runtime_with(0xffff, &[INC_R0, HALT]);
        runtime.run().unwrap();
        assert_eq!(runtime.state().reg(0), 1);
        assert_eq!(runtime.state().pc(), 0x0001);
    }
}
