use std::cmp::Ordering;

/// LC3 can address 128KB of memory.
pub const MEMORY_MAX: usize = 0x10000;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Represents complete machine state during runtime.
///
/// Registers and memory are plain words; all arithmetic on them wraps.
pub struct MachineState {
    /// System memory - 128KB in size.
    mem: Box<[u16; MEMORY_MAX]>,
    /// Program counter
    pc: u16,
    /// 8x 16-bit registers
    reg: [u16; REGISTER_COUNT],
    /// Condition code
    flag: Flag,
    /// Gates privileged instructions (`RTI`)
    supervisor: bool,
}

/// Condition code, set using the value of the last register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    N = 0b100,
    Z = 0b010,
    P = 0b001,
    /// No register has been written yet.
    Uninit = 0b000,
}

impl Flag {
    pub fn from_value(val: u16) -> Flag {
        match (val as i16).cmp(&0) {
            Ordering::Less => Flag::N,
            Ordering::Equal => Flag::Z,
            Ordering::Greater => Flag::P,
        }
    }

    /// One-hot `nzp` bitmask.
    pub fn bits(self) -> u16 {
        self as u16
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        MachineState {
            mem: Box::new([0; MEMORY_MAX]),
            pc: 0,
            reg: [0; REGISTER_COUNT],
            flag: Flag::Uninit,
            supervisor: false,
        }
    }

    /// Panics if `index` does not name one of R0..R7.
    #[inline]
    pub fn reg(&self, index: usize) -> u16 {
        self.reg[checked_reg(index)]
    }

    /// Write a register and update the condition code from the signed value written.
    #[inline]
    pub fn set_reg(&mut self, index: usize, val: u16) {
        self.reg[checked_reg(index)] = val;
        self.flag = Flag::from_value(val);
    }

    pub fn registers(&self) -> &[u16; REGISTER_COUNT] {
        &self.reg
    }

    #[inline]
    pub fn mem(&self, addr: u16) -> u16 {
        self.mem[addr as usize]
    }

    #[inline]
    pub fn set_mem(&mut self, addr: u16, val: u16) {
        self.mem[addr as usize] = val;
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// `pc += offset`, where `offset` is a sign-extended word.
    #[inline]
    pub fn move_pc_relative(&mut self, offset: u16) {
        self.pc = self.pc.wrapping_add(offset);
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn is_supervisor(&self) -> bool {
        self.supervisor
    }

    pub fn set_supervisor(&mut self, supervisor: bool) {
        self.supervisor = supervisor;
    }
}

#[inline]
fn checked_reg(index: usize) -> usize {
    assert!(
        index < REGISTER_COUNT,
        "register index {index} is out of range (R0..R7)"
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_zeroed() {
        let state = MachineState::new();
        assert_eq!(state.pc(), 0);
        assert_eq!(state.registers(), &[0; 8]);
        assert_eq!(state.mem(0x0000), 0);
        assert_eq!(state.mem(0xffff), 0);
        assert_eq!(state.flag(), Flag::Uninit);
        assert!(!state.is_supervisor());
    }

    #[test]
    fn register_write_sets_one_flag() {
        let mut state = MachineState::new();
        for (val, expected) in [
            (0x0000, Flag::Z),
            (0x0001, Flag::P),
            (0x7fff, Flag::P),
            (0x8000, Flag::N),
            (0xffff, Flag::N),
        ] {
            state.set_reg(3, val);
            assert_eq!(state.reg(3), val);
            assert_eq!(state.flag(), expected, "flag for 0x{val:04x}");
            assert_eq!(state.flag().bits().count_ones(), 1);
        }
    }

    #[test]
    fn memory_write_keeps_flags() {
        let mut state = MachineState::new();
        state.set_reg(0, 5);
        state.set_mem(0x3000, 0x8000);
        assert_eq!(state.mem(0x3000), 0x8000);
        assert_eq!(state.flag(), Flag::P);
    }

    #[test]
    fn pc_moves_relative_and_wraps() {
        let mut state = MachineState::new();
        state.set_pc(0x3000);
        state.move_pc_relative(0xffff);
        assert_eq!(state.pc(), 0x2fff);
        state.set_pc(0xffff);
        state.move_pc_relative(2);
        assert_eq!(state.pc(), 0x0001);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn register_index_out_of_range() {
        let state = MachineState::new();
        state.reg(8);
    }
}
