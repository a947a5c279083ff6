use crate::error::ExecError;
use crate::image::LoadImage;
use crate::runtime::Runtime;
use crate::state::MachineState;
use crate::word::{format_word, parse_word, WordError};

/// Boundary over the engine, exchanging words in their 16-character binary form.
///
/// Malformed words are rejected here and never reach the machine.
#[derive(Default)]
pub struct Simulator {
    runtime: Runtime,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_image(image: &LoadImage) -> Self {
        let mut sim = Self::new();
        sim.load(image);
        sim
    }

    pub fn load(&mut self, image: &LoadImage) {
        image.load(self.runtime.state_mut());
    }

    pub fn read_memory(&self, addr: u16) -> String {
        format_word(self.state().mem(addr))
    }

    pub fn write_memory(&mut self, addr: u16, word: &str) -> Result<(), WordError> {
        let word = parse_word(word)?;
        self.state_mut().set_mem(addr, word);
        Ok(())
    }

    /// Panics if `index` is not a register index.
    pub fn read_register(&self, index: usize) -> String {
        format_word(self.state().reg(index))
    }

    /// Updates the condition code, like any register write.
    pub fn write_register(&mut self, index: usize, word: &str) -> Result<(), WordError> {
        let word = parse_word(word)?;
        self.state_mut().set_reg(index, word);
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), ExecError> {
        self.runtime.step()
    }

    pub fn run(&mut self) -> Result<(), ExecError> {
        self.runtime.run()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    pub fn state(&self) -> &MachineState {
        self.runtime.state()
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        self.runtime.state_mut()
    }
}
