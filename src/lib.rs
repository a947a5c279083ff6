// Machine
mod state;
pub use state::{Flag, MachineState, MEMORY_MAX, REGISTER_COUNT};
pub mod word;

// Decoding & execution
mod ops;
pub use ops::{Choice, Op, Opcode, TRAP_HALT};
mod exec;
pub use exec::{execute, prepare, Action};
mod runtime;
pub use runtime::{Cycle, Runtime, Status};

// Boundary
mod image;
pub use image::LoadImage;
mod sim;
pub use sim::Simulator;

pub mod error;
pub use error::ExecError;
pub mod output;

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;
