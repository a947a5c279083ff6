use std::{error::Error, fmt, ops::Range};

use miette::{miette, LabeledSpan, Report, Severity};

use crate::ops::Opcode;
use crate::word::{format_word, WordError};

/// Fatal error raised while decoding or executing a single instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The opcode has no handler.
    Decode { opcode: Opcode, instr: u16 },
    /// A privileged instruction ran outside supervisor mode.
    Privilege { opcode: Opcode, instr: u16 },
}

impl ExecError {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Decode { opcode, .. } | Self::Privilege { opcode, .. } => *opcode,
        }
    }

    pub fn instr(&self) -> u16 {
        match self {
            Self::Decode { instr, .. } | Self::Privilege { instr, .. } => *instr,
        }
    }
}

impl Error for ExecError {}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { opcode, instr } => write!(
                f,
                "Unknown opcode `{}` in instruction {}",
                opcode,
                format_word(*instr)
            ),
            Self::Privilege { opcode, .. } => write!(
                f,
                "`{}` can only be executed in supervisor mode",
                opcode
            ),
        }
    }
}

// Load image errors

pub fn image_bad_word(span: Range<usize>, src: &str, e: WordError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "image::bad_word",
        help = "each line after the address must hold exactly 16 `0`/`1` characters",
        labels = vec![LabeledSpan::at(span, "malformed word")],
        "Encountered a malformed word: {e}",
    )
    .with_source_code(src.to_owned())
}

pub fn image_bad_orig(span: Range<usize>, src: &str, e: WordError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "image::bad_orig",
        help = "the first line gives the start address as up to 16 binary digits",
        labels = vec![LabeledSpan::at(span, "malformed address")],
        "Encountered a malformed start address: {e}",
    )
    .with_source_code(src.to_owned())
}

pub fn image_empty() -> Report {
    miette!(
        severity = Severity::Error,
        code = "image::empty",
        help = "a load image starts with a line holding the start address",
        "Load image is empty",
    )
}

// Runtime errors

pub fn run_fault(e: &ExecError, pc: u16) -> Report {
    let (code, help) = match e {
        ExecError::Decode { .. } => (
            "run::decode",
            "the program counter may have run into data or uninitialised memory",
        ),
        ExecError::Privilege { .. } => (
            "run::privilege",
            "pass `--supervisor` to start the machine in supervisor mode",
        ),
    };
    miette!(
        severity = Severity::Error,
        code = code,
        help = help,
        "Machine faulted at address 0x{pc:04x}: {e}",
    )
}

pub fn run_limit(limit: u64) -> Report {
    miette!(
        severity = Severity::Error,
        code = "run::limit",
        help = "raise `--limit`, or check that the program reaches `TRAP x25`",
        "Program did not halt within {limit} instructions",
    )
}

// Command-line errors

pub fn cli_bad_address(text: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "cli::address",
        help = "addresses are written as `x3000`, `0x3000` or decimal",
        "Invalid address `{text}`",
    )
}

pub fn cli_bad_poke(text: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "cli::poke",
        help = "write pokes as ADDR=WORD, eg. `x3100=0000000000001111`",
        "Invalid memory poke `{text}`",
    )
}
