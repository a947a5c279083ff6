use std::cell::Cell;
use std::str::Chars;

use colored::{ColoredString, Colorize};

use crate::runtime::Cycle;
use crate::state::MachineState;
use crate::word::format_word;

/// Where a piece of output goes.
///
/// Machine results go to stdout; step traces go to stderr, so they can be separated from
/// results in scripts.
#[derive(Clone, Copy, Debug)]
pub enum Output {
    Normal,
    Trace,
}

struct Decolored<'a> {
    chars: Chars<'a>,
}

impl Output {
    thread_local! {
        static IS_MINIMAL: Cell<bool> = const { Cell::new(false) };
        static IS_COLOR: Cell<bool> = const { Cell::new(true) };
    }

    pub fn set_minimal(new_value: bool) -> bool {
        Self::IS_MINIMAL.with(|value| value.replace(new_value))
    }
    pub fn is_minimal() -> bool {
        Self::IS_MINIMAL.with(|value| value.get())
    }
    pub fn set_color(new_value: bool) -> bool {
        Self::IS_COLOR.with(|value| value.replace(new_value))
    }
    pub fn is_color() -> bool {
        Self::IS_COLOR.with(|value| value.get())
    }

    pub fn print_str(&self, string: &str) {
        // Escapes are dropped in minimal mode and when colour is off
        let plain = Self::is_minimal() || !Self::is_color();
        match (self, plain) {
            (Self::Normal, false) => print!("{}", string),
            (Self::Normal, true) => print!("{}", Decolored::new(string).collect::<String>()),
            (Self::Trace, false) => eprint!("{}", ColoredString::from(string).blue()),
            (Self::Trace, true) => eprint!("{}", Decolored::new(string).collect::<String>()),
        }
    }

    pub fn print_registers(&self, state: &MachineState) {
        if Self::is_minimal() {
            for (i, reg) in state.registers().iter().enumerate() {
                self.print_str(&format!("R{} {}\n", i, format_word(*reg)));
            }
            self.print_str(&format!("PC {}\n", format_word(state.pc())));
            self.print_str(&format!("CC {:03b}\n", state.flag().bits()));
            return;
        }

        self.print_str("\x1b[2m┌──────────────────────────────────────────┐\x1b[0m\n");
        self.print_str(
            "\x1b[2m│      \x1b[3mbinary               hex     int\x1b[0m\x1b[2m │\x1b[0m\n",
        );
        for (i, reg) in state.registers().iter().enumerate() {
            self.print_str("\x1b[2m│\x1b[0m");
            self.print_str(&format!(" \x1b[1mR{}\x1b[0m  ", i));
            self.print_integer(*reg);
            self.print_str(" \x1b[2m│\x1b[0m\n");
        }
        self.print_str("\x1b[2m│\x1b[0m");
        self.print_str(&format!(" \x1b[1mPC\x1b[0m  0x{:04x}", state.pc()));
        self.print_str(&format!("   \x1b[1mCC\x1b[0m  {:03b}", state.flag().bits()));
        let mode = if state.is_supervisor() {
            "supervisor"
        } else {
            "user"
        };
        self.print_str(&format!("   \x1b[1mMODE\x1b[0m  {:<10}", mode));
        self.print_str(" \x1b[2m│\x1b[0m\n");
        self.print_str("\x1b[2m└──────────────────────────────────────────┘\x1b[0m\n");
    }

    /// Binary, hex and signed decimal
    pub fn print_integer(&self, value: u16) {
        self.print_str(&format!("{}  ", format_word(value)));
        self.print_str(&format!("0x{:04x}  ", value));
        self.print_str(&format!("{:-6}", value as i16));
    }

    pub fn print_memory(&self, state: &MachineState, addr: u16) {
        let value = state.mem(addr);
        if Self::is_minimal() {
            self.print_str(&format!("x{:04X} {}\n", addr, format_word(value)));
            return;
        }
        self.print_str(&format!("\x1b[1mx{:04X}\x1b[0m = ", addr));
        self.print_integer(value);
        self.print_str("\n");
    }

    pub fn print_cycle(&self, cycle: &Cycle) {
        self.print_str(&format!(
            "x{:04X}  {}  {}\n",
            cycle.addr,
            format_word(cycle.instr),
            cycle.op.opcode()
        ));
    }
}

impl<'a> Decolored<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            chars: string.chars(),
        }
    }
}

impl<'a> Iterator for Decolored<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            // Skip escape sequences up to and including the terminating 'm'
            if ch == '\x1b' {
                for ch in self.chars.by_ref() {
                    if ch == 'm' {
                        break;
                    }
                }
                continue;
            }
            return Some(ch);
        }
        None
    }
}
