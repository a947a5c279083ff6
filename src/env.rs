//! Process configuration read from environment variables.
//!
//! - `LC3SIM_TRACE=1`: print every executed instruction to stderr.
//! - `NO_COLOR` (any value): disable colored output.

use std::cell::Cell;
use std::ffi::OsStr;

use crate::output::Output;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Env {
    pub trace: bool,
    pub color: bool,
}

impl Env {
    fn from_vars() -> Self {
        Env {
            trace: var_is("LC3SIM_TRACE", "1"),
            color: std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

thread_local! {
    /// Set exactly once, by `init`
    static ENV: Cell<Option<Env>> = const { Cell::new(None) };
}

/// Must be called once, before any other function in this module.
pub fn init() {
    let env = Env::from_vars();
    let previous = ENV.replace(Some(env));
    assert!(
        previous.is_none(),
        "tried to initialize environment state multiple times"
    );
    if !env.color {
        colored::control::set_override(false);
        Output::set_color(false);
    }
}

pub fn get() -> Env {
    ENV.get()
        .unwrap_or_else(|| panic!("tried to access environment state before initialization"))
}

pub fn is_trace_enabled() -> bool {
    get().trace
}

fn var_is(name: impl AsRef<OsStr>, value: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == value)
}
