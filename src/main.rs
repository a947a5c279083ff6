use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

use lc3sim::output::Output;
use lc3sim::word::parse_word;
use lc3sim::{error, LoadImage, Runtime, Simulator};

/// lc3sim runs LC3 load images one instruction at a time.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a load image to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load an image, run it until it halts and print the machine state
    Run {
        /// Text load image to run
        name: PathBuf,
        #[command(flatten)]
        opts: RunOptions,
    },
    /// Check that a load image is well formed, without running it
    Check {
        /// Text load image to check
        name: PathBuf,
    },
}

#[derive(clap::Args, Default)]
struct RunOptions {
    /// Produce minimal output, suited for blackbox tests
    #[arg(short, long)]
    minimal: bool,
    /// Start the machine in supervisor mode
    #[arg(short, long)]
    supervisor: bool,
    /// Fail if the program has not halted after this many instructions
    #[arg(short, long, value_name = "COUNT")]
    limit: Option<u64>,
    /// Write a word to memory before the image is loaded, eg. `x3100=0000000000001111`
    #[arg(short, long, value_name = "ADDR=WORD")]
    poke: Vec<String>,
    /// Print the word at this address once the program halts
    #[arg(short, long, value_name = "ADDR")]
    dump: Vec<String>,
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    lc3sim::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(lc3sim::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    match args.command {
        Some(Command::Run { name, opts }) => run(&name, &opts),
        Some(Command::Check { name }) => {
            file_message(Green, "Checking", &name);
            let image = read_image(&name)?;
            message(
                Green,
                "Success",
                &format!("{} word(s) from x{:04X}", image.len(), image.orig()),
            );
            Ok(())
        }
        None => {
            if let Some(path) = args.path {
                run(&path, &RunOptions::default())
            } else {
                println!("\n~ lc3sim v{VERSION} ~");
                println!("{SHORT_INFO}");
                Ok(())
            }
        }
    }
}

enum MsgColor {
    Green,
    Cyan,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message(color: MsgColor, left: &str, right: &str) {
    if Output::is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
    };
    println!("{left:>12} {right}");
}

fn read_image(name: &Path) -> Result<LoadImage> {
    let src = fs::read_to_string(name).into_diagnostic()?;
    LoadImage::parse(&src)
}

fn run(name: &Path, opts: &RunOptions) -> Result<()> {
    Output::set_minimal(opts.minimal);

    file_message(MsgColor::Green, "Loading", name);
    let image = read_image(name)?;

    let mut sim = Simulator::new();
    sim.state_mut().set_supervisor(opts.supervisor);
    for poke in &opts.poke {
        let (addr, word) = parse_poke(poke)?;
        sim.state_mut().set_mem(addr, word);
    }
    // Image is loaded last, so it wins over overlapping pokes
    sim.load(&image);
    let dumps = opts
        .dump
        .iter()
        .map(|addr| parse_address(addr))
        .collect::<Result<Vec<_>>>()?;

    message(
        MsgColor::Green,
        "Running",
        &format!("from x{:04X}", image.orig()),
    );
    drive(sim.runtime_mut(), opts.limit)?;

    let processed = sim.runtime().processed();
    message(
        MsgColor::Cyan,
        "Halted",
        &format!("after {processed} instruction(s)"),
    );
    if Output::is_minimal() {
        Output::Normal.print_str(&format!("processed {processed}\n"));
    }
    Output::Normal.print_registers(sim.state());
    for addr in dumps {
        Output::Normal.print_memory(sim.state(), addr);
    }

    file_message(MsgColor::Green, "Completed", name);
    Ok(())
}

/// Run to completion. Steps manually when tracing or when a limit is set.
fn drive(runtime: &mut Runtime, limit: Option<u64>) -> Result<()> {
    let trace = lc3sim::env::is_trace_enabled();
    if !trace && limit.is_none() {
        return runtime
            .run()
            .map_err(|e| error::run_fault(&e, runtime.state().pc()));
    }

    let mut count = 0;
    while runtime.is_running() {
        if let Some(limit) = limit {
            if count >= limit {
                return Err(error::run_limit(limit));
            }
        }
        match runtime.cycle() {
            Ok(Some(cycle)) if trace => Output::Trace.print_cycle(&cycle),
            Ok(_) => (),
            Err(e) => return Err(error::run_fault(&e, runtime.state().pc())),
        }
        count += 1;
    }
    Ok(())
}

/// `x3000`, `0x3000` or decimal.
fn parse_address(text: &str) -> Result<u16> {
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('x'))
        .or_else(|| text.strip_prefix('X'))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse::<u16>(),
    };
    parsed.map_err(|_| error::cli_bad_address(text))
}

fn parse_poke(text: &str) -> Result<(u16, u16)> {
    let Some((addr, word)) = text.split_once('=') else {
        return Err(error::cli_bad_poke(text));
    };
    let addr = parse_address(addr.trim())?;
    let word = parse_word(word.trim()).map_err(|_| error::cli_bad_poke(text))?;
    Ok((addr, word))
}

const SHORT_INFO: &str = r"
Welcome to lc3sim, an instruction-level emulator for the LC3 architecture.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
