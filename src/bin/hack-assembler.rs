use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use colored::*;

use hack_toolchain::files::{self, HACK_EXTENSION};
use hack_toolchain::logging;

/// Assemble Hack assembly into binary machine code.
#[derive(Parser)]
#[command(name = "hack-assembler", version)]
struct Cli {
    /// Assembly source (`.asm`)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to `<INPUT>.hack`)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// More logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = cli
        .output
        .unwrap_or_else(|| files::output_path(&cli.input, HACK_EXTENSION));
    files::assemble_file(&cli.input, &output)
        .with_context(|| format!("failed to assemble {}", cli.input.display()))?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}
