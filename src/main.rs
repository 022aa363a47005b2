use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use colored::*;

use hack_toolchain::files::{self, ASM_EXTENSION};
use hack_toolchain::logging;
use hack_toolchain::translator::Options;

/// Translate VM code into Hack assembly.
#[derive(Parser)]
#[command(name = "vm-translator", version)]
struct Cli {
    /// A `.vm` file, or a directory of `.vm` files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to `<INPUT>.asm`, or `<dir>/<dir>.asm`)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Set SP to 256 and call Sys.init before anything else
    #[arg(long)]
    bootstrap: bool,

    /// Don't echo VM lines as assembly comments
    #[arg(long)]
    no_comments: bool,

    /// More logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let output = cli
        .output
        .unwrap_or_else(|| files::output_path(&cli.input, ASM_EXTENSION));
    let options = Options {
        bootstrap: cli.bootstrap,
        comments: !cli.no_comments,
    };
    files::translate_path(&cli.input, &output, options)
        .with_context(|| format!("failed to translate {}", cli.input.display()))?;
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
