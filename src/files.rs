//! Reading sources, writing outputs and deriving file names.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::assembler;
use crate::translator::{Options, Translator};
use crate::Result;

pub const ASM_EXTENSION: &str = "asm";
pub const HACK_EXTENSION: &str = "hack";
pub const VM_EXTENSION: &str = "vm";

/// `Prog.asm` -> `Prog.hack`. A directory `dir/` -> `dir/dir.<extension>`.
pub fn output_path(input: &Path, extension: &str) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        return input.join(format!("{}.{}", name, extension));
    }
    input.with_extension(extension)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The `.vm` files to translate, each paired with its namespace. A
/// directory yields every `.vm` file in it, sorted by name.
pub fn vm_sources(input: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !input.is_dir() {
        return Ok(vec![(stem(input), input.to_path_buf())]);
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == VM_EXTENSION) {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no .{} files in {}", VM_EXTENSION, input.display()),
        )
        .into());
    }
    paths.sort();
    Ok(paths.into_iter().map(|p| (stem(&p), p)).collect())
}

pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    out.flush()?;
    Ok(())
}

/// Assemble `input` into `output`, returning the number of words written.
pub fn assemble_file(input: &Path, output: &Path) -> Result<usize> {
    let source = fs::read_to_string(input)?;
    let words = assembler::assemble_to_binary(&source)?;
    write_lines(output, &words)?;
    info!(output = %output.display(), words = words.len(), "wrote binary");
    Ok(words.len())
}

/// Translate a `.vm` file or a directory of them into `output`.
pub fn translate_path(input: &Path, output: &Path, options: Options) -> Result<usize> {
    let mut translator = Translator::new(options);
    for (name, path) in vm_sources(input)? {
        let source = fs::read_to_string(&path)?;
        translator.translate_unit(&name, &source)?;
    }
    let lines = translator.finish();
    write_lines(output, &lines)?;
    info!(output = %output.display(), lines = lines.len(), "wrote assembly");
    Ok(lines.len())
}
