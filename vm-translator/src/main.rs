//! Command-line front end: `vm-translator <path>`.
//!
//! A `.vm` file translates to its sibling `.asm` without a bootstrap. A
//! directory translates every `.vm` file inside (sorted, for reproducible
//! output) into `<dir>/<basename>.asm` behind the `Sys.init` bootstrap.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use vm_translator::{translate_unit, CodeWriter};

fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `.vm` files of a directory in sorted order.
fn vm_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    Ok(files)
}

fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let base = unit_name(input);
        input.join(format!("{base}.asm"))
    } else {
        input.with_extension("asm")
    }
}

fn run(path: &Path) -> Result<(), String> {
    let output = output_path(path);
    let file = File::create(&output)
        .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    let mut writer = CodeWriter::new(std::io::BufWriter::new(file));

    if path.is_dir() {
        let files =
            vm_files(path).map_err(|e| format!("reading \"{}\": {e}", path.display()))?;
        if files.is_empty() {
            return Err(format!("no .vm files in \"{}\"", path.display()));
        }
        writer
            .write_bootstrap()
            .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
        for file in &files {
            translate_file(file, &mut writer)?;
        }
    } else {
        translate_file(path, &mut writer)?;
    }

    writer
        .flush()
        .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    println!("Translated {} -> {}", path.display(), output.display());
    Ok(())
}

fn translate_file<W: std::io::Write>(
    path: &Path,
    writer: &mut CodeWriter<W>,
) -> Result<(), String> {
    let file =
        File::open(path).map_err(|e| format!("reading \"{}\": {e}", path.display()))?;
    translate_unit(&unit_name(path), BufReader::new(file), writer)
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.vm | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
