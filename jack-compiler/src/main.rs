//! Command-line front end: `jack-compiler <path>`.
//!
//! A `.jack` file compiles to its sibling `.vm`. A directory compiles
//! every `.jack` file inside (sorted) the same way, each into its own
//! translation unit.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use jack_compiler::compile_source;

fn jack_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();
    Ok(files)
}

fn compile_file(path: &Path) -> Result<(), String> {
    let source =
        fs::read_to_string(path).map_err(|e| format!("reading \"{}\": {e}", path.display()))?;
    let output = path.with_extension("vm");
    let file = File::create(&output)
        .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    let mut writer = compile_source(&source, BufWriter::new(file))
        .map_err(|e| format!("{}: {e}", path.display()))?;
    std::io::Write::flush(&mut writer)
        .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    println!("Compiled {} -> {}", path.display(), output.display());
    Ok(())
}

fn run(path: &Path) -> Result<(), String> {
    if path.is_dir() {
        let files =
            jack_files(path).map_err(|e| format!("reading \"{}\": {e}", path.display()))?;
        if files.is_empty() {
            return Err(format!("no .jack files in \"{}\"", path.display()));
        }
        for file in &files {
            compile_file(file)?;
        }
        Ok(())
    } else {
        compile_file(path)
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <file.jack | directory>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1])) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
