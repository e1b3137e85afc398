//! Command-line front end: `hack-assembler <dir> <name>` reads
//! `<dir>/<name>.asm` and writes `<dir>/<name>.hack`.

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use hack_assembler::assemble;

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    reader.lines().collect()
}

fn source_path(dir: &str, name: &str) -> PathBuf {
    Path::new(dir).join(format!("{name}.asm"))
}

fn target_path(dir: &str, name: &str) -> PathBuf {
    Path::new(dir).join(format!("{name}.hack"))
}

fn run(dir: &str, name: &str) -> Result<(), String> {
    let input = source_path(dir, name);
    let output = target_path(dir, name);

    let lines =
        read_lines(&input).map_err(|e| format!("reading \"{}\": {e}", input.display()))?;
    let words = assemble(&lines).map_err(|e| e.to_string())?;

    let file =
        File::create(&output).map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for word in &words {
        writeln!(writer, "{word}")
            .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;
    }
    writer
        .flush()
        .map_err(|e| format!("writing \"{}\": {e}", output.display()))?;

    println!("Assembled {} -> {}", input.display(), output.display());
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <dir> <name>", args[0]);
        eprintln!();
        eprintln!("Reads <dir>/<name>.asm and writes <dir>/<name>.hack");
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2]) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
