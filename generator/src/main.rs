use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "blgen",
    version,
    about = "Builtin library generator — expands .def builtin definitions into C source tiers"
)]
struct Cli {
    /// Input .def builtin definition file
    def_file: PathBuf,

    /// Directory receiving the four generated C source files
    out_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // ── Read source ──
    let source = match std::fs::read_to_string(&cli.def_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("blgen: error: {}: {}", cli.def_file.display(), e);
            std::process::exit(2);
        }
    };

    // ── Parse ──
    let program = match blgen::parser::parse(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("blgen: error: {}: {}", cli.def_file.display(), e);
            std::process::exit(1);
        }
    };

    // ── Emit ──
    let mut generator = blgen::generate::Generator::new(&cli.out_dir);
    for function in &program.functions {
        if let Err(e) = generator.add(function) {
            eprintln!("blgen: error: {}", e);
            std::process::exit(1);
        }
    }

    // ── Flush ──
    if let Err(e) = generator.write() {
        eprintln!("blgen: error: {}", e);
        std::process::exit(2);
    }
}
