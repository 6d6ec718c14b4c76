//! `perlc` command-line interface.

use std::io::{IsTerminal, Write};
use std::path::Path;

use perlc::commands::{check_files, infer_files, lex_file, parse_file, symbols_at};
use perlc::{init_tracing, AnalysisConfig, CliError};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let (config, rest) = match AnalysisConfig::load(&args[2..]) {
        Ok(loaded) => loaded,
        Err(e) => fail(&e),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match command {
        "lex" => match rest.as_slice() {
            [path] => lex_file(Path::new(path), &mut out),
            _ => usage_error("Usage: perlc lex <file>"),
        },
        "parse" => match rest.as_slice() {
            [path] => parse_file(&config, Path::new(path), &mut out),
            _ => usage_error("Usage: perlc parse <file>"),
        },
        "infer" => infer_files(&config, &rest, &mut out),
        "symbols" => match rest.as_slice() {
            [path, offset] => match offset.parse::<u32>() {
                Ok(offset) => symbols_at(&config, path, offset, &mut out),
                Err(_) => usage_error("offset must be a byte offset"),
            },
            _ => usage_error("Usage: perlc symbols <file> <offset>"),
        },
        "check" => {
            let color = std::io::stderr().is_terminal();
            match check_files(&config, &rest, color, &mut out) {
                Ok(0) => Ok(()),
                Ok(_) => {
                    let _ = out.flush();
                    std::process::exit(1);
                }
                Err(e) => Err(e),
            }
        }
        _ => {
            eprintln!("error: unknown command '{command}'");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn usage_error(message: &'static str) -> Result<(), CliError> {
    Err(CliError::Usage(message))
}

fn fail(error: &CliError) -> ! {
    eprintln!("error: {error}");
    std::process::exit(1);
}

fn print_usage() {
    eprintln!("perlc - static analysis for Perl");
    eprintln!();
    eprintln!("Usage: perlc <command> [options] <file>...");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  lex <file>               Show the token stream");
    eprintln!("  parse <file>             Show packages, subs and parse errors");
    eprintln!("  infer <file>...          Show inferred sub returns and variable values");
    eprintln!("  symbols <file> <offset>  Show what is visible at a byte offset");
    eprintln!("  check <file>...          Report parse errors");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --perl=<version>         Perl version floor (default v5.0.0)");
    eprintln!("  --max-depth=<n>          Inference depth limit, 1 to 64 (default 32)");
    eprintln!("  --cache-dir=<dir>        Persist registry stubs under <dir>");
    eprintln!("  --threads=<n>            Worker threads for parallel analysis");
    eprintln!();
    eprintln!("Options can also be set with PERLC_PERL_VERSION, PERLC_MAX_DEPTH,");
    eprintln!("PERLC_CACHE_DIR and PERLC_THREADS.");
}
