use std::path::PathBuf;

use clap::{CommandFactory, Parser as ClapParser, error::ErrorKind};
use jsmir::{
    driver::{self, CompileError, Emit},
    frontend::{SourceFile, SourceFileOrigin},
};

#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    source_files: Vec<PathBuf>,

    /// Representation to print for every file
    #[arg(long, default_value_t = Emit::Lowered)]
    emit: Emit,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only log when asked to
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    let args = Args::parse();

    init_tracing();

    if args.source_files.is_empty() {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "Missing source files!")
            .exit();
    }

    for source_file in &args.source_files {
        if !source_file.exists() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Source file '{}' does not exist!", source_file.display()),
                )
                .exit()
        }

        if !source_file.is_file() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Input path '{}' is not a file!", source_file.display()),
                )
                .exit()
        }
    }

    let mut failed = false;

    for path in args.source_files {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Failed to read '{}': {error}", path.display());
                failed = true;
                continue;
            }
        };

        let source = SourceFile {
            contents,
            origin: SourceFileOrigin::File(path),
        };

        match driver::compile(&source) {
            Ok(compilation) => print!("{}", compilation.dump(args.emit)),
            Err(CompileError::Source(diagnostics)) => {
                let rendered = if args.no_color {
                    diagnostics.render_plain(&source)
                } else {
                    diagnostics.render(&source)
                };

                eprint!("{rendered}");
                failed = true;
            }
            Err(CompileError::Internal(error)) => {
                eprintln!("internal compiler error in {}: {error}", source.origin);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
