///
/// rill CLI - command-line driver for the rill language
///
/// Provides commands for running and inspecting rill code:
/// - rill run <file>: Run a program's `main` (or a script with --script)
/// - rill ast <file>: Print the syntax tree
/// - rill tokens <file>: Print the token stream
/// - rill check [path]: Parse a file or every .rill file under a directory
///
/// Any error is printed to stderr prefixed with `ERROR: ` and the process
/// exits with -1.
///

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};

use rillc::lexer::{TokenStreamExt, Tokenizer};
use rillc::{AstDumper, Config, DiagnosticReporter, Error, SourceBuffer, Token, parse_source, parse_unit, read_source};

#[derive(Parser)]
#[command(name = "rill")]
#[command(author, version, about = "The rill scripting language", long_about = None)]
struct Cli {
    /// Config file to use instead of the nearest rill.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a rill program
    Run {
        /// The file to run
        file: PathBuf,

        /// Treat the file as a script of statements instead of a program with `main`
        #[arg(long)]
        script: bool,
    },

    /// Print the syntax tree of a file
    Ast {
        /// The file to dump
        file: PathBuf,

        /// Treat the file as a script of statements
        #[arg(long)]
        script: bool,

        /// Leave source ranges out of the dump
        #[arg(long)]
        no_ranges: bool,
    },

    /// Print the tokens of a file
    Tokens {
        /// The file to tokenize
        file: PathBuf,

        /// Keep whitespace, line breaks and comments
        #[arg(long)]
        all: bool,

        /// Print the tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse without running
    Check {
        /// File or directory to check
        path: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ok = match &cli.command {
        Commands::Run { file, script } => with_source(file, |buffer| run_file(buffer, &cli, *script)),
        Commands::Ast {
            file,
            script,
            no_ranges,
        } => with_source(file, |buffer| dump_ast(buffer, &cli, *script, *no_ranges)),
        Commands::Tokens { file, all, json } => with_source(file, |buffer| dump_tokens(buffer, *all, *json)),
        Commands::Check { path } => check_code(path.as_deref()),
    };

    if !ok {
        std::process::exit(-1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

/// Reads `file` and runs `action` on it, reporting any error. Returns
/// whether everything succeeded.
fn with_source(file: &Path, action: impl FnOnce(&SourceBuffer) -> Result<(), Error>) -> bool {
    let buffer = match read_source(file) {
        Ok(buffer) => buffer,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            return false;
        }
    };
    match action(&buffer) {
        Ok(()) => true,
        Err(err) => {
            DiagnosticReporter::new(&buffer).report(&err);
            false
        }
    }
}

fn load_config(cli: &Cli, file: &Path) -> Result<Config, Error> {
    Ok(Config::discover(cli.config.as_deref(), file)?)
}

fn run_file(buffer: &SourceBuffer, cli: &Cli, script: bool) -> Result<(), Error> {
    let config = load_config(cli, Path::new(&buffer.name))?;
    let stdout = std::io::stdout();
    let result = if script {
        rillc::run_script(buffer, &config, stdout.lock())?
    } else {
        rillc::run(buffer, &config, stdout.lock())?
    };
    info!(result = %result, "finished");
    Ok(())
}

fn dump_ast(buffer: &SourceBuffer, cli: &Cli, script: bool, no_ranges: bool) -> Result<(), Error> {
    let config = load_config(cli, Path::new(&buffer.name))?;
    let show_ranges = config.dump.show_ranges && !no_ranges;
    let text = if script {
        let source = parse_source(buffer)?;
        AstDumper::new(&source.names).show_ranges(show_ranges).dump_source(&source)
    } else {
        let unit = parse_unit(buffer)?;
        AstDumper::new(&unit.names).show_ranges(show_ranges).dump_unit(&unit)
    };
    print!("{}", text);
    Ok(())
}

fn dump_tokens(buffer: &SourceBuffer, all: bool, json: bool) -> Result<(), Error> {
    let tokens: Vec<Token> = if all {
        Tokenizer::new(buffer).collect::<Result<_, _>>()?
    } else {
        Tokenizer::new(buffer).without_trivia().collect::<Result<_, _>>()?
    };
    debug!(count = tokens.len(), "tokenized");

    if json {
        let text = serde_json::to_string_pretty(&tokens).map_err(|e| Error::Io {
            path: PathBuf::from(&buffer.name),
            source: e.into(),
        })?;
        println!("{}", text);
    } else {
        for token in &tokens {
            println!("{} {}", token.location, token);
        }
    }
    Ok(())
}

fn check_code(path: Option<&Path>) -> bool {
    let path = path.unwrap_or(Path::new("."));

    if path.is_file() {
        let ok = with_source(path, check_buffer);
        if ok {
            println!("No errors in {}", path.display());
        }
        ok
    } else if path.is_dir() {
        check_directory(path)
    } else {
        eprintln!("ERROR: {} does not exist", path.display());
        false
    }
}

fn check_buffer(buffer: &SourceBuffer) -> Result<(), Error> {
    parse_unit(buffer)?;
    Ok(())
}

fn check_directory(path: &Path) -> bool {
    let mut checked = 0;
    let mut errors = 0;

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if file_path.extension().map(|e| e == "rill").unwrap_or(false) {
            if !with_source(file_path, check_buffer) {
                errors += 1;
            }
            checked += 1;
        }
    }

    println!("Checked {} files, {} with errors", checked, errors);
    errors == 0
}
