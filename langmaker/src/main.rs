//! langmaker CLI: runs programs written in a generated language and scaffolds new languages.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use langmaker::scaffold;
use langmaker_eval::Interpreter;
use langmaker_parser::dump::TokenDump;
use langmaker_spec::Specification;

#[derive(Parser)]
#[command(name = "langmaker", version, about = "Build and run tiny configurable languages")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program.
    Run(RunArgs),
    /// Generate a project directory (README, examples, wrapper script) for a language.
    New(NewArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Program to run. Must carry the language's file extension.
    file: PathBuf,

    /// Language configuration (JSON). Defaults to the built-in SOARES language.
    #[arg(long, env = "LANGMAKER_SPEC")]
    spec: Option<PathBuf>,

    /// Print the token stream to stderr before running.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed program to stderr before running.
    #[arg(long)]
    dump_ast: bool,
}

#[derive(Parser)]
struct NewArgs {
    /// Language configuration (JSON).
    config: PathBuf,

    /// Directory the language directory is created in.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            if let Err(err) = run(&args) {
                println!("{}", langmaker::error_message(&err));
                process::exit(1);
            }
        }
        Commands::New(args) => {
            if let Err(err) = new(&args) {
                eprintln!("{:?}", err);
                process::exit(1);
            }
        }
    }
}

/// Logs go to stderr so they never mix with program output.
/// Enabled by --verbose or the RUST_LOG env var.
fn init_tracing(verbose: bool) {
    if verbose || std::env::var("RUST_LOG").is_ok() {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else {
            tracing_subscriber::EnvFilter::new("debug")
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }
}

fn load_spec(path: Option<&PathBuf>) -> langmaker_spec::Result<Specification> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading specification");
            Specification::from_path(path)
        }
        None => Ok(Specification::default()),
    }
}

fn run(args: &RunArgs) -> langmaker::Result<()> {
    let spec = load_spec(args.spec.as_ref())?;
    let source = langmaker::read_source(&args.file, &spec)?;
    let compiled = langmaker::compile(&source, &spec)?;

    if args.dump_tokens {
        eprint!("{}", TokenDump(&compiled.tokens));
    }
    if args.dump_ast {
        eprint!("{}", compiled.program);
    }

    Interpreter::with_stdout(&spec).run(&compiled.program)?;
    Ok(())
}

fn new(args: &NewArgs) -> miette::Result<()> {
    let spec = load_spec(Some(&args.config))?;
    let dir = scaffold::generate(&spec, &args.out)?;

    println!(
        "{} language has been successfully generated in {}",
        spec.language_name,
        dir.display()
    );
    println!(
        "To run a {} program, use: ./{} <filename>{}",
        spec.language_name, spec.command_name, spec.file_extension
    );
    Ok(())
}
