use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::lox::{Lox, Outcome};
use rox::parser::Parser;
use rox::scanner::{scan, Scanner};

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints its syntax tree
    Parse { filename: Option<PathBuf> },

    /// Runs input from a file as a Rox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive session
    Repl,
}

/// Reads the contents of a file as UTF‑8 text
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Write to file with module and source line
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn missing_file(command: &str) -> ! {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let mut tokenized = true;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => {
                if json {
                    println!("{}", serde_json::to_string(&token)?);
                } else {
                    println!("{}", token);
                }
            }

            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(65);
    }

    Ok(())
}

fn parse(source: &str) {
    let (tokens, lex_errors) = scan(source);
    for e in &lex_errors {
        eprintln!("{}", e);
    }

    match Parser::new(&tokens).parse() {
        Ok(statements) if lex_errors.is_empty() => {
            let ast = AstPrinter::print_program(&statements);
            debug!("AST: {}", ast);
            println!("{}", ast);
        }

        Ok(_) => std::process::exit(65),

        Err(errors) => {
            for e in &errors {
                eprintln!("{}", e);
            }
            std::process::exit(65);
        }
    }
}

fn repl() -> Result<()> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };

        lox.run(&line.context("Failed to read from stdin")?);
        lox.reset();
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let filename = filename.unwrap_or_else(|| missing_file("Tokenize"));
            tokenize(&read_file(filename)?, json)?;
        }

        Commands::Parse { filename } => {
            let filename = filename.unwrap_or_else(|| missing_file("Parse"));
            parse(&read_file(filename)?);
        }

        Commands::Run { filename } => {
            let filename = filename.unwrap_or_else(|| missing_file("Run"));
            let source = read_file(filename)?;

            let outcome: Outcome = Lox::new().run(&source);
            info!("Run finished: {:?}", outcome);

            if outcome != Outcome::Completed {
                std::process::exit(outcome.exit_code());
            }
        }

        Commands::Repl => repl()?,
    }

    Ok(())
}
