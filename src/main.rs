//! Board CLI entry point.

use board::cli::commands;
use board::cli::{Cli, Commands};
use board::config;
use board::engine::Board;
use board::error::Error;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let json = cli.json;

    // Commands that never touch the board
    match &cli.command {
        Commands::Version => return commands::version::execute(json),
        Commands::Completions { shell } => return commands::completions::execute(shell),
        _ => {}
    }

    let config = config::load(&cli.overrides())?;
    let board = Board::new(config).dry_run(cli.dry_run);

    match &cli.command {
        // Item transitions
        Commands::Create(args) => commands::item::execute_create(&board, args, json),
        Commands::Complete { id, links } => {
            commands::item::execute_complete(&board, id, links.as_deref(), json)
        }
        Commands::Block(args) => commands::item::execute_block(&board, args, json),
        Commands::Unblock { id } => commands::item::execute_unblock(&board, id, json),
        Commands::Move { id, to } => commands::item::execute_move(&board, id, to, json),
        Commands::Edit(args) => commands::item::execute_edit(&board, args, json),

        // Whole-board operations
        Commands::List => commands::list::execute(&board, json),
        Commands::Archive { keep } => commands::archive::execute(&board, *keep, json),
        Commands::Lint => commands::lint::execute(&board, json),

        // Companions
        Commands::ValidatePr { text } => {
            commands::pr::execute(board.config(), text.as_deref(), json)
        }
        Commands::CleanLock => commands::lock::execute(board.config(), json),

        Commands::Version | Commands::Completions { .. } => Ok(()),
    }
}
