//! Arbor CLI
//!
//! Command-line interface for the tree store and the exception journal.
//! Every command goes through the engine dispatcher; the JSON response body
//! is printed to stdout and a failure response exits with status 1.

use arbor_core::logging_facility::{self, Profile};
use arbor_store::db::DEFAULT_DB_PATH;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor - named trees with an exception journal", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "ARBOR_DB", default_value = DEFAULT_DB_PATH)]
    db: String,

    /// Logging profile (dev, prod)
    #[arg(long, global = true, env = "ARBOR_LOG", default_value = "dev")]
    log_profile: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Tree operations
    Tree(commands::tree::TreeArgs),
    /// Exception journal queries
    Journal(commands::journal::JournalArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_profile);

    let result = match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &cli.db),
        Commands::Journal(args) => commands::journal::execute(args, &cli.db),
    };

    match result {
        Ok(response) => {
            println!("{}", commands::render(&response.body));
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
