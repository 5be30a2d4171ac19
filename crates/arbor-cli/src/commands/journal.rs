//! Exception journal commands

use arbor_core::model::JournalFilter;
use arbor_engine::{ApiRequest, ApiResponse};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct JournalArgs {
    #[command(subcommand)]
    pub command: JournalCommand,
}

#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    /// List journal entries, newest first
    List(ListArgs),
    /// Show one journal entry
    Get {
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 0)]
    pub skip: u64,

    #[arg(long, default_value_t = 20)]
    pub take: u64,

    /// Earliest creation time, RFC 3339 (inclusive)
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// Latest creation time, RFC 3339 (inclusive)
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,

    /// Case-sensitive substring of message, type or stack trace
    #[arg(long)]
    pub search: Option<String>,
}

pub fn execute(args: JournalArgs, db: &str) -> Result<ApiResponse, Box<dyn std::error::Error>> {
    let request = match args.command {
        JournalCommand::List(list) => ApiRequest::GetJournalRange {
            skip: list.skip,
            take: list.take,
            filter: JournalFilter {
                from: list.from,
                to: list.to,
                search: list.search,
            },
        },
        JournalCommand::Get { id } => ApiRequest::GetJournalSingle { id },
    };

    super::dispatch(db, request)
}
