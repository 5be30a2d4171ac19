//! Tree commands

use arbor_engine::{ApiRequest, ApiResponse};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TreeArgs {
    #[command(subcommand)]
    pub command: TreeCommand,
}

#[derive(Debug, Subcommand)]
pub enum TreeCommand {
    /// Print a tree as nested JSON
    Get {
        tree_name: String,
    },
    /// Create a node, top-level unless --parent is given
    Create {
        tree_name: String,
        node_name: String,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Delete a node that has no children
    Delete {
        node_id: i64,
    },
    /// Rename a node
    Rename {
        node_id: i64,
        new_node_name: String,
    },
}

pub fn execute(args: TreeArgs, db: &str) -> Result<ApiResponse, Box<dyn std::error::Error>> {
    let request = match args.command {
        TreeCommand::Get { tree_name } => ApiRequest::GetTree { tree_name },
        TreeCommand::Create {
            tree_name,
            node_name,
            parent,
        } => ApiRequest::CreateNode {
            tree_name,
            parent_node_id: parent,
            node_name,
        },
        TreeCommand::Delete { node_id } => ApiRequest::DeleteNode { node_id },
        TreeCommand::Rename {
            node_id,
            new_node_name,
        } => ApiRequest::RenameNode {
            node_id,
            new_node_name,
        },
    };

    super::dispatch(db, request)
}
