//! Subcommands
//!
//! Each subcommand turns its arguments into an `ApiRequest` and runs it
//! through a dispatcher opened on the configured database.

pub mod journal;
pub mod tree;

use arbor_core_types::CancellationToken;
use arbor_engine::{ApiRequest, ApiResponse, Dispatcher};
use arbor_store::StoreConfig;

/// Open the database at `db` and dispatch one request
pub fn dispatch(db: &str, request: ApiRequest) -> Result<ApiResponse, Box<dyn std::error::Error>> {
    let dispatcher = Dispatcher::open(&StoreConfig::at(db))?;
    let meta = request.meta();
    Ok(dispatcher.handle(request, &meta, &CancellationToken::new()))
}

/// Pretty-print a response body
pub fn render(body: &serde_json::Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}
