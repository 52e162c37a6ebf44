//! CLI command implementations.

mod ask;
mod config;
mod context;
mod ingest;
mod list;
mod remove;
mod summarize;

pub use ask::run_ask;
pub use config::run_config;
pub use context::run_context;
pub use ingest::run_ingest;
pub use list::run_list;
pub use remove::run_remove;
pub use summarize::run_summarize;
