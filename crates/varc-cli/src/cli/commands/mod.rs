//! CLI command handlers. Each command is in its own file for clarity.

mod describe;
mod fetch;
mod treehash;

pub use describe::run_describe;
pub use fetch::run_fetch;
pub use treehash::run_treehash;
