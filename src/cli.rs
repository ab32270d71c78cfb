//! CLI domain: parse, route, help, output, and presentation only.
//! No resolution logic; the route table dispatches to the composition engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{parse_bag_entry, Cli, Commands};
pub use presentation::{CheckReport, GroupSummary, TreeSummary};
pub use route::RunContext;
