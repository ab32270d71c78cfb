//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name used in log spans (e.g. "expand", "has_children").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Check { .. } => "check",
        Commands::HasChildren { .. } => "has_children",
        Commands::Expand { .. } => "expand",
        Commands::Attachments { .. } => "attachments",
    }
}

/// Output format requested by `command`, for commands that take one.
pub fn output_format(command: &Commands) -> Option<&str> {
    match command {
        Commands::Check { format }
        | Commands::Expand { format, .. }
        | Commands::Attachments { format, .. } => Some(format.as_str()),
        Commands::HasChildren { .. } => None,
    }
}
