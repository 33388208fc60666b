//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod discover;
pub mod policies;
pub mod rules;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Discover => discover::handle(global).await,
        Command::Policies(args) => policies::handle(args, global).await,
        Command::Rules(args) => rules::handle(args, global).await,
        Command::Check(args) => check::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
