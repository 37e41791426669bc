use clap::{Args, Subcommand};
use tmuxdir_core::{Mutations, WindowDirectory};

use crate::output;
use crate::Context;

#[derive(Args)]
pub struct WindowsArgs {
    #[command(subcommand)]
    pub action: WindowAction,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum WindowAction {
    /// List a session's windows in index order
    List { session: String },
    /// Create a window in a session
    New { session: String, name: String },
    /// Rename a window by ID (e.g., @3)
    Rename { id: String, name: String },
    /// Kill a window by ID (e.g., @3)
    Kill {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn run(args: WindowsArgs, ctx: &Context) {
    if let Err(e) = run_action(args.action, args.json, ctx) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_action(action: WindowAction, json: bool, ctx: &Context) -> tmuxdir_core::Result<()> {
    let mutations = Mutations::new(ctx.executor.clone());

    let session = match action {
        WindowAction::List { session } => session,
        WindowAction::New { session, name } => {
            mutations.create_window(&session, &name)?;
            session
        }
        WindowAction::Rename { id, name } => {
            mutations.rename_window(&id, &name)?;
            println!("renamed {} to {}", id.trim(), name.trim());
            return Ok(());
        }
        WindowAction::Kill { id, yes } => {
            if !yes && !output::confirm(&format!("Kill window {}?", id.trim())) {
                return Ok(());
            }
            mutations.delete_window(&id)?;
            println!("killed {}", id.trim());
            return Ok(());
        }
    };

    if !mutations.session_exists(&session)? {
        log::warn!("session {} not found", session);
    }

    let mut directory = WindowDirectory::new(ctx.executor.clone(), session.trim());
    output::print_windows(directory.refresh()?, json);
    Ok(())
}
