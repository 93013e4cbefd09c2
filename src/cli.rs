use clap::{Parser, Subcommand};

/// Curator — moderation-queue notifier
#[derive(Parser)]
#[command(name = "curator", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the notifier service
    Serve {
        /// Port for the interaction callback listener
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect and decide queued suggestions directly
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// List pending suggestions
    List,
    /// Approve a pending suggestion
    Approve { suggestion_id: i64 },
    /// Reject a pending suggestion
    Reject { suggestion_id: i64 },
}
