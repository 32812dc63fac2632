//! CLI argument definitions for the Spamscope binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use spamscope::Settings;
use spamscope::batch::{ClassifyInput, SortKey};
use spamscope::constants::{DEFAULT_BATCH_SIZE, DEFAULT_PING_INTERVAL_SECS, DEFAULT_SERVER_URL};

/// Spamscope: review suspected spam and keep track of scam conversations
#[derive(Parser, Debug)]
#[command(name = "spamscope")]
#[command(about = "Spamscope: classify suspected spam and track scam conversations")]
#[command(version)]
pub struct Cli {
    /// Base URL of the classifier service
    #[arg(long, global = true, default_value = DEFAULT_SERVER_URL, env = "SPAMSCOPE_SERVER_URL")]
    pub server_url: String,

    /// Directory holding spamscope.json
    #[arg(short = 'D', long, global = true, default_value = ".", env = "SPAMSCOPE_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Request timeout in seconds (transport default when unset)
    #[arg(long, global = true, env = "SPAMSCOPE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings from the global flags; commands layer their own on top.
    pub fn settings(&self) -> Settings {
        Settings {
            server_url: self.server_url.clone(),
            data_dir: self.data_dir.clone(),
            request_timeout_secs: self.timeout,
            ..Settings::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether the classifier service is reachable
    Health(HealthArgs),
    /// Manage stored conversations
    #[command(subcommand)]
    Conv(ConvCommand),
    /// Classify a single message
    Check(CheckArgs),
    /// Classify a set of email files
    Batch(BatchArgs),
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Keep probing and print every change until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between probes when watching
    #[arg(short, long, default_value_t = DEFAULT_PING_INTERVAL_SECS, env = "SPAMSCOPE_PING_INTERVAL")]
    pub interval: u64,
}

#[derive(Subcommand, Debug)]
pub enum ConvCommand {
    /// List conversations in order
    List,
    /// Create a conversation
    New {
        /// Title to give it instead of the numbered default
        #[arg(long)]
        title: Option<String>,
    },
    /// Show a conversation's messages
    Show { id: String },
    /// Rename a conversation
    Rename { id: String, title: String },
    /// Delete a conversation
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Append a message
    Add {
        id: String,
        /// Who wrote it
        #[arg(long, value_enum)]
        from: SenderArg,
        text: String,
    },
    /// Generate a reply to the latest scammer message (or --prompt)
    Reply {
        id: String,
        /// Reply to this text instead
        #[arg(long)]
        prompt: Option<String>,
        /// Store the generated reply as a user message
        #[arg(long)]
        append: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SenderArg {
    Scammer,
    User,
}

impl From<SenderArg> for spamscope::Sender {
    fn from(arg: SenderArg) -> Self {
        match arg {
            SenderArg::Scammer => spamscope::Sender::Scammer,
            SenderArg::User => spamscope::Sender::User,
        }
    }
}

/// Arguments for the check command
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct CheckArgs {
    /// Message text
    pub text: Option<String>,

    /// Read the message from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the batch command
#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Files and folders to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Column to sort the table by
    #[arg(long, default_value = "status")]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Text sent to the classifier
    #[arg(long, default_value = "preview", env = "SPAMSCOPE_CLASSIFY_USING")]
    pub using: ClassifyInput,

    /// Requests in flight at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, env = "SPAMSCOPE_BATCH_SIZE")]
    pub batch_size: usize,

    /// Add every spam row as a new conversation
    #[arg(long)]
    pub add_spam: bool,

    /// Add the row for this path as a new conversation
    #[arg(long)]
    pub promote: Vec<String>,
}
