//! Command-line interface definitions using clap
//!
//! Each command's clap structure converts into the matching core parameter
//! type, so `keel_core::params` stays free of clap attributes:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Engine
//! ```
//!
//! Every scheduler and collaborator knob has a `KEEL_*` environment
//! fallback.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};
use keel_core::{
    collaborators::{rekor::DEFAULT_REKOR_SERVER, AnchorConfig},
    duration::parse_duration,
    params::{CreatePlan, Id},
};
use serde_json::Value;

/// Durable phase engine for QPH plans
///
/// Plans move through ESTABLISH, PHRASE, SEAL, SYNC, CONFIRM, SEND and VERIFY
/// one step per tick. `keel work` drives due plans forward; `keel sweep`
/// repairs side effects that never recorded success.
#[derive(Parser)]
#[command(version, about, name = "keel")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/keel/keel.db
    #[arg(long, global = true, env = "KEEL_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Append every published event as a JSON line to this file
    #[arg(long, global = true, env = "KEEL_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Delay before a plan's next step becomes due
    #[arg(
        long,
        global = true,
        env = "KEEL_TICK_DELAY",
        default_value = "1s",
        value_parser = duration_arg
    )]
    pub tick_delay: Duration,

    /// Upper bound on each anchor, pin, webhook or telemetry call
    #[arg(
        long,
        global = true,
        env = "KEEL_CALL_TIMEOUT",
        default_value = "30s",
        value_parser = duration_arg
    )]
    pub call_timeout: Duration,

    /// Webhook URL to broadcast plans to; repeat or comma-separate for more
    #[arg(long, global = true, env = "KEEL_WEBHOOK_URL", value_delimiter = ',')]
    pub webhook_url: Vec<String>,

    /// Record a simulated anchor instead of calling rekor-cli
    #[arg(long, global = true, env = "KEEL_REKOR_SIMULATE")]
    pub rekor_simulate: bool,

    /// Public key used to verify the anchored signature
    #[arg(long, global = true, env = "KEEL_REKOR_PUBKEY_PATH")]
    pub rekor_pubkey_path: Option<PathBuf>,

    /// Detached signature over the canonical payload
    #[arg(long, global = true, env = "KEEL_REKOR_SIG_PATH")]
    pub rekor_sig_path: Option<PathBuf>,

    /// Transparency log server
    #[arg(
        long,
        global = true,
        env = "KEEL_REKOR_SERVER",
        default_value = DEFAULT_REKOR_SERVER
    )]
    pub rekor_server: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    pub fn anchor_config(&self) -> AnchorConfig {
        AnchorConfig {
            simulate: self.rekor_simulate,
            pubkey_path: self.rekor_pubkey_path.clone(),
            signature_path: self.rekor_sig_path.clone(),
            server: self.rekor_server.clone(),
            ..AnchorConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a plan and make it due immediately
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// Record an explicit acknowledgement on a plan
    Ack(IdArgs),
    /// Show one plan
    #[command(alias = "s")]
    Show(IdArgs),
    /// Summarize plans by stage
    Scope,
    /// Run one state-machine step for a plan now
    Tick(IdArgs),
    /// Poll the due index and drive plans forward until Ctrl-C
    #[command(alias = "w")]
    Work(WorkArgs),
    /// Re-drive anchoring, broadcast and receipts on every plan once
    Sweep,
}

/// Create a new plan
#[derive(ClapArgs)]
pub struct CreatePlanArgs {
    /// Unique plan identifier
    pub id: String,
    /// Originating conversation thread
    #[arg(short, long)]
    pub thread: Option<String>,
    /// Correlation pointer; derived at PHRASE when omitted
    #[arg(long)]
    pub scp: Option<String>,
    /// Inbound event as JSON, stored under the payload's `event` key
    #[arg(long, value_parser = json_arg)]
    pub seed: Option<Value>,
}

impl From<CreatePlanArgs> for CreatePlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreatePlan {
            id: val.id,
            thread: val.thread,
            scp: val.scp,
            seed: val.seed,
        }
    }
}

#[derive(ClapArgs)]
pub struct IdArgs {
    #[arg(help = "Unique identifier of the plan")]
    pub id: String,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Worker loop options
#[derive(ClapArgs)]
pub struct WorkArgs {
    /// Sleep between polls of the due index
    #[arg(long, env = "KEEL_WORKER_SLEEP", default_value = "5s", value_parser = duration_arg)]
    pub sleep: Duration,
    /// Make every persisted plan due before the first poll
    #[arg(long, env = "KEEL_BOOT_TICK_ALL")]
    pub boot_tick_all: bool,
    /// Poll once and exit instead of looping
    #[arg(long)]
    pub once: bool,
}

fn duration_arg(input: &str) -> Result<Duration, String> {
    parse_duration(input).map_err(|e| e.to_string())
}

fn json_arg(input: &str) -> Result<Value, String> {
    serde_json::from_str(input).map_err(|e| format!("invalid JSON: {e}"))
}
