use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gomibi_core::Day;

/// Trash collection day notifier for Saga City.
#[derive(Debug, Parser)]
#[command(name = "gomibi", version, about = "Trash collection day notifier for Saga City")]
pub(crate) struct Cli {
    /// Increase verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to a TOML config file. Falls back to `GOMIBI_CONFIG`.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Announce today's or tomorrow's collection, depending on the hour.
    Notify(NotifyArgs),
    /// Print the categories collected on one or more days.
    Show(ShowArgs),
    /// Announce every collection day in the coming days, one message each.
    Digest(DigestArgs),
    /// Check the schedule rules against known dates.
    SelfTest,
    /// Report whether the webhook is configured.
    CheckConfig(WebhookArgs),
}

/// Webhook override shared by commands that post.
#[derive(Debug, Args)]
pub(crate) struct WebhookArgs {
    /// Discord webhook URL. Takes precedence over the config file and `DISCORD_WEBHOOK_URL`.
    #[arg(long)]
    pub webhook_url: Option<String>,
}

/// Arguments for the `notify` subcommand.
#[derive(Debug, Args)]
pub(crate) struct NotifyArgs {
    #[command(flatten)]
    pub webhook: WebhookArgs,

    /// Announce this day regardless of the current hour.
    #[arg(long, value_enum)]
    pub day: Option<DayArg>,

    /// Print the message instead of posting it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// First date to show (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Number of days to show.
    #[arg(long, default_value_t = 1)]
    pub days: u32,
}

/// Arguments for the `digest` subcommand.
#[derive(Debug, Args)]
pub(crate) struct DigestArgs {
    #[command(flatten)]
    pub webhook: WebhookArgs,

    /// Number of days to cover, starting today.
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// Pause between messages in milliseconds. Overrides the config file.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Print the messages instead of posting them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DayArg {
    Today,
    Tomorrow,
}

impl From<DayArg> for Day {
    fn from(day: DayArg) -> Self {
        match day {
            DayArg::Today => Day::Today,
            DayArg::Tomorrow => Day::Tomorrow,
        }
    }
}
