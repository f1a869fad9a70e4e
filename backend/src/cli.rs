use clap::Parser;

/// Market mover alerts for a Telegram chat.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Emit JSON log lines (implied by APP_ENV=production).
    #[arg(long)]
    pub json_logs: bool,

    /// Log rendered messages instead of posting them.
    #[arg(long)]
    pub dry_run: bool,
}
