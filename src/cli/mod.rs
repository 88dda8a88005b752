use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::platform::PathGrammar;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity of the command output.
    #[arg(long)]
    pub verbose: Option<LevelFilter>,

    /// Configuration file with the SMTP account and dump-utility settings.
    #[arg(long, env = "DB_BACKUP_CONFIG", default_value = "db_backup.toml")]
    pub config: PathBuf,

    /// Hostname of the database server. Prompted for when omitted.
    #[arg(long, env = "DB_BACKUP_HOST")]
    pub host: Option<String>,

    /// Database user name. Prompted for when omitted.
    #[arg(long, short = 'u', env = "DB_BACKUP_USER")]
    pub user: Option<String>,

    /// Name of the database to dump. Prompted for when omitted.
    #[arg(long, env = "DB_BACKUP_DATABASE")]
    pub database: Option<String>,

    /// TCP port of the database server. Prompted for when omitted.
    #[arg(long, env = "DB_BACKUP_PORT")]
    pub port: Option<u16>,

    /// Destination directory for the dump artifact. Must already exist.
    #[arg(long, short = 'd')]
    pub backup_dir: Option<PathBuf>,

    /// Recipient of the confirmation mail. Skips the interactive prompt.
    #[arg(long, conflicts_with = "notification")]
    pub email: Option<String>,

    /// Never send a confirmation mail.
    #[arg(
        long = "no-notification",
        action = ArgAction::SetFalse
    )]
    pub notification: bool,

    /// Attempts allowed per interactive prompt before the run gives up.
    #[arg(long, default_value = "3")]
    pub max_attempts: u32,

    /// Path convention used to validate the destination directory.
    #[arg(long, default_value_t = PathGrammar::native())]
    pub path_grammar: PathGrammar,
}
