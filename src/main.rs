use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use sqlx::MySqlConnection;

use db_backup_lib::cli::Cli;
use db_backup_lib::config::AppConfig;
use db_backup_lib::db::{self, ConnectionParams};
use db_backup_lib::dump::{self, MysqlDump};
use db_backup_lib::notify::{validate_email, Notifier};
use db_backup_lib::platform;
use db_backup_lib::prompt::{self, Answer, ValidationError};
use db_backup_lib::report;

const EXIT_CONNECTION_FAILURE: u8 = 2;
const EXIT_DUMP_FAILURE: u8 = 3;
const EXIT_INVALID_INPUT: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // init logger
    let mut env_logger = env_logger::builder();
    if let Some(level) = cli.verbose {
        env_logger.filter_level(level);
    }
    env_logger.try_init().expect("env_logger should not fail");

    let config: AppConfig = match std::fs::read_to_string(&cli.config) {
        Ok(config_str) => match toml::from_str(&config_str) {
            Err(e) => {
                log::error!("Reading the config file failed: {e}");
                return ExitCode::FAILURE;
            }
            Ok(cfg) => cfg,
        },
        Err(e) => {
            if std::fs::exists(&cli.config).is_ok_and(|b| !b) {
                log::debug!(
                    "Writing default config to {} because it doesn't exist yet",
                    cli.config.display()
                );
                let default_config = AppConfig::default();
                let config_str = toml::to_string_pretty(&default_config)
                    .expect("default config should be serializable");
                if let Err(e) = std::fs::write(&cli.config, config_str) {
                    log::warn!(
                        "Writing default config to {} failed: {e}",
                        cli.config.display(),
                    );
                }

                default_config
            } else {
                log::error!("Reading the config file failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let params = match collect_params(&cli) {
        Ok(params) => params,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    let mut connection = match db::connect(&params).await {
        Ok(connection) => connection,
        Err(e) => {
            log::error!(target: "db", "{e}");
            return ExitCode::from(EXIT_CONNECTION_FAILURE);
        }
    };
    println!("Connected to database '{}'.", params.database);

    let exit_code = run(&mut connection, &cli, &config, &params).await;

    db::close(connection).await;
    exit_code
}

/// The pipeline once a live connection exists.
///
/// Never closes the connection itself; the caller does that on every path.
async fn run(
    connection: &mut MySqlConnection,
    cli: &Cli,
    config: &AppConfig,
    params: &ConnectionParams,
) -> ExitCode {
    if let Err(e) = db::ensure_audit_table(connection).await {
        log::error!(target: "db", "Creating the audit table failed: {e}");
        return ExitCode::from(EXIT_CONNECTION_FAILURE);
    }

    let destination = match resolve_backup_dir(cli) {
        Ok(destination) => destination,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    let dumper = MysqlDump::new(config.dump.utility.clone());
    let artifact = match dump::run_backup(&dumper, params, &destination) {
        Ok(artifact) => artifact,
        Err(e) => {
            log::error!(target: "dump", "{e}");
            println!("Creating the backup of database '{}' failed.", params.database);
            report_history(connection).await;
            return ExitCode::from(EXIT_DUMP_FAILURE);
        }
    };
    println!(
        "Backup of database '{}' created at {}.",
        params.database,
        artifact.display()
    );

    if let Err(e) = db::insert_backup_record(connection).await {
        // the artifact is on disk; a lost audit row is reported, not fatal
        log::error!(target: "db", "Recording the backup failed: {e}");
    }

    maybe_notify(cli, config, &artifact).await;
    platform::reveal_in_file_browser(&destination);
    report_history(connection).await;

    ExitCode::SUCCESS
}

/// Connection parameters from flags and environment, prompting for the rest.
/// The password is always prompted for, masked, never accepted as argv.
fn collect_params(cli: &Cli) -> Result<ConnectionParams, ValidationError> {
    let host = match &cli.host {
        Some(host) => host.clone(),
        None => prompt::prompt_nonempty("Database host", "host", cli.max_attempts)?,
    };
    let user = match &cli.user {
        Some(user) => user.clone(),
        None => prompt::prompt_nonempty("Database user", "user name", cli.max_attempts)?,
    };
    let password = prompt::prompt_password("Database password")?;
    let database = match &cli.database {
        Some(database) => database.clone(),
        None => prompt::prompt_nonempty("Database name", "database name", cli.max_attempts)?,
    };
    let port = match cli.port {
        Some(port) => port,
        None => prompt::prompt_port(cli.max_attempts)?,
    };

    Ok(ConnectionParams {
        host,
        user,
        password,
        database,
        port,
    })
}

/// Destination directory from the flag when valid, otherwise from a prompt.
fn resolve_backup_dir(cli: &Cli) -> Result<PathBuf, ValidationError> {
    if let Some(dir) = &cli.backup_dir {
        let raw = dir.to_string_lossy();
        if !cli.path_grammar.validate(&raw) {
            log::warn!("'{raw}' is not a valid {} directory path", cli.path_grammar);
        } else if !dir.is_dir() {
            log::warn!("'{}' does not exist", dir.display());
        } else {
            return Ok(dir.clone());
        }
    }

    prompt::prompt_backup_dir(cli.path_grammar, cli.max_attempts)
}

/// Who receives the confirmation mail, or [None] when none is wanted.
fn confirmation_recipient(cli: &Cli) -> Option<String> {
    if let Some(email) = &cli.email {
        if validate_email(email) {
            return Some(email.clone());
        }
        log::warn!("'{email}' is not a valid mail address");
    } else if !cli.notification {
        return None;
    } else {
        match prompt::prompt_yes_no("Send a confirmation mail?") {
            Ok(Answer::Yes) => {}
            Ok(Answer::No) => {
                println!("No confirmation mail will be sent.");
                return None;
            }
            Ok(Answer::Unrecognized) => {
                log::warn!("Unrecognized answer, no confirmation mail will be sent");
                return None;
            }
            Err(e) => {
                log::warn!("Reading the answer failed: {e}");
                return None;
            }
        }
    }

    match prompt::prompt_recipient(cli.max_attempts) {
        Ok(recipient) => Some(recipient),
        Err(e) => {
            log::warn!("{e}; no confirmation mail will be sent");
            None
        }
    }
}

async fn maybe_notify(cli: &Cli, config: &AppConfig, artifact: &Path) {
    let Some(recipient) = confirmation_recipient(cli) else {
        return;
    };

    let notifier = Notifier::new(config.smtp.clone());
    match notifier.send_confirmation(&recipient, artifact).await {
        Ok(()) => println!("Confirmation mail sent to {recipient}."),
        Err(e) => log::error!(target: "notify", "{e}"),
    }
}

async fn report_history(connection: &mut MySqlConnection) {
    match db::list_backups(connection).await {
        Ok(records) => report::display_backups(&records),
        Err(e) => log::error!(target: "db", "Reading the audit table failed: {e}"),
    }
}
