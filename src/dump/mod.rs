//! The backup executor: produce one dump artifact and verify it landed.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use chrono::{Local, NaiveDateTime};
use derive_more::{Display, Error};

use crate::db::ConnectionParams;

/// Failure to produce a dump artifact. No audit row is written for any of
/// these.
#[derive(Debug, Display, Error)]
pub enum DumpError {
    /// The dump utility could not be started.
    #[display("starting the dump utility failed: {_0}")]
    Spawn(io::Error),
    /// The artifact file could not be created or written.
    #[display("writing the dump artifact failed: {_0}")]
    Artifact(io::Error),
    /// The dump utility ran but exited unsuccessfully.
    #[display("the dump utility exited with {status}")]
    Utility {
        #[error(ignore)]
        status: ExitStatus,
    },
    /// The dump utility finished but left no artifact behind.
    #[display("no dump artifact at {}", _0.display())]
    ArtifactMissing(#[error(ignore)] PathBuf),
}

/// Capability to serialize one database into an artifact file.
///
/// The workflow only depends on this seam, so it can run against a fake
/// implementation in tests, independent of any database engine being
/// installed.
pub trait Dumper {
    fn dump(&self, params: &ConnectionParams, artifact: &Path) -> Result<(), DumpError>;
}

/// Production [Dumper] shelling out to `mysqldump` (or a compatible utility).
pub struct MysqlDump {
    utility: String,
}

impl MysqlDump {
    pub fn new(utility: String) -> Self {
        Self { utility }
    }
}

impl Dumper for MysqlDump {
    fn dump(&self, params: &ConnectionParams, artifact: &Path) -> Result<(), DumpError> {
        log::debug!(target: "dump", "Running {} for database '{}'", self.utility, params.database);

        // The password travels in the child's environment, never in argv
        // where other processes on the host could read it.
        let mut dump_process = Command::new(&self.utility)
            .arg(format!("--user={}", params.user))
            .arg(format!("--host={}", params.host))
            .arg(format!("--port={}", params.port))
            .arg(&params.database)
            .env("MYSQL_PWD", &params.password)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(DumpError::Spawn)?;
        log::trace!(target: "dump", "Started {} process", self.utility);

        // capture stdout of the dump utility into the artifact
        let stdout = dump_process.stdout.take().unwrap();
        let mut reader = BufReader::new(stdout);
        let mut artifact_file = File::create_new(artifact).map_err(DumpError::Artifact)?;
        io::copy(&mut reader, &mut artifact_file).map_err(DumpError::Artifact)?;

        let exit_status = dump_process.wait().map_err(DumpError::Spawn)?;
        if !exit_status.success() {
            // the utility may have written a partial dump before failing
            if let Err(e) = fs::remove_file(artifact) {
                log::warn!(target: "dump", "Removing the partial artifact failed: {e}");
            }
            return Err(DumpError::Utility {
                status: exit_status,
            });
        }

        log::info!(target: "dump", "Finished dump of database '{}'", params.database);
        Ok(())
    }
}

/// Artifact name embedding the database and a full timestamp, unique per run.
pub fn artifact_filename(database: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{database}_backup_{}.sql",
        timestamp.format("%Y_%m_%d_%H_%M_%S")
    )
}

/// Runs one backup into `destination` and verifies the artifact landed.
///
/// Returns the artifact path on success; the caller inserts the audit row
/// only then. `destination` must already exist, it is never created here.
pub fn run_backup(
    dumper: &dyn Dumper,
    params: &ConnectionParams,
    destination: &Path,
) -> Result<PathBuf, DumpError> {
    let artifact = destination.join(artifact_filename(
        &params.database,
        Local::now().naive_local(),
    ));
    log::debug!(target: "dump", "Dump artifact: {}", artifact.display());

    dumper.dump(params, &artifact)?;

    if !artifact.is_file() {
        return Err(DumpError::ArtifactMissing(artifact));
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_params() -> ConnectionParams {
        ConnectionParams {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: "secret".to_string(),
            database: "shopdb".to_string(),
            port: 3306,
        }
    }

    /// Writes a canned dump, standing in for a working utility.
    struct FixedDumper(&'static [u8]);

    impl Dumper for FixedDumper {
        fn dump(&self, _params: &ConnectionParams, artifact: &Path) -> Result<(), DumpError> {
            fs::write(artifact, self.0).map_err(DumpError::Artifact)
        }
    }

    /// Reports success without producing any output file.
    struct SilentDumper;

    impl Dumper for SilentDumper {
        fn dump(&self, _params: &ConnectionParams, _artifact: &Path) -> Result<(), DumpError> {
            Ok(())
        }
    }

    #[test]
    fn artifact_filename_embeds_database_and_timestamp() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        assert_eq!(
            artifact_filename("shopdb", timestamp),
            "shopdb_backup_2024_03_01_10_00_00.sql"
        );
    }

    #[test]
    fn successful_dump_leaves_a_verified_artifact() {
        let destination = tempfile::tempdir().unwrap();
        let dumper = FixedDumper(b"-- MySQL dump\nCREATE TABLE t (id INT);\n");

        let artifact = run_backup(&dumper, &test_params(), destination.path()).unwrap();

        assert!(artifact.is_file());
        let name = artifact.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("shopdb_backup_"));
        assert!(name.ends_with(".sql"));
    }

    #[test]
    fn missing_artifact_is_a_dump_failure() {
        let destination = tempfile::tempdir().unwrap();

        let result = run_backup(&SilentDumper, &test_params(), destination.path());

        assert!(matches!(result, Err(DumpError::ArtifactMissing(_))));
        // nothing was left behind in the destination
        assert_eq!(fs::read_dir(destination.path()).unwrap().count(), 0);
    }
}
