//! Connection management and the audit table.
//!
//! Exactly one connection is open at a time; it is used sequentially for the
//! schema check, one audit insert and one read-all query, then closed.

use std::fmt;

use chrono::{Local, NaiveDateTime};
use derive_more::{Display, Error, From};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;

/// Parameters of one database connection, collected once per run.
///
/// Never persisted; the password is redacted from debug output.
#[derive(Clone)]
pub struct ConnectionParams {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

/// Driver-level failure to reach or authenticate to the database.
///
/// Fatal: the run aborts before any side effect.
#[derive(Debug, Display, Error, From)]
#[display("connecting to the database failed: {_0}")]
pub struct ConnectionError(sqlx::Error);

/// One row of the audit table.
#[derive(Debug, sqlx::FromRow)]
pub struct BackupRecord {
    pub id: i32,
    pub backup_date: NaiveDateTime,
}

/// Opens a connection to the database described by `params`.
pub async fn connect(params: &ConnectionParams) -> Result<MySqlConnection, ConnectionError> {
    log::debug!(target: "db", "Connecting to {}:{}/{} as '{}'", params.host, params.port, params.database, params.user);

    let options = MySqlConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .password(&params.password)
        .database(&params.database);

    let connection = MySqlConnection::connect_with(&options).await?;
    log::info!(target: "db", "Connected to database '{}'", params.database);

    Ok(connection)
}

/// Creates the audit table when absent. Safe to call on every run.
pub async fn ensure_audit_table(connection: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS backups (
            id INT AUTO_INCREMENT PRIMARY KEY,
            backup_date DATETIME NOT NULL
        )",
    )
    .execute(connection)
    .await?;

    log::debug!(target: "db", "Audit table present");
    Ok(())
}

/// Inserts one audit row stamped with the current local time.
///
/// Called only after the dump artifact was confirmed on disk; the insert is
/// the durability signal of the run.
pub async fn insert_backup_record(connection: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    let now = Local::now().naive_local();
    sqlx::query("INSERT INTO backups (backup_date) VALUES (?)")
        .bind(now)
        .execute(connection)
        .await?;

    log::info!(target: "db", "Recorded backup at {now}");
    Ok(())
}

/// Reads every audit row in storage order.
pub async fn list_backups(
    connection: &mut MySqlConnection,
) -> Result<Vec<BackupRecord>, sqlx::Error> {
    sqlx::query_as::<_, BackupRecord>("SELECT id, backup_date FROM backups ORDER BY id")
        .fetch_all(connection)
        .await
}

/// Releases the connection. Invoked exactly once per successful [`connect`].
pub async fn close(connection: MySqlConnection) {
    if let Err(e) = connection.close().await {
        log::warn!(target: "db", "Closing the database connection failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_password() {
        let params = ConnectionParams {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: "hunter2".to_string(),
            database: "shopdb".to_string(),
            port: 3306,
        };

        let rendered = format!("{params:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}
